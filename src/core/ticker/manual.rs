//=========================================================================
// Manual Ticker
//=========================================================================
//
// Clock-free ticker fed from a script of signals. Used by hosts that own
// their own loop and by tests that need deterministic frame delivery.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::VecDeque;

//=== Internal Dependencies ===============================================

use super::{FrameEvent, TickSignal, Ticker, TickerCommand};

//=== ManualTicker ========================================================

/// Ticker that replays queued signals.
///
/// Frames popped while the ticker is paused are discarded, mirroring a
/// real clock that does not fire while stopped. An exhausted script
/// yields `Stop`.
#[derive(Debug)]
pub struct ManualTicker {
    frame_rate: f64,
    running: bool,
    script: VecDeque<TickSignal>,
    next_frame: FrameEvent,
    start_calls: usize,
    pause_calls: usize,
}

impl ManualTicker {
    pub fn new(frame_rate: f64) -> Self {
        Self {
            frame_rate,
            running: false,
            script: VecDeque::new(),
            next_frame: FrameEvent::first(frame_rate),
            start_calls: 0,
            pause_calls: 0,
        }
    }

    /// Appends `count` frames, one nominal period apart.
    pub fn push_frames(&mut self, count: usize) -> &mut Self {
        for _ in 0..count {
            self.script.push_back(TickSignal::Frame(self.next_frame));
            self.next_frame = self.next_frame.next();
        }
        self
    }

    /// Appends a control request.
    pub fn push_command(&mut self, command: TickerCommand) -> &mut Self {
        self.script.push_back(TickSignal::Control(command));
        self
    }

    /// Number of signals not yet polled.
    pub fn pending(&self) -> usize {
        self.script.len()
    }

    /// How many times `start` has been called.
    pub fn start_calls(&self) -> usize {
        self.start_calls
    }

    /// How many times `pause` has been called.
    pub fn pause_calls(&self) -> usize {
        self.pause_calls
    }
}

impl Default for ManualTicker {
    fn default() -> Self {
        Self::new(120.0)
    }
}

impl Ticker for ManualTicker {
    fn start(&mut self) {
        self.start_calls += 1;
        self.running = true;
    }

    fn pause(&mut self) {
        self.pause_calls += 1;
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    fn poll(&mut self) -> TickSignal {
        while let Some(signal) = self.script.pop_front() {
            match signal {
                TickSignal::Frame(_) if !self.running => continue,
                other => return other,
            }
        }
        TickSignal::Control(TickerCommand::Stop)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
