//=========================================================================
// Frame Ticker
//=========================================================================
//
// Wall-clock ticker built on crossbeam channels.
//
// Architecture:
//   clock:   crossbeam_channel::tick(1 / frame_rate)  (None while paused)
//   control: unbounded channel fed by TickerHandle
//
//   poll() selects over both; while paused it blocks on control only.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::{Duration, Instant};

use crossbeam_channel::{select, tick, unbounded, Receiver, Sender};
use log::{debug, trace};

//=== Internal Dependencies ===============================================

use super::{checked_period, FrameEvent, TickSignal, Ticker, TickerCommand, TickerHandle};

//=== FrameTicker =========================================================

/// Ticker that emits frames at a fixed target rate.
///
/// Frames are paced by a crossbeam `tick` channel, so a slow frame does not
/// accumulate a backlog: the clock keeps at most one pending instant.
pub struct FrameTicker {
    frame_rate: f64,
    period: Duration,
    clock: Option<Receiver<Instant>>,
    control_tx: Sender<TickerCommand>,
    control_rx: Receiver<TickerCommand>,
    last: Option<Instant>,
    elapsed: Duration,
    frame: u64,
}

impl FrameTicker {
    /// Creates a stopped ticker targeting `frame_rate` frames per second.
    ///
    /// # Panics
    ///
    /// Panics if `frame_rate` is not positive and finite, or is so small
    /// that its period overflows a `Duration`.
    pub fn new(frame_rate: f64) -> Self {
        let Some(period) = checked_period(frame_rate) else {
            panic!("Frame rate must be positive and finite, got {}", frame_rate);
        };
        let (control_tx, control_rx) = unbounded();

        Self {
            frame_rate,
            period,
            clock: None,
            control_tx,
            control_rx,
            last: None,
            elapsed: Duration::ZERO,
            frame: 0,
        }
    }

    /// Nominal time between frames.
    pub fn period(&self) -> Duration {
        self.period
    }

    fn advance(&mut self, now: Instant) -> FrameEvent {
        let delta = match self.last {
            Some(last) => now.saturating_duration_since(last),
            None => self.period,
        };
        self.last = Some(now);
        self.elapsed += delta;

        let event = FrameEvent {
            frame: self.frame,
            delta,
            elapsed: self.elapsed,
            frame_rate: self.frame_rate,
        };
        self.frame += 1;

        trace!("Frame {} (delta: {:?})", event.frame, event.delta);
        event
    }

    fn wait_for_control(&self) -> TickSignal {
        // The ticker owns a sender, so this only fails if it is being torn down.
        match self.control_rx.recv() {
            Ok(command) => TickSignal::Control(command),
            Err(_) => TickSignal::Control(TickerCommand::Stop),
        }
    }
}

impl Ticker for FrameTicker {
    fn start(&mut self) {
        if self.clock.is_some() {
            return;
        }

        debug!("Frame ticker started ({} fps)", self.frame_rate);
        self.clock = Some(tick(self.period));
        self.last = Some(Instant::now());
    }

    fn pause(&mut self) {
        if self.clock.take().is_some() {
            debug!("Frame ticker paused at frame {}", self.frame);
        }
        self.last = None;
    }

    fn is_running(&self) -> bool {
        self.clock.is_some()
    }

    fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    fn poll(&mut self) -> TickSignal {
        let Some(clock) = self.clock.clone() else {
            return self.wait_for_control();
        };
        let control = self.control_rx.clone();

        select! {
            recv(control) -> command => {
                TickSignal::Control(command.unwrap_or(TickerCommand::Stop))
            }
            recv(clock) -> now => match now {
                Ok(now) => TickSignal::Frame(self.advance(now)),
                Err(_) => TickSignal::Control(TickerCommand::Stop),
            },
        }
    }

    fn handle(&self) -> Option<TickerHandle> {
        Some(TickerHandle::new(self.control_tx.clone()))
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
