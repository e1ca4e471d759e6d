//=========================================================================
// Ticker
//=========================================================================
//
// Frame-timing sources that drive Game::run.
//
// Architecture:
//   Ticker::poll() ──► TickSignal::Frame(FrameEvent)   → Game::tick
//                 └──► TickSignal::Control(command)    → pause/resume/stop
//
// Implementations:
//   FrameTicker  - wall-clock frames via crossbeam tick channel
//   ManualTicker - scripted frames for headless hosts and tests
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

use crossbeam_channel::Sender;

//=== Internal Dependencies ===============================================

use crate::core::lifecycle::AsAny;

//=== Module Declarations =================================================

mod frame_ticker;
mod manual;

//=== Public API ==========================================================

pub use frame_ticker::FrameTicker;
pub use manual::ManualTicker;

//=== FrameEvent ==========================================================

/// Timing information delivered with every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameEvent {
    /// Zero-based index of this frame since the ticker was created.
    pub frame: u64,

    /// Time since the previous frame.
    pub delta: Duration,

    /// Accumulated frame time, excluding time spent paused.
    pub elapsed: Duration,

    /// Target frames per second of the ticker that produced this frame.
    pub frame_rate: f64,
}

impl FrameEvent {
    /// The first frame of a ticker running at `frame_rate`.
    ///
    /// Its delta is one nominal period.
    pub fn first(frame_rate: f64) -> Self {
        let period = period_of(frame_rate);
        Self {
            frame: 0,
            delta: period,
            elapsed: period,
            frame_rate,
        }
    }

    /// The frame following this one, one nominal period later.
    pub fn next(&self) -> Self {
        let period = period_of(self.frame_rate);
        Self {
            frame: self.frame + 1,
            delta: period,
            elapsed: self.elapsed + period,
            frame_rate: self.frame_rate,
        }
    }

    /// `delta` in seconds, for simulation math.
    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }
}

pub(crate) fn period_of(frame_rate: f64) -> Duration {
    Duration::from_secs_f64(1.0 / frame_rate)
}

/// Nominal frame period, or `None` if `frame_rate` is not a positive,
/// finite rate with a non-zero period representable as a `Duration`.
pub(crate) fn checked_period(frame_rate: f64) -> Option<Duration> {
    if !frame_rate.is_finite() || frame_rate <= 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(1.0 / frame_rate)
        .ok()
        .filter(|period| !period.is_zero())
}

//=== Signals =============================================================

/// Out-of-band control request delivered through a ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickerCommand {
    Pause,
    Resume,
    Stop,
}

/// What [`Ticker::poll`] produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickSignal {
    Frame(FrameEvent),
    Control(TickerCommand),
}

//=== Ticker Trait ========================================================

/// Frame-timing source.
///
/// The game owns exactly one ticker and is its only consumer: frames are
/// pulled by [`Game::run`](crate::Game::run) and handed to
/// [`Game::tick`](crate::Game::tick).
pub trait Ticker: AsAny {
    /// Begins (or resumes) frame emission.
    fn start(&mut self);

    /// Stops frame emission; control signals still flow.
    fn pause(&mut self);

    fn is_running(&self) -> bool;

    fn frame_rate(&self) -> f64;

    /// Blocks until the next frame or control request.
    ///
    /// While paused, only control requests are returned.
    fn poll(&mut self) -> TickSignal;

    /// A thread-safe handle for sending control requests, if supported.
    fn handle(&self) -> Option<TickerHandle> {
        None
    }
}

//=== TickerHandle ========================================================

/// Cloneable, `Send` remote control for a ticker.
#[derive(Debug, Clone)]
pub struct TickerHandle {
    sender: Sender<TickerCommand>,
}

impl TickerHandle {
    pub(crate) fn new(sender: Sender<TickerCommand>) -> Self {
        Self { sender }
    }

    /// Requests a pause. Returns `false` if the ticker is gone.
    pub fn pause(&self) -> bool {
        self.send(TickerCommand::Pause)
    }

    /// Requests a resume. Returns `false` if the ticker is gone.
    pub fn resume(&self) -> bool {
        self.send(TickerCommand::Resume)
    }

    /// Requests that `Game::run` return. Returns `false` if the ticker is gone.
    pub fn stop(&self) -> bool {
        self.send(TickerCommand::Stop)
    }

    fn send(&self, command: TickerCommand) -> bool {
        self.sender.send(command).is_ok()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
