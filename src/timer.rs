use tracing::trace;

use crate::session::{SessionState, TIMED_SECONDS};

/// Result of delivering one tick to the timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTick {
    /// Timer not running, tick dropped
    Stopped,
    /// Seconds left after this tick
    Running(u32),
    /// Countdown reached zero; the timer has stopped itself
    Expired,
}

/// Countdown for timed sessions.
///
/// The timer holds no clock of its own: the host delivers one `on_tick` per
/// elapsed second and the remaining time is kept on the session.
#[derive(Debug, Clone, Default)]
pub struct Timer {
    running: bool,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, session: &mut SessionState) {
        session.time_remaining = Some(TIMED_SECONDS);
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn on_tick(&mut self, session: &mut SessionState) -> TimerTick {
        if !self.running {
            return TimerTick::Stopped;
        }

        let remaining = session.time_remaining.unwrap_or(0).saturating_sub(1);
        session.time_remaining = Some(remaining);
        trace!(remaining, "tick");

        if remaining == 0 {
            self.running = false;
            TimerTick::Expired
        } else {
            TimerTick::Running(remaining)
        }
    }
}
