use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Length of a timed session, in seconds
pub const TIMED_SECONDS: u32 = 60;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Ends when the countdown runs out
    #[default]
    Timed,
    /// Ends when the last character of the passage is typed
    Passage,
}

impl Mode {
    pub fn toggle(self) -> Self {
        match self {
            Mode::Timed => Mode::Passage,
            Mode::Passage => Mode::Timed,
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Next tier, wrapping from hard back to easy
    pub fn next(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Hard,
            Difficulty::Medium => Difficulty::Easy,
            Difficulty::Hard => Difficulty::Medium,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Lifecycle {
    Idle,
    Active,
    Complete,
}

/// Mutable state of a single typing session.
///
/// A fresh value is created on every reset; lifecycle only ever moves
/// forward (Idle -> Active -> Complete) within one value.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub mode: Mode,
    pub difficulty: Difficulty,
    pub lifecycle: Lifecycle,
    pub cursor: usize,
    pub error_count: usize,
    pub start_time: Option<Instant>,
    pub end_time: Option<Instant>,
    /// Seconds left on the countdown, `None` outside timed mode
    pub time_remaining: Option<u32>,
}

impl SessionState {
    pub fn new(mode: Mode, difficulty: Difficulty) -> Self {
        Self {
            mode,
            difficulty,
            lifecycle: Lifecycle::Idle,
            cursor: 0,
            error_count: 0,
            start_time: None,
            end_time: None,
            time_remaining: match mode {
                Mode::Timed => Some(TIMED_SECONDS),
                Mode::Passage => None,
            },
        }
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle == Lifecycle::Active
    }

    pub fn is_complete(&self) -> bool {
        self.lifecycle == Lifecycle::Complete
    }
}
