//! Derived metrics. Everything here is a pure function of the session state.

use std::time::Instant;

use crate::session::SessionState;

/// Standard word length used for wpm
pub const CHARS_PER_WORD: f64 = 5.0;

/// Live numbers shown while typing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub wpm: u32,
    pub accuracy: u32,
    pub time_remaining: Option<u32>,
}

/// Words per minute over every consumed character, mistakes included.
///
/// Elapsed time runs to `end_time` once the session is complete, otherwise to `now`.
pub fn wpm(state: &SessionState, now: Instant) -> u32 {
    let Some(started_at) = state.start_time else {
        return 0;
    };

    let elapsed_secs = state
        .end_time
        .unwrap_or(now)
        .saturating_duration_since(started_at)
        .as_secs_f64();
    if elapsed_secs <= 0.0 {
        return 0;
    }

    let words = state.cursor as f64 / CHARS_PER_WORD;
    (words / (elapsed_secs / 60.0)).round() as u32
}

/// Percentage of consumed characters that were not mistakes, 100 before any input.
pub fn accuracy(state: &SessionState) -> u32 {
    if state.cursor == 0 {
        return 100;
    }

    let typed = state.cursor as f64;
    let correct = typed - state.error_count as f64;
    (100.0 * correct / typed).round().clamp(0.0, 100.0) as u32
}

pub fn stats(state: &SessionState, now: Instant) -> Stats {
    Stats {
        wpm: wpm(state, now),
        accuracy: accuracy(state),
        time_remaining: state.time_remaining,
    }
}

/// Frozen results of a completed session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub wpm: u32,
    pub accuracy: u32,
    pub chars_typed: usize,
    pub total_chars: usize,
    /// Beat the best that stood before this session
    pub is_new_best: bool,
    pub previous_best: u32,
}

impl SessionSummary {
    pub fn headline(&self) -> &'static str {
        if self.is_new_best {
            "New personal best! Amazing work!"
        } else if self.accuracy >= 95 && self.wpm > 50 {
            "Excellent accuracy and speed!"
        } else if self.accuracy >= 90 {
            "Great accuracy! Keep it up."
        } else if self.wpm > 60 {
            "Fast typing! Focus on accuracy."
        } else {
            "Solid run. Keep pushing to beat your high score."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Difficulty, Mode};
    use std::time::Duration;

    fn state_with(cursor: usize, error_count: usize) -> SessionState {
        SessionState {
            cursor,
            error_count,
            ..SessionState::new(Mode::Timed, Difficulty::Easy)
        }
    }

    #[test]
    fn wpm_is_zero_before_start() {
        let state = state_with(10, 0);
        assert_eq!(wpm(&state, Instant::now()), 0);
    }

    #[test]
    fn wpm_is_zero_with_no_elapsed_time() {
        let now = Instant::now();
        let mut state = state_with(10, 0);
        state.start_time = Some(now);

        assert_eq!(wpm(&state, now), 0);
    }

    #[test]
    fn wpm_full_minute() {
        let start = Instant::now();
        let mut state = state_with(50, 3);
        state.start_time = Some(start);

        assert_eq!(wpm(&state, start + Duration::from_secs(60)), 10);
    }

    #[test]
    fn wpm_rounds() {
        let start = Instant::now();
        let mut state = state_with(12, 0);
        state.start_time = Some(start);

        // 2.4 words in 10s -> 14.4 wpm
        assert_eq!(wpm(&state, start + Duration::from_secs(10)), 14);
        // 2.4 words in 8s -> 18.0 wpm
        assert_eq!(wpm(&state, start + Duration::from_secs(8)), 18);
    }

    #[test]
    fn wpm_uses_end_time_once_complete() {
        let start = Instant::now();
        let mut state = state_with(25, 0);
        state.start_time = Some(start);
        state.end_time = Some(start + Duration::from_secs(30));

        let much_later = start + Duration::from_secs(600);
        assert_eq!(wpm(&state, much_later), 10);
    }

    #[test]
    fn accuracy_before_input() {
        assert_eq!(accuracy(&state_with(0, 0)), 100);
    }

    #[test]
    fn accuracy_rounds() {
        assert_eq!(accuracy(&state_with(3, 1)), 67);
        assert_eq!(accuracy(&state_with(3, 0)), 100);
        assert_eq!(accuracy(&state_with(8, 1)), 88);
    }

    #[test]
    fn accuracy_is_floored_at_zero() {
        assert_eq!(accuracy(&state_with(2, 5)), 0);
        assert_eq!(accuracy(&state_with(2, 2)), 0);
    }

    #[test]
    fn stats_carries_time_remaining() {
        let mut state = state_with(0, 0);
        state.time_remaining = Some(42);

        let s = stats(&state, Instant::now());
        assert_eq!(
            s,
            Stats {
                wpm: 0,
                accuracy: 100,
                time_remaining: Some(42)
            }
        );
    }

    fn summary(wpm: u32, accuracy: u32, is_new_best: bool) -> SessionSummary {
        SessionSummary {
            wpm,
            accuracy,
            chars_typed: 0,
            total_chars: 0,
            is_new_best,
            previous_best: 0,
        }
    }

    #[test]
    fn headline_prefers_new_best() {
        assert_eq!(
            summary(20, 50, true).headline(),
            "New personal best! Amazing work!"
        );
    }

    #[test]
    fn headline_tiers() {
        assert_eq!(
            summary(55, 96, false).headline(),
            "Excellent accuracy and speed!"
        );
        assert_eq!(summary(40, 96, false).headline(), "Great accuracy! Keep it up.");
        assert_eq!(summary(80, 90, false).headline(), "Great accuracy! Keep it up.");
        assert_eq!(
            summary(61, 70, false).headline(),
            "Fast typing! Focus on accuracy."
        );
        assert_eq!(
            summary(30, 70, false).headline(),
            "Solid run. Keep pushing to beat your high score."
        );
    }
}
