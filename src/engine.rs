use std::time::Instant;

use tracing::debug;

use crate::input::KeyInput;
use crate::session::{Lifecycle, Mode, SessionState};

/// Display state of a single passage position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CharacterState {
    #[default]
    Untouched,
    Current,
    Correct,
    Incorrect,
}

/// What a single `submit` did to the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submission {
    /// False when the session was already complete and the key was dropped
    pub accepted: bool,
    /// This keystroke moved the session from idle to active
    pub started: bool,
    /// The session has to be completed now (passage mode only)
    pub finished: bool,
    /// Character state changes, in the order they were applied
    pub changes: Vec<(usize, CharacterState)>,
}

/// Keystroke-to-character matching over one passage.
///
/// The engine owns the characters and their display states; cursor, error
/// count and lifecycle live in the [`SessionState`] passed to each call.
#[derive(Debug, Clone, Default)]
pub struct TypingEngine {
    chars: Vec<char>,
    states: Vec<CharacterState>,
}

impl TypingEngine {
    pub fn new(text: &str) -> Self {
        let mut engine = Self::default();
        engine.initialize(text);
        engine
    }

    /// Loads a new passage. Position 0 becomes current, everything else untouched.
    pub fn initialize(&mut self, text: &str) -> Vec<(usize, CharacterState)> {
        self.chars = text.chars().collect();
        self.states = vec![CharacterState::Untouched; self.chars.len()];

        let mut changes = Vec::new();
        self.mark(0, CharacterState::Current, &mut changes);
        changes
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn states(&self) -> &[CharacterState] {
        &self.states
    }

    pub fn expected_char(&self, idx: usize) -> Option<char> {
        self.chars.get(idx).copied()
    }

    pub fn submit(
        &mut self,
        session: &mut SessionState,
        input: KeyInput,
        now: Instant,
    ) -> Submission {
        let mut submission = Submission::default();

        if session.lifecycle == Lifecycle::Complete {
            return submission;
        }
        submission.accepted = true;

        if session.lifecycle == Lifecycle::Idle {
            session.lifecycle = Lifecycle::Active;
            session.start_time = Some(now);
            submission.started = true;
            debug!(mode = %session.mode, difficulty = %session.difficulty, "session started");
        }

        let Some(typed) = input.as_char() else {
            self.backspace(session, &mut submission.changes);
            return submission;
        };

        let len = self.chars.len();
        if session.cursor >= len {
            submission.finished = session.mode == Mode::Passage;
            return submission;
        }

        if typed == self.chars[session.cursor] {
            self.mark(session.cursor, CharacterState::Correct, &mut submission.changes);
        } else {
            self.mark(session.cursor, CharacterState::Incorrect, &mut submission.changes);
            session.error_count += 1;
        }
        session.cursor += 1;

        if session.cursor < len {
            self.mark(session.cursor, CharacterState::Current, &mut submission.changes);
        } else if session.mode == Mode::Passage {
            submission.finished = true;
        }

        submission
    }

    /// Moves the session to complete. Returns false if it already was.
    pub fn finish(&self, session: &mut SessionState, now: Instant) -> bool {
        if session.lifecycle == Lifecycle::Complete {
            return false;
        }
        session.lifecycle = Lifecycle::Complete;
        session.end_time = Some(now);
        debug!(cursor = session.cursor, errors = session.error_count, "session finished");
        true
    }

    // errors stay counted after a correction
    fn backspace(&mut self, session: &mut SessionState, changes: &mut Vec<(usize, CharacterState)>) {
        if session.cursor == 0 {
            return;
        }

        self.mark(session.cursor, CharacterState::Untouched, changes);
        session.cursor -= 1;
        self.mark(session.cursor, CharacterState::Untouched, changes);
        self.mark(session.cursor, CharacterState::Current, changes);
    }

    fn mark(
        &mut self,
        idx: usize,
        state: CharacterState,
        changes: &mut Vec<(usize, CharacterState)>,
    ) {
        if let Some(slot) = self.states.get_mut(idx) {
            *slot = state;
            changes.push((idx, state));
        }
    }
}
