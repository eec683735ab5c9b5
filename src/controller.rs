use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::engine::{CharacterState, TypingEngine};
use crate::input::KeyInput;
use crate::observer::SessionObserver;
use crate::personal_best::PersonalBestStore;
use crate::scoring::{self, SessionSummary, Stats};
use crate::session::{Difficulty, Lifecycle, Mode, SessionState};
use crate::texts::{choose_sample, TextProvider, TextSample};
use crate::timer::{Timer, TimerTick};

/// Starting settings for a controller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSettings {
    pub mode: Mode,
    pub difficulty: Difficulty,
    /// Fixed seed for sample selection, random when `None`
    pub seed: Option<u64>,
}

/// Owns one session at a time and routes host events into it.
///
/// Input arrives through [`handle_input`](Self::handle_input), timer ticks
/// through [`on_tick`](Self::on_tick); everything the view needs is pushed
/// to the observer `O`.
pub struct SessionController<O: SessionObserver = ()> {
    state: SessionState,
    engine: TypingEngine,
    timer: Timer,
    sample: TextSample,
    personal_best: u32,
    summary: Option<SessionSummary>,
    provider: Box<dyn TextProvider>,
    store: Box<dyn PersonalBestStore>,
    clock: Box<dyn Clock>,
    rng: StdRng,
    observer: O,
}

impl<O: SessionObserver> SessionController<O> {
    pub fn new(
        settings: SessionSettings,
        provider: Box<dyn TextProvider>,
        store: Box<dyn PersonalBestStore>,
        clock: Box<dyn Clock>,
        observer: O,
    ) -> Self {
        let personal_best = store.load().unwrap_or_else(|err| {
            warn!(error = %err, "could not read personal best, starting from 0");
            0
        });
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut controller = Self {
            state: SessionState::new(settings.mode, settings.difficulty),
            engine: TypingEngine::default(),
            timer: Timer::new(),
            sample: TextSample::new("", ""),
            personal_best,
            summary: None,
            provider,
            store,
            clock,
            rng,
            observer,
        };
        controller.reset();
        controller
    }

    /// Sole entry point for keystrokes from the view
    pub fn handle_input(&mut self, input: KeyInput) {
        let now = self.clock.now();
        let submission = self.engine.submit(&mut self.state, input, now);
        if !submission.accepted {
            return;
        }

        if submission.started {
            self.observer.on_lifecycle_changed(Lifecycle::Active);
            if self.state.mode == Mode::Timed {
                self.timer.start(&mut self.state);
            }
        }
        self.publish_changes(&submission.changes);

        if submission.finished {
            self.end_test();
        } else if self.state.is_active() {
            self.publish_stats(now);
        }
    }

    /// One elapsed second of the countdown
    pub fn on_tick(&mut self) {
        match self.timer.on_tick(&mut self.state) {
            TimerTick::Stopped => {}
            TimerTick::Running(_) => {
                let now = self.clock.now();
                self.publish_stats(now);
            }
            TimerTick::Expired => self.end_test(),
        }
    }

    /// Completes the session and freezes its results. Repeated calls do nothing.
    pub fn end_test(&mut self) {
        let now = self.clock.now();
        if !self.engine.finish(&mut self.state, now) {
            return;
        }
        self.timer.stop();

        let stats = scoring::stats(&self.state, now);
        let previous_best = self.personal_best;
        let is_new_best = stats.wpm > previous_best;
        if is_new_best {
            self.personal_best = stats.wpm;
            if let Err(err) = self.store.save(stats.wpm) {
                warn!(error = %err, wpm = stats.wpm, "could not save personal best");
            }
        }

        let summary = SessionSummary {
            wpm: stats.wpm,
            accuracy: stats.accuracy,
            chars_typed: self.state.cursor,
            total_chars: self.engine.len(),
            is_new_best,
            previous_best,
        };
        info!(
            wpm = summary.wpm,
            accuracy = summary.accuracy,
            typed = summary.chars_typed,
            total = summary.total_chars,
            new_best = is_new_best,
            "session complete"
        );
        self.summary = Some(summary);

        self.observer.on_lifecycle_changed(Lifecycle::Complete);
        self.observer.on_stats_updated(stats);
        self.observer.on_session_complete(&summary);
    }

    /// Fresh session with a new sample for the current difficulty
    pub fn reset(&mut self) {
        self.timer.stop();

        let difficulty = self.state.difficulty;
        let sample = choose_sample(self.provider.as_ref(), difficulty, &mut self.rng);
        debug!(id = %sample.id, %difficulty, mode = %self.state.mode, "reset");

        let changes = self.engine.initialize(&sample.text);
        self.state = SessionState::new(self.state.mode, difficulty);
        self.summary = None;

        self.observer.on_sample_loaded(&sample);
        self.sample = sample;
        self.publish_changes(&changes);
        self.observer.on_lifecycle_changed(Lifecycle::Idle);
        let now = self.clock.now();
        self.publish_stats(now);
    }

    /// Switches mode and resets. Rejected while a session is running.
    pub fn change_mode(&mut self, mode: Mode) -> bool {
        if self.state.is_active() {
            debug!(%mode, "mode change rejected during active session");
            return false;
        }
        self.state.mode = mode;
        self.reset();
        true
    }

    /// Switches difficulty and resets. Rejected while a session is running.
    pub fn change_difficulty(&mut self, difficulty: Difficulty) -> bool {
        if self.state.is_active() {
            debug!(%difficulty, "difficulty change rejected during active session");
            return false;
        }
        self.state.difficulty = difficulty;
        self.reset();
        true
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn engine(&self) -> &TypingEngine {
        &self.engine
    }

    pub fn sample(&self) -> &TextSample {
        &self.sample
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    pub fn difficulty(&self) -> Difficulty {
        self.state.difficulty
    }

    pub fn personal_best(&self) -> u32 {
        self.personal_best
    }

    /// Results of the last completed session, cleared on reset
    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    pub fn timer_running(&self) -> bool {
        self.timer.is_running()
    }

    /// Live stats as of now
    pub fn stats(&self) -> Stats {
        scoring::stats(&self.state, self.clock.now())
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    fn publish_changes(&mut self, changes: &[(usize, CharacterState)]) {
        for &(idx, state) in changes {
            self.observer.on_character_state_changed(idx, state);
        }
    }

    fn publish_stats(&mut self, now: Instant) {
        let stats = scoring::stats(&self.state, now);
        self.observer.on_stats_updated(stats);
    }
}
