use crate::engine::CharacterState;
use crate::scoring::{SessionSummary, Stats};
use crate::session::Lifecycle;
use crate::texts::TextSample;

/// One-way notifications from the session controller to a view.
///
/// Every method defaults to doing nothing so a view only implements what it renders.
pub trait SessionObserver {
    /// A new passage was loaded; every position starts out untouched
    fn on_sample_loaded(&mut self, _sample: &TextSample) {}

    fn on_character_state_changed(&mut self, _index: usize, _state: CharacterState) {}

    fn on_stats_updated(&mut self, _stats: Stats) {}

    fn on_session_complete(&mut self, _summary: &SessionSummary) {}

    fn on_lifecycle_changed(&mut self, _lifecycle: Lifecycle) {}
}

/// Silent observer
impl SessionObserver for () {}
