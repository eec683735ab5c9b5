// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod input;
pub mod logging;
pub mod observer;
pub mod personal_best;
pub mod runtime;
pub mod scoring;
pub mod session;
pub mod texts;
pub mod timer;

pub use controller::{SessionController, SessionSettings};
pub use engine::{CharacterState, TypingEngine};
pub use input::KeyInput;
pub use observer::SessionObserver;
pub use session::{Difficulty, Lifecycle, Mode, SessionState};
