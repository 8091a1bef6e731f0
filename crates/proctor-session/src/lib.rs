//! proctor-session — The quiz-attempt session engine.
//!
//! One actor task per session owns the state machine; the countdown timer
//! and integrity signals feed the same serialized command queue as user
//! actions, so no two transitions ever race.

pub mod config;
pub mod integrity;
pub mod session;
pub mod state;
mod timer;

pub use config::SessionConfig;
pub use session::{Session, SessionEvent, SessionHandle};
