//! proctor-store — Question source and attempt store implementations.
//!
//! Backends for the boundary traits in `proctor-core`: an in-memory source
//! fed from question banks, an instrumented in-memory attempt store, and a
//! JSON file-backed attempt store for the CLI.

pub mod json;
pub mod memory;

pub use json::JsonAttemptStore;
pub use memory::{MemoryAttemptStore, MemoryQuestionSource};
