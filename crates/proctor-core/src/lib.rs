//! proctor-core — Data model, scoring, and storage traits.
//!
//! This crate defines the fundamental types, error taxonomy, and boundary
//! traits that the rest of the proctor system builds on.

pub mod bank;
pub mod error;
pub mod model;
pub mod report;
pub mod score;
pub mod traits;
