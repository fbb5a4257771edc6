//! Regression model implementations.
//!
//! Models are immutable once built, so a loaded model can be shared across
//! threads and evaluated concurrently without locking.

pub mod model;

pub use model::*;
