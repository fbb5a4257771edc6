//! Input/output helpers.
//!
//! - artifact storage abstraction + filesystem store (`store`)
//! - artifact decoding, validation and pairing (`artifacts`)

pub mod artifacts;
pub mod store;

pub use artifacts::*;
pub use store::*;
