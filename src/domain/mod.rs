//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the ordinal grades (`Cut`, `Color`, `Clarity`) and their option sets
//! - the raw input record (`RawRecord`) and its field metadata
//! - the encoded model input (`FeatureVector`)

pub mod feature;
pub mod types;

pub use feature::*;
pub use types::*;
