//! Feature encoding.
//!
//! - artifact schema written by the training side (`artifact`)
//! - validated encoder applied per record (`encoder`)

pub mod artifact;
pub mod encoder;

pub use artifact::*;
pub use encoder::*;
