//! `gem-price` library crate.
//!
//! The binary (`gem`) is a thin wrapper around this library so that:
//!
//! - the encoder and inference pipeline are testable without spawning processes
//! - the HTTP service, one-shot CLI and TUI all share one prediction path
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod client;
pub mod config;
pub mod domain;
pub mod encode;
pub mod error;
pub mod io;
pub mod logging;
pub mod models;
pub mod report;
pub mod server;
pub mod service;
pub mod tui;

#[cfg(test)]
mod test_support;
