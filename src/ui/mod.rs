//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`prompts`] - Line and masked input from the terminal
//! - [`output`] - Output formatting and display
//!
//! # Design
//!
//! All user-facing output and prompts go through this module. Diagnostics
//! go through `tracing` instead.

pub mod output;
pub mod prompts;
