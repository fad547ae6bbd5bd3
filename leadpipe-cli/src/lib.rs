//! Leadpipe CLI library.
//!
//! Exposes the argument definitions, command dispatch and table rendering
//! so they can be tested without spawning the binary.

pub mod cli;
pub mod commands;
pub mod table;

pub use cli::{Cli, Commands};
