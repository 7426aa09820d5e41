#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! PipelineHub CLI
//!
//! Argument parsing, config file handlers, and the record commands behind
//! the `pipelinehub` binary.

pub mod cli;
pub mod commands;
pub mod config_handlers;
pub mod error;
pub mod render;

// Re-exports for convenience
pub use cli::{Cli, Command, ConfigAction, ListArgs};
pub use commands::run;
pub use config_handlers::handle_config_command;
pub use error::{Error, Result};
pub use render::{Tabular, render_table};
