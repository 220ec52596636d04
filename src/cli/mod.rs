//! Command-line interface definitions and helpers.
//!
//! This module contains all CLI argument parsing, enums, and subcommand handlers.

mod args;
mod commands;
mod enums;

pub use args::{Args, Command, ConfigAction};
pub use commands::{
    describe, handle_config_action, init_config, load_config, run_extract, run_watch,
    run_watch_until, CliError, Settings, DEFAULT_WATCH_PATH,
};
pub use enums::Mode;
