//! CLI module - argument parsing and command dispatch
//!
//! This module owns everything between `main()` and the library:
//! clap definitions ([`args`]), the dispatch loop ([`run`]), the
//! non-interactive commands ([`commands`]), media input classification
//! ([`media`]), and the interactive authoring REPL ([`session`]).
//!
//! Commands print their own output and return `anyhow::Result<()>`;
//! [`run()`] maps any error onto the documented exit code table.

pub mod args;
mod commands;
mod media;
mod run;
mod session;

pub use args::{Cli, Commands, build_cli};
pub use run::run;
