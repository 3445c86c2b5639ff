//! CLI argument definitions
//!
//! Defines the clap command tree for the deckgen binary. Global flags mirror
//! the fields of [`deckgen_config::CliArgs`] so every subcommand can override
//! configuration the same way.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// deckgen - outline-driven slide decks with generated content and PDF export
#[derive(Parser, Debug)]
#[command(name = "deckgen")]
#[command(version)]
#[command(about = "Author a slide deck from a fixed outline with generated content")]
#[command(
    long_about = "Author a slide deck from a fixed outline with generated content.\n\n\
    deckgen reads a deck outline (deck.toml), drafts each slide's text with a \
    generative collaborator, and exports the finished deck as a 16:9 PDF. \
    Slides can be regenerated, refined with follow-up instructions, and \
    illustrated. Media slides collect curated links, videos, and photos.\n\n\
    EXAMPLES:\n    \
    deckgen init                      # write starter deckgen.toml and deck.toml\n    \
    deckgen outline                   # show the resolved outline\n    \
    deckgen build --images            # draft every slide, render images, export\n    \
    deckgen build --dry-run           # offline placeholder content, no API calls\n    \
    deckgen session                   # interactive slide-by-slide authoring\n\n\
    CONFIGURATION:\n    \
    Settings come from CLI flags, then DECKGEN_* environment variables, then \
    the nearest deckgen.toml, then built-in defaults. The collaborator API \
    key is only ever read from the environment (GEMINI_API_KEY by default)."
)]
pub struct Cli {
    /// Path to config file (default: search for deckgen.toml upward)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the deck outline file (default: deck.toml)
    #[arg(long, global = true)]
    pub deck: Option<String>,

    /// Collaborator provider
    #[arg(long, global = true, value_parser = ["gemini", "static"])]
    pub provider: Option<String>,

    /// Text model identifier
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Image model identifier
    #[arg(long, global = true)]
    pub image_model: Option<String>,

    /// Environment variable holding the provider API key
    #[arg(long, global = true)]
    pub api_key_env: Option<String>,

    /// Provider API base URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    pub timeout_seconds: Option<u64>,

    /// Maximum concurrent slide generations during build
    #[arg(long, global = true)]
    pub concurrency: Option<usize>,

    /// Generate placeholder content offline instead of calling the provider
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Verbose logging (spans and close events)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a starter deckgen.toml and deck.toml into the current directory
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Show the resolved deck outline
    Outline,

    /// Draft every slide, then export the deck as a PDF
    Build {
        /// Also render an illustration for each content slide
        #[arg(long)]
        images: bool,

        /// Regenerate slides that already have content
        #[arg(long)]
        force: bool,

        /// Write the PDF here instead of the configured output path
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Author the deck interactively, one slide at a time
    Session,
}

/// Build the clap command for introspection (help text, completions, tests).
pub fn build_cli() -> clap::Command {
    use clap::CommandFactory;
    Cli::command()
}
