//! deckgen - Outline-driven slide decks with generated content and PDF export
//!
//! This crate turns a fixed presentation outline into a finished slide deck:
//! each slide's text is drafted by a generative collaborator on demand, can be
//! refined through follow-up instructions, and the whole deck renders to a
//! paginated 16:9 PDF.
//!
//! deckgen can be used in two ways:
//! - **CLI**: Install via `cargo install deckgen` and run from command line
//! - **Library**: Add as a dependency and drive [`DeckOrchestrator`] directly
//!
//! # Quick Start (CLI)
//!
//! Install deckgen from crates.io:
//!
//! ```bash
//! cargo install deckgen
//! ```
//!
//! Author a deck end to end:
//!
//! ```bash
//! # Write a starter deckgen.toml and deck.toml
//! deckgen init
//!
//! # Inspect the resolved outline
//! deckgen outline
//!
//! # Draft every slide and export the PDF (offline placeholder mode)
//! deckgen build --dry-run
//!
//! # Work slide by slide with refinement and media curation
//! deckgen session
//! ```
//!
//! # Quick Start (Library)
//!
//! Add deckgen to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! deckgen = "0.3"
//! tokio = { version = "1", features = ["rt-multi-thread", "macros"] }
//! ```
//!
//! Build an orchestrator from configuration, generate, and export:
//!
//! ```rust,no_run
//! use deckgen::{CliArgs, Config, DeckOrchestrator, export_to_file};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let config = Config::discover(&CliArgs::default())?;
//! let outline = deckgen::config::load_outline(&config.outline_path())?;
//! let orchestrator = DeckOrchestrator::from_config(&config, outline)?;
//!
//! let report = orchestrator.build(false, false).await?;
//! println!("{report}");
//!
//! let snapshot = orchestrator.snapshot();
//! export_to_file(&snapshot, &orchestrator.deck_title(), &config.output_path())?;
//! # Ok(())
//! # }
//! ```
//!
//! # Stable Public API
//!
//! The following types are part of the stable public API:
//!
//! - [`DeckOrchestrator`] - Slide lifecycle and generation coordinator
//! - [`Config`] and [`CliArgs`] - Configuration management
//! - [`DeckError`] - Library error type
//! - [`ExitCode`] - CLI exit codes
//! - [`export_deck`] / [`export_to_file`] - PDF rendering
//!
//! Internal modules are accessible via module paths but are marked `#[doc(hidden)]`
//! and are not covered by semver stability guarantees.

// ============================================================================
// Stable Public API
// ============================================================================

/// Slide lifecycle coordinator: generation, refinement, media, build fan-out.
///
/// `DeckOrchestrator` owns the slide store and the collaborator backend. Use
/// [`DeckOrchestrator::from_config()`] for CLI-like behavior or
/// [`DeckOrchestrator::new()`] to supply a custom [`SlideBackend`] when
/// embedding.
pub use deckgen_engine::DeckOrchestrator;

/// Summary of a whole-deck build pass.
///
/// Counts generated, already-ready, and failed slides plus image outcomes.
/// Its `Display` impl produces the one-line summary the CLI prints.
pub use deckgen_engine::BuildReport;

/// Configuration for deckgen operations.
///
/// `Config` provides hierarchical configuration with discovery and precedence:
/// CLI arguments > environment > config file > built-in defaults.
///
/// Use [`Config::discover()`] to walk up from the current directory looking
/// for a `deckgen.toml`.
pub use deckgen_config::Config;

/// CLI argument structure for configuration override.
///
/// Used internally by the CLI and for programmatic configuration via
/// [`Config::discover()`].
pub use deckgen_config::CliArgs;

/// Library-level error type with rich context.
///
/// `DeckError` provides detailed error information including:
/// - User-friendly messages via [`display_for_user()`](DeckError::display_for_user)
/// - Exit code mapping via [`to_exit_code()`](DeckError::to_exit_code)
///
/// Library code returns `DeckError` and does NOT call `std::process::exit()`.
pub use deckgen_utils::error::DeckError;

/// Exit codes matching the documented exit code table.
///
/// `ExitCode` provides type-safe exit code handling for deckgen operations.
/// Use named constants (e.g., [`ExitCode::SUCCESS`], [`ExitCode::EXPORT_REFUSED`])
/// or [`as_i32()`](ExitCode::as_i32) to get the numeric value.
pub use deckgen_utils::exit_codes::ExitCode;

/// Render ready slides into an in-memory PDF.
pub use deckgen_export::export_deck;

/// Render ready slides and atomically write the PDF to disk.
pub use deckgen_export::export_to_file;

/// Outcome of a PDF export: rendered bytes plus page and slide counts.
pub use deckgen_export::ExportedDeck;

// Additional stable re-exports for convenience

/// Error categories for grouping similar errors.
///
/// Used with [`DeckError`] for programmatic error handling.
pub use deckgen_utils::error::ErrorCategory;

/// Trait for providing user-friendly error reporting.
///
/// Implemented by [`DeckError`] and its component error types.
pub use deckgen_utils::error::UserFriendlyError;

/// Collaborator backend trait for custom generation providers.
///
/// Implement this to plug a different text/image provider into
/// [`DeckOrchestrator::new()`].
pub use deckgen_llm::SlideBackend;

/// Core deck vocabulary: outlines, slide state, content, and media entries.
pub use deckgen_utils::types::{
    ContentBody, DeckOutline, GenerationStatus, ImageRef, MediaEntry, MediaGallery, MediaKind,
    SlideContent, SlideDescriptor, SlideId, SlideKind, SlideState,
};

// ============================================================================
// Internal modules - accessible but not stable
// ============================================================================

#[doc(hidden)]
pub use deckgen_utils::{atomic_write, error, exit_codes, logging, types};

#[doc(hidden)]
pub use deckgen_config as config;

#[doc(hidden)]
pub use deckgen_llm as llm;

#[doc(hidden)]
pub use deckgen_engine as engine;

#[doc(hidden)]
pub use deckgen_export as export;

// CLI module - internal implementation detail, not part of stable public API
// Exported with #[doc(hidden)] to allow white-box testing of CLI flag parsing
// External consumers should use DeckOrchestrator, not CLI internals
#[doc(hidden)]
pub mod cli;
