//! Collaborator backend abstraction for slide generation
//!
//! This crate provides a trait-based system for the AI collaborator calls the
//! deck engine makes. All providers implement the [`SlideBackend`] trait, so
//! the engine can draft, refine, and illustrate slides without knowing which
//! provider is answering.

mod gemini;
mod prompts;
mod static_backend;
mod types;

pub use deckgen_utils::error::BackendError;
pub use types::{ContentRequest, ImageRequest, RefineRequest, SlideBackend};

pub(crate) use gemini::GeminiBackend;
pub(crate) use static_backend::StaticBackend;

use deckgen_config::Config;

/// Create a collaborator backend from configuration.
///
/// ## Supported providers
///
/// - **`gemini`**: Gemini REST API for text, Imagen for illustrations.
///   Requires an API key in the environment variable named by
///   `api_key_env` (default `GEMINI_API_KEY`).
/// - **`static`**: Offline placeholder content, selected by `--dry-run`.
///   Needs no credentials.
///
/// # Errors
///
/// Returns `BackendError::Unsupported` if the provider is unknown and
/// `BackendError::Misconfiguration` if provider-specific configuration is
/// invalid, such as a missing API key variable.
pub fn backend_from_config(config: &Config) -> Result<Box<dyn SlideBackend>, BackendError> {
    match config.provider() {
        "gemini" => {
            let backend = GeminiBackend::new_from_config(config)?;
            Ok(Box::new(backend))
        }
        "static" => Ok(Box::new(StaticBackend::new())),
        unknown => Err(BackendError::Unsupported(format!(
            "Unknown collaborator provider '{}'. Supported providers: gemini, static.",
            unknown
        ))),
    }
}
