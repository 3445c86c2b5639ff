use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::exit_codes::ExitCode;
use crate::types::{GenerationStatus, SlideId};

/// Library-level error type with user-friendly reporting.
///
/// `DeckError` is the primary error type returned by deckgen library
/// operations. It provides detailed error information for programmatic
/// handling, user-friendly messages with context and suggestions, and a
/// mapping to CLI exit codes.
///
/// # Error Categories
///
/// | Category | Description |
/// |----------|-------------|
/// | `Config` | Configuration file, outline, or CLI argument errors |
/// | `Generation` | Slide content generation failures |
/// | `Refinement` | Refinement requests that could not be applied |
/// | `Gallery` | Media gallery curation errors |
/// | `MediaInput` | Invalid media references supplied by the user |
/// | `Export` | PDF export refusals and write failures |
/// | `Backend` | Collaborator transport/provider failures |
///
/// # Exit Code Mapping
///
/// Use [`to_exit_code()`](Self::to_exit_code) to map errors to CLI exit codes:
///
/// | Exit Code | Error Type |
/// |-----------|------------|
/// | 2 | Configuration, unknown slide, ineligible operations, bad media input |
/// | 3 | Export refused (nothing generated yet) |
/// | 70 | Collaborator backend failure |
/// | 1 | Other errors |
///
/// Library code returns `DeckError` and does NOT call `std::process::exit()`.
#[derive(Error, Debug)]
pub enum DeckError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Refinement error: {0}")]
    Refinement(#[from] RefinementError),

    #[error("Media gallery error: {0}")]
    Gallery(#[from] GalleryError),

    #[error("Media input error: {0}")]
    MediaInput(#[from] MediaInputError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Collaborator error: {0}")]
    Backend(#[from] BackendError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No slide with id {id} in the outline")]
    UnknownSlide { id: SlideId },
}

impl DeckError {
    /// Map this error to the CLI exit code documented in the exit code table.
    #[must_use]
    pub fn to_exit_code(&self) -> ExitCode {
        match self {
            Self::Config(_) => ExitCode::CLI_ARGS,
            Self::UnknownSlide { .. } => ExitCode::CLI_ARGS,
            Self::MediaInput(_) => ExitCode::CLI_ARGS,
            Self::Gallery(_) => ExitCode::CLI_ARGS,
            Self::Generation(_) => ExitCode::BACKEND_FAILURE,
            Self::Backend(_) => ExitCode::BACKEND_FAILURE,
            Self::Refinement(err) => match err {
                RefinementError::Backend(_) => ExitCode::BACKEND_FAILURE,
                _ => ExitCode::CLI_ARGS,
            },
            Self::Export(err) => match err {
                ExportError::NothingToExport => ExitCode::EXPORT_REFUSED,
                ExportError::Write { .. } => ExitCode::INTERNAL,
            },
            Self::Io(_) => ExitCode::INTERNAL,
        }
    }

    /// Format this error for end users, including context and suggestions
    /// where a [`UserFriendlyError`] implementation provides them.
    #[must_use]
    pub fn display_for_user(&self) -> String {
        let friendly: Option<&dyn UserFriendlyError> = match self {
            Self::Config(err) => Some(err),
            Self::Backend(err) => Some(err),
            Self::Export(err) => Some(err),
            Self::Generation(GenerationError::Backend(err)) => Some(err),
            Self::Refinement(RefinementError::Backend(err)) => Some(err),
            _ => None,
        };

        let Some(friendly) = friendly else {
            return format!("Error: {self}");
        };

        let mut out = format!("Error: {}", friendly.user_message());
        if let Some(context) = friendly.context() {
            out.push_str("\n\n");
            out.push_str(&context);
        }
        let suggestions = friendly.suggestions();
        if !suggestions.is_empty() {
            out.push_str("\n\nTry:");
            for suggestion in suggestions {
                out.push_str("\n  - ");
                out.push_str(&suggestion);
            }
        }
        out
    }
}

/// Trait for providing user-friendly error reporting with context and suggestions
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get contextual information about the error
    fn context(&self) -> Option<String>;

    /// Get suggested actions to resolve the error
    fn suggestions(&self) -> Vec<String>;

    /// Get the error category for grouping similar errors
    fn category(&self) -> ErrorCategory;
}

/// Categories of errors for better organization and handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Generation,
    Refinement,
    MediaCuration,
    Export,
    Backend,
    FileSystem,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::Generation => write!(f, "Generation"),
            Self::Refinement => write!(f, "Refinement"),
            Self::MediaCuration => write!(f, "Media Curation"),
            Self::Export => write!(f, "Export"),
            Self::Backend => write!(f, "Collaborator Backend"),
            Self::FileSystem => write!(f, "File System"),
        }
    }
}

/// Configuration and outline loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Invalid configuration file: {0}")]
    Parse(String),

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid deck outline: {0}")]
    InvalidOutline(String),
}

impl UserFriendlyError for ConfigError {
    fn user_message(&self) -> String {
        match self {
            Self::Io { path, reason } => {
                format!("Could not read configuration file {path}: {reason}")
            }
            Self::Parse(reason) => {
                format!("Configuration file has invalid format: {reason}")
            }
            Self::InvalidValue { key, value } => {
                format!("Configuration '{key}' has invalid value: {value}")
            }
            Self::MissingRequired(key) => {
                format!("Required configuration '{key}' is missing")
            }
            Self::InvalidOutline(reason) => {
                format!("Deck outline is invalid: {reason}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Parse(_) => Some(
                "Configuration files must be valid TOML with optional [deck], [collaborator] and [export] sections.".to_string(),
            ),
            Self::InvalidOutline(_) => Some(
                "An outline needs a deck title and at least one slide, and slide ids must be unique.".to_string(),
            ),
            _ => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Parse(_) => vec![
                "Check the TOML syntax of deckgen.toml".to_string(),
                "Run 'deckgen init' in an empty directory to see a valid example".to_string(),
            ],
            Self::MissingRequired(key) => vec![
                format!("Add '{key}' to deckgen.toml or pass the matching CLI flag"),
            ],
            Self::InvalidOutline(_) => vec![
                "Run 'deckgen outline' to see how the current outline was parsed".to_string(),
                "Give every [[slides]] entry a unique integer id".to_string(),
            ],
            _ => vec![],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }
}

/// Collaborator transport and provider errors.
///
/// Collaborator calls are single-shot: deckgen never retries on its own,
/// so every variant here reflects exactly one failed call.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Provider authentication failed: {0}")]
    Auth(String),

    #[error("Provider quota or rate limit hit: {0}")]
    Quota(String),

    #[error("Provider unavailable: {0}")]
    Outage(String),

    #[error("Collaborator call timed out after {duration:?}")]
    Timeout { duration: Duration },

    #[error("Malformed collaborator response: {0}")]
    Malformed(String),

    #[error("Collaborator misconfiguration: {0}")]
    Misconfiguration(String),

    #[error("Unsupported collaborator operation: {0}")]
    Unsupported(String),
}

impl UserFriendlyError for BackendError {
    fn user_message(&self) -> String {
        match self {
            Self::Transport(reason) => format!("Could not reach the provider: {reason}"),
            Self::Auth(reason) => format!("The provider rejected the API key: {reason}"),
            Self::Quota(reason) => format!("The provider reported a quota limit: {reason}"),
            Self::Outage(reason) => format!("The provider is currently unavailable: {reason}"),
            Self::Timeout { duration } => {
                format!("The collaborator call timed out after {}s", duration.as_secs())
            }
            Self::Malformed(reason) => {
                format!("The provider response could not be used: {reason}")
            }
            Self::Misconfiguration(reason) => {
                format!("The collaborator is misconfigured: {reason}")
            }
            Self::Unsupported(operation) => {
                format!("This collaborator does not support: {operation}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Auth(_) => {
                Some("deckgen reads the API key from the environment variable named in [collaborator] api_key_env (GEMINI_API_KEY by default).".to_string())
            }
            Self::Quota(_) | Self::Outage(_) => {
                Some("Each slide operation is a single provider call; the failed slide stays marked failed until you regenerate it.".to_string())
            }
            _ => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Transport(_) => vec![
                "Check your network connection".to_string(),
                "Use --dry-run to work offline with placeholder content".to_string(),
            ],
            Self::Auth(_) => vec![
                "Export a valid key, e.g. GEMINI_API_KEY=...".to_string(),
                "Check the api_key_env setting in deckgen.toml".to_string(),
            ],
            Self::Quota(_) => vec![
                "Wait for the quota window to reset, then regenerate the failed slides".to_string(),
            ],
            Self::Timeout { .. } => vec![
                "Raise timeout_seconds in the [collaborator] section".to_string(),
            ],
            _ => vec![],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Backend
    }
}

/// Errors from initial or forced slide content generation
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Collaborator call failed: {0}")]
    Backend(#[from] BackendError),

    #[error("Collaborator returned unusable content: {0}")]
    InvalidContent(String),
}

/// Errors from refinement requests.
///
/// A refinement that fails at the collaborator does not damage the slide:
/// the previous content stays attached and the status reverts to ready.
#[derive(Error, Debug)]
pub enum RefinementError {
    #[error("Slide {id} is a media slide; refinement applies to content slides")]
    WrongKind { id: SlideId },

    #[error("Slide {id} has no content to refine yet (text status: {status})")]
    NotReady {
        id: SlideId,
        status: GenerationStatus,
    },

    #[error("Refinement call failed: {0}")]
    Backend(#[from] BackendError),
}

/// Errors from media gallery curation
#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("Slide {id} is not a media slide")]
    WrongKind { id: SlideId },

    #[error("The media gallery for slide {id} has not been generated yet")]
    NotMaterialized { id: SlideId },
}

/// Errors validating user-supplied media references before they reach a gallery
#[derive(Error, Debug)]
pub enum MediaInputError {
    #[error("Not a valid URL: {0}")]
    InvalidUrl(String),

    #[error("Media entries need a non-empty label")]
    EmptyLabel,

    #[error("Could not read image file {path}: {reason}")]
    UnreadableImage { path: String, reason: String },

    #[error("Image is {size} bytes; the limit is {limit} bytes")]
    ImageTooLarge { size: u64, limit: u64 },
}

/// Errors from PDF export
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("No slides have generated content yet")]
    NothingToExport,

    #[error("Failed to write {path}: {reason}")]
    Write { path: String, reason: String },
}

impl UserFriendlyError for ExportError {
    fn user_message(&self) -> String {
        match self {
            Self::NothingToExport => {
                "Nothing to export: no slide has generated content yet".to_string()
            }
            Self::Write { path, reason } => {
                format!("Could not write the PDF to {path}: {reason}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::NothingToExport => Some(
                "Export renders only slides whose content generation finished; an untouched deck would produce an empty file.".to_string(),
            ),
            Self::Write { .. } => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::NothingToExport => vec![
                "Run 'deckgen build' to generate the whole deck first".to_string(),
                "Or generate individual slides in a session before exporting".to_string(),
            ],
            Self::Write { .. } => vec![
                "Check that the output directory exists and is writable".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Export
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_mapping() {
        let err = DeckError::Config(ConfigError::MissingRequired("model".to_string()));
        assert_eq!(err.to_exit_code(), ExitCode::CLI_ARGS);

        let err = DeckError::UnknownSlide { id: SlideId(42) };
        assert_eq!(err.to_exit_code(), ExitCode::CLI_ARGS);

        let err = DeckError::Export(ExportError::NothingToExport);
        assert_eq!(err.to_exit_code(), ExitCode::EXPORT_REFUSED);

        let err = DeckError::Export(ExportError::Write {
            path: "out.pdf".to_string(),
            reason: "disk full".to_string(),
        });
        assert_eq!(err.to_exit_code(), ExitCode::INTERNAL);

        let err = DeckError::Backend(BackendError::Outage("503".to_string()));
        assert_eq!(err.to_exit_code(), ExitCode::BACKEND_FAILURE);

        let err = DeckError::Generation(GenerationError::InvalidContent("empty".to_string()));
        assert_eq!(err.to_exit_code(), ExitCode::BACKEND_FAILURE);
    }

    #[test]
    fn test_refinement_exit_codes_split_by_cause() {
        let user_side = DeckError::Refinement(RefinementError::NotReady {
            id: SlideId(2),
            status: GenerationStatus::Uninitialized,
        });
        assert_eq!(user_side.to_exit_code(), ExitCode::CLI_ARGS);

        let backend_side = DeckError::Refinement(RefinementError::Backend(
            BackendError::Transport("connection reset".to_string()),
        ));
        assert_eq!(backend_side.to_exit_code(), ExitCode::BACKEND_FAILURE);
    }

    #[test]
    fn test_display_messages() {
        let err = RefinementError::NotReady {
            id: SlideId(3),
            status: GenerationStatus::Pending,
        };
        let msg = err.to_string();
        assert!(msg.contains("Slide 3"));
        assert!(msg.contains("pending"));

        let err = GalleryError::NotMaterialized { id: SlideId(7) };
        assert!(err.to_string().contains("slide 7"));

        let err = MediaInputError::ImageTooLarge {
            size: 3_000_000,
            limit: 2_097_152,
        };
        assert!(err.to_string().contains("3000000"));
    }

    #[test]
    fn test_user_friendly_export_refusal() {
        let err = DeckError::Export(ExportError::NothingToExport);
        let rendered = err.display_for_user();
        assert!(rendered.starts_with("Error:"));
        assert!(rendered.contains("deckgen build"));
    }

    #[test]
    fn test_user_friendly_auth_mentions_env_var() {
        let err = DeckError::Backend(BackendError::Auth("401".to_string()));
        let rendered = err.display_for_user();
        assert!(rendered.contains("GEMINI_API_KEY"));
    }

    #[test]
    fn test_plain_display_fallback() {
        let err = DeckError::UnknownSlide { id: SlideId(9) };
        assert_eq!(err.display_for_user(), format!("Error: {err}"));
    }

    #[test]
    fn test_backend_category() {
        assert_eq!(
            BackendError::Transport("x".to_string()).category(),
            ErrorCategory::Backend
        );
        assert_eq!(ErrorCategory::MediaCuration.to_string(), "Media Curation");
    }
}
