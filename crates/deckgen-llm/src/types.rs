//! Backend trait and request types
//!
//! Backends implement [`SlideBackend`], which covers the three collaborator
//! calls the engine makes: drafting slide content, refining existing content
//! against a user instruction, and rendering an illustration. Each call gets
//! its own request struct so backends see exactly the inputs that operation
//! needs and nothing else.
//!
//! Media slides never reach a backend. The engine materializes their gallery
//! locally, so `generate_content` is only ever called for content slides.

use std::time::Duration;

use async_trait::async_trait;
use deckgen_utils::error::BackendError;
use deckgen_utils::types::{ContentBody, ImageRef};

/// Inputs for drafting the content of one slide.
#[derive(Debug, Clone)]
pub struct ContentRequest {
    /// Title of the whole presentation, for prompt context.
    pub deck_title: String,
    /// Outline title of the slide being drafted.
    pub slide_title: String,
    /// Outline topic describing what the slide should cover.
    pub topic: String,
    /// Per-call timeout.
    pub timeout: Duration,
}

impl ContentRequest {
    pub fn new(
        deck_title: impl Into<String>,
        slide_title: impl Into<String>,
        topic: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            deck_title: deck_title.into(),
            slide_title: slide_title.into(),
            topic: topic.into(),
            timeout,
        }
    }
}

/// Inputs for refining already-generated slide content.
#[derive(Debug, Clone)]
pub struct RefineRequest {
    /// The content as it currently stands.
    pub current: ContentBody,
    /// The user's change request, verbatim.
    pub instruction: String,
    /// Per-call timeout.
    pub timeout: Duration,
}

impl RefineRequest {
    pub fn new(current: ContentBody, instruction: impl Into<String>, timeout: Duration) -> Self {
        Self {
            current,
            instruction: instruction.into(),
            timeout,
        }
    }
}

/// Inputs for rendering a slide illustration.
///
/// The image is derived from the generated content, not the outline, so the
/// request carries the full body the illustration should depict.
#[derive(Debug, Clone)]
pub struct ImageRequest {
    /// The generated content to illustrate.
    pub content: ContentBody,
    /// Per-call timeout.
    pub timeout: Duration,
}

impl ImageRequest {
    pub fn new(content: ContentBody, timeout: Duration) -> Self {
        Self { content, timeout }
    }
}

/// A collaborator that can draft, refine, and illustrate slides.
///
/// Implementations are handed out by [`crate::backend_from_config`] and must
/// be safe to share across the engine's concurrent slide tasks. Every call is
/// single-shot: a failed call is reported to the caller as-is, and retrying
/// is a user decision, not a backend one.
#[async_trait]
pub trait SlideBackend: Send + Sync {
    /// Draft content for a content slide from its outline entry.
    async fn generate_content(&self, req: ContentRequest) -> Result<ContentBody, BackendError>;

    /// Rework existing content according to a user instruction.
    ///
    /// Returns the full replacement body; the caller decides whether to
    /// commit it.
    async fn refine_content(&self, req: RefineRequest) -> Result<ContentBody, BackendError>;

    /// Render a 16:9 illustration for generated content.
    async fn generate_image(&self, req: ImageRequest) -> Result<ImageRef, BackendError>;
}
