//! Deck orchestration
//!
//! This module wires the slide store to a collaborator backend and executes
//! user intents end to end: ensure a selected slide has content, regenerate,
//! refine, render illustrations, curate media galleries, and batch-build the
//! whole deck.
//!
//! The store sits behind a mutex and is only ever held across synchronous
//! `begin_*`/`complete_*` calls; the lock is released for the duration of
//! every collaborator call. Each in-flight call is keyed by slide id, so
//! resolutions always land on the slide that issued them no matter what the
//! user selected in the meantime.
//!
//! Failure policy follows the slide lifecycle: initial generation and image
//! failures are absorbed into the slide's status, while refinement failures
//! roll the slide back and travel to the caller.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use deckgen_config::Config;
use deckgen_llm::{
    ContentRequest, ImageRequest, RefineRequest, SlideBackend, backend_from_config,
};
use deckgen_utils::DeckError;
use deckgen_utils::error::{GenerationError, RefinementError};
use deckgen_utils::logging::slide_span;
use deckgen_utils::types::{
    ContentBody, DeckOutline, GenerationStatus, MediaEntry, SlideId, SlideKind, SlideState,
};
use tokio::task::JoinSet;
use tracing::{Instrument, info, warn};

use crate::store::{ImageDecision, SlideStore, TextDecision};

/// Outcome of one text pass over a slide, for build accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextOutcome {
    Generated,
    AlreadyReady,
    Failed,
}

/// Outcome of one image pass over a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImageOutcome {
    Rendered,
    Skipped,
    Failed,
}

/// Tallies from a whole-deck build pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Slides that gained content this pass, media materializations included.
    pub generated: usize,
    /// Slides that already had content and were left alone.
    pub already_ready: usize,
    /// Slides whose text is failed after this pass.
    pub failed: usize,
    /// Illustrations rendered this pass.
    pub images_rendered: usize,
    /// Illustration attempts that failed this pass.
    pub images_failed: usize,
}

impl BuildReport {
    /// True when every slide ended the pass with content.
    #[must_use]
    pub fn all_text_ready(&self) -> bool {
        self.failed == 0
    }
}

impl fmt::Display for BuildReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} generated, {} already ready, {} failed",
            self.generated, self.already_ready, self.failed
        )?;
        if self.images_rendered > 0 || self.images_failed > 0 {
            write!(
                f,
                "; {} images rendered, {} failed",
                self.images_rendered, self.images_failed
            )?;
        }
        Ok(())
    }
}

/// Executes deck intents against a store and a collaborator backend.
///
/// Cloning is cheap and yields a handle to the same deck; batch operations
/// clone the orchestrator into each worker task.
#[derive(Clone)]
pub struct DeckOrchestrator {
    store: Arc<Mutex<SlideStore>>,
    backend: Arc<dyn SlideBackend>,
    timeout: Duration,
    concurrency: usize,
}

impl DeckOrchestrator {
    /// Build an orchestrator around an outline and an explicit backend.
    #[must_use]
    pub fn new(
        outline: DeckOutline,
        backend: Box<dyn SlideBackend>,
        timeout: Duration,
        concurrency: usize,
    ) -> Self {
        Self {
            store: Arc::new(Mutex::new(SlideStore::new(outline))),
            backend: Arc::from(backend),
            timeout,
            concurrency: concurrency.max(1),
        }
    }

    /// Build an orchestrator with the backend the configuration selects.
    ///
    /// # Errors
    ///
    /// Returns `DeckError::Backend` when the configured provider cannot be
    /// constructed, for example a missing API key variable.
    pub fn from_config(config: &Config, outline: DeckOutline) -> Result<Self, DeckError> {
        let backend = backend_from_config(config)?;
        Ok(Self::new(
            outline,
            backend,
            config.timeout(),
            config.concurrency(),
        ))
    }

    fn lock_store(&self) -> MutexGuard<'_, SlideStore> {
        match self.store.lock() {
            Ok(guard) => guard,
            // A panicked worker must not wedge every later intent.
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Title of the deck being built.
    #[must_use]
    pub fn deck_title(&self) -> String {
        self.lock_store().deck_title().to_string()
    }

    /// Snapshot of every slide in outline order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<SlideState> {
        self.lock_store().slides().to_vec()
    }

    /// Snapshot of one slide.
    ///
    /// # Errors
    ///
    /// Returns `DeckError::UnknownSlide` for an id not in the outline.
    pub fn slide(&self, id: SlideId) -> Result<SlideState, DeckError> {
        self.lock_store()
            .slide(id)
            .cloned()
            .ok_or(DeckError::UnknownSlide { id })
    }

    /// All slide ids in outline order.
    #[must_use]
    pub fn slide_ids(&self) -> Vec<SlideId> {
        self.lock_store()
            .slides()
            .iter()
            .map(|s| s.descriptor.id)
            .collect()
    }

    /// Make sure a slide has content, generating it if nothing has tried yet.
    ///
    /// This is the reconciliation step behind slide selection: safe to call
    /// any number of times, it issues at most one generation call per slide.
    /// A failed earlier attempt stays failed; use [`Self::regenerate`] to
    /// retry. Generation failures land in the slide's status rather than in
    /// the returned result.
    ///
    /// # Errors
    ///
    /// Returns `DeckError::UnknownSlide` for an id not in the outline.
    pub async fn ensure_ready(&self, id: SlideId) -> Result<(), DeckError> {
        self.run_text(id, false).await.map(|_| ())
    }

    /// Throw away the current text state and generate again.
    ///
    /// Allowed from any settled state. Existing content survives until the
    /// new draft arrives and stays attached if the attempt fails.
    ///
    /// # Errors
    ///
    /// Returns `DeckError::UnknownSlide` for an id not in the outline.
    pub async fn regenerate(&self, id: SlideId) -> Result<(), DeckError> {
        self.run_text(id, true).await.map(|_| ())
    }

    /// Rework a ready content slide against a user instruction.
    ///
    /// On success the slide carries the refined content. On failure the
    /// slide reverts to ready with its previous content and the error is
    /// returned, so the caller can show it without the slide losing
    /// anything.
    ///
    /// # Errors
    ///
    /// Returns `DeckError::UnknownSlide` for a bad id,
    /// `RefinementError::WrongKind`/`NotReady` when the slide cannot be
    /// refined, and `RefinementError::Backend` when the collaborator call
    /// fails.
    pub async fn refine(&self, id: SlideId, instruction: &str) -> Result<(), DeckError> {
        let job = self.lock_store().begin_refine(id)?;

        let request = RefineRequest::new(job.current, instruction, self.timeout);
        let result = self
            .backend
            .refine_content(request)
            .instrument(slide_span("refine", id))
            .await;

        match result {
            Ok(refined) => {
                self.lock_store().complete_refine(id, refined);
                Ok(())
            }
            Err(e) => {
                self.lock_store().abort_refine(id);
                Err(RefinementError::Backend(e).into())
            }
        }
    }

    /// Render an illustration for a content slide.
    ///
    /// Ineligible requests (media slide, no content yet, render already in
    /// flight) and render failures are recorded in the slide's image status;
    /// the call itself only fails for unknown ids.
    ///
    /// # Errors
    ///
    /// Returns `DeckError::UnknownSlide` for an id not in the outline.
    pub async fn generate_image(&self, id: SlideId) -> Result<(), DeckError> {
        self.run_image(id).await.map(|_| ())
    }

    /// Generate the whole deck, fanning out up to the configured number of
    /// concurrent collaborator calls.
    ///
    /// With `force` unset this is idempotent: slides that already have
    /// content are skipped. With `with_images` set, a second pass renders
    /// illustrations for every ready content slide that does not have one
    /// yet (or for all of them when `force` is set).
    ///
    /// # Errors
    ///
    /// Returns `DeckError::UnknownSlide` only if the store changes under the
    /// pass, which cannot happen through this API.
    pub async fn build(&self, force: bool, with_images: bool) -> Result<BuildReport, DeckError> {
        let mut report = BuildReport::default();

        let ids = self.slide_ids();
        info!(slides = ids.len(), force, with_images, "Deck build started");

        let text_outcomes = self
            .fan_out(ids, |this, id| async move { this.run_text(id, force).await })
            .await;
        for outcome in text_outcomes {
            match outcome {
                Ok(TextOutcome::Generated) => report.generated += 1,
                Ok(TextOutcome::AlreadyReady) => report.already_ready += 1,
                Ok(TextOutcome::Failed) | Err(_) => report.failed += 1,
            }
        }

        if with_images {
            let image_ids: Vec<SlideId> = {
                let store = self.lock_store();
                store
                    .slides()
                    .iter()
                    .filter(|s| s.descriptor.kind == SlideKind::Content && s.is_ready())
                    .filter(|s| force || s.image_status != GenerationStatus::Ready)
                    .map(|s| s.descriptor.id)
                    .collect()
            };

            let image_outcomes = self
                .fan_out(image_ids, |this, id| async move { this.run_image(id).await })
                .await;
            for outcome in image_outcomes {
                match outcome {
                    Ok(ImageOutcome::Rendered) => report.images_rendered += 1,
                    Ok(ImageOutcome::Skipped) => {}
                    Ok(ImageOutcome::Failed) | Err(_) => report.images_failed += 1,
                }
            }
        }

        info!(
            generated = report.generated,
            already_ready = report.already_ready,
            failed = report.failed,
            images_rendered = report.images_rendered,
            images_failed = report.images_failed,
            "Deck build finished"
        );
        Ok(report)
    }

    /// Append an entry to a media slide's gallery, returning the new length.
    ///
    /// # Errors
    ///
    /// Returns `DeckError::UnknownSlide` or a `GalleryError` when the slide
    /// cannot take entries.
    pub fn add_media(&self, id: SlideId, entry: MediaEntry) -> Result<usize, DeckError> {
        self.lock_store().add_media_entry(id, entry)
    }

    /// Remove the gallery entry at `index`; out-of-range reports `false`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::add_media`].
    pub fn remove_media(&self, id: SlideId, index: usize) -> Result<bool, DeckError> {
        self.lock_store().remove_media_entry(id, index)
    }

    async fn run_text(&self, id: SlideId, force: bool) -> Result<TextOutcome, DeckError> {
        let decision = self.lock_store().begin_text(id, force)?;
        let job = match decision {
            TextDecision::Start(job) => job,
            TextDecision::Materialized => return Ok(TextOutcome::Generated),
            TextDecision::AlreadyReady | TextDecision::InFlight => {
                return Ok(TextOutcome::AlreadyReady);
            }
            TextDecision::FailedEarlier => return Ok(TextOutcome::Failed),
        };

        let request = ContentRequest::new(job.deck_title, job.slide_title, job.topic, self.timeout);
        let result = self
            .backend
            .generate_content(request)
            .instrument(slide_span("generate", id))
            .await;

        let outcome = result
            .map_err(GenerationError::from)
            .and_then(validate_generated);
        let succeeded = outcome.is_ok();
        self.lock_store().complete_text(id, outcome);

        Ok(if succeeded {
            TextOutcome::Generated
        } else {
            TextOutcome::Failed
        })
    }

    async fn run_image(&self, id: SlideId) -> Result<ImageOutcome, DeckError> {
        let decision = self.lock_store().begin_image(id)?;
        let job = match decision {
            ImageDecision::Start(job) => job,
            ImageDecision::InFlight | ImageDecision::Unsupported => {
                return Ok(ImageOutcome::Skipped);
            }
            ImageDecision::RejectedNoContent => return Ok(ImageOutcome::Failed),
        };

        let request = ImageRequest::new(job.content, self.timeout);
        let result = self
            .backend
            .generate_image(request)
            .instrument(slide_span("illustrate", id))
            .await;

        let succeeded = result.is_ok();
        self.lock_store()
            .complete_image(id, result.map_err(GenerationError::from));

        Ok(if succeeded {
            ImageOutcome::Rendered
        } else {
            ImageOutcome::Failed
        })
    }

    /// Run one async slide operation per id with bounded concurrency,
    /// returning the outcomes in completion order.
    async fn fan_out<T, F, Fut>(&self, ids: Vec<SlideId>, op: F) -> Vec<Result<T, DeckError>>
    where
        T: Send + 'static,
        F: Fn(Self, SlideId) -> Fut,
        Fut: Future<Output = Result<T, DeckError>> + Send + 'static,
    {
        let mut queue: VecDeque<SlideId> = ids.into();
        let mut tasks: JoinSet<(SlideId, Result<T, DeckError>)> = JoinSet::new();
        let mut outcomes = Vec::with_capacity(queue.len());

        loop {
            while tasks.len() < self.concurrency {
                let Some(id) = queue.pop_front() else { break };
                let fut = op(self.clone(), id);
                tasks.spawn(async move { (id, fut.await) });
            }

            let Some(joined) = tasks.join_next().await else {
                break;
            };
            match joined {
                Ok((id, result)) => {
                    if let Err(e) = &result {
                        warn!(slide = %id, error = %e, "Slide operation failed");
                    }
                    outcomes.push(result);
                }
                Err(e) => {
                    warn!(error = %e, "Slide worker aborted");
                    outcomes.push(Err(DeckError::Generation(GenerationError::InvalidContent(
                        format!("slide worker aborted: {e}"),
                    ))));
                }
            }
        }

        outcomes
    }
}

/// Check a generated body meets the contract: a title and at least one
/// non-blank bullet.
fn validate_generated(body: ContentBody) -> Result<ContentBody, GenerationError> {
    if body.title.trim().is_empty() {
        return Err(GenerationError::InvalidContent(
            "generated content has no title".to_string(),
        ));
    }
    if body.bullets.iter().all(|b| b.trim().is_empty()) {
        return Err(GenerationError::InvalidContent(
            "generated content has no bullet points".to_string(),
        ));
    }
    Ok(body)
}
