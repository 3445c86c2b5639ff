//! Slide state store
//!
//! Owns all mutable deck state: one [`SlideState`] per outline slide, mutated
//! only through the intent methods here. Collaborator calls happen outside
//! the store; async operations are split into a `begin_*` step that flips a
//! slide to pending and hands back a job description, and a `complete_*` step
//! that applies the outcome. The store itself never awaits anything, so a
//! caller can keep it behind a plain mutex and release the lock around the
//! collaborator call.
//!
//! State rules the methods enforce:
//! - `content` survives a failed regeneration; a slide that was ready once
//!   never loses its text to a later failure.
//! - `image` is attached exactly while `image_status` is ready. Starting a
//!   new render or failing one detaches it.
//! - Media slides never enter the image lifecycle and never call a
//!   collaborator for text; their gallery is materialized locally.

use deckgen_utils::DeckError;
use deckgen_utils::error::{GalleryError, GenerationError, RefinementError};
use deckgen_utils::types::{
    ContentBody, DeckOutline, GenerationStatus, ImageRef, MediaEntry, MediaGallery, SlideContent,
    SlideId, SlideKind, SlideState,
};
use tracing::{debug, warn};

/// Heading given to a media gallery when it is first materialized.
pub const DEFAULT_GALLERY_TITLE: &str = "Resources & Media";

/// What the caller should do after asking for text generation.
#[derive(Debug)]
pub enum TextDecision {
    /// Call the generation collaborator with this job, then report the
    /// outcome through [`SlideStore::complete_text`].
    Start(TextJob),
    /// Media slide; its gallery was just materialized in place.
    Materialized,
    /// A call for this slide is already in flight.
    InFlight,
    /// Content is already there and regeneration was not requested.
    AlreadyReady,
    /// An earlier attempt failed; only an explicit regenerate restarts it.
    FailedEarlier,
}

/// Inputs the generation collaborator needs for one slide.
#[derive(Debug, Clone)]
pub struct TextJob {
    pub deck_title: String,
    pub slide_title: String,
    pub topic: String,
}

/// Inputs the refinement collaborator needs.
#[derive(Debug, Clone)]
pub struct RefineJob {
    pub current: ContentBody,
}

/// What the caller should do after asking for an illustration.
#[derive(Debug)]
pub enum ImageDecision {
    /// Call the image collaborator with this job, then report the outcome
    /// through [`SlideStore::complete_image`].
    Start(ImageJob),
    /// A render for this slide is already in flight.
    InFlight,
    /// Media slides never take illustrations; nothing changed.
    Unsupported,
    /// The slide has no content to illustrate; recorded as a failed attempt.
    RejectedNoContent,
}

/// Inputs the image collaborator needs.
#[derive(Debug, Clone)]
pub struct ImageJob {
    pub content: ContentBody,
}

/// All runtime state for one deck.
///
/// Slides are stored in outline order; ids come from the outline and are the
/// only handle intents use. Unknown ids are reported as
/// [`DeckError::UnknownSlide`] rather than panicking, since ids arrive from
/// user input.
#[derive(Debug)]
pub struct SlideStore {
    outline: DeckOutline,
    slides: Vec<SlideState>,
}

impl SlideStore {
    #[must_use]
    pub fn new(outline: DeckOutline) -> Self {
        let slides = outline
            .slides
            .iter()
            .map(|descriptor| SlideState::new(descriptor.clone()))
            .collect();

        Self { outline, slides }
    }

    #[must_use]
    pub fn deck_title(&self) -> &str {
        &self.outline.title
    }

    #[must_use]
    pub fn outline(&self) -> &DeckOutline {
        &self.outline
    }

    /// All slides in outline order.
    #[must_use]
    pub fn slides(&self) -> &[SlideState] {
        &self.slides
    }

    #[must_use]
    pub fn slide(&self, id: SlideId) -> Option<&SlideState> {
        self.slides.iter().find(|s| s.descriptor.id == id)
    }

    fn slide_mut(&mut self, id: SlideId) -> Result<&mut SlideState, DeckError> {
        self.slides
            .iter_mut()
            .find(|s| s.descriptor.id == id)
            .ok_or(DeckError::UnknownSlide { id })
    }

    /// Start text generation for a slide, or explain why not.
    ///
    /// With `force` unset this is the reconciliation step run on selection:
    /// it only starts work for a slide nothing has touched yet. Pending,
    /// ready, and failed slides are left alone, so re-running it is free.
    /// With `force` set (an explicit regenerate) any settled slide starts
    /// over; existing content stays attached until the outcome arrives.
    ///
    /// Media slides never produce a job. Their gallery is materialized right
    /// here: empty, with a default heading. Forcing a media slide resets the
    /// gallery to that empty state, discarding curated entries.
    ///
    /// # Errors
    ///
    /// Returns `DeckError::UnknownSlide` for an id not in the outline.
    pub fn begin_text(&mut self, id: SlideId, force: bool) -> Result<TextDecision, DeckError> {
        let deck_title = self.outline.title.clone();
        let slide = self.slide_mut(id)?;

        if slide.descriptor.kind == SlideKind::Media {
            return Ok(Self::materialize_gallery(slide, force));
        }

        match slide.text_status {
            GenerationStatus::Pending => Ok(TextDecision::InFlight),
            GenerationStatus::Ready if !force => Ok(TextDecision::AlreadyReady),
            GenerationStatus::Failed if !force => Ok(TextDecision::FailedEarlier),
            _ => {
                slide.text_status = GenerationStatus::Pending;
                debug!(slide = %id, force, "Text generation started");
                Ok(TextDecision::Start(TextJob {
                    deck_title,
                    slide_title: slide.descriptor.title.clone(),
                    topic: slide.descriptor.topic.clone(),
                }))
            }
        }
    }

    fn materialize_gallery(slide: &mut SlideState, force: bool) -> TextDecision {
        if slide.text_status == GenerationStatus::Ready && !force {
            return TextDecision::AlreadyReady;
        }

        slide.content = Some(SlideContent::Gallery(MediaGallery {
            title: DEFAULT_GALLERY_TITLE.to_string(),
            entries: Vec::new(),
        }));
        slide.text_status = GenerationStatus::Ready;
        debug!(slide = %slide.descriptor.id, force, "Media gallery materialized");
        TextDecision::Materialized
    }

    /// Apply the outcome of a generation call started by [`Self::begin_text`].
    ///
    /// On success the slide becomes ready with the new content. On failure it
    /// becomes failed; whatever content it had stays attached. A completion
    /// arriving for a slide that is not pending is logged and dropped.
    pub fn complete_text(&mut self, id: SlideId, outcome: Result<ContentBody, GenerationError>) {
        let Ok(slide) = self.slide_mut(id) else {
            warn!(slide = %id, "Generation completed for unknown slide");
            return;
        };

        if slide.text_status != GenerationStatus::Pending {
            warn!(
                slide = %id,
                status = %slide.text_status,
                "Dropping text completion for a slide that is not pending"
            );
            return;
        }

        match outcome {
            Ok(body) => {
                slide.content = Some(SlideContent::Body(body));
                slide.text_status = GenerationStatus::Ready;
                debug!(slide = %id, "Text generation succeeded");
            }
            Err(e) => {
                slide.text_status = GenerationStatus::Failed;
                warn!(slide = %id, error = %e, "Text generation failed");
            }
        }
    }

    /// Start a refinement, handing back the content the collaborator should
    /// rework.
    ///
    /// Refinement is narrower than generation: it applies only to content
    /// slides that are currently ready. The slide goes pending while the
    /// call is out; exactly one of [`Self::complete_refine`] or
    /// [`Self::abort_refine`] must follow.
    ///
    /// # Errors
    ///
    /// Returns `DeckError::UnknownSlide` for a bad id,
    /// `RefinementError::WrongKind` for media slides, and
    /// `RefinementError::NotReady` when there is no settled content to work
    /// from.
    pub fn begin_refine(&mut self, id: SlideId) -> Result<RefineJob, DeckError> {
        let slide = self.slide_mut(id)?;

        if slide.descriptor.kind == SlideKind::Media {
            return Err(RefinementError::WrongKind { id }.into());
        }

        let current = match (&slide.text_status, &slide.content) {
            (GenerationStatus::Ready, Some(SlideContent::Body(body))) => body.clone(),
            _ => {
                return Err(RefinementError::NotReady {
                    id,
                    status: slide.text_status,
                }
                .into());
            }
        };

        slide.text_status = GenerationStatus::Pending;
        debug!(slide = %id, "Refinement started");
        Ok(RefineJob { current })
    }

    /// Commit a successful refinement: replace the content, back to ready.
    pub fn complete_refine(&mut self, id: SlideId, refined: ContentBody) {
        let Ok(slide) = self.slide_mut(id) else {
            warn!(slide = %id, "Refinement completed for unknown slide");
            return;
        };

        if slide.text_status != GenerationStatus::Pending {
            warn!(slide = %id, status = %slide.text_status, "Dropping unexpected refinement result");
            return;
        }

        slide.content = Some(SlideContent::Body(refined));
        slide.text_status = GenerationStatus::Ready;
        debug!(slide = %id, "Refinement applied");
    }

    /// Roll back a failed refinement.
    ///
    /// The slide returns to ready with its previous content untouched. The
    /// failure itself travels back to the caller separately; a failed
    /// refinement is the caller's problem, not the slide's.
    pub fn abort_refine(&mut self, id: SlideId) {
        let Ok(slide) = self.slide_mut(id) else {
            warn!(slide = %id, "Refinement aborted for unknown slide");
            return;
        };

        if slide.text_status == GenerationStatus::Pending {
            slide.text_status = GenerationStatus::Ready;
            debug!(slide = %id, "Refinement rolled back, previous content kept");
        }
    }

    /// Start an illustration render, or explain why not.
    ///
    /// Every accepted request is a fresh render, including on slides that
    /// already have an image; the old image is detached the moment the slide
    /// goes pending. Media slides are refused without any state change.
    /// Content slides without text yet are marked failed immediately, since
    /// there is nothing to illustrate.
    ///
    /// # Errors
    ///
    /// Returns `DeckError::UnknownSlide` for an id not in the outline.
    pub fn begin_image(&mut self, id: SlideId) -> Result<ImageDecision, DeckError> {
        let slide = self.slide_mut(id)?;

        if slide.descriptor.kind == SlideKind::Media {
            debug!(slide = %id, "Ignoring image request for media slide");
            return Ok(ImageDecision::Unsupported);
        }

        if slide.image_status == GenerationStatus::Pending {
            return Ok(ImageDecision::InFlight);
        }

        let Some(SlideContent::Body(body)) = &slide.content else {
            slide.image_status = GenerationStatus::Failed;
            warn!(slide = %id, "Image request rejected: slide has no content yet");
            return Ok(ImageDecision::RejectedNoContent);
        };

        let job = ImageJob {
            content: body.clone(),
        };
        slide.image = None;
        slide.image_status = GenerationStatus::Pending;
        debug!(slide = %id, "Image render started");
        Ok(ImageDecision::Start(job))
    }

    /// Apply the outcome of a render started by [`Self::begin_image`].
    pub fn complete_image(&mut self, id: SlideId, outcome: Result<ImageRef, GenerationError>) {
        let Ok(slide) = self.slide_mut(id) else {
            warn!(slide = %id, "Image render completed for unknown slide");
            return;
        };

        if slide.image_status != GenerationStatus::Pending {
            warn!(slide = %id, status = %slide.image_status, "Dropping unexpected image result");
            return;
        }

        match outcome {
            Ok(image) => {
                slide.image = Some(image);
                slide.image_status = GenerationStatus::Ready;
                debug!(slide = %id, "Image render succeeded");
            }
            Err(e) => {
                slide.image = None;
                slide.image_status = GenerationStatus::Failed;
                warn!(slide = %id, error = %e, "Image render failed");
            }
        }
    }

    /// Append an entry to a media slide's gallery, returning the new length.
    ///
    /// The entry itself is taken as-is; URL shape and label checks happen at
    /// the input boundary before an entry is built.
    ///
    /// # Errors
    ///
    /// Returns `DeckError::UnknownSlide` for a bad id,
    /// `GalleryError::WrongKind` for content slides, and
    /// `GalleryError::NotMaterialized` when the slide has not been selected
    /// yet and so has no gallery to extend.
    pub fn add_media_entry(&mut self, id: SlideId, entry: MediaEntry) -> Result<usize, DeckError> {
        let slide = self.slide_mut(id)?;
        let gallery = Self::gallery_mut(slide, id)?;

        gallery.entries.push(entry);
        debug!(slide = %id, entries = gallery.entries.len(), "Media entry added");
        Ok(gallery.entries.len())
    }

    /// Remove the entry at `index` from a media slide's gallery.
    ///
    /// Later entries shift down. An out-of-range index is a no-op and
    /// reports `false`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::add_media_entry`].
    pub fn remove_media_entry(&mut self, id: SlideId, index: usize) -> Result<bool, DeckError> {
        let slide = self.slide_mut(id)?;
        let gallery = Self::gallery_mut(slide, id)?;

        if index >= gallery.entries.len() {
            debug!(slide = %id, index, "Ignoring removal of out-of-range media entry");
            return Ok(false);
        }

        gallery.entries.remove(index);
        debug!(slide = %id, entries = gallery.entries.len(), "Media entry removed");
        Ok(true)
    }

    fn gallery_mut<'a>(
        slide: &'a mut SlideState,
        id: SlideId,
    ) -> Result<&'a mut MediaGallery, DeckError> {
        if slide.descriptor.kind != SlideKind::Media {
            return Err(GalleryError::WrongKind { id }.into());
        }

        match slide.content.as_mut().and_then(SlideContent::as_gallery_mut) {
            Some(gallery) => Ok(gallery),
            None => Err(GalleryError::NotMaterialized { id }.into()),
        }
    }
}
