//! PDF export for generated slide decks.
//!
//! The exporter consumes slide state produced by the engine and renders a
//! 1280 x 720 landscape document, one page per content slide and as many
//! pages as a media gallery needs. Only slides whose text generation
//! finished are included; slides still pending or failed are skipped, and
//! a deck with nothing ready at all refuses to export rather than produce
//! an empty file.

mod layout;
mod metrics;
mod pdf;

use camino::Utf8Path;
use tracing::{debug, info};

use deckgen_utils::atomic_write::write_bytes_atomic;
use deckgen_utils::error::{DeckError, ExportError};
use deckgen_utils::types::SlideState;

/// A rendered deck plus the accounting shown in status output.
#[derive(Debug, Clone)]
pub struct ExportedDeck {
    /// The complete PDF document.
    pub bytes: Vec<u8>,
    /// Pages in the document; media slides can span several.
    pub pages: usize,
    /// Slides that made it into the document.
    pub slides: usize,
    /// Slides left out because their text was not ready.
    pub skipped: usize,
}

/// Renders every ready slide of `slides` into a PDF, in deck order.
///
/// Returns [`ExportError::NothingToExport`] when no slide is ready.
pub fn export_deck(slides: &[SlideState], deck_title: &str) -> Result<ExportedDeck, DeckError> {
    let ready: Vec<&SlideState> = slides.iter().filter(|slide| slide.is_ready()).collect();
    if ready.is_empty() {
        return Err(ExportError::NothingToExport.into());
    }
    let skipped = slides.len() - ready.len();

    let pages = layout::layout_deck(&ready);
    debug!(
        slides = ready.len(),
        skipped,
        pages = pages.len(),
        "deck laid out"
    );

    let bytes = pdf::render(&pages, deck_title);
    Ok(ExportedDeck {
        bytes,
        pages: pages.len(),
        slides: ready.len(),
        skipped,
    })
}

/// Renders the deck and writes it to `path` atomically.
pub fn export_to_file(
    slides: &[SlideState],
    deck_title: &str,
    path: &Utf8Path,
) -> Result<ExportedDeck, DeckError> {
    let deck = export_deck(slides, deck_title)?;
    write_bytes_atomic(path, &deck.bytes).map_err(|err| ExportError::Write {
        path: path.to_string(),
        reason: err.to_string(),
    })?;
    info!(path = %path, pages = deck.pages, slides = deck.slides, "deck exported");
    Ok(deck)
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckgen_utils::types::{
        ContentBody, GenerationStatus, MediaGallery, SlideContent, SlideDescriptor, SlideId,
        SlideKind, SlideState,
    };

    fn descriptor(id: u32, kind: SlideKind) -> SlideDescriptor {
        SlideDescriptor {
            id: SlideId(id),
            title: format!("Slide {id}"),
            topic: "topic".to_string(),
            kind,
        }
    }

    fn ready_content(id: u32, title: &str) -> SlideState {
        SlideState {
            descriptor: descriptor(id, SlideKind::Content),
            content: Some(SlideContent::Body(ContentBody {
                title: title.to_string(),
                subtitle: None,
                bullets: vec!["One point".to_string()],
            })),
            image: None,
            text_status: GenerationStatus::Ready,
            image_status: GenerationStatus::Uninitialized,
        }
    }

    fn untouched(id: u32) -> SlideState {
        SlideState::new(descriptor(id, SlideKind::Content))
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn refuses_a_deck_with_nothing_ready() {
        let slides = vec![untouched(1), untouched(2)];
        let err = export_deck(&slides, "Deck").unwrap_err();
        assert!(matches!(
            err,
            DeckError::Export(ExportError::NothingToExport)
        ));
    }

    #[test]
    fn skips_slides_that_are_not_ready() {
        let slides = vec![ready_content(1, "Introduction"), untouched(2)];
        let deck = export_deck(&slides, "Deck").unwrap();
        assert_eq!(deck.slides, 1);
        assert_eq!(deck.skipped, 1);
        assert_eq!(deck.pages, 1);
        assert!(contains(&deck.bytes, b"(Introduction) Tj"));
    }

    #[test]
    fn media_slides_count_extra_pages() {
        let entries = (1..=7)
            .map(|n| deckgen_utils::types::MediaEntry {
                kind: deckgen_utils::types::MediaKind::Link,
                locator: format!("https://example.com/{n}"),
                label: format!("Site {n}"),
            })
            .collect();
        let media = SlideState {
            descriptor: descriptor(7, SlideKind::Media),
            content: Some(SlideContent::Gallery(MediaGallery {
                title: "Resources & Media".to_string(),
                entries,
            })),
            image: None,
            text_status: GenerationStatus::Ready,
            image_status: GenerationStatus::Uninitialized,
        };
        let slides = vec![ready_content(1, "Introduction"), media];
        let deck = export_deck(&slides, "Deck").unwrap();
        assert_eq!(deck.slides, 2);
        assert_eq!(deck.pages, 3);
    }

    #[test]
    fn writes_the_document_to_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path_buf = dir.path().join("deck.pdf");
        let path = Utf8Path::from_path(path_buf.as_path()).unwrap();

        let slides = vec![ready_content(1, "Introduction")];
        let deck = export_to_file(&slides, "Deck", path).unwrap();

        let on_disk = std::fs::read(path.as_std_path()).unwrap();
        assert_eq!(on_disk, deck.bytes);
        assert!(on_disk.starts_with(b"%PDF-"));
    }
}
