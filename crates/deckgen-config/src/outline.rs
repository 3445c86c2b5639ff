//! Deck outline loading and validation
//!
//! The outline is the fixed skeleton of a presentation: an ordered list of
//! slides with stable ids, titles, and prompt topics. It is authored as a
//! TOML file and never changes during a session; generation only fills in
//! per-slide content.
//!
//! # Outline format
//!
//! ```toml
//! title = "Bhoomi Naturals Presentation"
//!
//! [[slides]]
//! id = 1
//! title = "Introduction"
//! topic = "Introduction of Bhoomi Naturals"
//!
//! [[slides]]
//! id = 7
//! title = "Resources & Media"
//! topic = "Placeholder links for photos, videos, and further reading."
//! kind = "media"
//! ```
//!
//! `kind` defaults to `"content"` when omitted. The legacy key `type` is
//! accepted as an alias.

use std::collections::HashSet;

use camino::Utf8Path;
use deckgen_utils::DeckError;
use deckgen_utils::error::ConfigError;
use deckgen_utils::types::{DeckOutline, SlideDescriptor, SlideId, SlideKind};

/// Read an outline file, parse it, and validate the result.
///
/// # Errors
///
/// Returns `DeckError::Config` when the file cannot be read, is not valid
/// TOML, or fails structural validation (see [`validate_outline`]).
pub fn load_outline(path: &Utf8Path) -> Result<DeckOutline, DeckError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        DeckError::Config(ConfigError::Io {
            path: path.to_string(),
            reason: e.to_string(),
        })
    })?;

    let outline: DeckOutline = toml::from_str(&raw)
        .map_err(|e| DeckError::Config(ConfigError::Parse(format!("{path}: {e}"))))?;

    validate_outline(&outline)?;
    Ok(outline)
}

/// Structural validation for a parsed outline.
///
/// Checks, in order:
/// - the deck title is non-empty
/// - at least one slide is declared
/// - slide ids are unique across the deck
/// - every slide has a non-empty title and topic
///
/// # Errors
///
/// Returns `ConfigError::InvalidOutline` naming the first violation found.
pub fn validate_outline(outline: &DeckOutline) -> Result<(), ConfigError> {
    if outline.title.trim().is_empty() {
        return Err(ConfigError::InvalidOutline(
            "deck title must not be empty".to_string(),
        ));
    }

    if outline.slides.is_empty() {
        return Err(ConfigError::InvalidOutline(
            "outline must declare at least one slide".to_string(),
        ));
    }

    let mut seen: HashSet<SlideId> = HashSet::with_capacity(outline.slides.len());
    for slide in &outline.slides {
        if !seen.insert(slide.id) {
            return Err(ConfigError::InvalidOutline(format!(
                "duplicate slide id {}",
                slide.id
            )));
        }
        if slide.title.trim().is_empty() {
            return Err(ConfigError::InvalidOutline(format!(
                "slide {} has an empty title",
                slide.id
            )));
        }
        if slide.topic.trim().is_empty() {
            return Err(ConfigError::InvalidOutline(format!(
                "slide {} has an empty topic",
                slide.id
            )));
        }
    }

    Ok(())
}

/// The outline `deckgen init` writes for a fresh project.
///
/// Eight slides covering a small farm-management pitch deck, with one media
/// slide for curated links. Users are expected to edit the file afterwards.
#[must_use]
pub fn sample_outline() -> DeckOutline {
    let slide = |id: u32, title: &str, topic: &str, kind: SlideKind| SlideDescriptor {
        id: SlideId(id),
        title: title.to_string(),
        topic: topic.to_string(),
        kind,
    };

    DeckOutline {
        title: "Bhoomi Naturals Presentation".to_string(),
        slides: vec![
            slide(
                1,
                "Introduction",
                "Introduction of Bhoomi Naturals",
                SlideKind::Content,
            ),
            slide(
                2,
                "Our Services",
                "Farm development & management services - what it includes",
                SlideKind::Content,
            ),
            slide(
                3,
                "Our Approach",
                "Our approach to farm management, focusing on first principles",
                SlideKind::Content,
            ),
            slide(4, "Benefits to Owners", "Benefits to Farm owners", SlideKind::Content),
            slide(
                5,
                "Our Credentials",
                "Credentials - hinting at past projects & farm owner experiences",
                SlideKind::Content,
            ),
            slide(
                6,
                "Why Bhoomi Naturals?",
                "Why Bhoomi naturals? Their USP and experience",
                SlideKind::Content,
            ),
            slide(
                7,
                "Resources & Media",
                "A \"Resources\" slide with placeholder links for real photos, YouTube \
                 video references, and other relevant sites for more information.",
                SlideKind::Media,
            ),
            slide(
                8,
                "Contact Us",
                "A \"Contact Us\" slide with placeholder contact information",
                SlideKind::Content,
            ),
        ],
    }
}

/// Render the sample outline as the TOML text `deckgen init` writes to disk.
///
/// Content slides omit the `kind` key since `content` is the default; the
/// media slide carries it explicitly.
#[must_use]
pub fn sample_outline_toml() -> String {
    let outline = sample_outline();
    let mut out = String::new();

    out.push_str(&format!("title = {}\n", toml_string(&outline.title)));
    for slide in &outline.slides {
        out.push_str("\n[[slides]]\n");
        out.push_str(&format!("id = {}\n", slide.id));
        out.push_str(&format!("title = {}\n", toml_string(&slide.title)));
        out.push_str(&format!("topic = {}\n", toml_string(&slide.topic)));
        if slide.kind == SlideKind::Media {
            out.push_str("kind = \"media\"\n");
        }
    }

    out
}

/// Quote a string as a TOML basic string, escaping quotes and backslashes.
fn toml_string(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            other => quoted.push(other),
        }
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    fn write_outline(dir: &TempDir, content: &str) -> Utf8PathBuf {
        let path = dir.path().join("deck.toml");
        std::fs::write(&path, content).unwrap();
        Utf8PathBuf::from_path_buf(path).unwrap()
    }

    #[test]
    fn test_sample_outline_is_valid() {
        let outline = sample_outline();
        validate_outline(&outline).unwrap();
        assert_eq!(outline.slides.len(), 8);
        assert_eq!(outline.slides[6].kind, SlideKind::Media);
        assert_eq!(outline.slides[6].id, SlideId(7));
    }

    #[test]
    fn test_sample_toml_round_trips() {
        let rendered = sample_outline_toml();
        let parsed: DeckOutline = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, sample_outline());
    }

    #[test]
    fn test_load_outline_from_file() {
        let dir = TempDir::new().unwrap();
        let path = write_outline(&dir, &sample_outline_toml());

        let outline = load_outline(&path).unwrap();
        assert_eq!(outline.title, "Bhoomi Naturals Presentation");
        assert_eq!(outline.slides.len(), 8);
    }

    #[test]
    fn test_load_outline_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("absent.toml")).unwrap();

        let err = load_outline(&path).unwrap_err();
        assert!(matches!(
            err,
            DeckError::Config(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_load_outline_rejects_malformed_toml() {
        let dir = TempDir::new().unwrap();
        let path = write_outline(&dir, "title = \"x\"\n[[slides]\nid = 1\n");

        let err = load_outline(&path).unwrap_err();
        assert!(matches!(err, DeckError::Config(ConfigError::Parse(_))));
    }

    #[test]
    fn test_validate_rejects_duplicate_ids() {
        let mut outline = sample_outline();
        outline.slides[3].id = SlideId(1);

        let err = validate_outline(&outline).unwrap_err();
        assert!(err.to_string().contains("duplicate slide id 1"));
    }

    #[test]
    fn test_validate_rejects_empty_deck_title() {
        let mut outline = sample_outline();
        outline.title = "   ".to_string();

        assert!(validate_outline(&outline).is_err());
    }

    #[test]
    fn test_validate_rejects_empty_slide_fields() {
        let mut outline = sample_outline();
        outline.slides[0].topic = String::new();

        let err = validate_outline(&outline).unwrap_err();
        assert!(err.to_string().contains("empty topic"));
    }

    #[test]
    fn test_validate_rejects_no_slides() {
        let outline = DeckOutline {
            title: "Empty".to_string(),
            slides: vec![],
        };

        assert!(validate_outline(&outline).is_err());
    }

    #[test]
    fn test_type_alias_accepted_for_kind() {
        let raw = r#"
title = "Legacy"

[[slides]]
id = 1
title = "Media"
topic = "Curated links"
type = "media"
"#;
        let outline: DeckOutline = toml::from_str(raw).unwrap();
        assert_eq!(outline.slides[0].kind, SlideKind::Media);
    }
}
