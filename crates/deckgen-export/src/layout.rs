//! Slide geometry: turns ready slides into per-page draw operations.
//!
//! All coordinates here are page pixels with the origin at the top-left
//! corner and `y` naming the text baseline, matching how the layout
//! constants were designed. The PDF assembly flips `y` into PDF space.
//!
//! Content slides always occupy exactly one page. Media slides spill onto
//! continuation pages when their entry list outgrows the canvas.

use deckgen_utils::types::{ContentBody, ImageRef, MediaGallery, SlideContent, SlideState};

use crate::metrics::{FontFace, line_height, wrap_text};

pub(crate) type Rgb = (u8, u8, u8);

pub(crate) const PAGE_WIDTH: f32 = 1280.0;
pub(crate) const PAGE_HEIGHT: f32 = 720.0;

const MARGIN: f32 = 60.0;
const TOP_BASELINE: f32 = 120.0;
/// Text column of a content slide; the right half belongs to the image.
const CONTENT_COLUMN: f32 = 600.0;
const FULL_COLUMN: f32 = PAGE_WIDTH - 2.0 * MARGIN;

const TITLE_SIZE: f32 = 48.0;
const TITLE_GAP: f32 = 40.0;
const SUBTITLE_SIZE: f32 = 24.0;
const SUBTITLE_GAP: f32 = 30.0;
const BULLET_SIZE: f32 = 20.0;
const BULLET_INDENT: f32 = 25.0;
const BULLET_LINE_STEP: f32 = 22.0;
const BULLET_GAP: f32 = 15.0;

const MEDIA_TITLE_GAP: f32 = 50.0;
const LABEL_SIZE: f32 = 22.0;
const LABEL_LINE_STEP: f32 = 24.0;
const LOCATOR_SIZE: f32 = 18.0;
const LOCATOR_GAP: f32 = 50.0;
/// A media entry starting below this baseline moves to a fresh page.
const MEDIA_OVERFLOW_Y: f32 = PAGE_HEIGHT - 100.0;
const LOCATOR_DISPLAY_MAX: usize = 80;

pub(crate) const BACKGROUND_COLOR: Rgb = (31, 41, 55);
const TITLE_COLOR: Rgb = (134, 239, 172);
const SUBTITLE_COLOR: Rgb = (156, 163, 175);
const CHECK_COLOR: Rgb = (74, 222, 128);
const BODY_COLOR: Rgb = (209, 213, 219);
const LABEL_COLOR: Rgb = (209, 213, 219);
const LINK_COLOR: Rgb = (107, 114, 128);

const IMAGE_X: f32 = 700.0;
const IMAGE_Y: f32 = 110.0;
const IMAGE_WIDTH: f32 = 520.0;
const IMAGE_HEIGHT: f32 = 292.5;
pub(crate) const IMAGE_FALLBACK_X: f32 = 860.0;
pub(crate) const IMAGE_FALLBACK_Y: f32 = 360.0;
pub(crate) const IMAGE_FALLBACK_SIZE: f32 = 20.0;
pub(crate) const IMAGE_FALLBACK_COLOR: Rgb = (239, 68, 68);
pub(crate) const IMAGE_FALLBACK_TEXT: &str = "Image failed to load";

/// One drawing primitive on a page.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DrawOp {
    /// A single pre-wrapped line of text; `y` is the baseline.
    Text {
        face: FontFace,
        size: f32,
        color: Rgb,
        x: f32,
        y: f32,
        line: String,
    },
    /// The check glyph in front of a bullet.
    Check { size: f32, color: Rgb, x: f32, y: f32 },
    /// An illustration anchored at its top-left corner.
    Image {
        image: ImageRef,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    /// A single line of text that doubles as a clickable link.
    Link {
        size: f32,
        color: Rgb,
        x: f32,
        y: f32,
        text: String,
        uri: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Page {
    pub(crate) ops: Vec<DrawOp>,
}

/// Lays out `slides` in order into rendered pages.
///
/// Callers pass only exportable slides; a slide without content yields no
/// pages.
pub(crate) fn layout_deck(slides: &[&SlideState]) -> Vec<Page> {
    let mut pages = Vec::new();
    for slide in slides {
        match &slide.content {
            Some(SlideContent::Body(body)) => {
                pages.push(content_page(body, slide.image.as_ref()));
            }
            Some(SlideContent::Gallery(gallery)) => pages.extend(gallery_pages(gallery)),
            None => {}
        }
    }
    pages
}

fn content_page(body: &ContentBody, image: Option<&ImageRef>) -> Page {
    let mut ops = Vec::new();
    let mut y = TOP_BASELINE;

    y = push_wrapped(
        &mut ops,
        FontFace::Bold,
        TITLE_SIZE,
        TITLE_COLOR,
        MARGIN,
        y,
        &body.title,
        CONTENT_COLUMN,
    ) + TITLE_GAP;

    if let Some(subtitle) = &body.subtitle {
        y = push_wrapped(
            &mut ops,
            FontFace::Regular,
            SUBTITLE_SIZE,
            SUBTITLE_COLOR,
            MARGIN,
            y,
            subtitle,
            CONTENT_COLUMN,
        ) + SUBTITLE_GAP;
    }

    for bullet in &body.bullets {
        ops.push(DrawOp::Check {
            size: BULLET_SIZE,
            color: CHECK_COLOR,
            x: MARGIN,
            y,
        });
        let lines = wrap_text(
            FontFace::Regular,
            BULLET_SIZE,
            bullet,
            CONTENT_COLUMN - BULLET_INDENT,
        );
        for (i, line) in lines.iter().enumerate() {
            ops.push(DrawOp::Text {
                face: FontFace::Regular,
                size: BULLET_SIZE,
                color: BODY_COLOR,
                x: MARGIN + BULLET_INDENT,
                y: y + i as f32 * line_height(BULLET_SIZE),
                line: line.clone(),
            });
        }
        y += lines.len() as f32 * BULLET_LINE_STEP + BULLET_GAP;
    }

    if let Some(image) = image {
        ops.push(DrawOp::Image {
            image: image.clone(),
            x: IMAGE_X,
            y: IMAGE_Y,
            width: IMAGE_WIDTH,
            height: IMAGE_HEIGHT,
        });
    }

    Page { ops }
}

fn gallery_pages(gallery: &MediaGallery) -> Vec<Page> {
    let mut pages = Vec::new();
    let mut ops = Vec::new();
    let mut y = TOP_BASELINE;

    y = push_wrapped(
        &mut ops,
        FontFace::Bold,
        TITLE_SIZE,
        TITLE_COLOR,
        MARGIN,
        y,
        &gallery.title,
        FULL_COLUMN,
    ) + MEDIA_TITLE_GAP;

    for entry in &gallery.entries {
        if y > MEDIA_OVERFLOW_Y {
            pages.push(Page {
                ops: std::mem::take(&mut ops),
            });
            y = TOP_BASELINE;
        }

        let label = format!("[{}] {}", entry.kind.display_label(), entry.label);
        let lines = wrap_text(FontFace::Bold, LABEL_SIZE, &label, FULL_COLUMN);
        for (i, line) in lines.iter().enumerate() {
            ops.push(DrawOp::Text {
                face: FontFace::Bold,
                size: LABEL_SIZE,
                color: LABEL_COLOR,
                x: MARGIN,
                y: y + i as f32 * line_height(LABEL_SIZE),
                line: line.clone(),
            });
        }
        y += lines.len() as f32 * LABEL_LINE_STEP;

        ops.push(DrawOp::Link {
            size: LOCATOR_SIZE,
            color: LINK_COLOR,
            x: MARGIN + 2.0,
            y,
            text: locator_display(&entry.locator),
            uri: entry.locator.clone(),
        });
        y += LOCATOR_GAP;
    }

    pages.push(Page { ops });
    pages
}

#[allow(clippy::too_many_arguments)]
fn push_wrapped(
    ops: &mut Vec<DrawOp>,
    face: FontFace,
    size: f32,
    color: Rgb,
    x: f32,
    y: f32,
    text: &str,
    max_width: f32,
) -> f32 {
    let lines = wrap_text(face, size, text, max_width);
    let count = lines.len() as f32;
    for (i, line) in lines.into_iter().enumerate() {
        ops.push(DrawOp::Text {
            face,
            size,
            color,
            x,
            y: y + i as f32 * line_height(size),
            line,
        });
    }
    y + count * line_height(size)
}

/// Shortens a locator for display. Data URIs carried by photo entries can
/// run to megabytes; the link annotation still receives the full locator.
fn locator_display(locator: &str) -> String {
    if locator.chars().count() <= LOCATOR_DISPLAY_MAX {
        locator.to_string()
    } else {
        let prefix: String = locator.chars().take(LOCATOR_DISPLAY_MAX - 3).collect();
        format!("{prefix}...")
    }
}
