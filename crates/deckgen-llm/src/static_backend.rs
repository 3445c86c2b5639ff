//! Offline static backend
//!
//! A collaborator that answers every call locally with deterministic
//! placeholder content. `--dry-run` selects it so the whole pipeline can be
//! exercised end to end, including PDF export, without network access or an
//! API key.

use async_trait::async_trait;
use deckgen_utils::error::BackendError;
use deckgen_utils::types::{ContentBody, ImageRef};
use tracing::debug;

use crate::types::{ContentRequest, ImageRequest, RefineRequest, SlideBackend};

/// Placeholder illustration dimensions, 16:9 like the real image model.
const PLACEHOLDER_WIDTH: u32 = 320;
const PLACEHOLDER_HEIGHT: u32 = 180;

/// Collaborator that fabricates content without any provider calls.
#[derive(Debug, Clone, Default)]
pub(crate) struct StaticBackend;

impl StaticBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SlideBackend for StaticBackend {
    async fn generate_content(&self, req: ContentRequest) -> Result<ContentBody, BackendError> {
        debug!(provider = "static", slide = %req.slide_title, "Drafting placeholder content");

        Ok(ContentBody {
            title: req.slide_title,
            subtitle: Some(format!("Part of \"{}\"", req.deck_title)),
            bullets: vec![
                format!("Placeholder content for: {}", req.topic),
                "Generated offline without a collaborator provider.".to_string(),
                "Run again without --dry-run to draft real content.".to_string(),
            ],
        })
    }

    async fn refine_content(&self, req: RefineRequest) -> Result<ContentBody, BackendError> {
        debug!(provider = "static", slide = %req.current.title, "Refining placeholder content");

        let mut refined = req.current;
        refined.bullets.push(format!("Noted: {}", req.instruction));
        Ok(refined)
    }

    async fn generate_image(&self, req: ImageRequest) -> Result<ImageRef, BackendError> {
        debug!(provider = "static", slide = %req.content.title, "Rendering placeholder image");

        let data = placeholder_png()?;
        Ok(ImageRef::png(data))
    }
}

/// Render a small green-to-slate horizontal gradient and encode it as PNG.
///
/// Exports embed this image directly, so it has to be real decodable PNG
/// data, not a stub byte string.
fn placeholder_png() -> Result<Vec<u8>, BackendError> {
    let left: [f32; 3] = [134.0, 239.0, 172.0];
    let right: [f32; 3] = [31.0, 41.0, 55.0];

    let img = image::RgbImage::from_fn(PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT, |x, _y| {
        let t = x as f32 / PLACEHOLDER_WIDTH as f32;
        let channel = |i: usize| (left[i] + (right[i] - left[i]) * t).round() as u8;
        image::Rgb([channel(0), channel(1), channel(2)])
    });

    let mut data = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(
            &mut std::io::Cursor::new(&mut data),
            image::ImageFormat::Png,
        )
        .map_err(|e| {
            BackendError::Malformed(format!("failed to encode placeholder image: {e}"))
        })?;

    Ok(data)
}
