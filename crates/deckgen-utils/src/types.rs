use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a slide within a deck outline.
///
/// Slide ids come from the outline file and never change at runtime; every
/// engine operation and every log line is keyed by them. Display and
/// serialization use the bare number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlideId(pub u32);

impl fmt::Display for SlideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Generation lifecycle of one axis (text or image) of a slide.
///
/// Every slide carries two independent status values, one for its text
/// content and one for its illustration. Both start at `Uninitialized`
/// and move through `Pending` to either `Ready` or `Failed`.
///
/// # Transitions
///
/// ```text
/// Uninitialized → Pending → Ready
///                        ↘ Failed
/// ```
///
/// `Ready` and `Failed` are sticky: nothing moves a slide out of them
/// except an explicit regeneration request, which goes back through
/// `Pending`. A failed refinement is the one exception, reverting to
/// `Ready` because the previous content is still intact.
///
/// # Example
///
/// ```rust
/// use deckgen_utils::types::GenerationStatus;
///
/// let status = GenerationStatus::Uninitialized;
/// assert_eq!(status.as_str(), "uninitialized");
/// assert!(!status.is_settled());
/// assert!(GenerationStatus::Failed.is_settled());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    /// No generation has been attempted yet.
    Uninitialized,
    /// A collaborator call is in flight.
    Pending,
    /// Generation succeeded and the result is stored on the slide.
    Ready,
    /// The most recent initial generation attempt failed.
    Failed,
}

impl GenerationStatus {
    /// Canonical lowercase name used in status output and logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Pending => "pending",
            Self::Ready => "ready",
            Self::Failed => "failed",
        }
    }

    /// True once generation has run to completion, successfully or not.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        matches!(self, Self::Ready | Self::Failed)
    }
}

impl fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// The two slide flavors a deck outline can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideKind {
    /// Narrative slide: title, optional subtitle, bullet points, optional image.
    Content,
    /// Curated gallery of external references; never gets an image.
    Media,
}

impl SlideKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Media => "media",
        }
    }
}

impl fmt::Display for SlideKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl Default for SlideKind {
    fn default() -> Self {
        Self::Content
    }
}

/// One slide's row in the deck outline.
///
/// The outline is authored up front and fixed for the lifetime of a
/// session; only the generated state attached to each descriptor changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideDescriptor {
    pub id: SlideId,
    /// Display title, also used as the heading of the rendered slide.
    pub title: String,
    /// Topic sentence handed to the collaborator as the generation subject.
    pub topic: String,
    #[serde(alias = "type", default)]
    pub kind: SlideKind,
}

/// A full deck outline: presentation title plus ordered slides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckOutline {
    pub title: String,
    pub slides: Vec<SlideDescriptor>,
}

impl DeckOutline {
    /// Look up a slide descriptor by id.
    #[must_use]
    pub fn slide(&self, id: SlideId) -> Option<&SlideDescriptor> {
        self.slides.iter().find(|s| s.id == id)
    }

    /// Zero-based position of a slide in outline order.
    #[must_use]
    pub fn position(&self, id: SlideId) -> Option<usize> {
        self.slides.iter().position(|s| s.id == id)
    }
}

/// Generated narrative content of a content slide.
///
/// Field names follow the collaborator wire format: the bullet list
/// travels as `body`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBody {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(rename = "body")]
    pub bullets: Vec<String>,
}

/// Kind of an external reference in a media gallery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaKind {
    #[serde(rename = "youtube")]
    Video,
    #[serde(rename = "website")]
    Link,
    #[serde(rename = "photo")]
    Photo,
}

impl MediaKind {
    /// Label shown in rendered output, e.g. `[Youtube]`.
    #[must_use]
    pub const fn display_label(&self) -> &'static str {
        match self {
            Self::Video => "Youtube",
            Self::Link => "Website",
            Self::Photo => "Photo",
        }
    }
}

/// One curated reference inside a media gallery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaEntry {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    /// URL or data URI pointing at the referenced resource.
    #[serde(rename = "url")]
    pub locator: String,
    /// Human-readable label, never empty.
    #[serde(rename = "title")]
    pub label: String,
}

/// Generated content of a media slide: a heading plus curated entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaGallery {
    pub title: String,
    #[serde(rename = "items")]
    pub entries: Vec<MediaEntry>,
}

/// Content attached to a slide once text generation has succeeded.
///
/// The variant always matches the slide's [`SlideKind`]; the engine never
/// stores a gallery on a content slide or vice versa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlideContent {
    Body(ContentBody),
    Gallery(MediaGallery),
}

impl SlideContent {
    #[must_use]
    pub fn as_body(&self) -> Option<&ContentBody> {
        match self {
            Self::Body(body) => Some(body),
            Self::Gallery(_) => None,
        }
    }

    #[must_use]
    pub fn as_gallery(&self) -> Option<&MediaGallery> {
        match self {
            Self::Gallery(gallery) => Some(gallery),
            Self::Body(_) => None,
        }
    }

    pub fn as_gallery_mut(&mut self) -> Option<&mut MediaGallery> {
        match self {
            Self::Gallery(gallery) => Some(gallery),
            Self::Body(_) => None,
        }
    }

    /// Heading of the content, regardless of variant.
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Body(body) => &body.title,
            Self::Gallery(gallery) => &gallery.title,
        }
    }
}

/// Decoded illustration bytes attached to a slide.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub data: Vec<u8>,
    /// MIME type as reported by the producer, e.g. `image/png`.
    pub mime: String,
}

impl ImageRef {
    #[must_use]
    pub fn new(data: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            data,
            mime: mime.into(),
        }
    }

    #[must_use]
    pub fn png(data: Vec<u8>) -> Self {
        Self::new(data, "image/png")
    }
}

impl fmt::Debug for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageRef")
            .field("mime", &self.mime)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Full runtime state of one slide: the fixed descriptor plus everything
/// generation has produced so far.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideState {
    pub descriptor: SlideDescriptor,
    pub content: Option<SlideContent>,
    pub image: Option<ImageRef>,
    pub text_status: GenerationStatus,
    pub image_status: GenerationStatus,
}

impl SlideState {
    /// Fresh state for a slide that has not been touched yet.
    #[must_use]
    pub fn new(descriptor: SlideDescriptor) -> Self {
        Self {
            descriptor,
            content: None,
            image: None,
            text_status: GenerationStatus::Uninitialized,
            image_status: GenerationStatus::Uninitialized,
        }
    }

    /// True when the slide has renderable content for export.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.text_status == GenerationStatus::Ready && self.content.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(id: u32, kind: SlideKind) -> SlideDescriptor {
        SlideDescriptor {
            id: SlideId(id),
            title: format!("Slide {id}"),
            topic: "topic".to_string(),
            kind,
        }
    }

    #[test]
    fn test_status_names() {
        assert_eq!(GenerationStatus::Uninitialized.as_str(), "uninitialized");
        assert_eq!(GenerationStatus::Pending.as_str(), "pending");
        assert_eq!(GenerationStatus::Ready.as_str(), "ready");
        assert_eq!(GenerationStatus::Failed.as_str(), "failed");
    }

    #[test]
    fn test_status_settled() {
        assert!(!GenerationStatus::Uninitialized.is_settled());
        assert!(!GenerationStatus::Pending.is_settled());
        assert!(GenerationStatus::Ready.is_settled());
        assert!(GenerationStatus::Failed.is_settled());
    }

    #[test]
    fn test_content_body_wire_format() {
        let body = ContentBody {
            title: "Why It Matters".to_string(),
            subtitle: None,
            bullets: vec!["first".to_string(), "second".to_string()],
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["title"], "Why It Matters");
        assert_eq!(json["body"][1], "second");
        assert!(json.get("subtitle").is_none());

        let parsed: ContentBody =
            serde_json::from_str(r#"{"title":"T","subtitle":"S","body":["a"]}"#).unwrap();
        assert_eq!(parsed.subtitle.as_deref(), Some("S"));
        assert_eq!(parsed.bullets, vec!["a"]);
    }

    #[test]
    fn test_media_entry_wire_format() {
        let entry = MediaEntry {
            kind: MediaKind::Video,
            locator: "https://youtu.be/abc".to_string(),
            label: "Intro video".to_string(),
        };

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains(r#""type":"youtube""#));
        assert!(json.contains(r#""url":"https://youtu.be/abc""#));
        assert!(json.contains(r#""title":"Intro video""#));

        let back: MediaEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_slide_content_untagged_round_trip() {
        let gallery = SlideContent::Gallery(MediaGallery {
            title: "Resources & Media".to_string(),
            entries: vec![],
        });
        let json = serde_json::to_string(&gallery).unwrap();
        let back: SlideContent = serde_json::from_str(&json).unwrap();
        assert!(back.as_gallery().is_some());
        assert_eq!(back.title(), "Resources & Media");

        let body: SlideContent =
            serde_json::from_str(r#"{"title":"T","body":["x"]}"#).unwrap();
        assert!(body.as_body().is_some());
        assert!(body.as_gallery().is_none());
    }

    #[test]
    fn test_descriptor_kind_alias() {
        let toml_style: SlideDescriptor = serde_json::from_str(
            r#"{"id":3,"title":"Our Products","topic":"products","type":"media"}"#,
        )
        .unwrap();
        assert_eq!(toml_style.kind, SlideKind::Media);

        let defaulted: SlideDescriptor =
            serde_json::from_str(r#"{"id":4,"title":"T","topic":"t"}"#).unwrap();
        assert_eq!(defaulted.kind, SlideKind::Content);
    }

    #[test]
    fn test_outline_lookup() {
        let outline = DeckOutline {
            title: "Deck".to_string(),
            slides: vec![
                descriptor(1, SlideKind::Content),
                descriptor(7, SlideKind::Media),
            ],
        };
        assert_eq!(outline.position(SlideId(7)), Some(1));
        assert!(outline.slide(SlideId(2)).is_none());
        assert_eq!(outline.slide(SlideId(1)).unwrap().kind, SlideKind::Content);
    }

    #[test]
    fn test_fresh_state_not_ready() {
        let state = SlideState::new(descriptor(1, SlideKind::Content));
        assert_eq!(state.text_status, GenerationStatus::Uninitialized);
        assert_eq!(state.image_status, GenerationStatus::Uninitialized);
        assert!(!state.is_ready());
        assert!(state.content.is_none());
        assert!(state.image.is_none());
    }

    #[test]
    fn test_image_ref_debug_hides_bytes() {
        let image = ImageRef::png(vec![0u8; 4096]);
        let debug = format!("{image:?}");
        assert!(debug.contains("4096"));
        assert!(debug.contains("image/png"));
        assert!(!debug.contains("[0"));
    }
}
