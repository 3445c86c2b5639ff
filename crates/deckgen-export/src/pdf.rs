//! PDF assembly on top of the layout pass.
//!
//! Pages are written with uncompressed content streams and the built-in
//! Helvetica faces, so the output stays inspectable with a text editor.
//! Illustrations are re-encoded as zlib-compressed RGB rasters; a slide
//! image that fails to decode degrades to placeholder text instead of
//! aborting the export.

use std::io::Write as _;

use chrono::{Datelike, Timelike, Utc};
use flate2::{Compression, write::ZlibEncoder};
use pdf_writer::types::{ActionType, AnnotationType};
use pdf_writer::{Content, Date, Filter, Finish, Name, Pdf, Rect, Ref, Str, TextStr};
use tracing::warn;

use deckgen_utils::types::ImageRef;

use crate::layout::{
    BACKGROUND_COLOR, DrawOp, IMAGE_FALLBACK_COLOR, IMAGE_FALLBACK_SIZE, IMAGE_FALLBACK_TEXT,
    IMAGE_FALLBACK_X, IMAGE_FALLBACK_Y, PAGE_HEIGHT, PAGE_WIDTH, Page, Rgb,
};
use crate::metrics::{FontFace, encode_win_ansi, text_width};

const REGULAR_FONT: Name<'static> = Name(b"F1");
const BOLD_FONT: Name<'static> = Name(b"F2");
const DINGBATS_FONT: Name<'static> = Name(b"F3");
/// ZapfDingbats code for the check mark glyph.
const CHECK_GLYPH: &[u8] = b"\x33";

#[derive(Default)]
struct RefAllocator {
    last: i32,
}

impl RefAllocator {
    fn bump(&mut self) -> Ref {
        self.last += 1;
        Ref::new(self.last)
    }
}

#[derive(Clone, Copy)]
struct FontRefs {
    regular: Ref,
    bold: Ref,
    dingbats: Ref,
}

/// Renders laid-out pages into a complete PDF document.
pub(crate) fn render(pages: &[Page], deck_title: &str) -> Vec<u8> {
    let mut alloc = RefAllocator::default();
    let catalog_id = alloc.bump();
    let tree_id = alloc.bump();
    let fonts = FontRefs {
        regular: alloc.bump(),
        bold: alloc.bump(),
        dingbats: alloc.bump(),
    };
    let info_id = alloc.bump();
    let page_ids: Vec<Ref> = pages.iter().map(|_| alloc.bump()).collect();

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(tree_id);
    pdf.pages(tree_id)
        .kids(page_ids.iter().copied())
        .count(pages.len() as i32);

    for (page, &page_id) in pages.iter().zip(&page_ids) {
        write_page(&mut pdf, &mut alloc, page, page_id, tree_id, fonts);
    }

    pdf.type1_font(fonts.regular)
        .base_font(Name(b"Helvetica"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));
    pdf.type1_font(fonts.bold)
        .base_font(Name(b"Helvetica-Bold"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));
    pdf.type1_font(fonts.dingbats).base_font(Name(b"ZapfDingbats"));

    let now = Utc::now();
    let date = Date::new(now.year().max(0) as u16)
        .month(now.month() as u8)
        .day(now.day() as u8)
        .hour(now.hour() as u8)
        .minute(now.minute() as u8)
        .second(now.second() as u8);
    let mut info = pdf.document_info(info_id);
    info.title(TextStr(deck_title));
    info.producer(TextStr("deckgen"));
    info.creation_date(date);
    info.finish();

    pdf.finish()
}

fn write_page(
    pdf: &mut Pdf,
    alloc: &mut RefAllocator,
    page: &Page,
    page_id: Ref,
    tree_id: Ref,
    fonts: FontRefs,
) {
    let content_id = alloc.bump();
    let mut content = Content::new();
    let mut links: Vec<(String, Rect)> = Vec::new();
    let mut images: Vec<(String, Ref, Vec<u8>, u32, u32)> = Vec::new();

    set_fill(&mut content, BACKGROUND_COLOR);
    content.rect(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT);
    content.fill_nonzero();

    for op in &page.ops {
        match op {
            DrawOp::Text {
                face,
                size,
                color,
                x,
                y,
                line,
            } => {
                emit_text(&mut content, font_name(*face), *size, *color, *x, *y, line);
            }
            DrawOp::Check { size, color, x, y } => {
                content.begin_text();
                content.set_font(DINGBATS_FONT, *size);
                set_fill(&mut content, *color);
                content.next_line(*x, PAGE_HEIGHT - y);
                content.show(Str(CHECK_GLYPH));
                content.end_text();
            }
            DrawOp::Image {
                image,
                x,
                y,
                width,
                height,
            } => match encode_rgb(image) {
                Some((data, px_width, px_height)) => {
                    let name = format!("Im{}", images.len());
                    let id = alloc.bump();
                    content.save_state();
                    content.transform([
                        *width,
                        0.0,
                        0.0,
                        *height,
                        *x,
                        PAGE_HEIGHT - (y + height),
                    ]);
                    content.x_object(Name(name.as_bytes()));
                    content.restore_state();
                    images.push((name, id, data, px_width, px_height));
                }
                None => {
                    warn!(
                        mime = %image.mime,
                        bytes = image.data.len(),
                        "could not decode slide image, rendering placeholder text"
                    );
                    emit_text(
                        &mut content,
                        REGULAR_FONT,
                        IMAGE_FALLBACK_SIZE,
                        IMAGE_FALLBACK_COLOR,
                        IMAGE_FALLBACK_X,
                        IMAGE_FALLBACK_Y,
                        IMAGE_FALLBACK_TEXT,
                    );
                }
            },
            DrawOp::Link {
                size,
                color,
                x,
                y,
                text,
                uri,
            } => {
                emit_text(&mut content, REGULAR_FONT, *size, *color, *x, *y, text);
                let width = text_width(FontFace::Regular, *size, text);
                let baseline = PAGE_HEIGHT - y;
                links.push((
                    uri.clone(),
                    Rect::new(*x, baseline - 4.0, *x + width, baseline + 14.0),
                ));
            }
        }
    }

    let annotation_ids: Vec<Ref> = links.iter().map(|_| alloc.bump()).collect();
    for ((uri, rect), &annotation_id) in links.iter().zip(&annotation_ids) {
        let mut annotation = pdf.annotation(annotation_id);
        annotation.subtype(AnnotationType::Link);
        annotation.rect(*rect);
        annotation.border(0.0, 0.0, 0.0, None);
        annotation
            .action()
            .action_type(ActionType::Uri)
            .uri(Str(uri.as_bytes()));
        annotation.finish();
    }

    let mut page_writer = pdf.page(page_id);
    page_writer.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT));
    page_writer.parent(tree_id);
    page_writer.contents(content_id);
    if !annotation_ids.is_empty() {
        page_writer.annotations(annotation_ids.iter().copied());
    }
    let mut resources = page_writer.resources();
    let mut font_dict = resources.fonts();
    font_dict.pair(REGULAR_FONT, fonts.regular);
    font_dict.pair(BOLD_FONT, fonts.bold);
    font_dict.pair(DINGBATS_FONT, fonts.dingbats);
    font_dict.finish();
    if !images.is_empty() {
        let mut xobjects = resources.x_objects();
        for (name, id, ..) in &images {
            xobjects.pair(Name(name.as_bytes()), *id);
        }
        xobjects.finish();
    }
    resources.finish();
    page_writer.finish();

    pdf.stream(content_id, &content.finish());

    for (_, id, data, px_width, px_height) in &images {
        let mut xobject = pdf.image_xobject(*id, data);
        xobject.filter(Filter::FlateDecode);
        xobject.width(*px_width as i32);
        xobject.height(*px_height as i32);
        xobject.color_space().device_rgb();
        xobject.bits_per_component(8);
        xobject.finish();
    }
}

fn font_name(face: FontFace) -> Name<'static> {
    match face {
        FontFace::Regular => REGULAR_FONT,
        FontFace::Bold => BOLD_FONT,
    }
}

fn emit_text(
    content: &mut Content,
    font: Name,
    size: f32,
    color: Rgb,
    x: f32,
    y: f32,
    text: &str,
) {
    let encoded = encode_win_ansi(text);
    content.begin_text();
    content.set_font(font, size);
    set_fill(content, color);
    content.next_line(x, PAGE_HEIGHT - y);
    content.show(Str(&encoded));
    content.end_text();
}

fn set_fill(content: &mut Content, (r, g, b): Rgb) {
    content.set_fill_rgb(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
    );
}

/// Decodes an illustration and re-encodes it as zlib RGB24 for embedding.
fn encode_rgb(image: &ImageRef) -> Option<(Vec<u8>, u32, u32)> {
    let decoded = image::load_from_memory(&image.data).ok()?;
    let rgb = decoded.to_rgb8();
    let (width, height) = rgb.dimensions();
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(rgb.as_raw()).ok()?;
    let data = encoder.finish().ok()?;
    Some((data, width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::FontFace;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::io::Cursor;

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    fn count(haystack: &[u8], needle: &[u8]) -> usize {
        haystack.windows(needle.len()).filter(|w| *w == needle).count()
    }

    fn text_op(line: &str, y: f32) -> DrawOp {
        DrawOp::Text {
            face: FontFace::Bold,
            size: 48.0,
            color: (134, 239, 172),
            x: 60.0,
            y,
            line: line.to_string(),
        }
    }

    fn tiny_png() -> Vec<u8> {
        let img = RgbImage::from_pixel(2, 2, image::Rgb([10, 200, 30]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn render_emits_pdf_header_and_page_count() {
        let pages = vec![
            Page {
                ops: vec![text_op("Introduction", 120.0)],
            },
            Page {
                ops: vec![text_op("Contact Us", 120.0)],
            },
        ];
        let bytes = render(&pages, "Bhoomi Naturals Presentation");
        assert!(bytes.starts_with(b"%PDF-"));
        assert!(contains(&bytes, b"/Count 2"));
        assert!(contains(&bytes, b"/MediaBox"));
        assert!(contains(&bytes, b"(Introduction) Tj"));
        assert!(contains(&bytes, b"(Contact Us) Tj"));
    }

    #[test]
    fn render_registers_the_builtin_faces() {
        let pages = vec![Page {
            ops: vec![text_op("T", 120.0)],
        }];
        let bytes = render(&pages, "Deck");
        assert!(contains(&bytes, b"/Helvetica"));
        assert!(contains(&bytes, b"/Helvetica-Bold"));
        assert!(contains(&bytes, b"/ZapfDingbats"));
        assert!(contains(&bytes, b"/WinAnsiEncoding"));
    }

    #[test]
    fn check_marks_use_the_dingbats_glyph() {
        let pages = vec![Page {
            ops: vec![
                DrawOp::Check {
                    size: 20.0,
                    color: (74, 222, 128),
                    x: 60.0,
                    y: 215.2,
                },
                DrawOp::Check {
                    size: 20.0,
                    color: (74, 222, 128),
                    x: 60.0,
                    y: 252.2,
                },
                DrawOp::Check {
                    size: 20.0,
                    color: (74, 222, 128),
                    x: 60.0,
                    y: 289.2,
                },
            ],
        }];
        let bytes = render(&pages, "Deck");
        assert_eq!(count(&bytes, b"(3) Tj"), 3);
        assert!(contains(&bytes, b"/F3"));
    }

    #[test]
    fn links_draw_text_and_attach_uri_annotations() {
        let pages = vec![Page {
            ops: vec![DrawOp::Link {
                size: 18.0,
                color: (107, 114, 128),
                x: 62.0,
                y: 249.2,
                text: "https://example.com".to_string(),
                uri: "https://example.com".to_string(),
            }],
        }];
        let bytes = render(&pages, "Deck");
        assert!(contains(&bytes, b"(https://example.com) Tj"));
        assert!(contains(&bytes, b"/Annots"));
        assert!(contains(&bytes, b"/URI (https://example.com)"));
        assert!(contains(&bytes, b"/Link"));
    }

    #[test]
    fn decodable_image_becomes_an_xobject() {
        let pages = vec![Page {
            ops: vec![DrawOp::Image {
                image: deckgen_utils::types::ImageRef::png(tiny_png()),
                x: 700.0,
                y: 110.0,
                width: 520.0,
                height: 292.5,
            }],
        }];
        let bytes = render(&pages, "Deck");
        assert!(contains(&bytes, b"/Im0 Do"));
        assert!(contains(&bytes, b"/XObject"));
        assert!(contains(&bytes, b"/DeviceRGB"));
        assert!(!contains(&bytes, b"(Image failed to load) Tj"));
    }

    #[test]
    fn undecodable_image_renders_placeholder_text() {
        let pages = vec![Page {
            ops: vec![DrawOp::Image {
                image: deckgen_utils::types::ImageRef::png(vec![0xde, 0xad, 0xbe, 0xef]),
                x: 700.0,
                y: 110.0,
                width: 520.0,
                height: 292.5,
            }],
        }];
        let bytes = render(&pages, "Deck");
        assert!(contains(&bytes, b"(Image failed to load) Tj"));
        assert!(!contains(&bytes, b"/Im0 Do"));
    }

    #[test]
    fn document_info_carries_the_deck_title() {
        let pages = vec![Page {
            ops: vec![text_op("T", 120.0)],
        }];
        let bytes = render(&pages, "Quarterly Review");
        assert!(contains(&bytes, b"Quarterly Review"));
        assert!(contains(&bytes, b"(deckgen)"));
    }
}
