//! Text measurement for the two PDF base fonts the renderer embeds.
//!
//! Layout works in page pixels. Advance widths come from the standard
//! Helvetica metrics (per-mille of the font size), so a wrapped line is
//! guaranteed to fit the column it was measured against.

/// Multiplier applied to the font size to get the baseline-to-baseline
/// distance of consecutive wrapped lines.
pub const LINE_HEIGHT_FACTOR: f32 = 1.15;

/// Advance width used for characters outside the ASCII table.
const FALLBACK_WIDTH: u16 = 556;

/// The two faces the renderer registers on every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFace {
    Regular,
    Bold,
}

impl FontFace {
    fn widths(self) -> &'static [u16; 95] {
        match self {
            FontFace::Regular => &HELVETICA_WIDTHS,
            FontFace::Bold => &HELVETICA_BOLD_WIDTHS,
        }
    }
}

/// Baseline-to-baseline distance for wrapped text at `size`.
pub fn line_height(size: f32) -> f32 {
    size * LINE_HEIGHT_FACTOR
}

/// Width of `text` in page pixels when set in `face` at `size`.
pub fn text_width(face: FontFace, size: f32, text: &str) -> f32 {
    let table = face.widths();
    let millis: u32 = text.chars().map(|c| u32::from(char_width(table, c))).sum();
    millis as f32 * size / 1000.0
}

fn char_width(table: &[u16; 95], c: char) -> u16 {
    let code = c as u32;
    if (0x20..=0x7E).contains(&code) {
        table[(code - 0x20) as usize]
    } else {
        FALLBACK_WIDTH
    }
}

/// Greedy word wrap of `text` into lines no wider than `max_width` pixels.
///
/// A word that is wider than the whole column on its own is broken at
/// character granularity rather than overflowing. Always yields at least
/// one line so callers can charge a line height for empty text.
pub fn wrap_text(face: FontFace, size: f32, text: &str, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if text_width(face, size, &candidate) <= max_width {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if text_width(face, size, word) <= max_width {
            current = word.to_string();
        } else {
            current = break_long_word(face, size, word, max_width, &mut lines);
        }
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

fn break_long_word(
    face: FontFace,
    size: f32,
    word: &str,
    max_width: f32,
    lines: &mut Vec<String>,
) -> String {
    let mut current = String::new();
    for ch in word.chars() {
        let mut candidate = current.clone();
        candidate.push(ch);
        if !current.is_empty() && text_width(face, size, &candidate) > max_width {
            lines.push(std::mem::take(&mut current));
            current.push(ch);
        } else {
            current = candidate;
        }
    }
    current
}

/// Encodes `text` for the WinAnsi-encoded base fonts.
///
/// Characters without a WinAnsi code point degrade to `?` instead of
/// producing an invalid byte in the content stream.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi_byte).collect()
}

fn win_ansi_byte(c: char) -> u8 {
    let code = c as u32;
    match code {
        0x20..=0x7E | 0xA0..=0xFF => code as u8,
        _ => match c {
            '\u{20AC}' => 0x80,
            '\u{201A}' => 0x82,
            '\u{0192}' => 0x83,
            '\u{201E}' => 0x84,
            '\u{2026}' => 0x85,
            '\u{2020}' => 0x86,
            '\u{2021}' => 0x87,
            '\u{02C6}' => 0x88,
            '\u{2030}' => 0x89,
            '\u{0160}' => 0x8A,
            '\u{2039}' => 0x8B,
            '\u{0152}' => 0x8C,
            '\u{017D}' => 0x8E,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{02DC}' => 0x98,
            '\u{2122}' => 0x99,
            '\u{0161}' => 0x9A,
            '\u{203A}' => 0x9B,
            '\u{0153}' => 0x9C,
            '\u{017E}' => 0x9E,
            '\u{0178}' => 0x9F,
            _ => b'?',
        },
    }
}

// Per-mille advance widths for the printable ASCII range (0x20..=0x7E) of
// the standard Helvetica metrics.
#[rustfmt::skip]
static HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333,
    278, 278, 556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278,
    584, 584, 584, 556, 1015, 667, 667, 722, 722, 667, 611, 778, 722, 278,
    500, 667, 556, 833, 722, 778, 667, 778, 722, 667, 611, 722, 667, 944,
    667, 667, 611, 278, 278, 278, 469, 556, 333, 556, 556, 500, 556, 556,
    278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333, 500,
    278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
static HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333,
    278, 278, 556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333,
    584, 584, 584, 611, 975, 722, 722, 722, 722, 667, 611, 778, 722, 278,
    556, 722, 611, 833, 722, 778, 667, 778, 722, 667, 611, 722, 667, 944,
    667, 667, 611, 333, 278, 333, 584, 556, 333, 556, 611, 556, 611, 556,
    333, 611, 611, 278, 278, 556, 278, 889, 611, 611, 611, 611, 389, 556,
    333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn width_scales_with_font_size() {
        let small = text_width(FontFace::Regular, 10.0, "farm management");
        let large = text_width(FontFace::Regular, 20.0, "farm management");
        assert!((large - small * 2.0).abs() < 0.001);
    }

    #[test]
    fn bold_face_is_wider_than_regular() {
        let regular = text_width(FontFace::Regular, 20.0, "Introduction");
        let bold = text_width(FontFace::Bold, 20.0, "Introduction");
        assert!(bold > regular);
    }

    #[test]
    fn known_width_matches_metrics() {
        // 'H' is 722/1000 in the regular face.
        let w = text_width(FontFace::Regular, 48.0, "H");
        assert!((w - 34.656).abs() < 0.001);
    }

    #[test]
    fn wrap_keeps_short_text_on_one_line() {
        let lines = wrap_text(FontFace::Bold, 48.0, "Introduction", 600.0);
        assert_eq!(lines, vec!["Introduction".to_string()]);
    }

    #[test]
    fn wrap_respects_column_width() {
        let text = "Sustainable farm development and management services for landowners";
        let lines = wrap_text(FontFace::Regular, 20.0, text, 200.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(FontFace::Regular, 20.0, line) <= 200.0);
        }
    }

    #[test]
    fn wrap_preserves_word_order() {
        let text = "one two three four five six seven eight nine ten";
        let lines = wrap_text(FontFace::Regular, 20.0, text, 90.0);
        let rejoined = lines.join(" ");
        assert_eq!(rejoined, text);
    }

    #[test]
    fn wrap_breaks_oversized_words_by_character() {
        let lines = wrap_text(FontFace::Regular, 20.0, "abcdefghijklmnopqrstuvwxyz", 60.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(!line.is_empty());
            assert!(text_width(FontFace::Regular, 20.0, line) <= 60.0);
        }
        assert_eq!(lines.concat(), "abcdefghijklmnopqrstuvwxyz");
    }

    #[test]
    fn wrap_of_empty_text_is_one_empty_line() {
        assert_eq!(wrap_text(FontFace::Regular, 20.0, "", 100.0), vec![String::new()]);
        assert_eq!(wrap_text(FontFace::Regular, 20.0, "   ", 100.0), vec![String::new()]);
    }

    #[test]
    fn win_ansi_passes_ascii_through() {
        assert_eq!(encode_win_ansi("Contact Us"), b"Contact Us".to_vec());
    }

    #[test]
    fn win_ansi_maps_typographic_punctuation() {
        assert_eq!(encode_win_ansi("\u{2019}"), vec![0x92]);
        assert_eq!(encode_win_ansi("\u{2014}"), vec![0x97]);
        assert_eq!(encode_win_ansi("\u{2022}"), vec![0x95]);
    }

    #[test]
    fn win_ansi_degrades_unmapped_characters() {
        assert_eq!(encode_win_ansi("\u{2713}"), vec![b'?']);
        assert_eq!(encode_win_ansi("\u{1F600}"), vec![b'?']);
    }

    proptest! {
        #[test]
        fn wrap_never_loses_words(words in proptest::collection::vec("[a-zA-Z0-9]{1,12}", 1..30)) {
            let text = words.join(" ");
            let lines = wrap_text(FontFace::Regular, 20.0, &text, 250.0);
            let rejoined: Vec<&str> = lines.iter().flat_map(|l| l.split_whitespace()).collect();
            let original: Vec<&str> = text.split_whitespace().collect();
            prop_assert_eq!(rejoined, original);
        }

        #[test]
        fn wrap_never_exceeds_max_width(words in proptest::collection::vec("[a-zA-Z]{1,10}", 1..20)) {
            let text = words.join(" ");
            let lines = wrap_text(FontFace::Regular, 18.0, &text, 120.0);
            for line in &lines {
                prop_assert!(text_width(FontFace::Regular, 18.0, line) <= 120.0);
            }
        }
    }
}
