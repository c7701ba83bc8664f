//! Font management and text measurement
//!
//! The contract is set in Helvetica / Helvetica-Bold by default, using the
//! standard PDF font metrics below so no font file is needed. A TrueType pair
//! can replace them through `LayoutConfig`; those faces are measured with
//! fontdue and embedded. Either way text is encoded as WinAnsi, which is why
//! everything drawn goes through `typography::sanitize_text` first.

use anyhow::{anyhow, Context, Result};
use fontdue::{Font, FontSettings};
use log::info;
use std::path::Path;

use crate::config::LayoutConfig;

/// First and last codes of the WinAnsi range we measure and embed.
pub const FIRST_CHAR: u8 = 32;
pub const LAST_CHAR: u8 = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontWeight {
    Regular,
    Bold,
}

impl FontWeight {
    /// Resource name used in page content streams.
    pub fn resource_name(&self) -> &'static str {
        match self {
            FontWeight::Regular => "F1",
            FontWeight::Bold => "F2",
        }
    }
}

/// One measurable, embeddable face.
#[derive(Clone)]
pub enum FontFace {
    /// One of the 14 standard PDF fonts, never embedded.
    Standard {
        base_font: &'static str,
        widths: &'static [u16; 224],
    },
    /// A TrueType file loaded through fontdue, embedded as FontFile2.
    TrueType {
        name: String,
        font: Font,
        data: Vec<u8>,
        widths: Vec<u16>,
    },
}

impl FontFace {
    pub fn helvetica() -> Self {
        FontFace::Standard {
            base_font: "Helvetica",
            widths: &HELVETICA_WIDTHS,
        }
    }

    pub fn helvetica_bold() -> Self {
        FontFace::Standard {
            base_font: "Helvetica-Bold",
            widths: &HELVETICA_BOLD_WIDTHS,
        }
    }

    /// Load a TrueType file and precompute its WinAnsi advance widths.
    pub fn load_truetype(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)
            .with_context(|| format!("failed to read font {}", path.display()))?;
        let font = Font::from_bytes(data.clone(), FontSettings::default())
            .map_err(|e| anyhow!("Failed to load font from {}: {}", path.display(), e))?;

        // Advance widths in 1/1000 em, the unit PDF Widths arrays use.
        let widths = (FIRST_CHAR..=LAST_CHAR)
            .map(|code| match win_ansi_char(code) {
                Some(ch) => font.metrics(ch, 1000.0).advance_width.round() as u16,
                None => 0,
            })
            .collect();

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "EmbeddedFont".to_string());

        info!("Loaded font {} from {}", name, path.display());
        Ok(FontFace::TrueType {
            name,
            font,
            data,
            widths,
        })
    }

    /// PDF BaseFont name.
    pub fn base_font_name(&self) -> String {
        match self {
            FontFace::Standard { base_font, .. } => (*base_font).to_string(),
            FontFace::TrueType { name, .. } => sanitize_pdf_font_name(name),
        }
    }

    /// Advance width of a WinAnsi code in 1/1000 em.
    pub fn width_units(&self, code: u8) -> u16 {
        if code < FIRST_CHAR {
            return 0;
        }
        let index = (code - FIRST_CHAR) as usize;
        match self {
            FontFace::Standard { widths, .. } => widths[index],
            FontFace::TrueType { widths, .. } => widths.get(index).copied().unwrap_or(0),
        }
    }

    /// Width of `text` at `size` points. Characters outside WinAnsi measure
    /// as zero; they are dropped when drawing too.
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        let units: u32 = text
            .chars()
            .filter_map(win_ansi_byte)
            .map(|code| self.width_units(code) as u32)
            .sum();
        units as f32 * size / 1000.0
    }

    /// WinAnsi bytes for a content stream string.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        text.chars().filter_map(win_ansi_byte).collect()
    }
}

/// Regular and bold faces plus measurement helpers.
#[derive(Clone)]
pub struct FontContext {
    pub regular: FontFace,
    pub bold: FontFace,
}

impl FontContext {
    /// Helvetica pair, no files needed.
    pub fn standard() -> Self {
        Self {
            regular: FontFace::helvetica(),
            bold: FontFace::helvetica_bold(),
        }
    }

    /// Faces named in the config, falling back to Helvetica per weight.
    pub fn initialize_fonts(config: &LayoutConfig) -> Result<Self> {
        let regular = match &config.regular_font_path {
            Some(path) => FontFace::load_truetype(path)?,
            None => FontFace::helvetica(),
        };
        let bold = match &config.bold_font_path {
            Some(path) => FontFace::load_truetype(path)?,
            None => FontFace::helvetica_bold(),
        };
        Ok(Self { regular, bold })
    }

    pub fn face(&self, weight: FontWeight) -> &FontFace {
        match weight {
            FontWeight::Regular => &self.regular,
            FontWeight::Bold => &self.bold,
        }
    }

    pub fn text_width(&self, text: &str, size: f32, weight: FontWeight) -> f32 {
        self.face(weight).text_width(text, size)
    }
}

/// Map a character to its WinAnsiEncoding code.
pub fn win_ansi_byte(ch: char) -> Option<u8> {
    let code = ch as u32;
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(code as u8),
        _ => WIN_ANSI_EXTRAS
            .iter()
            .find(|(c, _)| *c == ch)
            .map(|(_, byte)| *byte),
    }
}

/// Inverse of [`win_ansi_byte`].
pub fn win_ansi_char(code: u8) -> Option<char> {
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(code as char),
        _ => WIN_ANSI_EXTRAS
            .iter()
            .find(|(_, byte)| *byte == code)
            .map(|(c, _)| *c),
    }
}

fn sanitize_pdf_font_name(raw: &str) -> String {
    let out: String = raw
        .chars()
        .filter_map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                Some(ch)
            } else if ch.is_whitespace() {
                Some('-')
            } else {
                None
            }
        })
        .collect();
    if out.is_empty() {
        "EmbeddedFont".to_string()
    } else {
        out
    }
}

/// WinAnsi codes 0x80..=0x9F that differ from Latin-1.
const WIN_ANSI_EXTRAS: [(char, u8); 27] = [
    ('\u{20AC}', 0x80),
    ('\u{201A}', 0x82),
    ('\u{0192}', 0x83),
    ('\u{201E}', 0x84),
    ('\u{2026}', 0x85),
    ('\u{2020}', 0x86),
    ('\u{2021}', 0x87),
    ('\u{02C6}', 0x88),
    ('\u{2030}', 0x89),
    ('\u{0160}', 0x8A),
    ('\u{2039}', 0x8B),
    ('\u{0152}', 0x8C),
    ('\u{017D}', 0x8E),
    ('\u{2018}', 0x91),
    ('\u{2019}', 0x92),
    ('\u{201C}', 0x93),
    ('\u{201D}', 0x94),
    ('\u{2022}', 0x95),
    ('\u{2013}', 0x96),
    ('\u{2014}', 0x97),
    ('\u{02DC}', 0x98),
    ('\u{2122}', 0x99),
    ('\u{0161}', 0x9A),
    ('\u{203A}', 0x9B),
    ('\u{0153}', 0x9C),
    ('\u{017E}', 0x9E),
    ('\u{0178}', 0x9F),
];

// Standard 14 font metrics (Adobe AFM), WinAnsi codes 32..=255.
const HELVETICA_WIDTHS: [u16; 224] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, 0,
    556, 0, 222, 556, 333, 1000, 556, 556, 333, 1000, 667, 333, 1000, 0, 611, 0,
    0, 222, 222, 333, 333, 350, 556, 1000, 333, 1000, 500, 333, 944, 0, 500, 667,
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500,
];

const HELVETICA_BOLD_WIDTHS: [u16; 224] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, 0,
    556, 0, 278, 556, 500, 1000, 556, 556, 333, 1000, 667, 333, 1000, 0, 611, 0,
    0, 278, 278, 500, 500, 350, 556, 1000, 333, 1000, 556, 333, 944, 0, 500, 667,
    278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278,
    611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helvetica_widths_match_afm() {
        let face = FontFace::helvetica();
        // "Page" = P 667 + a 556 + g 556 + e 556
        assert!((face.text_width("Page", 1000.0) - 2335.0).abs() < 0.01);
        assert!((face.text_width("é", 10.0) - 5.56).abs() < 0.001);
    }

    #[test]
    fn bold_is_wider_than_regular() {
        let fonts = FontContext::standard();
        let text = "ARTICLE 1 : OBJET DU BAIL";
        assert!(
            fonts.text_width(text, 11.0, FontWeight::Bold)
                > fonts.text_width(text, 11.0, FontWeight::Regular)
        );
    }

    #[test]
    fn french_letters_encode_as_single_bytes() {
        let face = FontFace::helvetica();
        assert_eq!(face.encode("Réf. œuvre"), vec![b'R', 0xE9, b'f', b'.', b' ', 0x9C, b'u', b'v', b'r', b'e']);
    }

    #[test]
    fn characters_outside_win_ansi_are_dropped() {
        assert_eq!(win_ansi_byte('\u{2550}'), None);
        assert_eq!(FontFace::helvetica().encode("a\u{1F3E0}b"), b"ab".to_vec());
    }

    #[test]
    fn win_ansi_round_trips_for_every_defined_code() {
        for code in FIRST_CHAR..=LAST_CHAR {
            if let Some(ch) = win_ansi_char(code) {
                assert_eq!(win_ansi_byte(ch), Some(code));
            }
        }
    }

    #[test]
    fn font_names_are_pdf_safe() {
        assert_eq!(sanitize_pdf_font_name("Noto Serif (Regular)"), "Noto-Serif-Regular");
        assert_eq!(sanitize_pdf_font_name("()"), "EmbeddedFont");
    }
}
