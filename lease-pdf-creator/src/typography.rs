//! Text normalization and line breaking
//!
//! Contract text arrives from a CMS-like store and from user input, so it
//! carries typographic quotes, narrow no-break spaces, emoji and the odd box
//! drawing rule. The WinAnsi-encoded faces cannot draw those, so text is
//! folded to the encodable set before it is measured or wrapped.

use unicode_segmentation::UnicodeSegmentation;

use crate::fonts::{win_ansi_byte, FontFace};

/// Fold `text` to characters the WinAnsi faces can draw.
pub fn sanitize_text(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut sanitized = String::with_capacity(text.len());

    for grapheme in text.graphemes(true) {
        // Emoji sequences (flags, ZWJ families, keycaps) go as a whole.
        if grapheme.chars().any(is_emoji) {
            continue;
        }
        for ch in grapheme.chars() {
            match ch {
                '\n' => sanitized.push('\n'),
                '\t' => sanitized.push(' '),
                '\u{00A0}' | '\u{2000}'..='\u{200B}' | '\u{202F}' | '\u{205F}' | '\u{3000}' => {
                    sanitized.push(' ')
                }
                '«' | '»' | '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' => {
                    sanitized.push('"')
                }
                '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' => sanitized.push('\''),
                '\u{2010}'..='\u{2015}' => sanitized.push('-'),
                '\u{2026}' => sanitized.push_str("..."),
                '\u{00AD}' => {}
                '\u{2500}'..='\u{257F}' => {}
                _ if win_ansi_byte(ch).is_some() => sanitized.push(ch),
                _ => {}
            }
        }
    }

    sanitized
}

fn is_emoji(ch: char) -> bool {
    matches!(
        ch as u32,
        0x1F000..=0x1FAFF
            | 0x2600..=0x27BF
            | 0x2B00..=0x2BFF
            | 0xFE00..=0xFE0F
            | 0x200D
            | 0x20E3
            | 0xE0020..=0xE007F
    )
}

/// Greedy word wrap of sanitized text.
///
/// Explicit newlines are kept, empty paragraphs become empty lines, and a
/// word wider than `max_width` gets a line of its own without being split.
/// Always returns at least one line.
pub fn wrap_text(text: &str, face: &FontFace, size: f32, max_width: f32) -> Vec<String> {
    let normalized = sanitize_text(text);
    let mut lines = Vec::new();

    for paragraph in normalized.split('\n') {
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        for word in paragraph.split(' ') {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };

            if face.text_width(&candidate, size) <= max_width {
                current = candidate;
            } else {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                current = word.to_string();
            }
        }

        if !current.is_empty() {
            lines.push(current);
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
