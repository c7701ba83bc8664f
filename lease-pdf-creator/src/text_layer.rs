//! Record of the text placed on each page
//!
//! Every string the generator draws is logged here with its position, so
//! callers can index the contract text or check which page a clause landed
//! on without parsing the PDF back.

use serde::{Deserialize, Serialize};

/// One drawn string. Coordinates are PDF user space (origin bottom-left).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedText {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub bold: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageText {
    /// 1-based page number.
    pub number: u32,
    pub lines: Vec<PlacedText>,
}

impl PageText {
    pub fn new(number: u32) -> Self {
        Self {
            number,
            lines: Vec::new(),
        }
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.text.contains(needle))
    }

    /// Lines in drawing order, one per row.
    pub fn plain_text(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextLayer {
    pub pages: Vec<PageText>,
}

impl TextLayer {
    pub fn new(pages: Vec<PageText>) -> Self {
        Self { pages }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page(&self, number: u32) -> Option<&PageText> {
        self.pages.iter().find(|page| page.number == number)
    }

    /// Page numbers holding a line that contains `needle`.
    pub fn pages_containing(&self, needle: &str) -> Vec<u32> {
        self.pages
            .iter()
            .filter(|page| page.contains(needle))
            .map(|page| page.number)
            .collect()
    }

    /// Whole document as text, pages separated by form feeds.
    pub fn plain_text(&self) -> String {
        self.pages
            .iter()
            .map(PageText::plain_text)
            .collect::<Vec<_>>()
            .join("\n\u{c}\n")
    }
}
