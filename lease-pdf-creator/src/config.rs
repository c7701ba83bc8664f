//! Layout settings and per-call generation options

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Device RGB color, components in 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb(pub f32, pub f32, pub f32);

pub mod colors {
    use super::Rgb;

    pub const PRIMARY: Rgb = Rgb(0.2, 0.2, 0.6);
    pub const SECONDARY: Rgb = Rgb(0.4, 0.4, 0.4);
    pub const TEXT: Rgb = Rgb(0.0, 0.0, 0.0);
    pub const BODY: Rgb = Rgb(0.1, 0.1, 0.1);
    pub const LIGHT_GRAY: Rgb = Rgb(0.95, 0.95, 0.95);
    pub const MEDIUM_GRAY: Rgb = Rgb(0.8, 0.8, 0.8);
    pub const GRID_FILL: Rgb = Rgb(0.97, 0.97, 0.97);
    pub const GRID_BORDER: Rgb = Rgb(0.9, 0.9, 0.9);
    pub const WATERMARK: Rgb = Rgb(0.9, 0.9, 0.9);
}

/// Page geometry, type sizes and pagination thresholds, all in points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,

    pub body_font_size: f32,
    pub line_height: f32,
    pub article_title_size: f32,
    pub article_title_gap: f32,
    pub article_gap: f32,

    /// A new article starts on a fresh page when the cursor is below this.
    pub article_floor: f32,
    /// Continuation lines need this much room above the bottom margin.
    pub line_floor_offset: f32,
    /// Contiguous space the signature section needs above the bottom margin.
    pub signature_reserve: f32,

    pub parties_box_height: f32,
    pub footer_rule_y: f32,
    pub footer_text_y: f32,

    pub watermark_font_size: f32,
    pub watermark_opacity: f32,

    /// TrueType faces replacing the built-in Helvetica pair.
    pub regular_font_path: Option<PathBuf>,
    pub bold_font_path: Option<PathBuf>,

    pub image_fetch_timeout_secs: u64,
    /// Flate-compress content streams before serialization.
    pub compress: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            // A4
            page_width: 595.0,
            page_height: 842.0,
            margin: 50.0,

            body_font_size: 10.0,
            line_height: 14.0,
            article_title_size: 11.0,
            article_title_gap: 15.0,
            article_gap: 15.0,

            article_floor: 100.0,
            line_floor_offset: 20.0,
            signature_reserve: 150.0,

            parties_box_height: 160.0,
            footer_rule_y: 45.0,
            footer_text_y: 30.0,

            watermark_font_size: 60.0,
            watermark_opacity: 0.3,

            regular_font_path: None,
            bold_font_path: None,

            image_fetch_timeout_secs: 15,
            compress: true,
        }
    }
}

impl LayoutConfig {
    /// Page width minus both margins.
    pub fn content_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    /// Cursor position at the top of a fresh page.
    pub fn top(&self) -> f32 {
        self.page_height - self.margin
    }

    pub fn line_floor(&self) -> f32 {
        self.margin + self.line_floor_offset
    }

    /// Reject geometry the flow algorithm cannot make progress with.
    pub fn validate(&self) -> Result<()> {
        if !(self.page_width > 0.0 && self.page_height > 0.0) {
            bail!("page size must be positive, got {}x{}", self.page_width, self.page_height);
        }
        if !(self.margin >= 0.0 && self.content_width() > 0.0 && self.top() > self.line_floor()) {
            bail!("margin {} leaves no room for content", self.margin);
        }
        for (name, value) in [
            ("bodyFontSize", self.body_font_size),
            ("lineHeight", self.line_height),
            ("articleTitleSize", self.article_title_size),
            ("watermarkFontSize", self.watermark_font_size),
        ] {
            if !(value > 0.0) {
                bail!("{} must be positive, got {}", name, value);
            }
        }
        if !(0.0..=1.0).contains(&self.watermark_opacity) {
            bail!("watermarkOpacity must be within 0..=1, got {}", self.watermark_opacity);
        }
        Ok(())
    }
}

/// Per-call presentation options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerationOptions {
    /// Overlay text such as "BROUILLON", drawn on every page.
    pub watermark: Option<String>,
    pub logo_url: Option<String>,
}

impl GenerationOptions {
    pub fn watermark_text(&self) -> Option<&str> {
        self.watermark
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}
