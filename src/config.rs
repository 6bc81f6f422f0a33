//! Build-time collage constants and the styling derived from them.
//!
//! Every collage shares one canvas geometry. The values below are fixed for
//! the lifetime of a [`Compositor`](crate::Compositor); nothing here can be
//! changed per composition call.

use std::path::PathBuf;

use palette::{Srgb, Srgba};

use crate::geometry::{Cell, SizePx};

/// Side length of the square output canvas, in pixels.
pub const CANVAS_SIZE: u32 = 1080;

/// Height of the header band (date, keyword, emoji).
pub const HEADER_HEIGHT: u32 = 80;

/// Height of the footer band (group name, product name).
pub const FOOTER_HEIGHT: u32 = 60;

/// Spacing between neighbouring cells.
pub const GAP: u32 = 4;

/// Height of the name-tag strip drawn over the bottom of each photo.
pub const NAME_TAG_HEIGHT: u32 = 28;

/// JPEG quality used for the encoded collage.
pub const JPEG_QUALITY: u8 = 90;

/// Product name printed in the footer.
pub const PRODUCT_NAME: &str = "Daily Snap";

/// Emoji shown in the header when a mission has none.
pub const DEFAULT_EMOJI: &str = "📸";

/// Font family list handed to the SVG text renderer.
pub const FONT_FAMILY: &str = "Arial, sans-serif";

// ============================================================================
// TextStyle
// ============================================================================

/// How a single line of text is drawn inside an overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub color: Srgb<u8>,
    /// Font size in pixels.
    pub size: f32,
    pub bold: bool,
    /// Baseline offset from the top of the overlay.
    pub baseline: f32,
}

impl TextStyle {
    pub fn new(color: Srgb<u8>, size: f32, baseline: f32) -> Self {
        Self {
            color,
            size,
            bold: false,
            baseline,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

// ============================================================================
// CollageConfig
// ============================================================================

/// Canvas geometry and overlay styling for one [`Compositor`](crate::Compositor).
///
/// `CollageConfig::default()` reproduces the constants of this module.
/// Invariant: `header_height + footer_height <= canvas_size`, so the
/// content band is never negative.
#[derive(Debug, Clone, PartialEq)]
pub struct CollageConfig {
    pub canvas_size: u32,
    pub header_height: u32,
    pub footer_height: u32,
    pub gap: u32,
    pub name_tag_height: u32,
    pub jpeg_quality: u8,

    pub product_name: String,
    pub default_emoji: String,
    pub font_family: String,

    /// Canvas fill behind everything, also used for empty cells.
    pub background: Srgb<u8>,
    /// Fill of the header and footer bands.
    pub band_background: Srgb<u8>,
    pub header_text: TextStyle,
    pub footer_text: TextStyle,
    /// Semi-transparent strip behind each display name.
    pub name_tag_fill: Srgba<u8>,
    pub name_tag_text: TextStyle,

    /// Extra directories scanned for fonts in addition to the system fonts.
    pub font_dirs: Vec<PathBuf>,
}

impl Default for CollageConfig {
    fn default() -> Self {
        let white = Srgb::new(255, 255, 255);
        Self {
            canvas_size: CANVAS_SIZE,
            header_height: HEADER_HEIGHT,
            footer_height: FOOTER_HEIGHT,
            gap: GAP,
            name_tag_height: NAME_TAG_HEIGHT,
            jpeg_quality: JPEG_QUALITY,
            product_name: PRODUCT_NAME.to_string(),
            default_emoji: DEFAULT_EMOJI.to_string(),
            font_family: FONT_FAMILY.to_string(),
            background: white,
            band_background: white,
            header_text: TextStyle::new(Srgb::new(0x33, 0x33, 0x33), 26.0, 52.0).bold(),
            footer_text: TextStyle::new(Srgb::new(0x99, 0x99, 0x99), 16.0, 35.0),
            name_tag_fill: Srgba::new(0, 0, 0, 128),
            name_tag_text: TextStyle::new(white, 13.0, 19.0),
            font_dirs: Vec::new(),
        }
    }
}

impl CollageConfig {
    /// Adds a directory whose fonts become available to every text overlay.
    pub fn with_font_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.font_dirs.push(dir.into());
        self
    }

    /// Returns the canvas dimensions.
    pub fn canvas(&self) -> SizePx {
        SizePx::new(self.canvas_size, self.canvas_size)
    }

    /// Height left for photos between the header and footer bands.
    pub fn content_height(&self) -> u32 {
        self.canvas_size
            .saturating_sub(self.header_height)
            .saturating_sub(self.footer_height)
    }

    pub fn header_band(&self) -> Cell {
        Cell::new(0, 0, self.canvas_size, self.header_height)
    }

    pub fn content_band(&self) -> Cell {
        Cell::new(0, self.header_height, self.canvas_size, self.content_height())
    }

    pub fn footer_band(&self) -> Cell {
        Cell::new(
            0,
            self.canvas_size.saturating_sub(self.footer_height),
            self.canvas_size,
            self.footer_height,
        )
    }

    /// Returns `emoji`, or the configured default when it is blank.
    pub fn emoji_or_default<'a>(&'a self, emoji: &'a str) -> &'a str {
        if emoji.trim().is_empty() {
            &self.default_emoji
        } else {
            emoji
        }
    }
}

/// Formats an sRGB colour as an SVG hex colour (`#rrggbb`).
pub fn svg_color(color: Srgb<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", color.red, color.green, color.blue)
}

/// Returns the alpha channel of `color` as an SVG opacity in `0.0..=1.0`.
pub fn svg_opacity(color: Srgba<u8>) -> f32 {
    color.alpha as f32 / 255.0
}
