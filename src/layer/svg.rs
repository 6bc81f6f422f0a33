//! SVG rendering utilities using resvg/usvg.
//!
//! Every text overlay (header, footer, name tags) is written as a small SVG
//! document and rasterized here. The font database is loaded once per
//! [`SvgRasterizer`] and shared by every render.

use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::Arc;

use image::{Rgba, RgbaImage};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{
    fontdb, FontFamily, FontResolver, FontStretch, FontStyle, Options, Tree,
};

use crate::error::{CollageError, CollageResult};

// ============================================================================
// Markup escaping
// ============================================================================

/// Escapes the characters that would break SVG text content.
///
/// `&`, `<` and `>` become entity references. Characters XML does not allow
/// at all (most C0 controls, U+FFFE, U+FFFF) are dropped. Everything else
/// passes through unchanged; the input is returned untouched when nothing
/// needs rewriting.
pub fn escape_markup(text: &str) -> Cow<'_, str> {
    if !text.chars().any(|ch| matches!(ch, '&' | '<' | '>') || !is_xml_char(ch)) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            ch if !is_xml_char(ch) => {}
            _ => escaped.push(ch),
        }
    }
    Cow::Owned(escaped)
}

/// The XML 1.0 `Char` production.
fn is_xml_char(ch: char) -> bool {
    matches!(
        ch,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

// ============================================================================
// SvgSource
// ============================================================================

/// A source for SVG data.
///
/// - Raw SVG markup strings
/// - Emoji characters, resolved to Twemoji artwork when the `twemoji`
///   feature is enabled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SvgSource {
    /// Raw SVG markup string.
    Raw(String),

    /// An emoji character to be resolved via twemoji_assets.
    Emoji(String),
}

impl SvgSource {
    /// Creates a source from raw SVG markup.
    pub fn from_svg(svg: impl Into<String>) -> Self {
        Self::Raw(svg.into())
    }

    /// Creates a source from an emoji character.
    ///
    /// Returns `None` if the emoji is not supported by twemoji_assets.
    #[cfg(feature = "twemoji")]
    pub fn from_emoji(emoji: &str) -> Option<Self> {
        use twemoji_assets::svg::SvgTwemojiAsset;

        SvgTwemojiAsset::from_emoji(emoji)?;
        Some(Self::Emoji(emoji.to_string()))
    }

    /// Resolves this source to SVG markup.
    ///
    /// Without the `twemoji` feature, emoji sources never resolve.
    pub fn resolve(&self) -> Option<&str> {
        match self {
            Self::Raw(svg) => Some(svg.as_str()),
            #[cfg(feature = "twemoji")]
            Self::Emoji(emoji) => {
                use twemoji_assets::svg::SvgTwemojiAsset;
                let asset = SvgTwemojiAsset::from_emoji(emoji)?;
                Some(asset.as_ref())
            }
            #[cfg(not(feature = "twemoji"))]
            Self::Emoji(_) => None,
        }
    }

    /// Returns `true` if this is an emoji source.
    pub fn is_emoji(&self) -> bool {
        matches!(self, Self::Emoji(_))
    }
}

impl<S: Into<String>> From<S> for SvgSource {
    fn from(s: S) -> Self {
        Self::Raw(s.into())
    }
}

// ============================================================================
// SvgRasterizer
// ============================================================================

/// Turns SVG markup into RGBA rasters.
///
/// Cloning is cheap: the font database sits behind an `Arc` and is never
/// mutated after construction.
#[derive(Clone)]
pub struct SvgRasterizer {
    fontdb: Arc<fontdb::Database>,
}

impl std::fmt::Debug for SvgRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SvgRasterizer")
            .field("faces", &self.fontdb.len())
            .finish()
    }
}

impl SvgRasterizer {
    /// Loads system fonts plus every font found in `font_dirs`.
    pub fn new(font_dirs: &[PathBuf]) -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        for dir in font_dirs {
            db.load_fonts_dir(dir);
        }
        bind_generic_families(&mut db);
        tracing::debug!(faces = db.len(), "font database ready");
        Self {
            fontdb: Arc::new(db),
        }
    }

    /// Number of font faces available to text overlays.
    pub fn face_count(&self) -> usize {
        self.fontdb.len()
    }

    pub(crate) fn parse(&self, svg_data: &str) -> CollageResult<Tree> {
        let mut opts = Options::default();
        opts.fontdb = Arc::clone(&self.fontdb);
        opts.font_resolver = font_resolver();
        Ok(Tree::from_str(svg_data, &opts)?)
    }

    /// Renders an SVG document stretched to exactly `width` x `height`.
    pub fn render(&self, svg_data: &str, width: u32, height: u32) -> CollageResult<RgbaImage> {
        let tree = self.parse(svg_data)?;
        let mut pixmap = Pixmap::new(width, height).ok_or(CollageError::Pixmap { width, height })?;

        let svg_size = tree.size();
        let transform = Transform::from_scale(
            width as f32 / svg_size.width(),
            height as f32 / svg_size.height(),
        );
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        pixmap_to_rgba_image(&pixmap)
    }

    /// Renders a source scaled to fit within `size x size`, preserving aspect ratio.
    ///
    /// Returns `None` if the source does not resolve or cannot be rendered.
    pub fn render_source(&self, source: &SvgSource, size: u32) -> Option<RgbaImage> {
        let tree = self.parse(source.resolve()?).ok()?;

        let svg_size = tree.size();
        let scale = (size as f32) / svg_size.width().max(svg_size.height());
        let width = (svg_size.width() * scale).ceil() as u32;
        let height = (svg_size.height() * scale).ceil() as u32;

        let mut pixmap = Pixmap::new(width, height)?;
        resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());
        pixmap_to_rgba_image(&pixmap).ok()
    }

    /// Horizontal extent `(left, right)` of everything drawn by the document.
    ///
    /// Returns `None` when nothing would be drawn, e.g. text with no usable font.
    pub fn horizontal_extent(&self, svg_data: &str) -> CollageResult<Option<(f32, f32)>> {
        let tree = self.parse(svg_data)?;
        let root = tree.root();
        if !root.has_children() {
            return Ok(None);
        }
        let bbox = root.abs_bounding_box();
        Ok(Some((bbox.left(), bbox.right())))
    }
}

// ============================================================================
// Font selection
// ============================================================================

/// Points the generic `sans-serif` / `serif` / `monospace` families at faces
/// that are actually installed.
///
/// fontdb maps the generic names to Arial, Times New Roman and Courier New,
/// which most Linux hosts lack; usvg then drops every text node.
fn bind_generic_families(db: &mut fontdb::Database) {
    let names: Vec<String> = db
        .faces()
        .filter_map(|face| face.families.first().map(|(name, _)| name.clone()))
        .collect();

    let pick = |wanted: &dyn Fn(&str) -> bool| names.iter().find(|n| wanted(n.as_str())).cloned();
    let is_mono = |n: &str| n.contains("Mono") || n.contains("Courier");
    let is_sans = |n: &str| n.contains("Sans") && !is_mono(n);
    let is_serif = |n: &str| n.contains("Serif") && !n.contains("Sans") && !is_mono(n);

    if !has_face(db, fontdb::Family::SansSerif) {
        if let Some(name) = pick(&is_sans).or_else(|| names.first().cloned()) {
            tracing::debug!(family = %name, "sans-serif fallback");
            db.set_sans_serif_family(name);
        }
    }
    if !has_face(db, fontdb::Family::Serif) {
        if let Some(name) = pick(&is_serif) {
            db.set_serif_family(name);
        }
    }
    if !has_face(db, fontdb::Family::Monospace) {
        if let Some(name) = pick(&is_mono) {
            db.set_monospace_family(name);
        }
    }
}

fn has_face(db: &fontdb::Database, family: fontdb::Family<'_>) -> bool {
    let query = fontdb::Query {
        families: &[family],
        ..fontdb::Query::default()
    };
    db.query(&query).is_some()
}

/// Font selection for text overlays.
///
/// Tries the requested families first, then the generic families, then any
/// loaded face, so a caption is never silently dropped while at least one
/// font is available.
fn font_resolver() -> FontResolver<'static> {
    FontResolver {
        select_font: Box::new(|font, db| {
            let mut families: Vec<fontdb::Family<'_>> = font
                .families()
                .iter()
                .map(|family| match family {
                    FontFamily::Serif => fontdb::Family::Serif,
                    FontFamily::SansSerif => fontdb::Family::SansSerif,
                    FontFamily::Cursive => fontdb::Family::Cursive,
                    FontFamily::Fantasy => fontdb::Family::Fantasy,
                    FontFamily::Monospace => fontdb::Family::Monospace,
                    FontFamily::Named(name) => fontdb::Family::Name(name),
                })
                .collect();
            families.extend([
                fontdb::Family::SansSerif,
                fontdb::Family::Serif,
                fontdb::Family::Monospace,
            ]);

            let stretch = match font.stretch() {
                FontStretch::UltraCondensed => fontdb::Stretch::UltraCondensed,
                FontStretch::ExtraCondensed => fontdb::Stretch::ExtraCondensed,
                FontStretch::Condensed => fontdb::Stretch::Condensed,
                FontStretch::SemiCondensed => fontdb::Stretch::SemiCondensed,
                FontStretch::Normal => fontdb::Stretch::Normal,
                FontStretch::SemiExpanded => fontdb::Stretch::SemiExpanded,
                FontStretch::Expanded => fontdb::Stretch::Expanded,
                FontStretch::ExtraExpanded => fontdb::Stretch::ExtraExpanded,
                FontStretch::UltraExpanded => fontdb::Stretch::UltraExpanded,
            };
            let style = match font.style() {
                FontStyle::Normal => fontdb::Style::Normal,
                FontStyle::Italic => fontdb::Style::Italic,
                FontStyle::Oblique => fontdb::Style::Oblique,
            };

            let query = fontdb::Query {
                families: &families,
                weight: fontdb::Weight(font.weight()),
                stretch,
                style,
            };
            db.query(&query).or_else(|| db.faces().next().map(|face| face.id))
        }),
        select_fallback: FontResolver::default_fallback_selector(),
    }
}

/// Converts a tiny_skia Pixmap to an image::RgbaImage.
fn pixmap_to_rgba_image(pixmap: &Pixmap) -> CollageResult<RgbaImage> {
    let (width, height) = (pixmap.width(), pixmap.height());
    // tiny_skia stores premultiplied alpha
    let raw: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    RgbaImage::from_raw(width, height, raw).ok_or(CollageError::Pixmap { width, height })
}

// ============================================================================
// Compositing
// ============================================================================

/// Composites a source image onto a destination image at the specified position.
///
/// Uses standard alpha blending (source over destination). Pixels falling
/// outside the destination are clipped.
pub fn composite_over(dest: &mut RgbaImage, src: &RgbaImage, x: i64, y: i64) {
    let dest_width = dest.width() as i64;
    let dest_height = dest.height() as i64;

    for (sx, sy, src_pixel) in src.enumerate_pixels() {
        let dx = x + sx as i64;
        let dy = y + sy as i64;

        if dx < 0 || dy < 0 || dx >= dest_width || dy >= dest_height {
            continue;
        }

        let dst_pixel = dest.get_pixel_mut(dx as u32, dy as u32);
        *dst_pixel = alpha_blend(*src_pixel, *dst_pixel);
    }
}

/// Alpha blends two RGBA pixels (source over destination).
fn alpha_blend(src: Rgba<u8>, dst: Rgba<u8>) -> Rgba<u8> {
    match src[3] {
        255 => return src,
        0 => return dst,
        _ => {}
    }

    let sa = src[3] as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);

    let blend = |s: u8, d: u8| -> u8 {
        let sf = s as f32 / 255.0;
        let df = d as f32 / 255.0;
        let out = (sf * sa + df * da * (1.0 - sa)) / out_a;
        (out * 255.0).round() as u8
    };

    Rgba([
        blend(src[0], dst[0]),
        blend(src[1], dst[1]),
        blend(src[2], dst[2]),
        (out_a * 255.0).round() as u8,
    ])
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100"><circle cx="50" cy="50" r="40" fill="#ff0000"/></svg>"##;

    fn rasterizer() -> SvgRasterizer {
        SvgRasterizer::new(&[])
    }

    #[test]
    fn escape_reserved_characters() {
        assert_eq!(escape_markup("Tom & Jerry"), "Tom &amp; Jerry");
        assert_eq!(escape_markup("<b>hi</b>"), "&lt;b&gt;hi&lt;/b&gt;");
        assert_eq!(escape_markup("a&&b"), "a&amp;&amp;b");
    }

    #[test]
    fn escape_drops_non_xml_characters() {
        assert_eq!(escape_markup("a\u{1}b\u{FFFF}"), "ab");
        assert_eq!(escape_markup("A&\u{0}B"), "A&amp;B");
        assert_eq!(escape_markup("tab\there"), "tab\there");

        let svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"><text>{}</text></svg>"#,
            escape_markup("bell\u{7} & co")
        );
        assert!(rasterizer().render(&svg, 10, 10).is_ok());
    }

    #[test]
    fn escape_passes_plain_text_through() {
        assert!(matches!(escape_markup("Alice"), Cow::Borrowed("Alice")));
        assert_eq!(escape_markup("지민 ☕ \"quoted\""), "지민 ☕ \"quoted\"");
    }

    #[test]
    fn render_exact_size() {
        let img = rasterizer().render(SIMPLE_SVG, 60, 30).unwrap();
        assert_eq!(img.dimensions(), (60, 30));

        let center = img.get_pixel(30, 15);
        assert_eq!(center[3], 255);
        assert!(center[0] > 200 && center[1] < 50);
        assert_eq!(img.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn render_rejects_bad_markup() {
        let err = rasterizer().render("<svg", 10, 10).unwrap_err();
        assert!(matches!(err, CollageError::Svg(_)));
    }

    #[test]
    fn render_rejects_empty_surface() {
        let err = rasterizer().render(SIMPLE_SVG, 0, 10).unwrap_err();
        assert!(matches!(
            err,
            CollageError::Pixmap {
                width: 0,
                height: 10
            }
        ));
    }

    #[test]
    fn render_source_fits_square() {
        let source = SvgSource::from_svg(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="100"><rect width="200" height="100" fill="#00ff00"/></svg>"##,
        );
        let img = rasterizer().render_source(&source, 50).unwrap();
        assert_eq!(img.dimensions(), (50, 25));
    }

    #[test]
    fn extent_of_shapes() {
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="10"><rect x="20" y="0" width="30" height="10"/></svg>"##;
        let (left, right) = rasterizer().horizontal_extent(svg).unwrap().unwrap();
        assert!((left - 20.0).abs() < 0.5);
        assert!((right - 50.0).abs() < 0.5);

        let empty = r#"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="10"></svg>"#;
        assert!(rasterizer().horizontal_extent(empty).unwrap().is_none());
    }

    #[test]
    fn composite_simple() {
        let mut dest = RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255]));
        let src = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 255, 255]));

        composite_over(&mut dest, &src, 3, 3);

        assert_eq!(dest.get_pixel(5, 5).0, [0, 0, 255, 255]);
        assert_eq!(dest.get_pixel(0, 0).0, [255, 0, 0, 255]);
    }

    #[test]
    fn composite_with_transparency() {
        let mut dest = RgbaImage::from_pixel(10, 10, Rgba([255, 255, 255, 255]));
        let src = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 128]));

        composite_over(&mut dest, &src, 0, 0);

        let pixel = dest.get_pixel(0, 0);
        assert!((120..=135).contains(&pixel[0]), "got {pixel:?}");
        assert_eq!(pixel[3], 255);
    }

    #[test]
    fn composite_clips_out_of_bounds() {
        let mut dest = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
        let src = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));

        composite_over(&mut dest, &src, -2, 3);

        assert_eq!(dest.get_pixel(0, 3).0, [255, 255, 255, 255]);
        assert_eq!(dest.get_pixel(2, 3).0, [0, 0, 0, 255]);
        assert_eq!(dest.get_pixel(0, 2).0, [0, 0, 0, 255]);
    }

    #[test]
    fn svg_source_into_from_string() {
        let source: SvgSource = "<svg></svg>".into();
        assert!(!source.is_emoji());
        assert_eq!(source.resolve(), Some("<svg></svg>"));
    }

    #[cfg(not(feature = "twemoji"))]
    #[test]
    fn emoji_source_needs_twemoji() {
        assert_eq!(SvgSource::Emoji("☕".into()).resolve(), None);
    }

    #[cfg(feature = "twemoji")]
    #[test]
    fn render_emoji_source() {
        let source = SvgSource::from_emoji("🦆").expect("duck emoji should be supported");
        assert!(source.is_emoji());

        let img = rasterizer().render_source(&source, 32).unwrap();
        assert_eq!(img.dimensions(), (32, 32));
    }

    #[cfg(feature = "twemoji")]
    #[test]
    fn svg_source_invalid_emoji_returns_none() {
        assert!(SvgSource::from_emoji("not-an-emoji").is_none());
    }
}
