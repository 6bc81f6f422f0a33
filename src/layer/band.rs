//! Header and footer text bands.

use super::svg::{escape_markup, SvgSource};
use super::{Blend, LayerEffect, Placement, RenderContext};
use crate::config::{svg_color, CollageConfig, TextStyle};
use crate::error::CollageResult;

/// Emoji artwork is drawn this much larger than the header font size.
const EMOJI_SCALE: f32 = 1.15;

/// Space between the header text and its emoji artwork, relative to font size.
const EMOJI_SPACING: f32 = 0.3;

// ============================================================================
// HeaderBand
// ============================================================================

/// Top band: `"{date} · {keyword} {emoji}"` centered on the band background.
///
/// With the `twemoji` feature, an emoji that has Twemoji artwork is drawn as
/// an image after the text instead of as a glyph, and the pair is centered
/// together.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeaderBand;

impl HeaderBand {
    /// The header line as plain text, emoji included.
    pub fn text(ctx: &RenderContext<'_>) -> String {
        let req = ctx.request;
        format!(
            "{} · {} {}",
            req.date,
            req.keyword,
            ctx.config.emoji_or_default(&req.emoji)
        )
    }

    fn render_with_artwork(
        ctx: &RenderContext<'_>,
        artwork: &SvgSource,
    ) -> CollageResult<Option<Vec<Placement>>> {
        let band = ctx.header_band();
        let style = &ctx.config.header_text;
        let req = ctx.request;
        let text = format!("{} · {}", req.date, req.keyword);
        let center = band.width as f32 / 2.0;

        let measured = text_svg(ctx.config, band.width, band.height, None, style, center, &text);
        let Some((left, right)) = ctx.rasterizer.horizontal_extent(&measured)? else {
            return Ok(None);
        };

        let emoji_size = (style.size * EMOJI_SCALE).round() as u32;
        let Some(emoji) = ctx.rasterizer.render_source(artwork, emoji_size) else {
            return Ok(None);
        };

        let spacing = style.size * EMOJI_SPACING;
        let shift = (spacing + emoji.width() as f32) / 2.0;
        let text_center = center - shift;
        let emoji_x = text_center + (right - left) / 2.0 + spacing;
        let emoji_y = style.baseline - style.size * 0.35 - emoji.height() as f32 / 2.0;

        let bg = Some(ctx.config.band_background);
        let svg = text_svg(ctx.config, band.width, band.height, bg, style, text_center, &text);
        let mut image = ctx.rasterizer.render(&svg, band.width, band.height)?;
        super::svg::composite_over(&mut image, &emoji, emoji_x.round() as i64, emoji_y.round() as i64);

        Ok(Some(vec![Placement::new(image, band.x, band.y, Blend::Over)]))
    }
}

impl LayerEffect for HeaderBand {
    fn name(&self) -> &'static str {
        "header"
    }

    fn render(&self, ctx: &RenderContext<'_>) -> CollageResult<Vec<Placement>> {
        let emoji = ctx.config.emoji_or_default(&ctx.request.emoji);
        if let Some(artwork) = emoji_artwork(emoji) {
            if let Some(placements) = Self::render_with_artwork(ctx, &artwork)? {
                return Ok(placements);
            }
        }

        render_band(ctx, ctx.header_band(), &ctx.config.header_text, &Self::text(ctx))
    }
}

// ============================================================================
// FooterBand
// ============================================================================

/// Bottom band: `"{group name} | {product name}"`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FooterBand;

impl FooterBand {
    pub fn text(ctx: &RenderContext<'_>) -> String {
        format!("{} | {}", ctx.request.group_name, ctx.config.product_name)
    }
}

impl LayerEffect for FooterBand {
    fn name(&self) -> &'static str {
        "footer"
    }

    fn render(&self, ctx: &RenderContext<'_>) -> CollageResult<Vec<Placement>> {
        render_band(ctx, ctx.footer_band(), &ctx.config.footer_text, &Self::text(ctx))
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn render_band(
    ctx: &RenderContext<'_>,
    band: crate::geometry::Cell,
    style: &TextStyle,
    text: &str,
) -> CollageResult<Vec<Placement>> {
    if band.size().is_empty() {
        return Ok(Vec::new());
    }
    let svg = text_svg(
        ctx.config,
        band.width,
        band.height,
        Some(ctx.config.band_background),
        style,
        band.width as f32 / 2.0,
        text,
    );
    let image = ctx.rasterizer.render(&svg, band.width, band.height)?;
    Ok(vec![Placement::new(image, band.x, band.y, Blend::Over)])
}

/// One line of centered text on an optional solid background.
fn text_svg(
    config: &CollageConfig,
    width: u32,
    height: u32,
    background: Option<palette::Srgb<u8>>,
    style: &TextStyle,
    center_x: f32,
    text: &str,
) -> String {
    let rect = background
        .map(|bg| format!(r#"<rect width="100%" height="100%" fill="{}"/>"#, svg_color(bg)))
        .unwrap_or_default();
    let weight = if style.bold { r#" font-weight="bold""# } else { "" };

    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">{rect}<text x="{center_x}" y="{baseline}" text-anchor="middle" font-family="{family}" font-size="{size}"{weight} fill="{fill}">{text}</text></svg>"#,
        baseline = style.baseline,
        family = escape_markup(&config.font_family),
        size = style.size,
        fill = svg_color(style.color),
        text = escape_markup(text),
    )
}

#[cfg(feature = "twemoji")]
fn emoji_artwork(emoji: &str) -> Option<SvgSource> {
    SvgSource::from_emoji(emoji)
}

#[cfg(not(feature = "twemoji"))]
fn emoji_artwork(_emoji: &str) -> Option<SvgSource> {
    None
}

// ============================================================================
// Tests
// ============================================================================
