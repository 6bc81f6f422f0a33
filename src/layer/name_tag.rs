//! Name tags: a translucent strip with the submitter's name along the bottom
//! edge of each photo.

use rayon::prelude::*;

use super::svg::escape_markup;
use super::{Blend, LayerEffect, Placement, RenderContext};
use crate::config::{svg_color, svg_opacity, CollageConfig};
use crate::error::CollageResult;
use crate::geometry::Cell;

/// One tag per photo that received a cell. Blank cells get none.
#[derive(Debug, Default, Clone, Copy)]
pub struct NameTags;

impl NameTags {
    /// Where the tag for `cell` goes: full cell width, flush with its bottom edge.
    pub fn tag_rect(cell: Cell, tag_height: u32) -> Cell {
        let height = tag_height.min(cell.height);
        Cell::new(cell.x, cell.bottom() - height, cell.width, height)
    }
}

impl LayerEffect for NameTags {
    fn name(&self) -> &'static str {
        "name-tags"
    }

    fn render(&self, ctx: &RenderContext<'_>) -> CollageResult<Vec<Placement>> {
        let assignments: Vec<_> = ctx.assignments().collect();
        assignments
            .into_par_iter()
            .map(|(_, photo, cell)| (Self::tag_rect(cell, ctx.config.name_tag_height), photo))
            .filter(|(rect, _)| !rect.size().is_empty())
            .map(|(rect, photo)| -> CollageResult<Placement> {
                let svg = tag_svg(ctx.config, rect.width, rect.height, &photo.display_name);
                let image = ctx.rasterizer.render(&svg, rect.width, rect.height)?;
                Ok(Placement::new(image, rect.x, rect.y, Blend::Over))
            })
            .collect()
    }
}

fn tag_svg(config: &CollageConfig, width: u32, height: u32, name: &str) -> String {
    let style = &config.name_tag_text;
    let fill = config.name_tag_fill;
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}"><rect width="100%" height="100%" fill="{rect_fill}" fill-opacity="{opacity}"/><text x="{center}" y="{baseline}" text-anchor="middle" font-family="{family}" font-size="{size}" fill="{text_fill}">{name}</text></svg>"#,
        rect_fill = svg_color(fill.color),
        opacity = svg_opacity(fill),
        center = width as f32 / 2.0,
        baseline = style.baseline,
        family = escape_markup(&config.font_family),
        size = style.size,
        text_fill = svg_color(style.color),
        name = escape_markup(name),
    )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::SvgRasterizer;
    use crate::layout::plan;
    use crate::request::{CompositionRequest, Photo};

    fn render(names: &[&str], count: usize) -> Vec<Placement> {
        let config = CollageConfig::default();
        let layout = plan(count);
        let request = CompositionRequest::new("k", "", "d", "g")
            .with_photos(names.iter().map(|n| Photo::new(Vec::new(), *n)));
        let raster = SvgRasterizer::new(&[]);
        let ctx = RenderContext::new(&config, &layout, &request, &raster);
        NameTags.render(&ctx).unwrap()
    }

    #[test]
    fn tag_sits_on_bottom_edge() {
        let cell = Cell::new(542, 80, 538, 940);
        assert_eq!(NameTags::tag_rect(cell, 28), Cell::new(542, 992, 538, 28));
        assert_eq!(NameTags::tag_rect(Cell::new(0, 0, 10, 20), 28), Cell::new(0, 0, 10, 20));
    }

    #[test]
    fn one_tag_per_assigned_photo() {
        let layout = plan(4);
        let tags = render(&["Alice", "Bob"], 4);
        assert_eq!(tags.len(), 2);
        for (tag, cell) in tags.iter().zip(&layout.cells) {
            assert_eq!(tag.x, cell.x as i64);
            assert_eq!(tag.y, (cell.bottom() - 28) as i64);
            assert_eq!(tag.image.dimensions(), (cell.width, 28));
        }
    }

    #[test]
    fn no_tags_for_dropped_photos() {
        let tags = render(&["A", "B", "C"], 2);
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn strip_is_translucent_black() {
        let tags = render(&["Alice"], 2);
        let corner = tags[0].image.get_pixel(1, 1);
        assert_eq!(&corner.0[..3], &[0, 0, 0]);
        assert!((120..=135).contains(&corner[3]), "alpha {}", corner[3]);
    }

    #[test]
    fn name_is_drawn_on_strip() {
        if SvgRasterizer::new(&[]).face_count() == 0 {
            eprintln!("no fonts installed, skipping name ink check");
            return;
        }
        let tags = render(&["Alice"], 2);
        let light = tags[0]
            .image
            .pixels()
            .filter(|p| p[0] > 160 && p[3] > 160)
            .count();
        assert!(light > 20, "name text missing: {light} light pixels");
    }

    fn text_chunks(node: &resvg::usvg::Group, out: &mut Vec<String>) {
        for child in node.children() {
            match child {
                resvg::usvg::Node::Text(text) => {
                    out.extend(text.chunks().iter().map(|c| c.text().to_string()))
                }
                resvg::usvg::Node::Group(group) => text_chunks(group, out),
                _ => {}
            }
        }
    }

    #[test]
    fn escaped_name_parses_back_to_original() {
        let raster = SvgRasterizer::new(&[]);
        if raster.face_count() == 0 {
            return;
        }
        let config = CollageConfig::default();
        let svg = tag_svg(&config, 200, 28, "<Tom & Jerry>");
        let tree = raster.parse(&svg).unwrap();

        let mut chunks = Vec::new();
        text_chunks(tree.root(), &mut chunks);
        assert_eq!(chunks.concat(), "<Tom & Jerry>");
    }

    #[test]
    fn control_characters_in_name_render() {
        let tags = render(&["Al\u{1}ice"], 2);
        assert_eq!(tags.len(), 1);
    }

    #[test]
    fn reserved_characters_are_escaped() {
        let config = CollageConfig::default();
        let svg = tag_svg(&config, 200, 28, "<Tom & Jerry>");
        assert!(svg.contains(">&lt;Tom &amp; Jerry&gt;</text>"));

        // renders instead of failing to parse
        let tags = render(&["<Tom & Jerry>", "a<b", "x&y"], 4);
        assert_eq!(tags.len(), 3);
    }
}
