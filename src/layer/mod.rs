//! Render layers and the fixed z-order pipeline.
//!
//! Each layer turns a [`RenderContext`] into a list of [`Placement`]s,
//! rasters with a canvas position. Layers never see each other's output, so
//! they render in parallel. The pipeline then flattens all placements onto
//! the background in a fixed order:
//!
//! ```text
//! ┌──────────────┐
//! │  Background  │ ◄── solid canvas fill
//! └──────┬───────┘
//!        ▼
//! ┌──────────────┐
//! │    Header    │ ◄── date · keyword emoji
//! └──────┬───────┘
//!        ▼
//! ┌──────────────┐
//! │    Photos    │ ◄── one cover-fit photo per cell
//! └──────┬───────┘
//!        ▼
//! ┌──────────────┐
//! │  Name tags   │ ◄── translucent strip at each photo's bottom edge
//! └──────┬───────┘
//!        ▼
//! ┌──────────────┐
//! │    Footer    │ ◄── group name | product name
//! └──────────────┘
//! ```

pub mod band;
pub mod name_tag;
pub mod photo;
pub mod svg;

pub use band::{FooterBand, HeaderBand};
pub use name_tag::NameTags;
pub use photo::PhotoCells;
pub use svg::{SvgRasterizer, SvgSource};

use image::{Rgba, RgbaImage};
use rayon::prelude::*;

use crate::config::CollageConfig;
use crate::error::CollageResult;
use crate::geometry::Cell;
use crate::layout::Layout;
use crate::request::{CompositionRequest, Photo};

// ============================================================================
// Render Context
// ============================================================================

/// Read-only inputs shared by every layer for one composition.
pub struct RenderContext<'a> {
    pub config: &'a CollageConfig,
    pub layout: &'a Layout,
    pub request: &'a CompositionRequest,
    pub rasterizer: &'a SvgRasterizer,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        config: &'a CollageConfig,
        layout: &'a Layout,
        request: &'a CompositionRequest,
        rasterizer: &'a SvgRasterizer,
    ) -> Self {
        Self {
            config,
            layout,
            request,
            rasterizer,
        }
    }

    /// Photos that received a cell, with their index and cell.
    ///
    /// Photo `i` pairs with `cells[i]`; photos past the last cell are left out.
    pub fn assignments(&self) -> impl Iterator<Item = (usize, &'a Photo, Cell)> + 'a {
        self.request
            .photos
            .iter()
            .zip(self.layout.cells.iter().copied())
            .enumerate()
            .map(|(i, (photo, cell))| (i, photo, cell))
    }

    /// Number of photos that did not get a cell.
    pub fn dropped_photos(&self) -> usize {
        self.request.photos.len().saturating_sub(self.layout.len())
    }

    /// Cells with no photo; they stay background-filled.
    pub fn blank_cells(&self) -> &'a [Cell] {
        let used = self.request.photos.len().min(self.layout.len());
        &self.layout.cells[used..]
    }

    pub fn canvas_size(&self) -> u32 {
        self.layout.canvas_size
    }

    pub fn header_band(&self) -> Cell {
        Cell::new(0, 0, self.layout.canvas_size, self.layout.header_height)
    }

    pub fn footer_band(&self) -> Cell {
        let size = self.layout.canvas_size;
        let height = self.layout.footer_height;
        Cell::new(0, size.saturating_sub(height), size, height)
    }
}

// ============================================================================
// Placement
// ============================================================================

/// How a placement is merged into the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blend {
    /// Copy pixels as-is. For opaque rasters such as photos.
    Replace,
    /// Source-over alpha blending.
    Over,
}

/// A rendered raster and where it goes on the canvas.
#[derive(Debug, Clone)]
pub struct Placement {
    pub image: RgbaImage,
    pub x: i64,
    pub y: i64,
    pub blend: Blend,
}

impl Placement {
    pub fn new(image: RgbaImage, x: u32, y: u32, blend: Blend) -> Self {
        Self {
            image,
            x: x as i64,
            y: y as i64,
            blend,
        }
    }

    /// Draws this placement onto `canvas`.
    pub fn draw(&self, canvas: &mut RgbaImage) {
        match self.blend {
            Blend::Replace => image::imageops::replace(canvas, &self.image, self.x, self.y),
            Blend::Over => svg::composite_over(canvas, &self.image, self.x, self.y),
        }
    }
}

// ============================================================================
// Layer Trait
// ============================================================================

/// One stage of the collage.
///
/// Implementations are pure: they read the context and return rasters, and
/// must not depend on any other layer's output.
pub trait LayerEffect: Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Renders this layer's placements.
    fn render(&self, ctx: &RenderContext<'_>) -> CollageResult<Vec<Placement>>;
}

// ============================================================================
// Layer Pipeline
// ============================================================================

/// The four collage layers in z-order.
#[derive(Debug, Default, Clone, Copy)]
pub struct LayerPipeline {
    pub header: HeaderBand,
    pub photos: PhotoCells,
    pub name_tags: NameTags,
    pub footer: FooterBand,
}

impl LayerPipeline {
    /// Layers from bottom to top.
    pub fn layers(&self) -> [&dyn LayerEffect; 4] {
        [&self.header, &self.photos, &self.name_tags, &self.footer]
    }

    /// Renders every layer and flattens them onto a fresh background canvas.
    ///
    /// All layers are materialized before anything is drawn; the first layer
    /// error aborts the render.
    pub fn render(&self, ctx: &RenderContext<'_>) -> CollageResult<RgbaImage> {
        let rendered = self
            .layers()
            .par_iter()
            .map(|layer| layer.render(ctx))
            .collect::<CollageResult<Vec<_>>>()?;

        let size = ctx.canvas_size();
        let bg = ctx.config.background;
        let mut canvas = RgbaImage::from_pixel(size, size, Rgba([bg.red, bg.green, bg.blue, 255]));

        for (layer, placements) in self.layers().iter().zip(&rendered) {
            tracing::trace!(layer = layer.name(), placements = placements.len(), "flatten");
            for placement in placements {
                placement.draw(&mut canvas);
            }
        }

        Ok(canvas)
    }
}

// ============================================================================
// Tests
// ============================================================================
