//! Photo layer: decodes every assigned photo and cover-fits it into its cell.

use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};
use rayon::prelude::*;

use super::{Blend, LayerEffect, Placement, RenderContext};
use crate::error::{CollageError, CollageResult};
use crate::geometry::Cell;

/// Draws photo `i` into `cells[i]`, scaled to fill and center-cropped.
///
/// Photos are decoded and resized in parallel. Any photo that fails to
/// decode fails the whole layer.
#[derive(Debug, Default, Clone, Copy)]
pub struct PhotoCells;

impl LayerEffect for PhotoCells {
    fn name(&self) -> &'static str {
        "photos"
    }

    fn render(&self, ctx: &RenderContext<'_>) -> CollageResult<Vec<Placement>> {
        let dropped = ctx.dropped_photos();
        if dropped > 0 {
            tracing::debug!(dropped, cells = ctx.layout.len(), "photos without a cell are skipped");
        }
        let blank = ctx.blank_cells().len();
        if blank > 0 {
            tracing::debug!(blank, "cells without a photo stay empty");
        }

        let assignments: Vec<_> = ctx.assignments().collect();
        assignments
            .into_par_iter()
            .filter(|(_, _, cell)| !cell.size().is_empty())
            .map(|(index, photo, cell)| -> CollageResult<Placement> {
                let decoded = image::load_from_memory(&photo.data).map_err(|source| {
                    tracing::warn!(index, name = %photo.display_name, error = %source, "undecodable photo");
                    CollageError::InvalidImage { index, source }
                })?;
                let fitted = cover_fit(&decoded, cell);
                Ok(Placement::new(fitted, cell.x, cell.y, Blend::Replace))
            })
            .collect()
    }
}

/// Resizes `image` to exactly the cell size, preserving aspect ratio by
/// cropping whatever overflows the cell (centered).
pub fn cover_fit(image: &DynamicImage, cell: Cell) -> RgbaImage {
    let fitted = image.resize_to_fill(cell.width, cell.height, FilterType::Lanczos3);
    let mut rgba = fitted.into_rgba8();
    // Photos are drawn opaque; any source alpha is dropped.
    for pixel in rgba.pixels_mut() {
        pixel[3] = 255;
    }
    rgba
}

// ============================================================================
// Tests
// ============================================================================
