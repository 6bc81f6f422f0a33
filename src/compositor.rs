//! Collage composition engine.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbImage};

use crate::config::CollageConfig;
use crate::error::{CollageError, CollageResult};
use crate::layer::{LayerPipeline, RenderContext, SvgRasterizer};
use crate::layout::{plan_with, Layout};
use crate::request::CompositionRequest;

// ============================================================================
// Compositor
// ============================================================================

/// Renders collages from a [`CompositionRequest`].
///
/// A `Compositor` owns the canvas configuration and a loaded font database.
/// It keeps no state between calls, so one instance can serve many
/// compositions, including concurrently from several threads.
///
/// # Pipeline
///
/// 1. Plan the layout for the photo count
/// 2. Render header, photos, name tags and footer (in parallel)
/// 3. Flatten them over the background in that z-order
/// 4. Encode the canvas as JPEG
///
/// # Example
///
/// ```no_run
/// use stichy_collage::{Compositor, CompositionRequest, Photo};
///
/// let compositor = Compositor::new();
/// let request = CompositionRequest::new("Coffee", "☕", "2026.02.05", "Best Friends")
///     .with_photo(Photo::new(std::fs::read("alice.jpg").unwrap(), "Alice"))
///     .with_photo(Photo::new(std::fs::read("bob.jpg").unwrap(), "Bob"));
///
/// let jpeg = compositor.compose(&request).unwrap();
/// std::fs::write("collage.jpg", jpeg).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Compositor {
    config: CollageConfig,
    rasterizer: SvgRasterizer,

    /// The render layers, in z-order.
    pub pipeline: LayerPipeline,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new()
    }
}

impl Compositor {
    /// Creates a compositor with the default canvas and styling.
    pub fn new() -> Self {
        Self::with_config(CollageConfig::default())
    }

    /// Creates a compositor for the given configuration.
    ///
    /// Loads the system fonts and any configured font directories once.
    pub fn with_config(config: CollageConfig) -> Self {
        let rasterizer = SvgRasterizer::new(&config.font_dirs);
        Self {
            config,
            rasterizer,
            pipeline: LayerPipeline::default(),
        }
    }

    pub fn config(&self) -> &CollageConfig {
        &self.config
    }

    /// Plans the layout this compositor would use for `count` photos.
    pub fn plan(&self, count: usize) -> Layout {
        plan_with(count, &self.config)
    }

    /// Composes the collage and returns it JPEG-encoded.
    ///
    /// Photo `i` fills cell `i` of the layout planned for the photo count.
    /// Photos without a cell are dropped; the first undecodable photo fails
    /// the whole call.
    #[tracing::instrument(skip_all, fields(photos = request.photos.len()))]
    pub fn compose(&self, request: &CompositionRequest) -> CollageResult<Vec<u8>> {
        let layout = self.plan(request.photo_count());
        self.compose_with_layout(request, &layout)
    }

    /// Like [`compose`](Self::compose), but with a caller-chosen layout.
    pub fn compose_with_layout(
        &self,
        request: &CompositionRequest,
        layout: &Layout,
    ) -> CollageResult<Vec<u8>> {
        let canvas = self.render_with_layout(request, layout)?;
        let encoded = encode_jpeg(&canvas, self.config.jpeg_quality)?;
        tracing::info!(
            cells = layout.len(),
            bytes = encoded.len(),
            "collage composed"
        );
        Ok(encoded)
    }

    /// Renders the flattened canvas without encoding it.
    pub fn render(&self, request: &CompositionRequest) -> CollageResult<RgbImage> {
        let layout = self.plan(request.photo_count());
        self.render_with_layout(request, &layout)
    }

    /// Renders the flattened canvas for a caller-chosen layout.
    pub fn render_with_layout(
        &self,
        request: &CompositionRequest,
        layout: &Layout,
    ) -> CollageResult<RgbImage> {
        let ctx = RenderContext::new(&self.config, layout, request, &self.rasterizer);
        let canvas = self.pipeline.render(&ctx)?;
        Ok(DynamicImage::ImageRgba8(canvas).into_rgb8())
    }
}

/// Composes a collage with a freshly built default [`Compositor`].
///
/// Loading fonts is not free; callers composing repeatedly should keep a
/// `Compositor` around instead.
pub fn compose(request: &CompositionRequest) -> CollageResult<Vec<u8>> {
    Compositor::new().compose(request)
}

/// Encodes an RGB canvas as baseline JPEG.
pub fn encode_jpeg(canvas: &RgbImage, quality: u8) -> CollageResult<Vec<u8>> {
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    canvas
        .write_with_encoder(encoder)
        .map_err(CollageError::Encode)?;
    Ok(buf)
}

// ============================================================================
// Tests
// ============================================================================
