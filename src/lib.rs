//! stichy-collage: daily photo-mission collage engine
//!
//! Every group member submits one photo for the day's keyword; once all
//! photos are in, this crate lays them out on a fixed square canvas with a
//! header (date, keyword, emoji), a footer (group and product name) and a
//! name tag on every photo, and encodes the result as a single JPEG.
//!
//! # Example
//!
//! ```no_run
//! use stichy_collage::{Compositor, CompositionRequest, Photo};
//!
//! let compositor = Compositor::new();
//!
//! let request = CompositionRequest::new("Coffee", "☕", "2026.02.05", "Best Friends")
//!     .with_photo(Photo::new(std::fs::read("alice.jpg").unwrap(), "Alice"))
//!     .with_photo(Photo::new(std::fs::read("bob.jpg").unwrap(), "Bob"));
//!
//! let jpeg = compositor.compose(&request).unwrap();
//! ```
//!
//! # Layouts
//!
//! Layout planning is a pure function of the photo count and can be used on
//! its own:
//!
//! ```
//! use stichy_collage::plan;
//!
//! let layout = plan(5);
//! assert_eq!(layout.cells.len(), 5);
//! // two photos on top, three below
//! assert_eq!(layout.cells[0].y, layout.cells[1].y);
//! assert!(layout.cells[2].y > layout.cells[1].y);
//! ```

mod compositor;
mod config;
mod error;
mod geometry;
mod layer;
mod layout;
mod mission;
mod request;

pub use compositor::{compose, encode_jpeg, Compositor};
pub use config::{
    CollageConfig, TextStyle, CANVAS_SIZE, DEFAULT_EMOJI, FONT_FAMILY, FOOTER_HEIGHT, GAP,
    HEADER_HEIGHT, JPEG_QUALITY, NAME_TAG_HEIGHT, PRODUCT_NAME,
};
pub use error::{CollageError, CollageResult};
pub use geometry::{Cell, SizePx};
pub use layer::svg::{composite_over, escape_markup};
pub use layer::{
    Blend, FooterBand, HeaderBand, LayerEffect, LayerPipeline, NameTags, PhotoCells, Placement,
    RenderContext, SvgRasterizer, SvgSource,
};
pub use layout::{plan, plan_with, Layout, LayoutSpec, FALLBACK_MAX_CELLS};
pub use mission::{finalize_mission, MissionBackend, MissionInfo};
pub use request::{CollageManifest, CompositionRequest, ManifestPhoto, Photo};
