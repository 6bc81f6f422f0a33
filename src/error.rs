use std::path::PathBuf;

pub type CollageResult<T> = Result<T, CollageError>;

/// Everything that can make a composition fail.
///
/// A composition is all-or-nothing: the first error aborts the whole call and
/// no partial image is produced.
#[derive(thiserror::Error, Debug)]
pub enum CollageError {
    #[error("photo {index} could not be decoded: {source}")]
    InvalidImage {
        index: usize,
        #[source]
        source: image::ImageError,
    },

    #[error("overlay markup rejected: {0}")]
    Svg(#[from] resvg::usvg::Error),

    #[error("cannot allocate a {width}x{height} raster surface")]
    Pixmap { width: u32, height: u32 },

    #[error("collage encoding failed: {0}")]
    Encode(#[source] image::ImageError),

    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("manifest error: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("backend error: {0}")]
    Backend(String),
}

impl CollageError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Index of the offending photo, for errors tied to a single photo.
    pub fn photo_index(&self) -> Option<usize> {
        match self {
            Self::InvalidImage { index, .. } => Some(*index),
            _ => None,
        }
    }
}
