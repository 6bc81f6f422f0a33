//! Composition inputs.
//!
//! A [`CompositionRequest`] is what the compositor consumes: photo bytes in
//! display order plus the caption strings. A [`CollageManifest`] is its
//! serialisable twin, referring to photos by file path, used by the CLI and
//! by callers that queue compositions as JSON.
//!
//! # Example
//!
//! ```
//! use stichy_collage::CollageManifest;
//!
//! let json = r#"{
//!     "photos": [{ "path": "alice.jpg", "displayName": "Alice" }],
//!     "keyword": "Coffee",
//!     "emoji": "☕",
//!     "date": "2026.02.05",
//!     "groupName": "Best Friends"
//! }"#;
//!
//! let manifest = CollageManifest::from_json(json).unwrap();
//! assert_eq!(manifest.photos[0].display_name, "Alice");
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CollageError, CollageResult};

// ============================================================================
// Photo
// ============================================================================

/// One submitted photo: encoded image bytes and the submitter's display name.
#[derive(Clone, PartialEq, Eq)]
pub struct Photo {
    /// Encoded image data in any format the `image` crate can decode.
    pub data: Vec<u8>,
    /// Caption drawn in the photo's name tag.
    pub display_name: String,
}

impl Photo {
    pub fn new(data: impl Into<Vec<u8>>, display_name: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            display_name: display_name.into(),
        }
    }
}

impl std::fmt::Debug for Photo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Photo")
            .field("data", &format_args!("<{} bytes>", self.data.len()))
            .field("display_name", &self.display_name)
            .finish()
    }
}

// ============================================================================
// CompositionRequest
// ============================================================================

/// Everything needed to render one collage.
///
/// Photo order decides cell assignment: `photos[i]` goes into `cells[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompositionRequest {
    pub photos: Vec<Photo>,
    pub keyword: String,
    /// May be empty; the compositor substitutes its default emoji.
    pub emoji: String,
    /// Pre-formatted date string, shown verbatim.
    pub date: String,
    pub group_name: String,
}

impl CompositionRequest {
    /// Creates a request with no photos.
    pub fn new(
        keyword: impl Into<String>,
        emoji: impl Into<String>,
        date: impl Into<String>,
        group_name: impl Into<String>,
    ) -> Self {
        Self {
            photos: Vec::new(),
            keyword: keyword.into(),
            emoji: emoji.into(),
            date: date.into(),
            group_name: group_name.into(),
        }
    }

    /// Appends a photo.
    pub fn with_photo(mut self, photo: Photo) -> Self {
        self.photos.push(photo);
        self
    }

    /// Replaces the photo list.
    pub fn with_photos(mut self, photos: impl IntoIterator<Item = Photo>) -> Self {
        self.photos = photos.into_iter().collect();
        self
    }

    pub fn photo_count(&self) -> usize {
        self.photos.len()
    }
}

// ============================================================================
// CollageManifest
// ============================================================================

/// Serializable reference to a photo on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct ManifestPhoto {
    /// Path to the image file. Relative paths resolve against the manifest's directory.
    pub path: PathBuf,
    pub display_name: String,
}

/// Serializable composition request.
///
/// # JSON Format
///
/// ```json
/// {
///   "photos": [
///     { "path": "alice.jpg", "displayName": "Alice" },
///     { "path": "bob.png", "displayName": "Bob" }
///   ],
///   "keyword": "Coffee",
///   "emoji": "☕",
///   "date": "2026.02.05",
///   "groupName": "Best Friends"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct CollageManifest {
    #[serde(default)]
    pub photos: Vec<ManifestPhoto>,
    pub keyword: String,
    #[serde(default)]
    pub emoji: String,
    pub date: String,
    pub group_name: String,
}

impl CollageManifest {
    /// Serializes the manifest to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serializes the manifest to a pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Reads and parses a manifest file.
    pub fn from_path(path: &Path) -> CollageResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| CollageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_json(&json)?)
    }

    /// Reads every referenced photo and builds a [`CompositionRequest`].
    ///
    /// Relative photo paths are resolved against `base_dir`. Bytes are not
    /// decoded here; invalid images surface when the collage is composed.
    pub fn load(&self, base_dir: &Path) -> CollageResult<CompositionRequest> {
        let photos = self
            .photos
            .iter()
            .map(|entry| {
                let path = base_dir.join(&entry.path);
                let data = std::fs::read(&path).map_err(|source| CollageError::Io { path, source })?;
                Ok(Photo::new(data, entry.display_name.clone()))
            })
            .collect::<CollageResult<Vec<_>>>()?;

        Ok(CompositionRequest {
            photos,
            keyword: self.keyword.clone(),
            emoji: self.emoji.clone(),
            date: self.date.clone(),
            group_name: self.group_name.clone(),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
