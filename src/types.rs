//! Shared types passed between the listing, preparation and output stages.
//!
//! [`ImageRecord`] and [`PageData`] are serialized into the page data file
//! and must keep their JSON field names stable for the rendering layer.

use serde::{Deserialize, Serialize};

/// One asset as returned by the media service search.
///
/// The service returns many more fields (bytes, created_at, tags, ...); only
/// the four consumed here are part of the contract. Missing dimensions
/// deserialize as `0` and are rejected by the listing stage.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawAssetDescriptor {
    pub public_id: String,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

/// A listed image, optionally carrying its blur-up placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Dense 0-based position in the listing order. The only identifier the
    /// page uses to address an image.
    #[serde(rename = "id")]
    pub sequence_index: usize,
    pub width: u32,
    pub height: u32,
    /// Opaque handle to the hosted asset (includes the folder path).
    pub public_id: String,
    /// File extension reported by the service (`jpg`, `png`, ...).
    pub format: String,
    /// `data:<mime>;base64,<payload>` once populated.
    #[serde(
        rename = "blur_data_url",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub placeholder: Option<String>,
}

impl ImageRecord {
    /// `public_id.format`, the name the asset is delivered under.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.public_id, self.format)
    }

    /// Consume the record and return it with its placeholder set.
    pub fn with_placeholder(self, placeholder: String) -> Self {
        Self {
            placeholder: Some(placeholder),
            ..self
        }
    }
}

/// The artifact handed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageData {
    pub folder: String,
    pub images: Vec<ImageRecord>,
}
