//! Parameter types for placeholder generation.
//!
//! These describe *what* placeholder to produce; [`placeholder`](super::placeholder)
//! does the pixel work and [`service`](crate::service) does the transfer.
//!
//! - [`Quality`] — Lossy encoding quality (1–100, default 70). Clamped on construction.
//! - [`PlaceholderEncoding`] — Output codec of the inline image, with its MIME type.
//! - [`PlaceholderSettings`] — Bounding width + quality + encoding, resolved from config.

use crate::config::PlaceholderConfig;
use serde::{Deserialize, Serialize};

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(70)
    }
}

/// Codec used for the inline placeholder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderEncoding {
    /// Smallest payload; alpha is flattened.
    #[default]
    Jpeg,
    /// Lossless, keeps alpha.
    Png,
}

impl PlaceholderEncoding {
    pub fn mime(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }
}

/// Everything needed to turn one record into a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderSettings {
    /// Bounding width in pixels.
    pub width: u32,
    pub quality: Quality,
    pub encoding: PlaceholderEncoding,
}

impl PlaceholderSettings {
    pub fn from_config(config: &PlaceholderConfig) -> Self {
        Self {
            width: config.width.max(1),
            quality: Quality::new(config.quality),
            encoding: config.encoding,
        }
    }
}

impl Default for PlaceholderSettings {
    fn default() -> Self {
        Self::from_config(&PlaceholderConfig::default())
    }
}
