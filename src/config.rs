//! Build configuration.
//!
//! Handles loading, validating, and overriding `gallery-prep.toml`. Stock
//! defaults are the base layer; a user config file (if present) is merged on
//! top, then a small set of environment variables override the result.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [service]
//! cloud_name = ""                               # or CLOUDINARY_CLOUD_NAME
//! api_base = "https://api.cloudinary.com/v1_1"  # Search API root
//! delivery_base = "https://res.cloudinary.com"  # Image delivery root
//! timeout_secs = 30                             # Per-request timeout
//!
//! [listing]
//! folder = ""                                   # or CLOUDINARY_FOLDER
//! max_results = 4                               # Cap on listed images
//!
//! [placeholder]
//! width = 8                                     # Bounding width in pixels
//! quality = 70                                  # Fetch + JPEG quality (1-100)
//! encoding = "jpeg"                             # "jpeg" or "png"
//!
//! [processing]
//! max_processes = 4                             # Cap on parallel fetches (omit: one per image)
//! ```
//!
//! ## Secrets
//!
//! API credentials are never read from the config file. They come from
//! `CLOUDINARY_API_KEY` / `CLOUDINARY_API_SECRET`; see
//! [`Credentials`](crate::service::Credentials).
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::PlaceholderEncoding;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILENAME: &str = "gallery-prep.toml";

/// Environment variable overriding `service.cloud_name`.
pub const ENV_CLOUD_NAME: &str = "CLOUDINARY_CLOUD_NAME";
/// Environment variable overriding `listing.folder`.
pub const ENV_FOLDER: &str = "CLOUDINARY_FOLDER";

/// Upper bound the search API accepts for `max_results`.
const MAX_RESULTS_LIMIT: usize = 500;
/// Anything wider than this is no longer a blur placeholder.
const MAX_PLACEHOLDER_WIDTH: u32 = 64;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `gallery-prep.toml`.
///
/// All fields have defaults; a config file only needs the values it
/// overrides. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Media service endpoints and account.
    pub service: ServiceConfig,
    /// Which assets to list and how many.
    pub listing: ListingConfig,
    /// Placeholder size and encoding.
    pub placeholder: PlaceholderConfig,
    /// Parallel fetch settings.
    pub processing: ProcessingConfig,
}

impl GalleryConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.listing.max_results == 0 || self.listing.max_results > MAX_RESULTS_LIMIT {
            return Err(ConfigError::Validation(format!(
                "listing.max_results must be 1-{MAX_RESULTS_LIMIT}"
            )));
        }
        if self.placeholder.width == 0 || self.placeholder.width > MAX_PLACEHOLDER_WIDTH {
            return Err(ConfigError::Validation(format!(
                "placeholder.width must be 1-{MAX_PLACEHOLDER_WIDTH}"
            )));
        }
        if !(1..=100).contains(&self.placeholder.quality) {
            return Err(ConfigError::Validation(
                "placeholder.quality must be 1-100".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        if self.service.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "service.timeout_secs must be non-zero".into(),
            ));
        }
        Ok(())
    }

    /// Checks that only matter once we actually talk to the service.
    pub fn validate_remote(&self) -> Result<(), ConfigError> {
        if self.service.cloud_name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "service.cloud_name is empty (set it in {CONFIG_FILENAME} or {ENV_CLOUD_NAME})"
            )));
        }
        if self.listing.folder.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "listing.folder is empty (set it in {CONFIG_FILENAME} or {ENV_FOLDER})"
            )));
        }
        Ok(())
    }

    /// Apply environment overrides. Empty values are ignored.
    ///
    /// Takes a lookup function so tests don't have to mutate the process
    /// environment.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(cloud_name) = non_empty(ENV_CLOUD_NAME) {
            self.service.cloud_name = cloud_name;
        }
        if let Some(folder) = non_empty(ENV_FOLDER) {
            self.listing.folder = folder;
        }
    }
}

/// Media service endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Account name, the first path segment of every API and delivery URL.
    pub cloud_name: String,
    pub api_base: String,
    pub delivery_base: String,
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            cloud_name: String::new(),
            api_base: "https://api.cloudinary.com/v1_1".to_string(),
            delivery_base: "https://res.cloudinary.com".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Listing settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListingConfig {
    /// Virtual folder whose assets are listed (prefix match).
    pub folder: String,
    /// Maximum number of images on the page.
    pub max_results: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            folder: String::new(),
            max_results: 4,
        }
    }
}

/// Placeholder generation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlaceholderConfig {
    /// Bounding width requested from the service and used for the output.
    pub width: u32,
    /// Quality for the delivery transformation and the JPEG re-encode.
    pub quality: u32,
    pub encoding: PlaceholderEncoding,
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self {
            width: 8,
            quality: 70,
            encoding: PlaceholderEncoding::Jpeg,
        }
    }
}

/// Parallel fetch settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Upper bound on concurrent placeholder fetches.
    ///
    /// Fetches are network-bound, so this is not tied to the CPU count.
    /// When absent every listed image is fetched at once.
    pub max_processes: Option<usize>,
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(GalleryConfig::default()).expect("default config must serialize")
}

/// Layer `overlay` onto `base` in place.
///
/// Tables merge key by key, so a file that sets one `[placeholder]` key
/// keeps the stock values of its siblings. Any other overlay value replaces
/// whatever `base` held at that key.
pub fn merge_toml(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(table), toml::Value::Table(layer)) => {
            for (key, value) in layer {
                match table.get_mut(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => {
                        table.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Read the user's config file, if there is one.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(toml::from_str(&content)?))
}

/// Merge an optional overlay onto the stock defaults and deserialize.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<GalleryConfig, ConfigError> {
    let mut merged = stock_defaults_value();
    if let Some(overlay) = overlay {
        merge_toml(&mut merged, overlay);
    }
    Ok(merged.try_into()?)
}

/// Load config from `path`, apply overrides from the process environment,
/// and validate.
///
/// A missing file is not an error: every value has a default or an
/// environment override.
pub fn load_config(path: &Path) -> Result<GalleryConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// [`load_config`] with an explicit environment lookup.
pub fn load_config_with_env(
    path: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<GalleryConfig, ConfigError> {
    let mut config = resolve_config(load_raw_config(path)?)?;
    config.apply_env_overrides(lookup);
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `gallery-prep.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Gallery Prep Configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Credentials are read from the environment only:
#   CLOUDINARY_API_KEY, CLOUDINARY_API_SECRET
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Media service
# ---------------------------------------------------------------------------
[service]
# Account name. CLOUDINARY_CLOUD_NAME overrides this value.
cloud_name = ""

# Root of the search API; the account name is appended.
api_base = "https://api.cloudinary.com/v1_1"

# Root of image delivery URLs; the account name is appended.
delivery_base = "https://res.cloudinary.com"

# Timeout for each request, in seconds.
timeout_secs = 30

# ---------------------------------------------------------------------------
# Listing
# ---------------------------------------------------------------------------
[listing]
# Virtual folder to list. CLOUDINARY_FOLDER overrides this value.
folder = ""

# Number of images shown on the page (newest public id first).
max_results = 4

# ---------------------------------------------------------------------------
# Blur-up placeholders
# ---------------------------------------------------------------------------
[placeholder]
# Bounding width in pixels. Height follows the image's aspect ratio.
width = 8

# Quality used for the downloaded rendition and the JPEG re-encode (1-100).
quality = 70

# Encoding of the inline placeholder: "jpeg" or "png".
encoding = "jpeg"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Cap on concurrent placeholder downloads.
# Omit or comment out to download every listed image at once.
# max_processes = 4
"##
}
