//! Placeholder imaging — pure Rust via the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::load_from_memory` (JPEG, PNG, WebP, TIFF, GIF) |
//! | **Shrink** | `resize_exact` with `Lanczos3`, never upscaling |
//! | **Encode** | `JpegEncoder` (quality) or `PngEncoder` |
//! | **Inline** | `base64` standard engine → `data:` URI |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing the placeholder to produce
//! - **Data URI**: Encoding and parsing of `data:<mime>;base64,` strings
//! - **Placeholder**: Fetch + decode + shrink + encode for one record

mod calculations;
pub mod data_uri;
mod params;
pub mod placeholder;

pub use calculations::placeholder_dimensions;
pub use data_uri::{DataUri, encode_data_uri};
pub use params::{PlaceholderEncoding, PlaceholderSettings, Quality};
pub use placeholder::{PlaceholderError, generate_placeholder, placeholder_from_bytes};
