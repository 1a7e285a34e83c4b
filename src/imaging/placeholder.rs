//! Blur-up placeholder generation.
//!
//! ```text
//! fetch (service, f_jpg,w_8)  →  decode  →  shrink (Lanczos3, never upscale)
//!     →  re-encode (JPEG q70 | PNG)  →  data:<mime>;base64,<payload>
//! ```
//!
//! The service already scales the image down, so the shrink step is usually
//! a no-op. It still runs because the delivery API is allowed to ignore the
//! width hint (e.g. for formats it can't transform) and the page relies on
//! placeholders staying tiny.

use super::calculations::placeholder_dimensions;
use super::data_uri::encode_data_uri;
use super::params::{PlaceholderEncoding, PlaceholderSettings};
use crate::service::{FetchError, FetchParams, MediaService};
use crate::types::ImageRecord;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, GenericImageView, ImageEncoder};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlaceholderError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("failed to decode {public_id}: {source}")]
    Decode {
        public_id: String,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to encode placeholder for {public_id}: {source}")]
    Encode {
        public_id: String,
        #[source]
        source: image::ImageError,
    },
}

/// Produce the inline placeholder for one record.
///
/// One outbound fetch per call; nothing is cached between calls.
pub fn generate_placeholder(
    service: &impl MediaService,
    record: &ImageRecord,
    settings: &PlaceholderSettings,
) -> Result<String, PlaceholderError> {
    let params = FetchParams::for_record(record, settings);
    let bytes = service.fetch(&params)?;
    placeholder_from_bytes(&record.public_id, &bytes, settings)
}

/// Decode fetched bytes and turn them into a `data:` URI.
pub fn placeholder_from_bytes(
    public_id: &str,
    bytes: &[u8],
    settings: &PlaceholderSettings,
) -> Result<String, PlaceholderError> {
    let img = image::load_from_memory(bytes).map_err(|source| PlaceholderError::Decode {
        public_id: public_id.to_string(),
        source,
    })?;

    let small = shrink(img, settings.width);
    let encoded = encode(&small, settings).map_err(|source| PlaceholderError::Encode {
        public_id: public_id.to_string(),
        source,
    })?;
    Ok(encode_data_uri(settings.encoding.mime(), &encoded))
}

fn shrink(img: DynamicImage, max_width: u32) -> DynamicImage {
    let (width, height) = placeholder_dimensions(img.dimensions(), max_width);
    if (width, height) == img.dimensions() {
        img
    } else {
        img.resize_exact(width, height, FilterType::Lanczos3)
    }
}

fn encode(img: &DynamicImage, settings: &PlaceholderSettings) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    let (width, height) = img.dimensions();
    match settings.encoding {
        PlaceholderEncoding::Jpeg => {
            let rgb = img.to_rgb8();
            JpegEncoder::new_with_quality(&mut buf, settings.quality.value() as u8).write_image(
                rgb.as_raw(),
                width,
                height,
                ExtendedColorType::Rgb8,
            )?;
        }
        PlaceholderEncoding::Png => {
            let rgba = img.to_rgba8();
            PngEncoder::new(&mut buf).write_image(
                rgba.as_raw(),
                width,
                height,
                ExtendedColorType::Rgba8,
            )?;
        }
    }
    Ok(buf)
}
