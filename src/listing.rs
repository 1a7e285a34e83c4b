//! Image listing.
//!
//! Stage 1 of the preparation pipeline. Issues a single folder search
//! against the media service, newest public id first, and maps the raw
//! descriptors to [`ImageRecord`]s.
//!
//! ## Guarantees
//!
//! - At most `max_count` records, even if the service returns more.
//! - `sequence_index` is `0..count` in the order the service returned them.
//! - Every record has non-zero width and height; a descriptor without
//!   dimensions fails the listing rather than producing a broken record.
//!
//! There are no retries. This runs once per site build, and a failed build
//! is cheaper to rerun than a half-populated page is to debug.

use crate::service::{ListQuery, MediaService, ServiceError};
use crate::types::{ImageRecord, RawAssetDescriptor};
use tracing::debug;

/// List up to `max_count` images in `folder`.
pub fn list_images(
    service: &impl MediaService,
    folder: &str,
    max_count: usize,
) -> Result<Vec<ImageRecord>, ServiceError> {
    if max_count == 0 {
        return Ok(Vec::new());
    }

    let query = ListQuery::newest_first(folder, max_count);
    let descriptors = service.list(&query)?;
    debug!(
        folder = %query.folder,
        returned = descriptors.len(),
        cap = max_count,
        "listing complete"
    );
    records_from_descriptors(descriptors, max_count)
}

/// Cap, index, and validate raw descriptors.
pub fn records_from_descriptors(
    descriptors: Vec<RawAssetDescriptor>,
    max_count: usize,
) -> Result<Vec<ImageRecord>, ServiceError> {
    descriptors
        .into_iter()
        .take(max_count)
        .enumerate()
        .map(|(sequence_index, raw)| {
            if raw.width == 0 || raw.height == 0 {
                return Err(ServiceError::Malformed(format!(
                    "asset {} has no dimensions ({}x{})",
                    raw.public_id, raw.width, raw.height
                )));
            }
            Ok(ImageRecord {
                sequence_index,
                width: raw.width,
                height: raw.height,
                public_id: raw.public_id,
                format: raw.format,
                placeholder: None,
            })
        })
        .collect()
}
