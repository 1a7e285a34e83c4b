//! Page data preparation.
//!
//! Runs the whole pipeline: list the folder, generate one placeholder per
//! record in parallel, merge the placeholders back into their records, and
//! hand the finished [`PageData`] to the caller (or write it as JSON).
//!
//! ## Fan-out / Fan-in
//!
//! ```text
//!                 ┌─ generate_placeholder(r0) ─┐
//! list_images ──► ├─ generate_placeholder(r1) ─┤──► collect (in order) ──► zip with records
//!                 ├─ generate_placeholder(r2) ─┤
//!                 └─ generate_placeholder(r3) ─┘
//! ```
//!
//! Jobs run on a dedicated [rayon](https://docs.rs/rayon) pool with one
//! worker per record (or fewer, if `processing.max_processes` caps it), so
//! every download is in flight at once. The pool is not sized to the CPU
//! count: workers spend their time waiting on the network. The parallel
//! iterator is indexed, so collected results are in record order no matter
//! which download finishes first, and collecting into a `Result` stops at
//! the first error. Jobs already in flight may still finish; their results
//! are dropped. Either every record gets a placeholder or none is returned.
//!
//! ## Output
//!
//! ```json
//! {
//!   "folder": "teachers-day",
//!   "images": [
//!     { "id": 0, "width": 1200, "height": 800, "public_id": "teachers-day/b",
//!       "format": "jpg", "blur_data_url": "data:image/jpeg;base64,/9j/4AAQ..." }
//!   ]
//! }
//! ```

use crate::config::GalleryConfig;
use crate::imaging::{PlaceholderError, PlaceholderSettings, generate_placeholder};
use crate::listing::list_images;
use crate::service::{MediaService, ServiceError};
use crate::types::{ImageRecord, PageData};
use rayon::prelude::*;
use std::path::Path;
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum PrepareError {
    #[error("Listing failed: {0}")]
    Listing(#[from] ServiceError),
    #[error("Placeholder for image {index} ({public_id}) failed: {source}")]
    Placeholder {
        index: usize,
        public_id: String,
        #[source]
        source: PlaceholderError,
    },
    #[error("Placeholder count mismatch: {records} records, {placeholders} placeholders")]
    Mismatch { records: usize, placeholders: usize },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Could not start fetch workers: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// What to prepare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepareSettings {
    pub folder: String,
    pub max_results: usize,
    pub placeholder: PlaceholderSettings,
    /// Cap on concurrent fetches; `None` fetches every record at once.
    pub max_parallel: Option<usize>,
}

impl PrepareSettings {
    pub fn from_config(config: &GalleryConfig) -> Self {
        Self {
            folder: config.listing.folder.clone(),
            max_results: config.listing.max_results,
            placeholder: PlaceholderSettings::from_config(&config.placeholder),
            max_parallel: config.processing.max_processes,
        }
    }
}

/// Progress reported while preparing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrepareEvent {
    /// The listing returned `count` records.
    Listed { folder: String, count: usize },
    /// One placeholder finished. Arrives in completion order, not record order.
    PlaceholderReady {
        index: usize,
        public_id: String,
        bytes: usize,
    },
    /// All placeholders merged.
    Complete { count: usize },
}

/// List, fan out placeholder generation, and merge.
///
/// Any listing, fetch, or decode failure fails the whole call and no
/// [`PageData`] is produced.
pub fn prepare(
    service: &impl MediaService,
    settings: &PrepareSettings,
    events: Option<Sender<PrepareEvent>>,
) -> Result<PageData, PrepareError> {
    let send = |event: PrepareEvent| {
        if let Some(tx) = &events {
            // A dropped receiver only loses progress output.
            let _ = tx.send(event);
        }
    };

    let records = list_images(service, &settings.folder, settings.max_results)?;
    send(PrepareEvent::Listed {
        folder: settings.folder.clone(),
        count: records.len(),
    });

    let workers = worker_count(settings.max_parallel, records.len());
    let placeholders = generate_all(service, &records, &settings.placeholder, workers, &send)?;
    let images = attach_placeholders(records, placeholders)?;

    send(PrepareEvent::Complete {
        count: images.len(),
    });
    Ok(PageData {
        folder: settings.folder.clone(),
        images,
    })
}

/// Number of fetch workers for `jobs` records.
///
/// One per record unless `max_parallel` caps it; never zero.
pub fn worker_count(max_parallel: Option<usize>, jobs: usize) -> usize {
    max_parallel.map_or(jobs, |cap| jobs.min(cap)).max(1)
}

/// Generate placeholders for every record concurrently on `workers` threads.
///
/// The i-th string belongs to the i-th record.
fn generate_all(
    service: &impl MediaService,
    records: &[ImageRecord],
    settings: &PlaceholderSettings,
    workers: usize,
    send: &(impl Fn(PrepareEvent) + Sync),
) -> Result<Vec<String>, PrepareError> {
    if records.is_empty() {
        return Ok(Vec::new());
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("fetch-{i}"))
        .build()?;
    debug!(workers, jobs = records.len(), "fanning out placeholder fetches");

    pool.install(|| {
        records
            .par_iter()
            .with_max_len(1)
            .map(|record| {
                let placeholder =
                    generate_placeholder(service, record, settings).map_err(|source| {
                        warn!(
                            index = record.sequence_index,
                            public_id = %record.public_id,
                            error = %source,
                            "placeholder failed"
                        );
                        PrepareError::Placeholder {
                            index: record.sequence_index,
                            public_id: record.public_id.clone(),
                            source,
                        }
                    })?;
                debug!(
                    index = record.sequence_index,
                    len = placeholder.len(),
                    "placeholder ready"
                );
                send(PrepareEvent::PlaceholderReady {
                    index: record.sequence_index,
                    public_id: record.public_id.clone(),
                    bytes: placeholder.len(),
                });
                Ok(placeholder)
            })
            .collect()
    })
}

/// Merge placeholders into records by position.
pub fn attach_placeholders(
    records: Vec<ImageRecord>,
    placeholders: Vec<String>,
) -> Result<Vec<ImageRecord>, PrepareError> {
    if records.len() != placeholders.len() {
        return Err(PrepareError::Mismatch {
            records: records.len(),
            placeholders: placeholders.len(),
        });
    }
    Ok(records
        .into_iter()
        .zip(placeholders)
        .map(|(record, placeholder)| record.with_placeholder(placeholder))
        .collect())
}

/// Write page data as pretty JSON, creating parent directories.
pub fn write_page_data(page: &PageData, path: &Path) -> Result<(), PrepareError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(page)?;
    std::fs::write(path, json)?;
    Ok(())
}
