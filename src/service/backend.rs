//! Media service trait and shared error types.
//!
//! The [`MediaService`] trait is the only network seam in the crate: one
//! call to list a folder, one call to download a transformed asset. The
//! production implementation is
//! [`CloudinaryService`](super::cloudinary::CloudinaryService); tests use an
//! in-memory mock.

use super::params::{FetchParams, ListQuery};
use crate::types::RawAssetDescriptor;
use thiserror::Error;

/// Listing failures: transport, auth, or a response we can't use.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("search request failed with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed search response: {0}")]
    Malformed(String),
    #[error("missing credential: {0} is not set")]
    MissingCredential(&'static str),
}

/// Asset download failures.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error fetching {public_id}: {source}")]
    Http {
        public_id: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("fetching {public_id} failed with status {status}")]
    Status { public_id: String, status: u16 },
    #[error("fetching {public_id} returned an empty body")]
    EmptyBody { public_id: String },
}

/// Outbound calls to the media host.
///
/// `Sync` so a single service can be shared across the worker pool.
pub trait MediaService: Sync {
    /// Run a folder search. Implementations return what the service sent;
    /// capping and validation happen in [`listing`](crate::listing).
    fn list(&self, query: &ListQuery) -> Result<Vec<RawAssetDescriptor>, ServiceError>;

    /// Download one transformed asset.
    fn fetch(&self, params: &FetchParams) -> Result<Vec<u8>, FetchError>;
}
