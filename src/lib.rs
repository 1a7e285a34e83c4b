//! # Gallery Prep
//!
//! Build-time data preparation for a static greeting page. The page shows a
//! handful of hosted photos; this crate fetches their metadata from the media
//! service and derives a tiny inline blur-up placeholder for each one, so the
//! rendering layer can paint something immediately while the full image loads.
//!
//! # Architecture: List → Fan-out → Merge
//!
//! ```text
//! 1. List      media service  →  Vec<ImageRecord>      (one search request)
//! 2. Fan-out   each record    →  data:image/jpeg;...   (one fetch per record, in parallel)
//! 3. Merge     records + URIs →  page-data.json        (positional, listing order)
//! ```
//!
//! The pipeline runs once per site build. Any failure in any stage fails the
//! whole build; there is no partial output and no retry. The rendering layer
//! assumes every record it receives carries a valid placeholder.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`listing`] | Stage 1 — search the configured folder and map results to [`types::ImageRecord`] |
//! | [`imaging`] | Placeholder generation: fetch, decode, shrink, re-encode, `data:` URI |
//! | [`prepare`] | Stages 2–3 — concurrent fan-out over records and positional merge |
//! | [`service`] | [`service::MediaService`] trait and the HTTP client for the hosted media API |
//! | [`config`] | `gallery-prep.toml` loading, environment overrides, validation |
//! | [`types`] | Records serialized into the page data consumed by the renderer |
//! | [`output`] | CLI output formatting for listing and preparation results |
//!
//! # Design Decisions
//!
//! ## A Trait at the Network Seam
//!
//! All outbound traffic goes through [`service::MediaService`], which exposes
//! exactly two calls: `list` and `fetch`. The production implementation is
//! [`service::CloudinaryService`]; tests swap in an in-memory service and can
//! inject failures at any index without touching the network.
//!
//! ## Thread Pool Instead of an Async Runtime
//!
//! The fan-out is at most a few dozen tiny downloads. A `rayon` pool with an
//! indexed parallel iterator gives both properties the pipeline needs for
//! free: results are collected in input order no matter which download
//! finishes first, and collecting into a `Result` stops at the first error.
//! The pool is built per run with one thread per record, not sized to the
//! CPU count, so every download starts at once even on a single core.
//!
//! ## Placeholders Are Never Defaulted
//!
//! A corrupt or missing image fails the build instead of falling back to a
//! grey square. A silent fallback would ship a page whose blur-up preview no
//! longer matches the photo it stands in for.

pub mod config;
pub mod imaging;
pub mod listing;
pub mod output;
pub mod prepare;
pub mod service;
pub mod types;
