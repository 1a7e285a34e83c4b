//! End-to-end pipeline tests against an in-memory media service.
//!
//! The service sleeps a different amount per asset, earlier entries longest,
//! and records how many fetches overlap and the order they finish in. With
//! every fetch in flight at once they complete in reverse listing order, so a
//! merge that followed completion order would scramble the page.

use gallery_prep::config::GalleryConfig;
use gallery_prep::imaging::{DataUri, PlaceholderEncoding, PlaceholderSettings};
use gallery_prep::listing::list_images;
use gallery_prep::prepare::{PrepareError, PrepareSettings, prepare, write_page_data};
use gallery_prep::service::{FetchError, FetchParams, ListQuery, MediaService, ServiceError};
use gallery_prep::types::{PageData, RawAssetDescriptor};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;

struct FakeHost {
    listing: Vec<RawAssetDescriptor>,
    assets: HashMap<String, (usize, Vec<u8>, Duration)>,
    fail: Option<String>,
    fetches: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    finished: Mutex<Vec<usize>>,
}

impl FakeHost {
    /// `count` assets, newest first, each a solid gray whose level encodes
    /// its listing position. Earlier entries respond slower.
    fn with_assets(count: usize) -> Self {
        let listing: Vec<RawAssetDescriptor> = (0..count)
            .map(|i| RawAssetDescriptor {
                public_id: format!("teachers-day/note-{:02}", count - i),
                format: "jpg".to_string(),
                width: 1200,
                height: 900,
            })
            .collect();
        let assets = listing
            .iter()
            .enumerate()
            .map(|(i, d)| {
                let delay = Duration::from_millis(((count - i) * 40) as u64);
                (d.public_id.clone(), (i, gray_png(marker(i)), delay))
            })
            .collect();
        Self {
            listing,
            assets,
            fail: None,
            fetches: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            finished: Mutex::new(Vec::new()),
        }
    }

    fn finish_order(&self) -> Vec<usize> {
        self.finished.lock().unwrap().clone()
    }
}

impl MediaService for FakeHost {
    fn list(&self, query: &ListQuery) -> Result<Vec<RawAssetDescriptor>, ServiceError> {
        assert_eq!(query.expression(), "folder:teachers-day/*");
        Ok(self.listing.clone())
    }

    fn fetch(&self, params: &FetchParams) -> Result<Vec<u8>, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail.as_deref() == Some(params.public_id.as_str()) {
            return Err(FetchError::Status {
                public_id: params.public_id.clone(),
                status: 503,
            });
        }
        let (index, bytes, delay) = self
            .assets
            .get(&params.public_id)
            .cloned()
            .ok_or_else(|| FetchError::EmptyBody {
                public_id: params.public_id.clone(),
            })?;

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(delay);
        self.finished.lock().unwrap().push(index);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(bytes)
    }
}

fn marker(index: usize) -> u8 {
    (index as u8) * 40 + 20
}

fn gray_png(level: u8) -> Vec<u8> {
    let img = RgbImage::from_pixel(8, 6, Rgb([level, level, level]));
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf)
        .write_image(img.as_raw(), 8, 6, ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

fn settings(max_results: usize, encoding: PlaceholderEncoding) -> PrepareSettings {
    PrepareSettings {
        folder: "teachers-day".to_string(),
        max_results,
        placeholder: PlaceholderSettings {
            encoding,
            ..PlaceholderSettings::default()
        },
        max_parallel: None,
    }
}

fn gray_level(data_uri: &str) -> u8 {
    let uri = DataUri::parse(data_uri).expect("data:<mime>;base64,<payload>");
    let img = image::load_from_memory(&uri.decode().unwrap())
        .unwrap()
        .to_rgb8();
    img.get_pixel(4, 3).0[0]
}

#[test]
fn six_listed_four_kept() {
    let host = FakeHost::with_assets(6);
    let records = list_images(&host, "teachers-day", 4).unwrap();

    assert_eq!(records.len(), 4);
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record.sequence_index, i);
        assert_eq!(record.public_id, host.listing[i].public_id);
    }
}

#[test]
fn placeholders_follow_listing_order_not_completion_order() {
    let host = FakeHost::with_assets(4);
    let page = prepare(&host, &settings(4, PlaceholderEncoding::Png), None).unwrap();
    assert_ne!(host.finish_order(), vec![0, 1, 2, 3]);

    for (i, record) in page.images.iter().enumerate() {
        assert_eq!(record.sequence_index, i);
        assert_eq!(
            gray_level(record.placeholder.as_deref().unwrap()),
            marker(i),
            "record {i}"
        );
    }
    assert_eq!(host.fetches.load(Ordering::SeqCst), 4);
}

#[test]
fn every_fetch_is_in_flight_at_once() {
    let host = FakeHost::with_assets(4);
    prepare(&host, &settings(4, PlaceholderEncoding::Jpeg), None).unwrap();

    assert_eq!(host.peak_in_flight.load(Ordering::SeqCst), 4);
    // Slowest first in the listing, so overlapping fetches finish backwards.
    assert_eq!(host.finish_order(), vec![3, 2, 1, 0]);
}

#[test]
fn max_parallel_bounds_in_flight_fetches() {
    let host = FakeHost::with_assets(4);
    let capped = PrepareSettings {
        max_parallel: Some(2),
        ..settings(4, PlaceholderEncoding::Jpeg)
    };
    let page = prepare(&host, &capped, None).unwrap();

    assert!(host.peak_in_flight.load(Ordering::SeqCst) <= 2);
    assert_eq!(page.images.len(), 4);
    assert!(page.images.iter().all(|r| r.placeholder.is_some()));
}

#[test]
fn jpeg_placeholders_are_data_uris_of_images() {
    let host = FakeHost::with_assets(4);
    let page = prepare(&host, &settings(4, PlaceholderEncoding::Jpeg), None).unwrap();

    for record in &page.images {
        let placeholder = record.placeholder.as_deref().unwrap();
        assert!(placeholder.starts_with("data:image/jpeg;base64,"));
        let uri = DataUri::parse(placeholder).unwrap();
        let img = image::load_from_memory(&uri.decode().unwrap()).unwrap();
        assert!(img.width() <= 8);
    }
}

#[test]
fn third_fetch_failing_rejects_the_page() {
    let mut host = FakeHost::with_assets(4);
    host.fail = Some(host.listing[2].public_id.clone());

    let result = prepare(&host, &settings(4, PlaceholderEncoding::Jpeg), None);

    match result {
        Err(PrepareError::Placeholder { index, .. }) => assert_eq!(index, 2),
        other => panic!("expected placeholder failure, got {other:?}"),
    }
}

#[test]
fn default_config_settings_drive_the_pipeline() {
    let mut config = GalleryConfig::default();
    config.listing.folder = "teachers-day".to_string();
    let host = FakeHost::with_assets(6);

    let page = prepare(&host, &PrepareSettings::from_config(&config), None).unwrap();
    assert_eq!(page.images.len(), 4);
    assert!(page.images.iter().all(|r| r.placeholder.is_some()));
}

#[test]
fn page_data_file_matches_renderer_contract() {
    let tmp = TempDir::new().unwrap();
    let host = FakeHost::with_assets(2);
    let page = prepare(&host, &settings(4, PlaceholderEncoding::Jpeg), None).unwrap();

    let path = tmp.path().join("page-data.json");
    write_page_data(&page, &path).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["folder"], "teachers-day");
    let first = &raw["images"][0];
    assert_eq!(first["id"], 0);
    assert_eq!(first["public_id"], "teachers-day/note-02");
    assert_eq!(first["width"], 1200);
    assert!(first["blur_data_url"].as_str().unwrap().starts_with("data:"));

    let parsed: PageData = serde_json::from_value(raw).unwrap();
    assert_eq!(parsed, page);
}
