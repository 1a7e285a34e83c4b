//! CLI output formatting.
//!
//! Every image is shown by its page id (zero-padded) and delivered file
//! name, with details on indented lines below:
//!
//! ## List
//!
//! ```text
//! Folder teachers-day (4 images)
//! 000 teachers-day/photo-5.jpg (1200x800)
//! 001 teachers-day/photo-4.jpg (800x1000)
//! ```
//!
//! ## Prepare
//!
//! ```text
//! Folder teachers-day (4 images)
//!     002 teachers-day/photo-3: placeholder ready (412 chars)
//!     000 teachers-day/photo-5: placeholder ready (398 chars)
//!     ...
//! Merged 4 placeholders
//!
//! 000 teachers-day/photo-5.jpg (1200x800)
//!     Placeholder: image/jpeg, 296 bytes
//! ...
//! Wrote 4 images → page-data.json
//! ```
//!
//! Placeholder-ready lines arrive in completion order; the summary is in
//! page order.
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout.

use crate::imaging::DataUri;
use crate::prepare::PrepareEvent;
use crate::types::{ImageRecord, PageData};
use std::path::Path;
use std::thread::JoinHandle;
use tracing::warn;

/// Format a page id as 3-digit zero-padded.
fn format_index(index: usize) -> String {
    format!("{:0>3}", index)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

/// `000 folder/name.jpg (1200x800)`
fn record_line(record: &ImageRecord) -> String {
    format!(
        "{} {} ({}x{})",
        format_index(record.sequence_index),
        record.file_name(),
        record.width,
        record.height
    )
}

fn folder_header(folder: &str, count: usize) -> String {
    format!("Folder {} ({})", folder, plural(count, "image"))
}

// ============================================================================
// List
// ============================================================================

pub fn format_listing_output(folder: &str, records: &[ImageRecord]) -> Vec<String> {
    let mut lines = vec![folder_header(folder, records.len())];
    lines.extend(records.iter().map(record_line));
    lines
}

pub fn print_listing_output(folder: &str, records: &[ImageRecord]) {
    for line in format_listing_output(folder, records) {
        println!("{}", line);
    }
}

// ============================================================================
// Prepare
// ============================================================================

pub fn format_prepare_event(event: &PrepareEvent) -> Vec<String> {
    match event {
        PrepareEvent::Listed { folder, count } => vec![folder_header(folder, *count)],
        PrepareEvent::PlaceholderReady {
            index,
            public_id,
            bytes,
        } => vec![format!(
            "{}{} {}: placeholder ready ({} chars)",
            indent(1),
            format_index(*index),
            public_id,
            bytes
        )],
        PrepareEvent::Complete { count } => {
            vec![format!("Merged {}", plural(*count, "placeholder"))]
        }
    }
}

/// Format the finished page data, one entry per image in page order.
pub fn format_page_summary(page: &PageData, output: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    for record in &page.images {
        lines.push(record_line(record));
        let detail = match record.placeholder.as_deref().map(DataUri::parse) {
            Some(Some(uri)) => format!("Placeholder: {}, {} bytes", uri.mime, uri.decoded_len()),
            Some(None) => "Placeholder: (not a data URI)".to_string(),
            None => "Placeholder: (missing)".to_string(),
        };
        lines.push(format!("{}{}", indent(1), detail));
    }
    lines.push(format!(
        "Wrote {} \u{2192} {}",
        plural(page.images.len(), "image"),
        output.display()
    ));
    lines
}

pub fn print_page_summary(page: &PageData, output: &Path) {
    for line in format_page_summary(page, output) {
        println!("{}", line);
    }
}

/// Wait for the progress printer thread.
///
/// Returns `false` if it panicked. That loses progress lines, not page data,
/// so it is logged rather than failing the run.
pub fn join_printer(printer: JoinHandle<()>) -> bool {
    match printer.join() {
        Ok(()) => true,
        Err(_) => {
            warn!("progress printer panicked; some progress lines may be missing");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::encode_data_uri;

    fn record(index: usize, id: &str) -> ImageRecord {
        ImageRecord {
            sequence_index: index,
            width: 1200,
            height: 800,
            public_id: id.to_string(),
            format: "jpg".to_string(),
            placeholder: None,
        }
    }

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(0), "000");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1234), "1234");
    }

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn plural_forms() {
        assert_eq!(plural(1, "image"), "1 image");
        assert_eq!(plural(0, "image"), "0 images");
        assert_eq!(plural(4, "image"), "4 images");
    }

    #[test]
    fn listing_output() {
        let records = vec![record(0, "f/b"), record(1, "f/a")];
        let lines = format_listing_output("f", &records);
        assert_eq!(
            lines,
            vec![
                "Folder f (2 images)",
                "000 f/b.jpg (1200x800)",
                "001 f/a.jpg (1200x800)",
            ]
        );
    }

    #[test]
    fn listing_output_empty() {
        let lines = format_listing_output("empty", &[]);
        assert_eq!(lines, vec!["Folder empty (0 images)"]);
    }

    #[test]
    fn prepare_events() {
        assert_eq!(
            format_prepare_event(&PrepareEvent::Listed {
                folder: "f".into(),
                count: 1
            }),
            vec!["Folder f (1 image)"]
        );
        assert_eq!(
            format_prepare_event(&PrepareEvent::PlaceholderReady {
                index: 3,
                public_id: "f/x".into(),
                bytes: 398
            }),
            vec!["    003 f/x: placeholder ready (398 chars)"]
        );
        assert_eq!(
            format_prepare_event(&PrepareEvent::Complete { count: 4 }),
            vec!["Merged 4 placeholders"]
        );
    }

    #[test]
    fn page_summary_reports_placeholder_sizes() {
        let page = PageData {
            folder: "f".into(),
            images: vec![
                record(0, "f/b").with_placeholder(encode_data_uri("image/jpeg", &[0; 10])),
                record(1, "f/a"),
                record(2, "f/c").with_placeholder("oops".into()),
            ],
        };
        let lines = format_page_summary(&page, Path::new("out/page-data.json"));
        assert_eq!(
            lines,
            vec![
                "000 f/b.jpg (1200x800)",
                "    Placeholder: image/jpeg, 10 bytes",
                "001 f/a.jpg (1200x800)",
                "    Placeholder: (missing)",
                "002 f/c.jpg (1200x800)",
                "    Placeholder: (not a data URI)",
                "Wrote 3 images \u{2192} out/page-data.json",
            ]
        );
    }

    #[test]
    fn join_printer_reports_panics() {
        assert!(join_printer(std::thread::spawn(|| {})));
        assert!(!join_printer(std::thread::spawn(|| panic!("printer died"))));
    }
}
