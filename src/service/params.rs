//! Request parameters for the two outbound calls.
//!
//! - [`ListQuery`] — folder search, sort key/direction, result cap.
//! - [`FetchParams`] — one asset at a reduced width and quality.

use crate::imaging::{PlaceholderSettings, Quality};
use crate::types::ImageRecord;

/// Sort direction understood by the search API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// A folder search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// Virtual folder path, without trailing slash.
    pub folder: String,
    pub sort_by: String,
    pub direction: SortDirection,
    pub max_results: usize,
}

impl ListQuery {
    /// Assets in `folder`, highest public id first.
    pub fn newest_first(folder: &str, max_results: usize) -> Self {
        Self {
            folder: folder.trim().trim_end_matches('/').to_string(),
            sort_by: "public_id".to_string(),
            direction: SortDirection::Desc,
            max_results,
        }
    }

    /// Search expression matching everything below the folder.
    pub fn expression(&self) -> String {
        format!("folder:{}/*", self.folder)
    }
}

/// A reduced-size download of one asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchParams {
    pub public_id: String,
    pub format: String,
    pub width: u32,
    pub quality: Quality,
}

impl FetchParams {
    pub fn for_record(record: &ImageRecord, settings: &PlaceholderSettings) -> Self {
        Self {
            public_id: record.public_id.clone(),
            format: record.format.clone(),
            width: settings.width,
            quality: settings.quality,
        }
    }

    /// Delivery transformation: JPEG at the bounding width and quality.
    ///
    /// The service always delivers JPEG here regardless of the stored
    /// format, so decoding never depends on the upload's codec.
    pub fn transformation(&self) -> String {
        format!("f_jpg,w_{},q_{}", self.width, self.quality.value())
    }

    /// Path of the transformed asset below `<cloud>/image/upload/`.
    pub fn asset_path(&self) -> String {
        if self.format.is_empty() {
            format!("{}/{}", self.transformation(), self.public_id)
        } else {
            format!(
                "{}/{}.{}",
                self.transformation(),
                self.public_id,
                self.format
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expression_matches_folder_contents() {
        let q = ListQuery::newest_first("teachers-day", 4);
        assert_eq!(q.expression(), "folder:teachers-day/*");
        assert_eq!(q.sort_by, "public_id");
        assert_eq!(q.direction, SortDirection::Desc);
        assert_eq!(q.max_results, 4);
    }

    #[test]
    fn folder_trailing_slash_trimmed() {
        let q = ListQuery::newest_first(" events/2023/ ", 4);
        assert_eq!(q.expression(), "folder:events/2023/*");
    }

    #[test]
    fn transformation_string() {
        let p = FetchParams {
            public_id: "teachers-day/a".into(),
            format: "png".into(),
            width: 8,
            quality: Quality::new(70),
        };
        assert_eq!(p.transformation(), "f_jpg,w_8,q_70");
        assert_eq!(p.asset_path(), "f_jpg,w_8,q_70/teachers-day/a.png");
    }

    #[test]
    fn asset_path_without_format() {
        let p = FetchParams {
            public_id: "a".into(),
            format: String::new(),
            width: 16,
            quality: Quality::new(50),
        };
        assert_eq!(p.asset_path(), "f_jpg,w_16,q_50/a");
    }

    #[test]
    fn for_record_copies_identity_and_settings() {
        let record = ImageRecord {
            sequence_index: 0,
            width: 100,
            height: 50,
            public_id: "x/y".into(),
            format: "webp".into(),
            placeholder: None,
        };
        let p = FetchParams::for_record(&record, &PlaceholderSettings::default());
        assert_eq!(p.public_id, "x/y");
        assert_eq!(p.format, "webp");
        assert_eq!(p.width, 8);
        assert_eq!(p.quality.value(), 70);
    }
}
