//! Page image naming conventions.
//!
//! Every scanned page is identified by a fixed-width stem built from the
//! document id and the page number: five digits of document id followed by
//! three digits of page number. Document 123, page 4 is `00123004`. The stem
//! is used as-is for legacy image rows and as the body of the JPEG filename:
//!
//! ```text
//! stem:        00123004
//! filename:    HLSL_NUR_00123004.jpg
//! source URL:  <images.source_url>/HLSL_NUR_00123004.jpg
//! media path:  <images.documents_bucket>/HLSL_NUR_00123004.jpg
//! ```
//!
//! ## Physical page numbers
//!
//! Legacy rows record the page number printed on the paper, free-form:
//! `"p. 12"`, `"12a"`, `"[12]"`. Only the digits are kept; a value with no
//! digits at all means the page had no printed number.

use crate::config::ImagesConfig;

/// Fixed-width stem for a document page (`00123004`).
pub fn page_stem(document_id: u32, page_number: u32) -> String {
    format!("{:05}{:03}", document_id, page_number)
}

/// Canonical names and locations of one page image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImageName {
    pub stem: String,
    pub filename: String,
    /// URL on the legacy image server.
    pub source_url: String,
    /// Path inside the storage bucket.
    pub media_path: String,
}

impl PageImageName {
    pub fn new(document_id: u32, page_number: u32, images: &ImagesConfig) -> Self {
        let stem = page_stem(document_id, page_number);
        let filename = format!("{}{}.jpg", images.filename_prefix, stem);
        Self {
            source_url: join_url(&images.source_url, &filename),
            media_path: join_url(&images.documents_bucket, &filename),
            stem,
            filename,
        }
    }

    /// URL the stored copy is downloaded from.
    pub fn download_url(&self, images: &ImagesConfig) -> String {
        join_url(&images.download_url, &self.media_path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Extract the printed page number from a legacy free-form value.
///
/// - `"12"` → `Some(12)`
/// - `"p. 12a"` → `Some(12)`
/// - `"1-2"` → `Some(12)` (digits are concatenated, not split)
/// - `"n/a"`, `""` → `None`
pub fn parse_physical_page_number(raw: &str) -> Option<u32> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_is_zero_padded() {
        assert_eq!(page_stem(123, 4), "00123004");
        assert_eq!(page_stem(1, 1), "00001001");
    }

    #[test]
    fn stem_does_not_truncate_large_values() {
        assert_eq!(page_stem(123456, 1000), "1234561000");
    }

    #[test]
    fn page_image_name_uses_config() {
        let images = ImagesConfig::default();
        let name = PageImageName::new(30, 2, &images);

        assert_eq!(name.stem, "00030002");
        assert_eq!(name.filename, "HLSL_NUR_00030002.jpg");
        assert_eq!(
            name.source_url,
            "http://nuremberg.law.harvard.edu/imagedir/HLSL_NMT01/HLSL_NUR_00030002.jpg"
        );
        assert_eq!(name.media_path, "nuremberg-documents/HLSL_NUR_00030002.jpg");
        assert_eq!(
            name.download_url(&images),
            "http://s3.amazonaws.com/nuremberg-documents/HLSL_NUR_00030002.jpg"
        );
    }

    #[test]
    fn trailing_slash_in_base_url_is_ignored() {
        let images = ImagesConfig {
            source_url: "http://localhost/images/".to_string(),
            ..ImagesConfig::default()
        };
        let name = PageImageName::new(1, 1, &images);
        assert_eq!(name.source_url, "http://localhost/images/HLSL_NUR_00001001.jpg");
    }

    #[test]
    fn physical_page_number_plain() {
        assert_eq!(parse_physical_page_number("12"), Some(12));
    }

    #[test]
    fn physical_page_number_strips_non_digits() {
        assert_eq!(parse_physical_page_number("p. 12a"), Some(12));
        assert_eq!(parse_physical_page_number("[7]"), Some(7));
        assert_eq!(parse_physical_page_number("1-2"), Some(12));
    }

    #[test]
    fn physical_page_number_without_digits() {
        assert_eq!(parse_physical_page_number(""), None);
        assert_eq!(parse_physical_page_number("n/a"), None);
    }

    #[test]
    fn physical_page_number_overflow_is_none() {
        assert_eq!(parse_physical_page_number("99999999999999"), None);
    }
}
