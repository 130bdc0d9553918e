//! Shared test utilities for the archive test suite.
//!
//! Builders for the inputs the aggregator and the JPEG prober consume, so
//! tests read as data rather than struct literals.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let author = make_author(Some("Some"), Some("Name"), "Sir Someone");
//! let records = vec![qualified("a property", "some value", "country", "US")];
//! let result = aggregate(&author, &records, &ranks(&[("a property", 10)]));
//! assert_eq!(property_names(&result), vec!["a property"]);
//!
//! let jpeg = JpegBuilder::new().app_segment(6000).sof0(100, 200).build();
//! ```

use crate::author::Author;
use crate::properties::{AuthorMetadata, PropertyRecord, RankTable};

// =========================================================================
// Author metadata inputs
// =========================================================================

pub fn make_author(first: Option<&str>, last: Option<&str>, title: &str) -> Author {
    Author {
        id: 42,
        first_name: first.map(String::from),
        last_name: last.map(String::from),
        title: title.to_string(),
    }
}

/// A property record carrying one qualifier.
pub fn qualified(name: &str, value: &str, qualifier: &str, qualifier_value: &str) -> PropertyRecord {
    PropertyRecord::new(name, value).with_qualifier(qualifier, qualifier_value)
}

pub fn ranks(entries: &[(&str, i32)]) -> RankTable {
    entries.iter().map(|(name, rank)| (*name, *rank)).collect()
}

/// Display names of the aggregated properties, in output order.
pub fn property_names(metadata: &AuthorMetadata) -> Vec<&str> {
    metadata
        .properties
        .iter()
        .map(|p| p.display_name.as_str())
        .collect()
}

// =========================================================================
// JPEG byte streams
// =========================================================================

/// Assembles minimal JPEG headers: SOI, filler segments, SOF0.
#[derive(Debug, Default)]
pub struct JpegBuilder {
    bytes: Vec<u8>,
}

impl JpegBuilder {
    pub fn new() -> Self {
        Self {
            bytes: vec![0xFF, 0xD8],
        }
    }

    /// Append an APP0 segment whose total length (including the two
    /// length bytes) is `length`.
    pub fn app_segment(mut self, length: u16) -> Self {
        self.bytes.extend_from_slice(&[0xFF, 0xE0]);
        self.bytes.extend_from_slice(&length.to_be_bytes());
        self.bytes
            .extend(std::iter::repeat_n(0u8, usize::from(length) - 2));
        self
    }

    /// Append a baseline SOF0 segment with three components.
    pub fn sof0(mut self, width: u16, height: u16) -> Self {
        self.bytes.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08]);
        self.bytes.extend_from_slice(&height.to_be_bytes());
        self.bytes.extend_from_slice(&width.to_be_bytes());
        self.bytes
            .extend_from_slice(&[0x03, 0x01, 0x22, 0x00, 0x02, 0x11, 0x01, 0x03, 0x11, 0x01]);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}
