//! JSON documents read by the CLI.
//!
//! The archive database is not this crate's concern. Whatever owns it exports
//! these shapes, and the CLI commands consume them.

use crate::author::Author;
use crate::properties::{PropertyRecord, RankEntry, RankTable};
use serde::{Deserialize, Serialize};

/// Input of the `metadata` command: one author with its properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorInput {
    pub author: Author,
    #[serde(default)]
    pub ranks: Vec<RankEntry>,
    /// Property records in the order the data source returned them.
    #[serde(default)]
    pub properties: Vec<PropertyRecord>,
}

impl AuthorInput {
    pub fn rank_table(&self) -> RankTable {
        self.ranks.iter().cloned().collect()
    }
}

/// A document as seen by the image scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentEntry {
    pub id: u32,
    /// Number of scanned pages the document should have.
    pub image_count: u32,
    /// Page numbers that already have an image row.
    #[serde(default)]
    pub existing_pages: Vec<u32>,
    /// Rows from the retired image table, keyed by page stem.
    #[serde(default)]
    pub legacy_images: Vec<LegacyImage>,
}

impl DocumentEntry {
    /// Whether fewer pages are stored than the document has.
    pub fn is_incomplete(&self) -> bool {
        (self.existing_pages.len() as u64) < u64::from(self.image_count)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyImage {
    /// Page stem, see [`crate::naming::page_stem`].
    pub filename: String,
    #[serde(default)]
    pub physical_page_number: Option<String>,
    #[serde(default)]
    pub image_type: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn author_input_parses_minimal_json() {
        let input: AuthorInput =
            serde_json::from_str(r#"{"author": {"id": 7, "last_name": "Doe"}}"#).unwrap();
        assert_eq!(input.author.full_name(), "Doe");
        assert!(input.properties.is_empty());
        assert!(input.rank_table().is_empty());
    }

    #[test]
    fn property_records_accept_source_description_field() {
        let input: AuthorInput = serde_json::from_str(
            r#"{
                "author": {"id": 7, "first_name": "John", "last_name": "Doe", "title": "Judge"},
                "ranks": [{"name": "occupation", "rank": 3}],
                "properties": [
                    {"name": "occupation", "value": "judge",
                     "personal_author_description": "American judge"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(input.properties[0].author_description, "American judge");
        assert_eq!(input.properties[0].qualifier, "");
        assert_eq!(input.rank_table().len(), 1);
    }

    #[test]
    fn document_entry_completeness() {
        let mut doc = DocumentEntry {
            id: 1,
            image_count: 2,
            existing_pages: vec![1],
            legacy_images: vec![],
        };
        assert!(doc.is_incomplete());
        doc.existing_pages.push(2);
        assert!(!doc.is_incomplete());
    }
}
