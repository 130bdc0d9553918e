//! Document dates, evidence codes and transcript matching.
//!
//! Documents and full-text transcripts are catalogued independently. The only
//! link between them is the evidence code: a transcript records the series and
//! number of the exhibit it transcribes (`NO-1234`), and a document lists
//! every evidence code it was filed under.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A catalogue date where any part may be unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDate {
    #[serde(default)]
    pub day: Option<i32>,
    #[serde(default)]
    pub month: Option<i32>,
    #[serde(default)]
    pub year: Option<i32>,
}

impl DocumentDate {
    pub fn new(year: i32, month: i32, day: i32) -> Self {
        Self {
            day: Some(day),
            month: Some(month),
            year: Some(year),
        }
    }

    /// The calendar date, if every part is known and the date exists.
    pub fn as_date(&self) -> Option<NaiveDate> {
        let year = self.year.filter(|y| *y >= 1)?;
        let month = u32::try_from(self.month?).ok()?;
        let day = u32::try_from(self.day?).ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    }
}

/// Exhibit identifier such as `NO-1234`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EvidenceCode {
    pub prefix: String,
    pub number: String,
}

impl EvidenceCode {
    pub fn new(prefix: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            number: number.into(),
        }
    }
}

impl fmt::Display for EvidenceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.prefix, self.number)
    }
}

/// A catalogued document with the evidence codes it was filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: u32,
    #[serde(default)]
    pub evidence_codes: Vec<EvidenceCode>,
}

impl Document {
    /// Transcripts of any of this document's exhibits.
    pub fn full_texts<'a>(&self, texts: &'a [DocumentText]) -> Vec<&'a DocumentText> {
        full_texts(&self.evidence_codes, texts)
    }
}

/// A full-text transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentText {
    pub id: u32,
    pub evidence_code_series: String,
    pub evidence_code_num: String,
}

impl DocumentText {
    pub fn matches(&self, code: &EvidenceCode) -> bool {
        self.evidence_code_series == code.prefix && self.evidence_code_num == code.number
    }

    /// Documents filed under this transcript's evidence code, in input order.
    pub fn documents<'a>(&self, documents: &'a [Document]) -> Vec<&'a Document> {
        documents
            .iter()
            .filter(|doc| doc.evidence_codes.iter().any(|code| self.matches(code)))
            .collect()
    }
}

/// Transcripts matching any of `codes`, in input order.
pub fn full_texts<'a>(codes: &[EvidenceCode], texts: &'a [DocumentText]) -> Vec<&'a DocumentText> {
    texts
        .iter()
        .filter(|text| codes.iter().any(|code| text.matches(code)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(id: u32, series: &str, num: &str) -> DocumentText {
        DocumentText {
            id,
            evidence_code_series: series.to_string(),
            evidence_code_num: num.to_string(),
        }
    }

    fn document(id: u32, codes: &[(&str, &str)]) -> Document {
        Document {
            id,
            evidence_codes: codes.iter().map(|(p, n)| EvidenceCode::new(*p, *n)).collect(),
        }
    }

    // =========================================================================
    // DocumentDate
    // =========================================================================

    #[test]
    fn as_date_rejects_missing_or_out_of_range_parts() {
        let days = [None, Some(0), Some(33), Some(-1)];
        let months = [None, Some(0), Some(13), Some(-1)];
        let years = [None, Some(0), Some(-1)];
        for day in days {
            for month in months {
                for year in years {
                    let date = DocumentDate { day, month, year };
                    assert_eq!(date.as_date(), None, "{date:?}");
                }
            }
        }
    }

    #[test]
    fn as_date_rejects_days_past_month_end() {
        assert_eq!(DocumentDate::new(2022, 2, 29).as_date(), None);
        assert_eq!(DocumentDate::new(2022, 4, 31).as_date(), None);
    }

    #[test]
    fn as_date_accepts_valid_dates() {
        for year in [1, 1000, 2050] {
            for month in [1, 12] {
                for day in [1, 30] {
                    let expected = NaiveDate::from_ymd_opt(year, month as u32, day as u32);
                    assert!(expected.is_some());
                    assert_eq!(DocumentDate::new(year, month, day).as_date(), expected);
                }
            }
        }
    }

    #[test]
    fn as_date_accepts_leap_day() {
        assert_eq!(
            DocumentDate::new(1948, 2, 29).as_date(),
            NaiveDate::from_ymd_opt(1948, 2, 29)
        );
    }

    // =========================================================================
    // Evidence codes
    // =========================================================================

    #[test]
    fn evidence_code_display() {
        assert_eq!(EvidenceCode::new("FF", "12").to_string(), "FF-12");
        assert_eq!(EvidenceCode::new("Z", "123").to_string(), "Z-123");
    }

    #[test]
    fn full_texts_empty_when_document_has_no_codes() {
        let texts = vec![text(1, "FF", "123")];
        assert!(document(1, &[]).full_texts(&texts).is_empty());
    }

    #[test]
    fn full_texts_requires_both_series_and_number() {
        let texts = vec![text(1, "FF", "123")];
        let doc = document(1, &[("Z", "123"), ("FF", "12")]);
        assert!(doc.full_texts(&texts).is_empty());
    }

    #[test]
    fn full_texts_preserves_input_order() {
        let texts = vec![text(3, "NO", "1"), text(1, "FF", "123"), text(2, "PS", "9")];
        let doc = document(1, &[("FF", "123"), ("NO", "1")]);
        let ids: Vec<u32> = doc.full_texts(&texts).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn documents_for_transcript() {
        let transcript = text(729, "NO", "1234");
        let docs = vec![
            document(30, &[("NO", "1234")]),
            document(31, &[("Z", "123"), ("FF", "12")]),
            document(2539, &[("PS", "1"), ("NO", "1234")]),
        ];
        let ids: Vec<u32> = transcript.documents(&docs).iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![30, 2539]);
        assert!(transcript.documents(&[]).is_empty());
    }
}
