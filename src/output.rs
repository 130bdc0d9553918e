//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Each entity (author, property, document, page) leads with its identity on
//! a header line. Supporting details are shown as indented context lines
//! below it, four spaces per level.
//!
//! # Output Format
//!
//! ## Metadata
//!
//! ```text
//! John Doe (#42)
//!     Slug: john-doe
//!     Title: Judge
//!     Description: American judge
//!     Image: http://example.com/doe.jpg
//!         Alt: Image of John Doe
//!
//! Properties
//! 001 occupation (rank 3)
//!     judge
//!         role: presiding judge
//! 002 born (rank 1)
//!     1900 (Berlin)
//! ```
//!
//! ## Probe
//!
//! ```text
//! http://example.com/a.jpg: 1200 x 1800
//! http://example.com/b.jpg: not a JPEG
//! ```
//!
//! ## Scan
//!
//! ```text
//! Document 30 (2 pages, 1 failed)
//!     001 1200 x 1800 → nuremberg-documents/HLSL_NUR_00030001.jpg
//!         Physical page: 1
//!     003 no dimensions → nuremberg-documents/HLSL_NUR_00030003.jpg
//!     002 failed: Probe failed: Fetch failed: 404
//!
//! Populated 2 pages in 1 document, 1 failed
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::imaging::{Dimensions, ProbeError};
use crate::properties::AuthorMetadata;
use crate::scan::{DocumentScan, ScanReport};

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte, _)) => format!("{}...", &text[..byte]),
        None => text.to_string(),
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

// ============================================================================
// Metadata
// ============================================================================

/// Format aggregated author metadata as display lines.
pub fn format_author_metadata(metadata: &AuthorMetadata) -> Vec<String> {
    let author = &metadata.author;
    let mut lines = vec![format!("{} (#{})", author.name, author.id)];

    lines.push(format!("{}Slug: {}", indent(1), author.slug));
    if !author.title.is_empty() {
        lines.push(format!("{}Title: {}", indent(1), author.title));
    }
    if !author.description.is_empty() {
        lines.push(format!(
            "{}Description: {}",
            indent(1),
            truncate_desc(&author.description, 60)
        ));
    }
    if let Some(image) = &metadata.image {
        lines.push(format!("{}Image: {}", indent(1), image.url));
        lines.push(format!("{}Alt: {}", indent(2), image.alt));
    }

    if metadata.properties.is_empty() {
        return lines;
    }

    lines.push(String::new());
    lines.push("Properties".to_string());
    for (i, property) in metadata.properties.iter().enumerate() {
        lines.push(format!(
            "{} {} (rank {})",
            format_index(i + 1),
            property.display_name,
            property.rank
        ));
        for group in &property.values {
            lines.push(format!("{}{}", indent(1), group.value));
            for qualifier in &group.qualifiers {
                lines.push(format!(
                    "{}{}: {}",
                    indent(2),
                    qualifier.name(),
                    qualifier.values().join(", ")
                ));
            }
        }
    }
    lines
}

pub fn print_author_metadata(metadata: &AuthorMetadata) {
    for line in format_author_metadata(metadata) {
        println!("{}", line);
    }
}

// ============================================================================
// Probe
// ============================================================================

/// Format one probe outcome as a single line.
pub fn format_probe_result(
    resource: &str,
    result: &Result<Option<Dimensions>, ProbeError>,
) -> String {
    match result {
        Ok(Some(d)) => format!("{}: {} x {}", resource, d.width, d.height),
        Ok(None) => format!("{}: not a JPEG", resource),
        Err(e) => format!("{}: error: {}", resource, e),
    }
}

// ============================================================================
// Scan
// ============================================================================

fn format_document_scan(scan: &DocumentScan) -> Vec<String> {
    let mut header = format!(
        "Document {} ({}",
        scan.document_id,
        plural(scan.pages.len(), "page")
    );
    if !scan.failures.is_empty() {
        header.push_str(&format!(", {} failed", scan.failures.len()));
    }
    header.push(')');

    let mut lines = vec![header];
    for page in &scan.pages {
        let size = match (page.width, page.height) {
            (Some(w), Some(h)) => format!("{} x {}", w, h),
            _ => "no dimensions".to_string(),
        };
        lines.push(format!(
            "{}{} {} → {}",
            indent(1),
            format_index(page.page_number as usize),
            size,
            page.media_path
        ));
        if let Some(physical) = page.physical_page_number {
            lines.push(format!("{}Physical page: {}", indent(2), physical));
        }
        if let Some(path) = &page.local_path {
            lines.push(format!("{}Saved: {}", indent(2), path.display()));
        }
    }
    for failure in &scan.failures {
        lines.push(format!(
            "{}{} failed: {}",
            indent(1),
            format_index(failure.page_number as usize),
            failure.error
        ));
    }
    lines
}

/// Format a scan report as display lines.
pub fn format_scan_report(report: &ScanReport) -> Vec<String> {
    if report.documents.is_empty() {
        return vec!["No documents to be processed".to_string()];
    }

    let mut lines = Vec::new();
    for scan in &report.documents {
        lines.extend(format_document_scan(scan));
    }

    lines.push(String::new());
    let mut summary = format!(
        "Populated {} in {}",
        plural(report.page_count(), "page"),
        plural(report.documents.len(), "document")
    );
    if report.failure_count() > 0 {
        summary.push_str(&format!(", {} failed", report.failure_count()));
    }
    lines.push(summary);
    lines
}

pub fn print_scan_report(report: &ScanReport) {
    for line in format_scan_report(report) {
        println!("{}", line);
    }
}
