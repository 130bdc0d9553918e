//! Scanned page image population.
//!
//! Documents declare how many scanned pages they have (`image_count`), but
//! the page image rows are filled in separately. This batch job finds the
//! missing pages and, for each one, works out everything the archive needs
//! to display it:
//!
//! 1. Canonical filename, source URL and media path (see [`crate::naming`])
//! 2. Physical page number and image type, from the retired legacy image row
//!    with the same stem if there is one
//! 3. Pixel dimensions, by probing the JPEG header on the image server
//! 4. Optionally, a full download of the stored copy into a local directory
//!
//! A page whose dimensions cannot be determined, or come out as zero, keeps
//! its row but loses its URL, so the site never links to a file it cannot
//! lay out.
//!
//! ## Selection
//!
//! Only documents with fewer stored pages than `image_count` are scanned,
//! and within them only the pages that are missing. `force` rescans every
//! page of every selected document.
//!
//! ## Parallel Processing
//!
//! Documents and their pages are fanned out on a dedicated
//! [rayon](https://docs.rs/rayon) pool sized by `processing.workers`. Pages
//! are independent: a failed probe is recorded in the report and the rest of
//! the batch carries on.

use crate::config::{ArchiveConfig, ImagesConfig};
use crate::imaging::{
    ByteRange, Dimensions, FetchError, ProbeError, RangeFetcher, probe_with_schedule,
};
use crate::naming::{PageImageName, parse_physical_page_number};
use crate::types::DocumentEntry;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Probe failed: {0}")]
    Probe(#[from] ProbeError),
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("Could not start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Which documents to scan and what to do with the results.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Restrict the scan to these document ids.
    pub ids: Option<Vec<u32>>,
    /// Rescan pages that already have an image row.
    pub force: bool,
    /// Download each stored copy below this directory.
    pub download_to: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageScale {
    Screen,
}

/// A populated page image row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageImage {
    pub document_id: u32,
    pub page_number: u32,
    pub physical_page_number: Option<u32>,
    pub image_type: u32,
    /// Source URL, cleared when dimensions are unknown or zero.
    pub url: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub scale: ImageScale,
    pub media_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageFailure {
    pub page_number: u32,
    pub error: String,
}

/// Scan results for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentScan {
    pub document_id: u32,
    pub pages: Vec<PageImage>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<PageFailure>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    pub documents: Vec<DocumentScan>,
}

impl ScanReport {
    pub fn page_count(&self) -> usize {
        self.documents.iter().map(|d| d.pages.len()).sum()
    }

    pub fn failure_count(&self) -> usize {
        self.documents.iter().map(|d| d.failures.len()).sum()
    }
}

/// Pick the documents a scan should touch, preserving input order.
pub fn select_documents<'a>(
    documents: &'a [DocumentEntry],
    options: &ScanOptions,
) -> Vec<&'a DocumentEntry> {
    documents
        .iter()
        .filter(|doc| options.ids.as_ref().is_none_or(|ids| ids.contains(&doc.id)))
        .filter(|doc| options.force || doc.is_incomplete())
        .collect()
}

/// Page numbers of `document` that need populating.
pub fn pages_to_populate(document: &DocumentEntry, force: bool) -> Vec<u32> {
    (1..=document.image_count)
        .filter(|page| force || !document.existing_pages.contains(page))
        .collect()
}

/// Scan every selected document on a pool of `config.processing.workers` threads.
pub fn scan(
    documents: &[DocumentEntry],
    fetcher: &impl RangeFetcher,
    config: &ArchiveConfig,
    options: &ScanOptions,
) -> Result<ScanReport, ScanError> {
    let selected = select_documents(documents, options);
    if selected.is_empty() {
        return Ok(ScanReport::default());
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.processing.workers)
        .build()?;

    let documents: Vec<DocumentScan> = pool.install(|| {
        selected
            .par_iter()
            .map(|doc| scan_document(doc, fetcher, config, options))
            .collect()
    });

    Ok(ScanReport { documents })
}

/// Populate the missing pages of one document.
///
/// Runs on the current rayon pool. Never fails as a whole: per-page errors
/// end up in [`DocumentScan::failures`].
pub fn scan_document(
    document: &DocumentEntry,
    fetcher: &impl RangeFetcher,
    config: &ArchiveConfig,
    options: &ScanOptions,
) -> DocumentScan {
    info!(document = document.id, image_count = document.image_count, "populating document");

    let results: Vec<(u32, Result<PageImage, ScanError>)> = pages_to_populate(document, options.force)
        .into_par_iter()
        .map(|page| {
            let result = populate_page(document, page, fetcher, config, options.download_to.as_deref());
            (page, result)
        })
        .collect();

    let mut scan = DocumentScan {
        document_id: document.id,
        pages: Vec::new(),
        failures: Vec::new(),
    };
    for (page_number, result) in results {
        match result {
            Ok(page) => scan.pages.push(page),
            Err(e) => {
                warn!(document = document.id, page = page_number, error = %e, "page failed");
                scan.failures.push(PageFailure {
                    page_number,
                    error: e.to_string(),
                });
            }
        }
    }

    info!(
        document = document.id,
        populated = scan.pages.len(),
        failed = scan.failures.len(),
        "populated document"
    );
    scan
}

/// Build the image row for one page, probing its dimensions.
pub fn populate_page(
    document: &DocumentEntry,
    page_number: u32,
    fetcher: &impl RangeFetcher,
    config: &ArchiveConfig,
    download_to: Option<&Path>,
) -> Result<PageImage, ScanError> {
    let name = PageImageName::new(document.id, page_number, &config.images);
    let legacy = document
        .legacy_images
        .iter()
        .find(|image| image.filename == name.stem);

    let physical_page_number = legacy
        .and_then(|image| image.physical_page_number.as_deref())
        .and_then(parse_physical_page_number);
    let image_type = legacy
        .and_then(|image| image.image_type)
        .unwrap_or(config.images.default_image_type);

    let dimensions = probe_with_schedule(fetcher, &name.source_url, &config.probe.schedule())?;
    let (width, height) = match dimensions {
        Some(Dimensions { width, height }) => (Some(width), Some(height)),
        None => (None, None),
    };
    // A zero-sized frame cannot be laid out either.
    let displayable = dimensions.is_some_and(|d| d.width > 0 && d.height > 0);

    let local_path = download_to.and_then(|dir| {
        download_page(fetcher, &name, &config.images, dir)
            .inspect_err(|e| warn!(media_path = %name.media_path, error = %e, "download failed"))
            .ok()
    });

    Ok(PageImage {
        document_id: document.id,
        page_number,
        physical_page_number,
        image_type,
        url: displayable.then(|| name.source_url.clone()),
        width,
        height,
        scale: ImageScale::Screen,
        media_path: name.media_path,
        local_path,
    })
}

/// Download the stored copy of a page to `<dir>/<media path>`.
pub fn download_page(
    fetcher: &impl RangeFetcher,
    name: &PageImageName,
    images: &ImagesConfig,
    dir: &Path,
) -> Result<PathBuf, ScanError> {
    let url = name.download_url(images);
    info!(url = %url, "downloading image");
    let bytes = fetcher.fetch_range(&url, ByteRange::Full)?;

    let path = dir.join(&name.media_path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, bytes)?;
    Ok(path)
}
