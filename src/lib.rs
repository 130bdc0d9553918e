//! # Nuremberg Archive
//!
//! Backend pieces of a trial document archive: the author panel shown next
//! to every document, and the batch job that fills in scanned page images.
//!
//! # Architecture: Two Independent Pipelines
//!
//! ```text
//! Author metadata   records + ranks  →  aggregate  →  JSON / text / HTML
//! Page images       documents.json   →  scan (probe JPEG headers)  →  scan report
//! ```
//!
//! The archive database is not touched directly. Its owner exports JSON (see
//! [`types`]), and both pipelines are functions from those exports to plain
//! serializable values. External collaborators are injected as traits:
//! [`properties::RankLookup`] for property ranks, [`imaging::RangeFetcher`]
//! for HTTP byte ranges. Unit tests therefore never need a database or a
//! network.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`properties`] | Ranked property aggregation into the author panel structure |
//! | [`author`] | Author identity: full name and URL slug |
//! | [`imaging`] | Byte-range fetching and the JPEG SOF0 dimension probe |
//! | [`naming`] | Page stem, filename, URL and media path conventions |
//! | [`scan`] | Parallel page image population over a rayon pool |
//! | [`documents`] | Document dates, evidence codes, transcript matching |
//! | [`output`] | CLI text output for every command |
//! | [`generate`] | Author panel HTML rendered with Maud |
//! | [`config`] | `config.toml` loading, merging and validation |
//! | [`types`] | JSON inputs read by the CLI |
//!
//! # Design Decisions
//!
//! ## Ordered Maps Everywhere
//!
//! The author panel must render identically for identical input, regardless
//! of the order the knowledge base returned rows in. Grouping uses
//! `BTreeMap`/`BTreeSet` so value, qualifier and tie ordering fall out of
//! the data structures instead of explicit sorts scattered through the code.
//!
//! ## Probing Instead of Downloading
//!
//! Scanned pages are large. Their dimensions sit in the SOF0 segment near the
//! start of the file, so the prober requests a short prefix and only widens
//! the range when the header turns out to be longer. See [`imaging::probe`].
//!
//! ## Blocking HTTP on Rayon
//!
//! The scanner is a batch job bound by remote latency. A rayon pool with a
//! configurable width and a blocking `ureq` agent keeps the code synchronous;
//! there is no async runtime to thread through.

pub mod author;
pub mod config;
pub mod documents;
pub mod generate;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod properties;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
