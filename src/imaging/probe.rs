//! JPEG dimension probe over partial downloads.
//!
//! Scanned pages live on a remote image server and can be tens of megabytes
//! each. Their pixel dimensions sit in the SOF0 (baseline start-of-frame)
//! segment, which in practice is within the first few kilobytes. The probe
//! fetches a prefix of the file, walks the marker segments and stops at SOF0.
//!
//! JPEG segment layout:
//!
//! ```text
//!   FF D8                       SOI, no length
//!   FF xx  LL LL  <LLLL-2 bytes>  marker, big-endian length incl. itself
//!   ...
//!   FF C0  LL LL  PP  HH HH  WW WW  ...   SOF0: precision, height, width
//! ```
//!
//! ## Retry tiers
//!
//! When the prefix ends before SOF0 (large EXIF or ICC blocks in front of
//! it), the whole fetch is retried with a longer prefix:
//!
//! | Attempt | Range |
//! |---|---|
//! | 1 | `[0, 5000)` |
//! | 2 | `[0, 30000)` |
//! | 3 | `[0, 55000)` |
//! | 4 | whole file |
//!
//! Bounded prefixes below the limit grow by one step; the first prefix at or
//! above the limit is followed by one unbounded fetch; exhaustion after that
//! is [`ProbeError::OutOfBytes`]. See [`ProbeSchedule`].

use super::fetch::{ByteRange, FetchError, RangeFetcher};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const SOI: [u8; 2] = [0xFF, 0xD8];
const SOF0: [u8; 2] = [0xFF, 0xC0];

pub const INITIAL_HEADER_LENGTH: usize = 5000;
pub const HEADER_STEP: usize = 25000;
pub const HEADER_LIMIT: usize = 50000;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("ran out of bytes in JPEG header of {resource} after {received} bytes")]
    OutOfBytes { resource: String, received: usize },
    #[error("invalid JPEG segment length {length} at offset {offset} in {resource}")]
    InvalidSegment {
        resource: String,
        offset: usize,
        length: usize,
    },
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Pixel dimensions read from SOF0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Tier table for header fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeSchedule {
    pub initial: usize,
    pub step: usize,
    pub limit: usize,
}

impl Default for ProbeSchedule {
    fn default() -> Self {
        Self {
            initial: INITIAL_HEADER_LENGTH,
            step: HEADER_STEP,
            limit: HEADER_LIMIT,
        }
    }
}

impl ProbeSchedule {
    pub fn first(&self) -> ByteRange {
        ByteRange::Prefix(self.initial)
    }

    /// The range to try after `current` came up short, or `None` when done.
    pub fn next(&self, current: ByteRange) -> Option<ByteRange> {
        match current {
            ByteRange::Prefix(n) if n > 0 && n < self.limit => Some(ByteRange::Prefix(n + self.step)),
            ByteRange::Prefix(n) if n > 0 => Some(ByteRange::Full),
            // A zero-length prefix behaves like an unbounded request.
            ByteRange::Prefix(_) => None,
            ByteRange::Full => None,
        }
    }

    /// Every range the probe may request, in order.
    pub fn tiers(&self) -> Vec<ByteRange> {
        std::iter::successors(Some(self.first()), |range| self.next(*range)).collect()
    }
}

/// Outcome of scanning one header buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HeaderScan {
    NotJpeg,
    Found(Dimensions),
    /// The buffer ended before SOF0 was complete.
    Truncated,
    /// A segment declared a length shorter than its own length field.
    InvalidSegment { offset: usize, length: usize },
}

/// Walk marker segments in `data` looking for SOF0.
pub(crate) fn scan_header(data: &[u8]) -> HeaderScan {
    if data.len() < 2 || data[..2] != SOI {
        return HeaderScan::NotJpeg;
    }

    let mut pos = 2;
    loop {
        // Marker (2) + length (2)
        if pos + 4 > data.len() {
            return HeaderScan::Truncated;
        }
        let marker = [data[pos], data[pos + 1]];
        let length = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;

        if marker == SOF0 {
            // Precision (1) + height (2) + width (2)
            let body = pos + 4;
            if body + 5 > data.len() {
                return HeaderScan::Truncated;
            }
            let height = u16::from_be_bytes([data[body + 1], data[body + 2]]);
            let width = u16::from_be_bytes([data[body + 3], data[body + 4]]);
            return HeaderScan::Found(Dimensions {
                width: u32::from(width),
                height: u32::from(height),
            });
        }

        // Length counts its own two bytes
        if length < 2 {
            return HeaderScan::InvalidSegment {
                offset: pos,
                length,
            };
        }
        pos += 2 + length;
    }
}

/// Probe a resource's JPEG dimensions using the default tiers.
///
/// Returns `Ok(None)` when the resource does not start with a JPEG signature.
pub fn probe_dimensions(
    fetcher: &impl RangeFetcher,
    resource: &str,
) -> Result<Option<Dimensions>, ProbeError> {
    probe_with_schedule(fetcher, resource, &ProbeSchedule::default())
}

/// Probe a resource's JPEG dimensions, growing the fetched prefix per `schedule`.
pub fn probe_with_schedule(
    fetcher: &impl RangeFetcher,
    resource: &str,
    schedule: &ProbeSchedule,
) -> Result<Option<Dimensions>, ProbeError> {
    let mut range = schedule.first();
    loop {
        let header = match fetcher.fetch_range(resource, range) {
            Ok(header) => header,
            // Missing scans come back as an HTML error page; judge the body.
            Err(FetchError::Status { status, body, .. }) => {
                debug!(resource, status, "error status, checking body");
                body
            }
            Err(e) => return Err(e.into()),
        };

        match scan_header(&header) {
            HeaderScan::Found(dimensions) => return Ok(Some(dimensions)),
            HeaderScan::NotJpeg => {
                warn!(resource, received = header.len(), "not a valid JPEG file");
                return Ok(None);
            }
            HeaderScan::InvalidSegment { offset, length } => {
                return Err(ProbeError::InvalidSegment {
                    resource: resource.to_string(),
                    offset,
                    length,
                });
            }
            HeaderScan::Truncated => match schedule.next(range) {
                Some(next) => {
                    debug!(resource, ?range, ?next, "JPEG header truncated, refetching");
                    range = next;
                }
                None => {
                    warn!(resource, received = header.len(), "ran out of bytes in JPEG header");
                    return Err(ProbeError::OutOfBytes {
                        resource: resource.to_string(),
                        received: header.len(),
                    });
                }
            },
        }
    }
}
