//! Remote image inspection.
//!
//! | Operation | Where |
//! |---|---|
//! | **Fetch a byte prefix** | [`RangeFetcher`] / [`HttpFetcher`] |
//! | **Identify** | [`probe_dimensions`]: SOF0 marker scan with tiered refetch |
//!
//! The module is split into:
//! - **Fetch**: the transport seam, so probing is testable without a server
//! - **Probe**: pure marker walking plus the bounded retry loop

pub mod fetch;
pub mod probe;

pub use fetch::{ByteRange, FetchError, HttpFetcher, RangeFetcher};
pub use probe::{Dimensions, ProbeError, ProbeSchedule, probe_dimensions, probe_with_schedule};
