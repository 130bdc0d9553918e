//! Archive tooling configuration.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! overridden by a user config file in the directory passed as
//! `--config-dir` (the current directory by default).
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [probe]
//! initial_header_length = 5000   # First byte prefix fetched per image
//! header_step = 25000            # Growth per retry while below the limit
//! header_limit = 50000           # Past this, retry once with the whole file
//!
//! [images]
//! source_url = "http://nuremberg.law.harvard.edu/imagedir/HLSL_NMT01"
//! filename_prefix = "HLSL_NUR_"
//! documents_bucket = "nuremberg-documents"
//! download_url = "http://s3.amazonaws.com"
//! default_image_type = 4
//!
//! [processing]
//! workers = 10                   # Concurrent page probes
//!
//! [http]
//! timeout_secs = 30
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [processing]
//! workers = 2
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::ProbeSchedule;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Archive configuration loaded from `config.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArchiveConfig {
    /// JPEG header fetch tiers.
    pub probe: ProbeConfig,
    /// Where page images live and how they are named.
    pub images: ImagesConfig,
    /// Worker pool settings for the image scanner.
    pub processing: ProcessingConfig,
    /// HTTP client settings.
    pub http: HttpConfig,
}

impl ArchiveConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.probe.initial_header_length == 0 {
            return Err(ConfigError::Validation(
                "probe.initial_header_length must be positive".into(),
            ));
        }
        if self.probe.header_step == 0 {
            return Err(ConfigError::Validation(
                "probe.header_step must be positive".into(),
            ));
        }
        if self.processing.workers == 0 {
            return Err(ConfigError::Validation(
                "processing.workers must be at least 1".into(),
            ));
        }
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "http.timeout_secs must be positive".into(),
            ));
        }
        if self.images.source_url.is_empty() {
            return Err(ConfigError::Validation(
                "images.source_url must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// JPEG header fetch tiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeConfig {
    pub initial_header_length: usize,
    pub header_step: usize,
    pub header_limit: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        let schedule = ProbeSchedule::default();
        Self {
            initial_header_length: schedule.initial,
            header_step: schedule.step,
            header_limit: schedule.limit,
        }
    }
}

impl ProbeConfig {
    pub fn schedule(&self) -> ProbeSchedule {
        ProbeSchedule {
            initial: self.initial_header_length,
            step: self.header_step,
            limit: self.header_limit,
        }
    }
}

/// Page image locations and naming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Base URL of the legacy image server the probe reads from.
    pub source_url: String,
    /// Prefix of every page image filename.
    pub filename_prefix: String,
    /// Storage bucket holding the downloaded copies.
    pub documents_bucket: String,
    /// Base URL the bucket is served from.
    pub download_url: String,
    /// Image type assigned when no legacy image row exists.
    pub default_image_type: u32,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            source_url: "http://nuremberg.law.harvard.edu/imagedir/HLSL_NMT01".to_string(),
            filename_prefix: "HLSL_NUR_".to_string(),
            documents_bucket: "nuremberg-documents".to_string(),
            download_url: "http://s3.amazonaws.com".to_string(),
            default_image_type: 4,
        }
    }
}

/// Worker pool settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Number of concurrent workers. Probing is network-bound, so this is
    /// not clamped to the core count.
    pub workers: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self { workers: 10 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    /// Per-request timeout covering connect and read.
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(ArchiveConfig::default())?)
}

/// Lay a sparse user file over the stock defaults.
///
/// Sections merge per key, so `[images] filename_prefix = ".."` leaves the
/// other `[images]` keys at their defaults. Any non-table value in `overlay`
/// wins outright.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read `<dir>/config.toml` without interpreting it. A missing file is `None`.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Turn defaults plus the optional user file into a validated [`ArchiveConfig`].
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ArchiveConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ArchiveConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory on top of stock defaults.
pub fn load_config(dir: &Path) -> Result<ArchiveConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(dir)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Archive Tooling Configuration
# =============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# JPEG dimension probe
# ---------------------------------------------------------------------------
[probe]
# Bytes fetched on the first attempt. SOF0 is usually within this prefix.
initial_header_length = 5000

# While the prefix is below header_limit, each retry grows it by this much.
header_step = 25000

# Once a prefix at or above this size comes up short, the whole file is
# fetched once more before giving up.
header_limit = 50000

# ---------------------------------------------------------------------------
# Page images
# ---------------------------------------------------------------------------
[images]
# Legacy image server probed for dimensions.
source_url = "http://nuremberg.law.harvard.edu/imagedir/HLSL_NMT01"

# Page images are named <prefix><document id:05><page:03>.jpg
filename_prefix = "HLSL_NUR_"

# Storage bucket for downloaded copies, and where it is served from.
documents_bucket = "nuremberg-documents"
download_url = "http://s3.amazonaws.com"

# Image type for pages with no legacy image row.
default_image_type = 4

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Concurrent page probes. Network-bound, so more than the core count is fine.
workers = 10

# ---------------------------------------------------------------------------
# HTTP
# ---------------------------------------------------------------------------
[http]
timeout_secs = 30
"##
}
