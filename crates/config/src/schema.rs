//! Config schema types (media save roots, download, upload, metrics).

use std::{collections::BTreeMap, path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

/// Default timeout for a single download. Videos can be large.
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 600;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FerryConfig {
    pub media: MediaConfig,
    pub metrics: MetricsConfig,
}

/// How much an upload's declared file name is trusted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadTrust {
    /// Keep the extension from the declared name; content was vetted upstream.
    #[default]
    Declared,
    /// Sniff the stored bytes, reject non-media and correct the extension.
    Sniffed,
}

/// Media pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Where downloaded images land. Defaults to `<data_dir>/images`.
    pub images_dir: Option<PathBuf>,
    /// Where downloaded and uploaded videos land. Defaults to `<data_dir>/videos`.
    pub videos_dir: Option<PathBuf>,
    /// Per-request timeout for downloads, in seconds.
    pub download_timeout_secs: u64,
    pub upload_trust: UploadTrust,
    /// Default age for `sweep` when none is given on the command line.
    pub retention_hours: Option<u64>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            images_dir: None,
            videos_dir: None,
            download_timeout_secs: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
            upload_trust: UploadTrust::default(),
            retention_hours: None,
        }
    }
}

impl MediaConfig {
    /// Resolved images save root.
    pub fn images_dir(&self) -> PathBuf {
        self.images_dir
            .clone()
            .unwrap_or_else(|| crate::loader::data_dir().join("images"))
    }

    /// Resolved videos save root.
    pub fn videos_dir(&self) -> PathBuf {
        self.videos_dir
            .clone()
            .unwrap_or_else(|| crate::loader::data_dir().join("videos"))
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    pub fn retention(&self) -> Option<Duration> {
        self.retention_hours
            .map(|hours| Duration::from_secs(hours.saturating_mul(3600)))
    }
}

/// Metrics configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    /// Labels attached to every recorded metric, e.g. `instance = "edge-1"`.
    pub labels: BTreeMap<String, String>,
}
