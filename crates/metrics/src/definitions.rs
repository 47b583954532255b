//! Metric name and label definitions.

/// Media acquisition metrics
pub mod media {
    /// Completed downloads, labelled by `kind`
    pub const DOWNLOADS_TOTAL: &str = "ferry_media_downloads_total";
    /// Failed downloads, labelled by `kind` and `reason`
    pub const DOWNLOAD_ERRORS_TOTAL: &str = "ferry_media_download_errors_total";
    /// Bytes persisted by downloads
    pub const DOWNLOAD_BYTES_TOTAL: &str = "ferry_media_download_bytes_total";
    /// Wall time of a single download in seconds
    pub const DOWNLOAD_DURATION_SECONDS: &str = "ferry_media_download_duration_seconds";
    /// Persisted uploads, labelled by `kind`
    pub const UPLOADS_TOTAL: &str = "ferry_media_uploads_total";
    /// Files removed by retention sweeps, labelled by `kind`
    pub const SWEPT_FILES_TOTAL: &str = "ferry_media_swept_files_total";
}

/// Common label keys
pub mod labels {
    pub const KIND: &str = "kind";
    pub const REASON: &str = "reason";
}

/// Histogram bucket boundaries
pub mod buckets {
    /// Download duration buckets (in seconds), 50ms to 10 minutes
    pub const DOWNLOAD_DURATION: &[f64] = &[
        0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 600.0,
    ];
}
