//! Media pipeline: classify references, stream downloads to disk, sniff real
//! types, persist uploads and sweep old files.
//!
//! Remote references (`http://` / `https://`) are downloaded into a per-kind
//! save root; anything else is treated as a local path and handed back
//! untouched. Stored files are named `<kind>_<hash>_<salt>.<ext>` where the
//! extension reflects the sniffed content, not the URL.

pub mod cleanup;
pub mod error;
pub mod fetch;
pub mod mime;
pub mod pipeline;
pub mod processor;
pub mod reference;
pub mod store;
pub mod upload;

pub use {
    cleanup::{SweepReport, sweep},
    error::{Error, Result},
    fetch::{DEFAULT_DOWNLOAD_TIMEOUT, Downloader, build_client},
    ferry_config::UploadTrust,
    mime::{Sniffed, sniff},
    pipeline::MediaPipeline,
    processor::{ImageProcessor, VideoProcessor},
    reference::{MediaReference, is_remote},
    store::{MediaKind, MediaStore, StoredMedia},
    upload::UploadPersister,
};
