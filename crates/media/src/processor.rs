//! Turning caller references into local paths.
//!
//! Remote references are downloaded; anything else is assumed to be a local
//! path and returned exactly as given, without touching the filesystem.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use {tokio::io::AsyncRead, tracing::debug};

#[cfg(feature = "metrics")]
use ferry_metrics::{counter, labels, media as media_metrics};

use crate::{
    cleanup::{self, SweepReport},
    error::{Error, Result},
    fetch::Downloader,
    reference::MediaReference,
    upload::UploadPersister,
};

async fn resolve(downloader: &Downloader, reference: &str) -> Result<PathBuf> {
    match MediaReference::classify(reference) {
        MediaReference::Remote => downloader
            .download(reference)
            .await
            .map(|stored| stored.path)
            .map_err(|e| Error::download_failed(downloader.store().kind(), reference, e)),
        MediaReference::Local => {
            debug!(reference, "using local media path");
            Ok(PathBuf::from(reference))
        },
    }
}

async fn sweep_store(downloader: &Downloader, max_age: Duration) -> Result<SweepReport> {
    let store = downloader.store();
    let report = cleanup::sweep(store.root(), max_age).await?;
    #[cfg(feature = "metrics")]
    counter!(media_metrics::SWEPT_FILES_TOTAL, labels::KIND => store.kind().as_str())
        .increment(report.removed as u64);
    Ok(report)
}

/// Resolves ordered lists of image references.
#[derive(Debug, Clone)]
pub struct ImageProcessor {
    downloader: Downloader,
}

impl ImageProcessor {
    pub fn new(downloader: Downloader) -> Self {
        Self { downloader }
    }

    /// Resolve every reference, in order.
    ///
    /// Items are processed one at a time and the first failed download aborts
    /// the whole call. Images already downloaded earlier in the same call stay
    /// on disk; they are not referenced by any result and are left for
    /// [`ImageProcessor::cleanup_old_images`] to reclaim.
    ///
    /// An input that yields no paths at all, including an empty list, is
    /// [`Error::NoValidImages`].
    pub async fn process_images<S: AsRef<str>>(&self, images: &[S]) -> Result<Vec<PathBuf>> {
        let mut local_paths = Vec::with_capacity(images.len());

        for image in images {
            local_paths.push(resolve(&self.downloader, image.as_ref()).await?);
        }

        if local_paths.is_empty() {
            return Err(Error::NoValidImages);
        }

        Ok(local_paths)
    }

    pub fn images_save_path(&self) -> &Path {
        self.downloader.store().root()
    }

    pub async fn cleanup_old_images(&self, max_age: Duration) -> Result<SweepReport> {
        sweep_store(&self.downloader, max_age).await
    }
}

/// Resolves single video references and persists uploaded videos.
#[derive(Debug, Clone)]
pub struct VideoProcessor {
    downloader: Downloader,
    uploads: UploadPersister,
}

impl VideoProcessor {
    /// `downloader` and `uploads` normally share one save root.
    pub fn new(downloader: Downloader, uploads: UploadPersister) -> Self {
        Self {
            downloader,
            uploads,
        }
    }

    pub async fn process_video(&self, video: &str) -> Result<PathBuf> {
        resolve(&self.downloader, video).await
    }

    pub async fn save_uploaded_video<R>(&self, reader: R, original_name: &str) -> Result<PathBuf>
    where
        R: AsyncRead + Unpin,
    {
        self.uploads
            .persist(reader, original_name)
            .await
            .map(|stored| stored.path)
    }

    pub fn videos_save_path(&self) -> &Path {
        self.downloader.store().root()
    }

    pub async fn cleanup_old_videos(&self, max_age: Duration) -> Result<SweepReport> {
        sweep_store(&self.downloader, max_age).await
    }
}
