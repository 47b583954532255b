//! The operations exposed to callers of the pipeline.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use {ferry_config::MediaConfig, tokio::io::AsyncRead, tracing::info};

use crate::{
    cleanup::SweepReport,
    error::Result,
    fetch::{self, Downloader},
    processor::{ImageProcessor, VideoProcessor},
    store::{MediaKind, MediaStore},
    upload::UploadPersister,
};

/// Image and video processing over explicitly configured save roots.
#[derive(Debug, Clone)]
pub struct MediaPipeline {
    images: ImageProcessor,
    videos: VideoProcessor,
}

impl MediaPipeline {
    /// Create both save roots and a shared HTTP client.
    ///
    /// Failing to create a save root is returned, not fatal; callers decide
    /// whether to abort startup.
    pub async fn from_config(config: &MediaConfig) -> Result<Self> {
        let client = fetch::build_client(config.download_timeout())?;
        Self::with_client(config, client).await
    }

    pub async fn with_client(config: &MediaConfig, client: reqwest::Client) -> Result<Self> {
        let images_store = MediaStore::open(config.images_dir(), MediaKind::Image).await?;
        let videos_store = MediaStore::open(config.videos_dir(), MediaKind::Video).await?;

        info!(
            images = %images_store.root().display(),
            videos = %videos_store.root().display(),
            upload_trust = ?config.upload_trust,
            "media pipeline ready"
        );

        Ok(Self {
            images: ImageProcessor::new(Downloader::with_client(images_store, client.clone())),
            videos: VideoProcessor::new(
                Downloader::with_client(videos_store.clone(), client),
                UploadPersister::new(videos_store, config.upload_trust),
            ),
        })
    }

    pub async fn process_images<S: AsRef<str>>(&self, images: &[S]) -> Result<Vec<PathBuf>> {
        self.images.process_images(images).await
    }

    pub async fn process_video(&self, video: &str) -> Result<PathBuf> {
        self.videos.process_video(video).await
    }

    pub async fn save_uploaded_video<R>(&self, reader: R, original_name: &str) -> Result<PathBuf>
    where
        R: AsyncRead + Unpin,
    {
        self.videos.save_uploaded_video(reader, original_name).await
    }

    pub fn images_save_path(&self) -> &Path {
        self.images.images_save_path()
    }

    pub fn videos_save_path(&self) -> &Path {
        self.videos.videos_save_path()
    }

    pub async fn cleanup_old_images(&self, max_age: Duration) -> Result<SweepReport> {
        self.images.cleanup_old_images(max_age).await
    }

    pub async fn cleanup_old_videos(&self, max_age: Duration) -> Result<SweepReport> {
        self.videos.cleanup_old_videos(max_age).await
    }
}
