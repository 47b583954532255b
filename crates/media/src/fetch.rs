//! Streaming media download.
//!
//! The response body is copied chunk by chunk into the destination file, so
//! memory use stays bounded no matter how large the video is. Once the body is
//! on disk the leading bytes are sniffed; the file is rejected unless it is the
//! kind of media its store holds, and renamed to the sniffed extension.

use std::{path::Path, time::Duration};

use {
    futures::StreamExt,
    tokio::{fs, io::AsyncWriteExt},
    tracing::{debug, info},
    url::Url,
};

#[cfg(feature = "metrics")]
use ferry_metrics::{counter, histogram, labels, media as media_metrics};

use crate::{
    error::{Error, Result},
    reference,
    store::{self, MediaStore, StoredMedia},
};

/// Large media tolerance: minutes, not seconds.
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);

/// Build the HTTP client shared by downloaders.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(Error::HttpClient)
}

/// Downloads remote media into a [`MediaStore`].
#[derive(Debug, Clone)]
pub struct Downloader {
    client: reqwest::Client,
    store: MediaStore,
}

impl Downloader {
    pub fn new(store: MediaStore, timeout: Duration) -> Result<Self> {
        Ok(Self::with_client(store, build_client(timeout)?))
    }

    pub fn with_client(store: MediaStore, client: reqwest::Client) -> Self {
        Self { client, store }
    }

    pub fn store(&self) -> &MediaStore {
        &self.store
    }

    /// Download `url` into the store.
    ///
    /// On any error no file from this call is left behind.
    pub async fn download(&self, url: &str) -> Result<StoredMedia> {
        #[cfg(feature = "metrics")]
        let started = std::time::Instant::now();

        let result = self.fetch_to_store(url).await;

        #[cfg(feature = "metrics")]
        {
            let kind = self.store.kind().as_str();
            match &result {
                Ok(stored) => {
                    counter!(media_metrics::DOWNLOADS_TOTAL, labels::KIND => kind).increment(1);
                    counter!(media_metrics::DOWNLOAD_BYTES_TOTAL, labels::KIND => kind)
                        .increment(stored.bytes_written);
                },
                Err(e) => {
                    counter!(
                        media_metrics::DOWNLOAD_ERRORS_TOTAL,
                        labels::KIND => kind,
                        labels::REASON => e.reason()
                    )
                    .increment(1);
                },
            }
            histogram!(media_metrics::DOWNLOAD_DURATION_SECONDS, labels::KIND => kind)
                .record(started.elapsed().as_secs_f64());
        }

        result
    }

    async fn fetch_to_store(&self, url: &str) -> Result<StoredMedia> {
        let kind = self.store.kind();
        let parsed = validate_url(url)?;

        debug!(url, %kind, "requesting media");
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|source| Error::Network {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status,
            });
        }

        let (path, file) = self.store.create(url, kind.default_extension()).await?;

        let written = match stream_to_file(response, file, url, &path).await {
            Ok(written) => written,
            Err(e) => {
                store::discard(&path).await;
                return Err(e);
            },
        };

        if written == 0 {
            store::discard(&path).await;
            return Err(Error::empty(format!("downloaded {kind} from {url}")));
        }

        let (path, sniffed) = match self.store.settle(&path).await {
            Ok(settled) => settled,
            Err(e) => {
                store::discard(&path).await;
                return Err(e);
            },
        };

        info!(
            url,
            path = %path.display(),
            bytes = written,
            mime = sniffed.mime_type,
            "downloaded {kind}"
        );

        Ok(StoredMedia {
            path,
            bytes_written: written,
            mime_type: Some(sniffed.mime_type),
        })
    }
}

/// Accept only http(s) URLs with a host.
fn validate_url(raw: &str) -> Result<Url> {
    let invalid = || Error::InvalidReference {
        reference: raw.to_string(),
    };

    if !reference::is_remote(raw) {
        return Err(invalid());
    }
    let parsed = Url::parse(raw).map_err(|_| invalid())?;
    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(parsed),
        _ => Err(invalid()),
    }
}

async fn stream_to_file(
    response: reqwest::Response,
    mut file: fs::File,
    url: &str,
    path: &Path,
) -> Result<u64> {
    let write_err =
        |source| Error::io(format!("failed to write {}", path.display()), source);

    let mut written = 0u64;
    let mut body = response.bytes_stream();
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|source| Error::Network {
            url: url.to_string(),
            source,
        })?;
        file.write_all(&chunk).await.map_err(write_err)?;
        written += chunk.len() as u64;
    }
    file.flush().await.map_err(write_err)?;

    Ok(written)
}
