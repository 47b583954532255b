//! Persisting byte streams that were handed to us rather than fetched.

use std::{ffi::OsStr, path::Path};

use {
    ferry_config::UploadTrust,
    tokio::io::{AsyncRead, AsyncWriteExt},
    tracing::info,
};

#[cfg(feature = "metrics")]
use ferry_metrics::{counter, labels, media as media_metrics};

use crate::{
    error::{Error, Result},
    store::{self, MediaStore, StoredMedia},
};

/// Writes uploaded streams into a [`MediaStore`].
#[derive(Debug, Clone)]
pub struct UploadPersister {
    store: MediaStore,
    trust: UploadTrust,
}

impl UploadPersister {
    pub fn new(store: MediaStore, trust: UploadTrust) -> Self {
        Self { store, trust }
    }

    pub fn store(&self) -> &MediaStore {
        &self.store
    }

    pub fn trust(&self) -> UploadTrust {
        self.trust
    }

    /// Stream `reader` to a new file named after `original_name`.
    ///
    /// With [`UploadTrust::Declared`] the extension of `original_name` is kept
    /// as is; with [`UploadTrust::Sniffed`] the content must sniff as this
    /// store's kind and the extension is corrected to match.
    pub async fn persist<R>(&self, mut reader: R, original_name: &str) -> Result<StoredMedia>
    where
        R: AsyncRead + Unpin,
    {
        let kind = self.store.kind();
        let extension = declared_extension(original_name)
            .unwrap_or_else(|| kind.default_extension().to_string());
        let content_key = format!("{original_name}_{}", store::time_salt());

        let (path, mut file) = self.store.create(&content_key, &extension).await?;

        let copied = async {
            let written = tokio::io::copy(&mut reader, &mut file).await?;
            file.flush().await?;
            Ok::<_, std::io::Error>(written)
        }
        .await;
        drop(file);

        let written = match copied {
            Ok(written) => written,
            Err(source) => {
                store::discard(&path).await;
                return Err(Error::io(
                    format!("failed to save uploaded {kind} {original_name}"),
                    source,
                ));
            },
        };

        if written == 0 {
            store::discard(&path).await;
            return Err(Error::empty(format!("uploaded {kind} {original_name}")));
        }

        let (path, mime_type) = match self.trust {
            UploadTrust::Declared => (path, None),
            UploadTrust::Sniffed => match self.store.settle(&path).await {
                Ok((settled, sniffed)) => (settled, Some(sniffed.mime_type)),
                Err(e) => {
                    store::discard(&path).await;
                    return Err(e);
                },
            },
        };

        info!(
            original_name,
            path = %path.display(),
            bytes = written,
            trust = ?self.trust,
            "saved uploaded {kind}"
        );

        #[cfg(feature = "metrics")]
        counter!(media_metrics::UPLOADS_TOTAL, labels::KIND => kind.as_str()).increment(1);

        Ok(StoredMedia {
            path,
            bytes_written: written,
            mime_type,
        })
    }
}

/// Lowercased extension of `name`, if it has a plain alphanumeric one.
fn declared_extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(OsStr::to_str)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, crate::store::MediaKind, rstest::rstest};

    const MP4: &[u8] = &[
        0x00, 0x00, 0x00, 0x18, b'f', b't', b'y', b'p', b'i', b's', b'o', b'm', 0x00, 0x00, 0x02,
        0x00, b'i', b's', b'o', b'm', b'm', b'p', b'4', b'1',
    ];
    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    async fn persister(dir: &Path, trust: UploadTrust) -> UploadPersister {
        let store = MediaStore::open(dir, MediaKind::Video).await.unwrap();
        UploadPersister::new(store, trust)
    }

    #[rstest]
    #[case("clip.MOV", Some("mov"))]
    #[case("holiday.final.webm", Some("webm"))]
    #[case("noext", None)]
    #[case("trailing.", None)]
    #[case("weird.m p4", None)]
    #[case("", None)]
    fn extension_from_declared_name(#[case] name: &str, #[case] expected: Option<&str>) {
        assert_eq!(declared_extension(name).as_deref(), expected);
    }

    #[tokio::test]
    async fn declared_trust_keeps_name_extension() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = persister(dir.path(), UploadTrust::Declared).await;

        let stored = uploads.persist(&b"opaque bytes"[..], "clip.MOV").await.unwrap();

        assert_eq!(stored.bytes_written, 12);
        assert_eq!(stored.mime_type, None);
        assert_eq!(stored.path.extension().unwrap(), "mov");
        assert_eq!(std::fs::read(&stored.path).unwrap(), b"opaque bytes");
        let name = stored.path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("video_"));
    }

    #[tokio::test]
    async fn missing_extension_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = persister(dir.path(), UploadTrust::Declared).await;
        let stored = uploads.persist(MP4, "recording").await.unwrap();
        assert_eq!(stored.path.extension().unwrap(), "mp4");
    }

    #[tokio::test]
    async fn same_name_twice_yields_two_files() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = persister(dir.path(), UploadTrust::Declared).await;
        let a = uploads.persist(MP4, "clip.mp4").await.unwrap();
        let b = uploads.persist(MP4, "clip.mp4").await.unwrap();
        assert_ne!(a.path, b.path);
    }

    #[tokio::test]
    async fn empty_upload_is_rejected_and_removed() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = persister(dir.path(), UploadTrust::Declared).await;

        let err = uploads.persist(&b""[..], "clip.mp4").await.unwrap_err();

        assert!(matches!(err, Error::EmptyContent { .. }));
        assert!(err.to_string().contains("clip.mp4"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn sniffed_trust_corrects_extension() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = persister(dir.path(), UploadTrust::Sniffed).await;

        let stored = uploads.persist(MP4, "clip.bin").await.unwrap();

        assert_eq!(stored.mime_type, Some("video/mp4"));
        assert_eq!(stored.path.extension().unwrap(), "mp4");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn sniffed_trust_rejects_non_video() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = persister(dir.path(), UploadTrust::Sniffed).await;

        let err = uploads.persist(PNG, "clip.mp4").await.unwrap_err();

        assert!(matches!(err, Error::TypeMismatch { .. }));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
