//! Save roots and collision-resistant file naming.
//!
//! Every stored file is created with create-new semantics under its kind's
//! save root. The name combines a short SHA-256 prefix of a content key with a
//! nanosecond time salt; if the name is already taken the salt is bumped, so
//! two calls never write to the same file.

use std::{
    fmt, io,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use {
    sha2::{Digest, Sha256},
    tokio::fs,
    tracing::{debug, warn},
};

use crate::{
    error::{Error, Result},
    mime::{self, Sniffed},
};

/// Hex characters of the content hash kept in file names.
pub const HASH_PREFIX_LEN: usize = 16;

const MAX_CREATE_ATTEMPTS: u32 = 16;

/// Class of media a save root holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }

    /// Extension used before the content has been sniffed.
    pub fn default_extension(self) -> &'static str {
        match self {
            Self::Image => "jpg",
            Self::Video => "mp4",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file this pipeline wrote and validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMedia {
    pub path: PathBuf,
    pub bytes_written: u64,
    /// Sniffed MIME type; `None` when the declared extension was trusted.
    pub mime_type: Option<&'static str>,
}

/// Nanoseconds since the Unix epoch.
pub fn time_salt() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default()
}

/// `<kind>_<sha256(content_key)[..16]>_<salt>.<extension>`
pub fn file_name(kind: MediaKind, content_key: &str, salt: u128, extension: &str) -> String {
    let digest = Sha256::digest(content_key.as_bytes());
    let hex = format!("{digest:x}");
    format!("{kind}_{}_{salt}.{extension}", &hex[..HASH_PREFIX_LEN])
}

/// A save root for one kind of media.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    kind: MediaKind,
}

impl MediaStore {
    /// Open a save root, creating it (and its parents) if needed.
    pub async fn open(root: impl Into<PathBuf>, kind: MediaKind) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await.map_err(|source| {
            Error::io(
                format!("failed to create {kind} save directory {}", root.display()),
                source,
            )
        })?;
        debug!(root = %root.display(), %kind, "media store ready");
        Ok(Self { root, kind })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Create a new, empty file named after `content_key`.
    pub(crate) async fn create(
        &self,
        content_key: &str,
        extension: &str,
    ) -> Result<(PathBuf, fs::File)> {
        let mut salt = time_salt();
        let mut last_err = None;

        for _ in 0..MAX_CREATE_ATTEMPTS {
            let path = self
                .root
                .join(file_name(self.kind, content_key, salt, extension));
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    salt += 1;
                    last_err = Some(e);
                },
                Err(source) => {
                    return Err(Error::io(
                        format!("failed to create {} file {}", self.kind, path.display()),
                        source,
                    ));
                },
            }
        }

        Err(Error::io(
            format!("no free {} file name in {}", self.kind, self.root.display()),
            last_err.unwrap_or_else(|| io::Error::from(io::ErrorKind::AlreadyExists)),
        ))
    }

    /// Check a freshly written file against this store's kind and give it the
    /// sniffed extension.
    ///
    /// The rename is best effort: if it fails the file keeps its provisional
    /// extension and the call still succeeds. Callers that rely on the
    /// extension matching the content should use the returned [`Sniffed`].
    pub(crate) async fn settle(&self, path: &Path) -> Result<(PathBuf, Sniffed)> {
        let sniffed = mime::sniff_file(path).await?;
        let sniffed = match sniffed {
            Some(s) if s.kind == Some(self.kind) => s,
            other => {
                return Err(Error::TypeMismatch {
                    path: path.to_path_buf(),
                    expected: self.kind,
                    detected: other.map_or_else(|| "unknown type".to_string(), |s| {
                        s.mime_type.to_string()
                    }),
                });
            },
        };

        let corrected = path.with_extension(sniffed.extension);
        if corrected == path {
            return Ok((corrected, sniffed));
        }

        match rename_no_replace(path, &corrected).await {
            Ok(()) => {
                debug!(
                    from = %path.display(),
                    to = %corrected.display(),
                    "corrected extension from content"
                );
                Ok((corrected, sniffed))
            },
            Err(e) => {
                warn!(
                    path = %path.display(),
                    extension = sniffed.extension,
                    error = %e,
                    "failed to correct extension, keeping original name"
                );
                Ok((path.to_path_buf(), sniffed))
            },
        }
    }
}

/// Move `from` to `to`, failing with `AlreadyExists` if `to` is taken.
///
/// `to` is claimed with a hard link, so an existing file is never replaced.
async fn rename_no_replace(from: &Path, to: &Path) -> io::Result<()> {
    fs::hard_link(from, to).await?;
    if let Err(e) = fs::remove_file(from).await {
        discard(to).await;
        return Err(e);
    }
    Ok(())
}

/// Remove a partially written or rejected file.
pub(crate) async fn discard(path: &Path) {
    match fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "removed partial file"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {},
        Err(e) => warn!(path = %path.display(), error = %e, "failed to remove partial file"),
    }
}
