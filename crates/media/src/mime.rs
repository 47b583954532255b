//! Content type detection from magic bytes.
//!
//! Only the leading bytes of a file are inspected; file names and declared
//! content types are never consulted.

use std::path::Path;

use tokio::{fs, io::AsyncReadExt};

use crate::{
    error::{Error, Result},
    store::MediaKind,
};

/// Number of leading bytes read from a file for sniffing.
pub const SNIFF_LEN: usize = 8192;

/// What the leading bytes of a file say it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sniffed {
    pub extension: &'static str,
    pub mime_type: &'static str,
    /// `None` for recognised formats that are neither image nor video.
    pub kind: Option<MediaKind>,
}

impl Sniffed {
    pub fn is_image(&self) -> bool {
        self.kind == Some(MediaKind::Image)
    }

    pub fn is_video(&self) -> bool {
        self.kind == Some(MediaKind::Video)
    }
}

/// Identify `prefix` by its format signature. `None` when unrecognised.
pub fn sniff(prefix: &[u8]) -> Option<Sniffed> {
    let detected = infer::get(prefix)?;
    let kind = match detected.matcher_type() {
        infer::MatcherType::Image => Some(MediaKind::Image),
        infer::MatcherType::Video => Some(MediaKind::Video),
        _ => None,
    };
    Some(Sniffed {
        extension: detected.extension(),
        mime_type: detected.mime_type(),
        kind,
    })
}

/// Read at most [`SNIFF_LEN`] bytes of `path` and sniff them.
pub async fn sniff_file(path: &Path) -> Result<Option<Sniffed>> {
    let file = fs::File::open(path)
        .await
        .map_err(|source| Error::io(format!("failed to open {}", path.display()), source))?;

    let mut head = Vec::with_capacity(SNIFF_LEN);
    file.take(SNIFF_LEN as u64)
        .read_to_end(&mut head)
        .await
        .map_err(|source| Error::io(format!("failed to read {}", path.display()), source))?;

    Ok(sniff(&head))
}
