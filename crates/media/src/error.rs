use std::path::PathBuf;

use crate::store::MediaKind;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid media URL: {reference}")]
    InvalidReference { reference: String },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("download of {url} failed with status: {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("{what} is empty")]
    EmptyContent { what: String },

    #[error("{} is not a valid {expected} (detected {detected})", .path.display())]
    TypeMismatch {
        path: PathBuf,
        expected: MediaKind,
        detected: String,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no valid images found")]
    NoValidImages,

    #[error("failed to download {kind} {reference}: {source}")]
    DownloadFailed {
        kind: MediaKind,
        reference: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    #[must_use]
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    #[must_use]
    pub fn empty(what: impl Into<String>) -> Self {
        Self::EmptyContent { what: what.into() }
    }

    #[must_use]
    pub fn download_failed(kind: MediaKind, reference: impl Into<String>, source: Error) -> Self {
        Self::DownloadFailed {
            kind,
            reference: reference.into(),
            source: Box::new(source),
        }
    }

    /// The error underneath any `DownloadFailed` wrapping.
    #[must_use]
    pub fn root_cause(&self) -> &Error {
        match self {
            Self::DownloadFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// HTTP status of a rejected download, if that is what failed.
    #[must_use]
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self.root_cause() {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short label used for logs and metrics.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self.root_cause() {
            Self::InvalidReference { .. } => "invalid_reference",
            Self::HttpClient(_) => "http_client",
            Self::Network { .. } => "network",
            Self::HttpStatus { .. } => "http_status",
            Self::EmptyContent { .. } => "empty_content",
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::Io { .. } => "io",
            Self::NoValidImages => "no_valid_images",
            Self::DownloadFailed { .. } => "download_failed",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_failure_names_reference_and_status() {
        let err = Error::download_failed(
            MediaKind::Image,
            "https://example.com/a.png",
            Error::HttpStatus {
                url: "https://example.com/a.png".into(),
                status: reqwest::StatusCode::NOT_FOUND,
            },
        );
        let msg = err.to_string();
        assert!(msg.contains("https://example.com/a.png"));
        assert!(msg.contains("404"));
        assert_eq!(err.status(), Some(reqwest::StatusCode::NOT_FOUND));
        assert_eq!(err.reason(), "http_status");
    }

    #[test]
    fn root_cause_of_plain_error_is_itself() {
        let err = Error::empty("uploaded video clip.mp4");
        assert!(matches!(err.root_cause(), Error::EmptyContent { .. }));
        assert_eq!(err.to_string(), "uploaded video clip.mp4 is empty");
        assert!(err.status().is_none());
    }
}
