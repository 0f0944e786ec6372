//! Error types for MergeScope core.

use std::{error::Error, fmt, io};

/// Failure reported by a snapshot provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// No snapshot exists for the requested repository.
    NotFound(String),
    /// The upstream source refused the request because of rate limits.
    RateLimited,
    /// The caller is not allowed to read the repository.
    Unauthorized,
    /// The snapshot could not be read.
    Io(String),
    /// The stored snapshot is not valid JSON for a snapshot.
    Malformed(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(repo) => write!(f, "repository not found: {repo}"),
            Self::RateLimited => write!(f, "rate limited by snapshot provider"),
            Self::Unauthorized => write!(f, "unauthorized to read repository"),
            Self::Io(message) => write!(f, "snapshot read failed: {message}"),
            Self::Malformed(message) => write!(f, "malformed snapshot: {message}"),
        }
    }
}

impl Error for ProviderError {}

/// Error type for MergeScope core operations.
#[derive(Debug)]
pub enum MergeScopeError {
    /// An underlying I/O error.
    Io(io::Error),
    /// JSON encoding or decoding failed.
    Json(serde_json::Error),
    /// The snapshot holds impossible data (negative counts, future timestamps, ...).
    InvalidSnapshot(String),
    /// A repository identifier could not be parsed.
    InvalidRepo(String),
    /// The snapshot provider failed.
    Provider(ProviderError),
}

impl fmt::Display for MergeScopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Json(err) => write!(f, "json error: {err}"),
            Self::InvalidSnapshot(message) => write!(f, "invalid snapshot: {message}"),
            Self::InvalidRepo(message) => write!(f, "invalid repository: {message}"),
            Self::Provider(err) => write!(f, "{err}"),
        }
    }
}

impl Error for MergeScopeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Provider(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for MergeScopeError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for MergeScopeError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<ProviderError> for MergeScopeError {
    fn from(value: ProviderError) -> Self {
        Self::Provider(value)
    }
}

/// Convenience result type for MergeScope core.
pub type Result<T> = std::result::Result<T, MergeScopeError>;

#[cfg(test)]
mod tests {
    use super::{MergeScopeError, ProviderError};
    use std::io;

    #[test]
    fn io_error_formats_message() {
        let error = MergeScopeError::Io(io::Error::new(io::ErrorKind::Other, "boom"));
        assert_eq!(format!("{error}"), "io error: boom");
    }

    #[test]
    fn invalid_snapshot_formats_message() {
        let error = MergeScopeError::InvalidSnapshot("negative comments on #4".to_string());
        assert_eq!(format!("{error}"), "invalid snapshot: negative comments on #4");
    }

    #[test]
    fn provider_errors_format_message() {
        let error: MergeScopeError = ProviderError::NotFound("octo/cat".to_string()).into();
        assert_eq!(format!("{error}"), "repository not found: octo/cat");
        assert_eq!(
            format!("{}", ProviderError::RateLimited),
            "rate limited by snapshot provider"
        );
    }

    #[test]
    fn from_io_error_maps_variant() {
        let error: MergeScopeError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        match error {
            MergeScopeError::Io(inner) => {
                assert_eq!(inner.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected Io variant, got {other:?}"),
        }
    }

    #[test]
    fn from_json_error_maps_variant() {
        let parse = serde_json::from_str::<serde_json::Value>("{").expect_err("invalid json");
        let error: MergeScopeError = parse.into();
        assert!(matches!(error, MergeScopeError::Json(_)));
    }
}
