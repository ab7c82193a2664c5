//! Unified error types for birdie.
//!
//! Every variant carries a stable prefix code so host adapters and logs can
//! tell failure classes apart without matching on message text.

use tokio_rusqlite::rusqlite;

/// Unified error type shared by the cache, the client and the router.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty manifest path).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Invalid or unsupported URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// A stored entry could not be encoded or decoded.
    #[error("CACHE_ERROR: invalid stored entry: {0}")]
    InvalidEntry(String),

    /// The request could not be made at all.
    #[error("NETWORK_ERROR: {0}")]
    Network(String),

    /// The request was made but the server answered with a non-2xx status.
    #[error("HTTP_ERROR: status {status}, body: {body}")]
    HttpStatus { status: u16, body: String },

    /// Response body was not the expected JSON shape.
    #[error("DECODE_ERROR: {0}")]
    Decode(String),

    /// A lifecycle event arrived in a state that cannot accept it.
    #[error("LIFECYCLE_ERROR: {0}")]
    Lifecycle(String),

    /// Deferred work replay failed; the host should retry later.
    #[error("REPLAY_FAILED: {0}")]
    Replay(String),
}

impl Error {
    /// HTTP status a host adapter should answer with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::InvalidInput(_) | Error::InvalidUrl(_) => 400,
            Error::Lifecycle(_) => 409,
            Error::Network(_) | Error::HttpStatus { .. } | Error::Decode(_) => 502,
            Error::Replay(_) => 503,
            Error::Database(_) | Error::MigrationFailed(_) | Error::InvalidEntry(_) => 500,
        }
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<crate::url::UrlError> for Error {
    fn from(err: crate::url::UrlError) -> Self {
        Error::InvalidUrl(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::HttpStatus { status: 404, body: "not found".to_string() };
        assert!(err.to_string().contains("HTTP_ERROR"));
        assert!(err.to_string().contains("404"));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_error_status_codes() {
        assert_eq!(Error::InvalidInput("x".into()).status_code(), 400);
        assert_eq!(Error::Lifecycle("x".into()).status_code(), 409);
        assert_eq!(Error::Network("x".into()).status_code(), 502);
        assert_eq!(Error::Replay("x".into()).status_code(), 503);
        assert_eq!(Error::InvalidEntry("x".into()).status_code(), 500);
    }

    #[test]
    fn test_from_url_error() {
        let err: Error = crate::url::UrlError::Empty.into();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }
}
