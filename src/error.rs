use std::path::PathBuf;

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum CentaurusError {
    #[error("link is neither an IMDB title nor a TMDB movie link: {0}")]
    #[diagnostic(help("expected https://www.imdb.com/title/tt… or https://www.themoviedb.org/movie/…"))]
    UnsupportedLink(String),

    #[error("no metadata found for {0}")]
    NotFound(String),

    #[error("TMDB request failed: {0}")]
    TmdbHttp(String),

    #[error("TMDB returned status {status}: {message}")]
    TmdbStatus { status: u16, message: String },

    #[error("TMDB returned a malformed response: {0}")]
    MalformedResponse(String),

    #[error("TMDB_API_KEY is not set or blank")]
    #[diagnostic(help("export TMDB_API_KEY=<your key> before running"))]
    MissingApiKey,

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("invalid content name: {0}")]
    InvalidName(String),

    #[error("asset path is required")]
    MissingAssetPath,

    #[error("asset file not found: {0}")]
    MissingAsset(String),

    #[error("failed to render sidecar: {0}")]
    Render(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}

/// Failure families reported across the UI boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    LinkParseFailure,
    NotFound,
    ServiceError,
    IoError,
    ConfigurationError,
    InvalidInput,
}

impl CentaurusError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CentaurusError::UnsupportedLink(_) => ErrorKind::LinkParseFailure,
            CentaurusError::NotFound(_) => ErrorKind::NotFound,
            CentaurusError::TmdbHttp(_)
            | CentaurusError::TmdbStatus { .. }
            | CentaurusError::MalformedResponse(_) => ErrorKind::ServiceError,
            CentaurusError::MissingApiKey
            | CentaurusError::ConfigRead(_)
            | CentaurusError::ConfigParse(_) => ErrorKind::ConfigurationError,
            CentaurusError::InvalidName(_) | CentaurusError::MissingAssetPath => {
                ErrorKind::InvalidInput
            }
            CentaurusError::MissingAsset(_)
            | CentaurusError::Render(_)
            | CentaurusError::Filesystem(_) => ErrorKind::IoError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_failures_share_a_kind() {
        let transport = CentaurusError::TmdbHttp("connection refused".to_string());
        let status = CentaurusError::TmdbStatus {
            status: 401,
            message: "Invalid API key".to_string(),
        };
        assert_eq!(transport.kind(), ErrorKind::ServiceError);
        assert_eq!(status.kind(), ErrorKind::ServiceError);
        assert_ne!(
            CentaurusError::NotFound("tt0000001".to_string()).kind(),
            ErrorKind::ServiceError
        );
    }
}
