use std::path::PathBuf;

/// Errors raised while building the viewer's state or loading its config.
///
/// Classification failures are not errors in this sense; they are reported
/// through [`crate::ClassifyState::Failed`].
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error("slideshow needs at least one image")]
    EmptyImageList,
    #[error("invalid base url {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("advance interval must be greater than zero")]
    ZeroInterval,
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("cannot build http client: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T, E = ViewerError> = std::result::Result<T, E>;
