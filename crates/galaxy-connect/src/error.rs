//! Error types for the galaxy-connect crate

use galaxy_interface::GalaxyError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConnectError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid Galaxy URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Galaxy URL cannot carry an API path: {0}")]
    NotABase(String),

    #[error("Galaxy returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Galaxy has no resource at {0}")]
    NotFound(String),
}

impl From<ConnectError> for GalaxyError {
    fn from(err: ConnectError) -> Self {
        match err {
            ConnectError::Http(e) if e.is_decode() => GalaxyError::Decode(e.to_string()),
            ConnectError::Status { status, url } => GalaxyError::Status { status, url },
            ConnectError::NotFound(url) => GalaxyError::NotFound(url),
            other => GalaxyError::Transport(other.to_string()),
        }
    }
}
