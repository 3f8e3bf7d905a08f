use thiserror::Error;

use crate::client::TwirpError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Media server error: {0}")]
    Remote(#[from] TwirpError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True when the remote reported a precondition failure, the one Twirp
    /// code this system treats specially ("recording already stopped").
    #[must_use]
    pub fn is_failed_precondition(&self) -> bool {
        matches!(self, Self::Remote(TwirpError::Api { code, .. }) if code == "failed_precondition")
    }
}

pub type Result<T> = std::result::Result<T, Error>;
