//! Twirp transport errors.
//!
//! The media server's admin API is Twirp: JSON POSTs to
//! `/twirp/livekit.{Service}/{Method}`. Failures come back as a JSON body
//! `{"code": "...", "msg": "..."}` with a non-2xx status; the `code` string
//! is the part callers match on.

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TwirpError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error {status} for {url}")]
    Http {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("API error ({code}): {msg}")]
    Api { code: String, msg: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<reqwest::Error> for TwirpError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<serde_json::Error> for TwirpError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct TwirpErrorBody {
    code: String,
    msg: String,
}

/// Check the response status before processing the body. Error statuses
/// with a decodable Twirp body become `Api` errors carrying the wire code.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, TwirpError> {
    let status = resp.status();
    if status.is_client_error() || status.is_server_error() {
        let url = resp.url().to_string();
        let bytes = resp.bytes().await.unwrap_or_default();
        if let Ok(body) = serde_json::from_slice::<TwirpErrorBody>(&bytes) {
            return Err(TwirpError::Api {
                code: body.code,
                msg: body.msg,
            });
        }
        return Err(TwirpError::Http { status, url });
    }
    Ok(resp)
}
