use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid URL: {0}")]
    Url(String),

    /// The request never produced a response
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected status: {0}")]
    Status(StatusCode),

    #[error("Failed to decode response: {0}")]
    Decode(String),
}
