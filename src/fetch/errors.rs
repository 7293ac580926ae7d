use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Unexpected status {0}")]
    Status(u16),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Client setup failed: {0}")]
    Client(String),
}
