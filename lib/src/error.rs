// Copyright (c) 2022-2023 The MobileCoin Foundation

use signer_proto::{failure::FailureCode, MessageKind, ProtoError};
use tokio::time::error::Elapsed;

/// Plugin signer host API Error Type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport error
    #[error("Transport error {0}")]
    Transport(String),

    /// No devices available
    #[error("No devices found")]
    NoDevices,

    /// Device reported a failure
    #[error("Device failure ({code}): {message}")]
    Failure { code: FailureCode, message: String },

    /// User denied operation
    #[error("Action cancelled by user")]
    UserDenied,

    /// Unexpected response kind
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(MessageKind),

    /// Timeout waiting for user
    #[error("Timeout waiting for user interaction")]
    UserTimeout,

    /// Request timeout
    #[error("Timeout waiting for device response")]
    RequestTimeout,

    /// Message encoding / decoding failed
    #[error("Message encoding error: {0}")]
    Proto(#[from] ProtoError),

    /// Artifact parsing or verification failed
    #[error("{0}")]
    Signing(#[from] signer_core::engine::Error),

    /// PIN entry failed or was aborted
    #[error("PIN entry failed: {0}")]
    PinEntry(String),

    /// Failed to load input file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to fetch input URL
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<Elapsed> for Error {
    fn from(_: Elapsed) -> Self {
        Error::RequestTimeout
    }
}

impl Error {
    /// Map a device failure response to an [Error]
    pub fn failure(code: FailureCode, message: &str) -> Self {
        match code {
            FailureCode::ActionCancelled => Error::UserDenied,
            _ => Error::Failure {
                code,
                message: message.to_string(),
            },
        }
    }
}
