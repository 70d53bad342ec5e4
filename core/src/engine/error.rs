// Copyright (c) 2022-2023 The MobileCoin Foundation

use signer_proto::{failure::FailureCode, ProtoError};

/// [Engine][super::Engine] errors
///
/// Every error is reported to the host as a
/// [`Failure`][signer_proto::failure::Failure], see [Error::code].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Message not valid in the current state
    #[error("Unexpected message")]
    UnexpectedMessage,

    /// Malformed PIN encoding
    #[error("Syntax error")]
    SyntaxError,

    /// Action declined by the user
    #[error("Action cancelled by user")]
    ActionCancelled,

    /// PIN did not match the stored PIN
    #[error("Invalid PIN")]
    PinInvalid,

    /// Invalid configuration JSON
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid hex integer in configuration
    #[error("invalid hex value '{0}'")]
    InvalidHex(String),

    /// Protocol descriptor compilation failed
    #[error("descriptor compilation failed: {0}")]
    Compile(String),

    /// Signing key could not be loaded
    #[error("invalid signing key: {0}")]
    Key(String),

    /// Signature verification failed
    #[error("signature verification failed")]
    Signature,

    /// Signature was not the expected length
    #[error("Signature must be 64 bytes long (got {0})")]
    SignatureLength(usize),

    /// Configuration encoding failed
    #[error("encoding failed: {0}")]
    Encoding(#[from] prost::EncodeError),

    /// Configuration decoding failed
    #[error("decoding failed: {0}")]
    Decoding(#[from] prost::DecodeError),

    /// Artifact contained invalid hex
    #[error("invalid artifact encoding: {0}")]
    Artifact(#[from] hex::FromHexError),

    /// Clock before unix epoch, or validity period overflow
    #[error("invalid clock or validity period")]
    Clock,

    /// Message encoding failed
    #[error("message encoding: {0}")]
    Proto(#[from] ProtoError),

    /// IO error (key file, compiler invocation)
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Fault during action execution
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Failure code reported to the host for this error
    pub fn code(&self) -> FailureCode {
        match self {
            Error::UnexpectedMessage => FailureCode::UnexpectedMessage,
            Error::SyntaxError => FailureCode::SyntaxError,
            Error::ActionCancelled => FailureCode::ActionCancelled,
            Error::PinInvalid => FailureCode::PinInvalid,
            _ => FailureCode::Other,
        }
    }
}
