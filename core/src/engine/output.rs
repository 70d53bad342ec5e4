// Copyright (c) 2022-2023 The MobileCoin Foundation

use signer_proto::{prelude::*, to_frame};

use super::Error;

/// [`Engine`][super::Engine] outputs (in response to events), typically encoded to
/// response frames
#[derive(Clone, PartialEq, Debug)]
pub enum Output {
    /// No response (event consumed)
    None,

    /// Confirmation prompt displayed, awaiting button decision
    ButtonRequest,

    /// PIN matrix displayed, awaiting PIN entry
    PinMatrixRequest,

    /// Signed artifact (hex encoded)
    SignedObject { payload: Vec<u8> },

    /// Operation completed
    Success { message: String },

    /// Operation failed
    Failure { code: FailureCode, message: String },
}

impl Output {
    /// Build a failure output from an engine error
    pub fn failure(e: &Error) -> Self {
        Output::Failure {
            code: e.code(),
            message: e.to_string(),
        }
    }

    /// Check whether this output completes an operation
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Output::SignedObject { .. } | Output::Success { .. } | Output::Failure { .. }
        )
    }

    /// Encode output to a response frame, [Output::None] encodes to an empty frame
    pub fn encode(&self) -> Result<Vec<u8>, ProtoError> {
        match self {
            Output::None => Ok(Vec::new()),
            Output::ButtonRequest => to_frame(&ButtonRequest {}),
            Output::PinMatrixRequest => to_frame(&PinMatrixRequest {}),
            Output::SignedObject { payload } => to_frame(&SignedObject { payload }),
            Output::Success { message } => to_frame(&Success { message }),
            Output::Failure { code, message } => to_frame(&Failure::new(*code, message)),
        }
    }
}
