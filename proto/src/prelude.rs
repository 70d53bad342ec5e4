//! Prelude to simplify downstream use of message objects
//!

pub use crate::{
    button::{ButtonAck, ButtonRequest},
    failure::{Failure, FailureCode, Success},
    pin::{ChangePin, PinMatrixAck, PinMatrixRequest},
    sign::{SignPluginConfig, SignedObject},
    ByteChannel, MessageKind, MessageStatic, ProtoError,
};
