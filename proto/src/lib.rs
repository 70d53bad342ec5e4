// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Protocol / message definitions for plugin signer communication
//!
//! This module provides a protocol specification and reference implementation for communication
//! between a host and the signing appliance.
//!
//! Each message is carried as a single frame over a [ByteChannel]: one kind byte
//! (see [MessageKind]) followed by the message body. Transport framing (splitting
//! frames over USB / serial reports) is the responsibility of the channel implementation.
//!
//! Encodings are intended to be _roughly_ equivalent to packed c structures while maintaining
//! 32-bit field alignment for headers. All integer encodings are little-endian.

use core::fmt::Debug;

use encdec::{Decode, Encode};
use num_enum::TryFromPrimitive;
use strum::{Display, EnumIter};

pub mod button;
pub mod channel;
pub mod failure;
pub mod pin;
pub mod prelude;
pub mod sign;

mod helpers;

pub use channel::ByteChannel;

/// Protocol version, incremented on breaking changes to message encodings
pub const SIGNER_PROTO_VERSION: u8 = 0x01;

/// Maximum frame size accepted by [split_frame]
pub const MAX_FRAME_LEN: usize = 1 << 20;

/// Message kind identifiers (first byte of each frame)
#[derive(Copy, Clone, PartialEq, Debug, Display, EnumIter, TryFromPrimitive)]
#[repr(u8)]
pub enum MessageKind {
    // Host to device
    /// Request a plugin configuration signature
    SignPluginConfig = 0x10,

    /// Acknowledge a confirmation prompt is displayed
    ButtonAck = 0x11,

    /// Matrix-encoded PIN response
    PinMatrixAck = 0x12,

    /// Request a PIN change
    ChangePin = 0x13,

    // Device to host
    /// Device is awaiting a button decision
    ButtonRequest = 0x20,

    /// Device is displaying a PIN matrix
    PinMatrixRequest = 0x21,

    /// Signed configuration artifact
    SignedObject = 0x22,

    /// Operation failed
    Failure = 0x23,

    /// Operation succeeded without payload
    Success = 0x24,
}

/// Protocol errors
#[derive(Copy, Clone, PartialEq, Debug, thiserror::Error)]
pub enum ProtoError {
    /// Buffer too short for the encoded object
    #[error("invalid message length")]
    InvalidLength,

    /// Invalid UTF8 in string field
    #[error("invalid utf8 string")]
    InvalidUtf8,

    /// Invalid field encoding
    #[error("invalid field encoding")]
    InvalidEncoding,

    /// Frame contained no kind byte
    #[error("empty frame")]
    EmptyFrame,

    /// Unrecognised kind byte
    #[error("unknown message kind 0x{0:02x}")]
    UnknownKind(u8),
}

impl From<encdec::Error> for ProtoError {
    fn from(_e: encdec::Error) -> Self {
        ProtoError::InvalidLength
    }
}

/// Static message kind binding, used for framing
pub trait MessageStatic {
    const KIND: MessageKind;
}

/// Encode a message to a frame (kind byte followed by the message body)
pub fn to_frame<M>(m: &M) -> Result<Vec<u8>, ProtoError>
where
    M: MessageStatic + Encode<Error = ProtoError>,
{
    let n = m.encode_len()?;
    let mut buff = vec![0u8; n + 1];

    buff[0] = M::KIND as u8;
    let written = m.encode(&mut buff[1..])?;
    buff.truncate(written + 1);

    Ok(buff)
}

/// Split a frame into message kind and body
pub fn split_frame(frame: &[u8]) -> Result<(MessageKind, &[u8]), ProtoError> {
    if frame.is_empty() {
        return Err(ProtoError::EmptyFrame);
    }
    if frame.len() > MAX_FRAME_LEN {
        return Err(ProtoError::InvalidLength);
    }

    let kind = MessageKind::try_from(frame[0]).map_err(|_| ProtoError::UnknownKind(frame[0]))?;

    Ok((kind, &frame[1..]))
}

/// Decode a message body from a frame, checking the kind byte
pub fn from_frame<'a, M>(frame: &'a [u8]) -> Result<M::Output, ProtoError>
where
    M: MessageStatic + Decode<'a, Error = ProtoError>,
{
    let (kind, body) = split_frame(frame)?;
    if kind != M::KIND {
        return Err(ProtoError::InvalidEncoding);
    }

    M::decode(body).map(|(v, _n)| v)
}

/// Helper macro for messages with an empty body
#[macro_export]
macro_rules! empty_message {
    ($t:ident, $k:expr) => {
        impl $crate::MessageStatic for $t {
            const KIND: $crate::MessageKind = $k;
        }

        impl encdec::Encode for $t {
            type Error = $crate::ProtoError;

            fn encode_len(&self) -> Result<usize, Self::Error> {
                Ok(0)
            }

            fn encode(&self, _buff: &mut [u8]) -> Result<usize, Self::Error> {
                Ok(0)
            }
        }

        impl encdec::DecodeOwned for $t {
            type Output = $t;
            type Error = $crate::ProtoError;

            fn decode_owned(_buff: &[u8]) -> Result<(Self::Output, usize), Self::Error> {
                Ok(($t {}, 0))
            }
        }
    };
}
