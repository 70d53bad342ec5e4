// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Result messages (failure / success)

use encdec::{Decode, Encode};
use num_enum::TryFromPrimitive;
use strum::{Display, EnumIter, EnumString};

use crate::{
    helpers::{read_str, write_bytes},
    MessageKind, MessageStatic, ProtoError,
};

/// Failure codes, carried in [Failure] responses
#[derive(
    Copy, Clone, PartialEq, Eq, Debug, Display, EnumString, EnumIter, TryFromPrimitive,
)]
#[repr(u8)]
pub enum FailureCode {
    /// Message not valid in the current state
    UnexpectedMessage = 1,
    /// Malformed PIN encoding
    SyntaxError = 3,
    /// Operation declined on the device
    ActionCancelled = 4,
    /// Wrong PIN
    PinInvalid = 7,
    /// Any other operation failure
    Other = 9,
}

/// Universal negative reply
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     CODE      |   RESERVED    |          MESSAGE_LEN          |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                        MESSAGE (utf8)                         /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Debug)]
pub struct Failure<'a> {
    pub code: FailureCode,
    pub message: &'a str,
}

impl<'a> Failure<'a> {
    pub fn new(code: FailureCode, message: &'a str) -> Self {
        Self { code, message }
    }
}

impl<'a> MessageStatic for Failure<'a> {
    const KIND: MessageKind = MessageKind::Failure;
}

impl<'a> Encode for Failure<'a> {
    type Error = ProtoError;

    fn encode_len(&self) -> Result<usize, ProtoError> {
        Ok(4 + self.message.len())
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ProtoError> {
        let d = self.message.as_bytes();

        if d.len() > u16::MAX as usize || buff.len() < 4 + d.len() {
            return Err(ProtoError::InvalidLength);
        }

        buff[0] = self.code as u8;
        buff[1] = 0;
        (d.len() as u16).encode(&mut buff[2..])?;

        write_bytes(buff, 4, d)
    }
}

impl<'a> Decode<'a> for Failure<'a> {
    type Output = Self;
    type Error = ProtoError;

    fn decode(buff: &'a [u8]) -> Result<(Self, usize), ProtoError> {
        if buff.len() < 4 {
            return Err(ProtoError::InvalidLength);
        }

        let code = FailureCode::try_from(buff[0]).map_err(|_| ProtoError::InvalidEncoding)?;
        let (len, _) = u16::decode(&buff[2..])?;
        let (message, index) = read_str(buff, 4, len as usize)?;

        Ok((Self { code, message }, index))
    }
}

/// Positive reply for operations without a payload
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |          MESSAGE_LEN          |           RESERVED            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                        MESSAGE (utf8)                         /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Debug)]
pub struct Success<'a> {
    pub message: &'a str,
}

impl<'a> MessageStatic for Success<'a> {
    const KIND: MessageKind = MessageKind::Success;
}

impl<'a> Encode for Success<'a> {
    type Error = ProtoError;

    fn encode_len(&self) -> Result<usize, ProtoError> {
        Ok(4 + self.message.len())
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ProtoError> {
        let d = self.message.as_bytes();

        if d.len() > u16::MAX as usize || buff.len() < 4 + d.len() {
            return Err(ProtoError::InvalidLength);
        }

        (d.len() as u16).encode(&mut buff[..])?;
        buff[2..4].fill(0);

        write_bytes(buff, 4, d)
    }
}

impl<'a> Decode<'a> for Success<'a> {
    type Output = Self;
    type Error = ProtoError;

    fn decode(buff: &'a [u8]) -> Result<(Self, usize), ProtoError> {
        if buff.len() < 4 {
            return Err(ProtoError::InvalidLength);
        }

        let (len, _) = u16::decode(buff)?;
        let (message, index) = read_str(buff, 4, len as usize)?;

        Ok((Self { message }, index))
    }
}
