// Copyright (c) 2022-2023 The MobileCoin Foundation

//! PIN matrix messages
//!
//! PINs are never transmitted in cleartext. The device displays a random
//! permutation of digits 1-9 on a 3x3 grid, the host user clicks grid
//! positions and the host returns position symbols (`'1'..='9'`, numbered
//! row-major from the top left) in a [PinMatrixAck].

use encdec::{Decode, Encode};

use crate::{
    empty_message,
    helpers::{read_str, write_bytes},
    MessageKind, MessageStatic, ProtoError,
};

/// Maximum encoded PIN length
pub const MAX_PIN_LEN: usize = 9;

/// Device is displaying a PIN matrix and awaits a [PinMatrixAck]
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct PinMatrixRequest {}

empty_message!(PinMatrixRequest, MessageKind::PinMatrixRequest);

/// Request a PIN change (privileged, requires confirmation)
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct ChangePin {}

empty_message!(ChangePin, MessageKind::ChangePin);

/// Matrix-encoded PIN response
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |    PIN_LEN    |                   RESERVED                    |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                     PIN (position symbols)                    /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// The symbols are not validated here, the device rejects out-of-range
/// positions with a syntax error.
#[derive(Clone, PartialEq, Debug)]
pub struct PinMatrixAck<'a> {
    pub pin: &'a str,
}

impl<'a> PinMatrixAck<'a> {
    pub fn new(pin: &'a str) -> Self {
        Self { pin }
    }
}

impl<'a> MessageStatic for PinMatrixAck<'a> {
    const KIND: MessageKind = MessageKind::PinMatrixAck;
}

impl<'a> Encode for PinMatrixAck<'a> {
    type Error = ProtoError;

    fn encode_len(&self) -> Result<usize, ProtoError> {
        Ok(4 + self.pin.len())
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ProtoError> {
        let d = self.pin.as_bytes();

        if d.len() > u8::MAX as usize {
            return Err(ProtoError::InvalidLength);
        }
        if buff.len() < 4 + d.len() {
            return Err(ProtoError::InvalidLength);
        }

        // Write length and padding
        buff[0] = d.len() as u8;
        buff[1..4].fill(0);

        write_bytes(buff, 4, d)
    }
}

impl<'a> Decode<'a> for PinMatrixAck<'a> {
    type Output = Self;
    type Error = ProtoError;

    fn decode(buff: &'a [u8]) -> Result<(Self, usize), ProtoError> {
        if buff.len() < 4 {
            return Err(ProtoError::InvalidLength);
        }

        let (pin, index) = read_str(buff, 4, buff[0] as usize)?;

        Ok((Self { pin }, index))
    }
}
