// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Plugin configuration signing messages

use encdec::{Decode, Encode};

use crate::{
    helpers::{read_bytes, write_bytes},
    MessageKind, MessageStatic, ProtoError,
};

/// Request a signature over a plugin configuration.
///
/// `config` is the JSON configuration text, `protospec` the protocol
/// descriptor source to be compiled into the signed configuration.
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                          CONFIG_LEN                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                         PROTOSPEC_LEN                         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                            CONFIG                             /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                           PROTOSPEC                           /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Debug)]
pub struct SignPluginConfig<'a> {
    /// JSON configuration
    pub config: &'a [u8],
    /// Protocol descriptor source
    pub protospec: &'a [u8],
}

impl<'a> SignPluginConfig<'a> {
    pub fn new(config: &'a [u8], protospec: &'a [u8]) -> Self {
        Self { config, protospec }
    }
}

impl<'a> MessageStatic for SignPluginConfig<'a> {
    const KIND: MessageKind = MessageKind::SignPluginConfig;
}

impl<'a> Encode for SignPluginConfig<'a> {
    type Error = ProtoError;

    fn encode_len(&self) -> Result<usize, ProtoError> {
        Ok(8 + self.config.len() + self.protospec.len())
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ProtoError> {
        let mut index = 0;

        if buff.len() < self.encode_len()? {
            return Err(ProtoError::InvalidLength);
        }

        index += (self.config.len() as u32).encode(&mut buff[index..])?;
        index += (self.protospec.len() as u32).encode(&mut buff[index..])?;

        index = write_bytes(buff, index, self.config)?;
        index = write_bytes(buff, index, self.protospec)?;

        Ok(index)
    }
}

impl<'a> Decode<'a> for SignPluginConfig<'a> {
    type Output = Self;
    type Error = ProtoError;

    fn decode(buff: &'a [u8]) -> Result<(Self, usize), ProtoError> {
        let mut index = 0;

        // Check header length
        if buff.len() < 8 {
            return Err(ProtoError::InvalidLength);
        }

        let (config_len, n) = u32::decode(&buff[index..])?;
        index += n;

        let (protospec_len, n) = u32::decode(&buff[index..])?;
        index += n;

        let (config, index) = read_bytes(buff, index, config_len as usize)?;
        let (protospec, index) = read_bytes(buff, index, protospec_len as usize)?;

        Ok((Self { config, protospec }, index))
    }
}

/// Signed configuration response, `payload` contains the hex encoded
/// artifact (`hex(signature) || hex(descriptor)`).
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                          PAYLOAD_LEN                          |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                            PAYLOAD                            /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Debug)]
pub struct SignedObject<'a> {
    pub payload: &'a [u8],
}

impl<'a> MessageStatic for SignedObject<'a> {
    const KIND: MessageKind = MessageKind::SignedObject;
}

impl<'a> Encode for SignedObject<'a> {
    type Error = ProtoError;

    fn encode_len(&self) -> Result<usize, ProtoError> {
        Ok(4 + self.payload.len())
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ProtoError> {
        let mut index = (self.payload.len() as u32).encode(buff)?;
        index = write_bytes(buff, index, self.payload)?;
        Ok(index)
    }
}

impl<'a> Decode<'a> for SignedObject<'a> {
    type Output = Self;
    type Error = ProtoError;

    fn decode(buff: &'a [u8]) -> Result<(Self, usize), ProtoError> {
        let (len, index) = u32::decode(buff)?;
        let (payload, index) = read_bytes(buff, index, len as usize)?;

        Ok((Self { payload }, index))
    }
}
