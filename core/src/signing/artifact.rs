// Copyright (c) 2022-2023 The MobileCoin Foundation

use k256::ecdsa::{signature::Verifier, Signature, VerifyingKey};
use prost::Message;

use super::Configuration;
use crate::engine::Error;

/// Signature length in bytes
pub const SIGNATURE_LEN: usize = 64;

/// Signed configuration artifact, serialised as `hex(signature) || hex(payload)`
#[derive(Clone, PartialEq, Debug)]
pub struct SignedArtifact {
    signature: [u8; SIGNATURE_LEN],
    payload: Vec<u8>,
}

impl SignedArtifact {
    /// Pack a signature and payload, failing where the signature is not [SIGNATURE_LEN] bytes
    pub fn pack(signature: &[u8], payload: Vec<u8>) -> Result<Self, Error> {
        let signature = signature
            .try_into()
            .map_err(|_| Error::SignatureLength(signature.len()))?;

        Ok(Self { signature, payload })
    }

    pub fn signature(&self) -> &[u8; SIGNATURE_LEN] {
        &self.signature
    }

    /// Serialised [Configuration]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Encode artifact to hex
    pub fn to_hex(&self) -> String {
        let mut s = hex::encode(self.signature);
        s.push_str(&hex::encode(&self.payload));
        s
    }

    /// Parse a hex encoded artifact (surrounding whitespace is ignored)
    pub fn from_hex(s: &str) -> Result<Self, Error> {
        let b = hex::decode(s.trim())?;
        if b.len() < SIGNATURE_LEN {
            return Err(Error::SignatureLength(b.len()));
        }

        let (signature, payload) = b.split_at(SIGNATURE_LEN);
        Self::pack(signature, payload.to_vec())
    }

    /// Decode the signed [Configuration]
    pub fn descriptor(&self) -> Result<Configuration, Error> {
        Ok(Configuration::decode(self.payload.as_slice())?)
    }

    /// Verify the artifact signature against the provided key
    pub fn verify(&self, key: &VerifyingKey) -> Result<(), Error> {
        let signature = Signature::from_slice(&self.signature).map_err(|_| Error::Signature)?;
        let signature = signature.normalize_s().unwrap_or(signature);

        key.verify(&self.payload, &signature)
            .map_err(|_| Error::Signature)
    }
}
