// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Plugin configuration signing
//!
//! Composes a [Configuration] from the host-supplied JSON and compiled
//! protocol descriptor, then signs the canonical protobuf encoding with
//! deterministic ECDSA (secp256k1 / SHA-256, RFC 6979).

use k256::{
    ecdsa::{signature::Signer, Signature, SigningKey, VerifyingKey},
    pkcs8::{DecodePrivateKey, DecodePublicKey},
    PublicKey, SecretKey,
};
use prost::Message;

use crate::engine::Error;

mod artifact;
pub use artifact::{SignedArtifact, SIGNATURE_LEN};

mod compiler;
pub use compiler::{
    DescriptorCompiler, Protoc, DEFAULT_PROTO_DIR, DEFAULT_PROTO_FILE, PROTOC_ENV, PROTO_DIR_ENV,
};

mod config;
pub use config::{Configuration, DeviceDescriptor, PluginConfig};

/// Sign a plugin configuration using the current system time
pub fn sign<C: DescriptorCompiler>(
    compiler: &C,
    key_pem: &str,
    config_json: &[u8],
    protospec: &[u8],
) -> Result<SignedArtifact, Error> {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_err(|_| Error::Clock)?;

    sign_at(compiler, key_pem, config_json, protospec, now.as_secs())
}

/// Sign a plugin configuration issued at `issued_at` (unix seconds)
pub fn sign_at<C: DescriptorCompiler>(
    compiler: &C,
    key_pem: &str,
    config_json: &[u8],
    protospec: &[u8],
    issued_at: u64,
) -> Result<SignedArtifact, Error> {
    // Compile protocol descriptor
    let wire_protocol = compiler.compile(protospec)?;

    // Build and encode configuration
    let config = PluginConfig::from_json(config_json)?;
    let payload = config.compose(wire_protocol, issued_at)?.encode_to_vec();

    // Sign encoded configuration
    let key = signing_key_from_pem(key_pem)?;

    #[cfg(feature = "log")]
    log::info!(
        "signing {} byte configuration, verifying key: {}",
        payload.len(),
        hex::encode(key.verifying_key().to_encoded_point(true).as_bytes())
    );

    let signature: Signature = key.sign(&payload);

    SignedArtifact::pack(&signature.to_bytes(), payload)
}

/// Load a signing key from SEC1 (`EC PRIVATE KEY`) or PKCS#8 (`PRIVATE KEY`) PEM
pub fn signing_key_from_pem(pem: &str) -> Result<SigningKey, Error> {
    let secret = match pem.contains("BEGIN EC PRIVATE KEY") {
        true => SecretKey::from_sec1_pem(pem).map_err(|e| Error::Key(e.to_string()))?,
        false => SecretKey::from_pkcs8_pem(pem).map_err(|e| Error::Key(e.to_string()))?,
    };

    Ok(SigningKey::from(secret))
}

/// Load a verifying key from a public key PEM, or derive it from a private key PEM
pub fn verifying_key_from_pem(pem: &str) -> Result<VerifyingKey, Error> {
    if pem.contains("PRIVATE KEY") {
        return signing_key_from_pem(pem).map(|k| VerifyingKey::from(&k));
    }

    let public = PublicKey::from_public_key_pem(pem).map_err(|e| Error::Key(e.to_string()))?;

    Ok(VerifyingKey::from(public))
}
