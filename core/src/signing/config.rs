// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Plugin configuration types
//!
//! [PluginConfig] is the host-supplied JSON form, [Configuration] the
//! protobuf message covered by the artifact signature.

use prost_types::FileDescriptorSet;
use serde::{Deserialize, Serialize};

use crate::{consts::SECONDS_PER_DAY, engine::Error, helpers::parse_hex_u32};

/// Host-supplied plugin configuration (JSON)
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Validity period from signing, in days
    pub valid_days: u64,

    /// Permitted URLs
    #[serde(default)]
    pub whitelist_urls: Vec<String>,

    /// Blocked URLs
    #[serde(default)]
    pub blacklist_urls: Vec<String>,

    /// Known devices as hex encoded `(vendor_id, product_id)` pairs
    #[serde(default)]
    pub known_devices: Vec<(String, String)>,
}

/// Signed configuration message
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Configuration {
    #[prost(string, repeated, tag = "1")]
    pub whitelist_urls: Vec<String>,

    #[prost(string, repeated, tag = "2")]
    pub blacklist_urls: Vec<String>,

    #[prost(message, optional, tag = "3")]
    pub wire_protocol: Option<FileDescriptorSet>,

    #[prost(message, repeated, tag = "4")]
    pub known_devices: Vec<DeviceDescriptor>,

    /// Unix timestamp (seconds) after which the configuration is invalid
    #[prost(uint32, optional, tag = "5")]
    pub valid_until: Option<u32>,
}

/// USB device identifiers
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeviceDescriptor {
    #[prost(uint32, optional, tag = "1")]
    pub vendor_id: Option<u32>,

    #[prost(uint32, optional, tag = "2")]
    pub product_id: Option<u32>,
}

impl PluginConfig {
    /// Parse JSON configuration
    pub fn from_json(b: &[u8]) -> Result<Self, Error> {
        Ok(serde_json::from_slice(b)?)
    }

    /// Compose the [Configuration] message for signing at `issued_at` (unix seconds)
    pub fn compose(
        &self,
        wire_protocol: FileDescriptorSet,
        issued_at: u64,
    ) -> Result<Configuration, Error> {
        let valid_until = self
            .valid_days
            .checked_mul(SECONDS_PER_DAY)
            .and_then(|v| v.checked_add(issued_at))
            .and_then(|v| u32::try_from(v).ok())
            .ok_or(Error::Clock)?;

        let known_devices = self
            .known_devices
            .iter()
            .map(|(v, p)| {
                Ok(DeviceDescriptor {
                    vendor_id: Some(parse_hex_u32(v)?),
                    product_id: Some(parse_hex_u32(p)?),
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        Ok(Configuration {
            whitelist_urls: self.whitelist_urls.clone(),
            blacklist_urls: self.blacklist_urls.clone(),
            wire_protocol: Some(wire_protocol),
            known_devices,
            valid_until: Some(valid_until),
        })
    }
}
