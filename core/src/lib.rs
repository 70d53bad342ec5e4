// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Plugin signer device core
//!
//! This provides a hardware-independent [Engine][engine::Engine] mediating
//! privileged operations on a signing appliance. Requests from an untrusted
//! host are decoded to [Event][engine::Event]s and answered with
//! [Output][engine::Output]s, see [signer_proto] for message encodings.
//!
//! ## Operations
//!
//! ### Signing a plugin configuration
//!
//! 1. Host issues [`SignPluginConfig`][signer_proto::sign::SignPluginConfig]
//!    containing the JSON configuration and protocol descriptor source
//! 2. Device displays a preview of the configuration and replies with
//!    [`ButtonRequest`][signer_proto::button::ButtonRequest]
//! 3. Where the device requires acknowledgement the host sends
//!    [`ButtonAck`][signer_proto::button::ButtonAck] to arm the prompt
//! 4. User accepts or declines on the device.
//!    - decline results in an `ActionCancelled` [`Failure`][signer_proto::failure::Failure]
//!    - accept (and PIN entry, where enabled) results in a
//!      [`SignedObject`][signer_proto::sign::SignedObject] containing the hex artifact
//!
//! ### PIN entry
//!
//! PIN protected operations reply with a
//! [`PinMatrixRequest`][signer_proto::pin::PinMatrixRequest] while the device
//! displays a freshly shuffled 3x3 digit matrix. The host responds with a
//! [`PinMatrixAck`][signer_proto::pin::PinMatrixAck] containing the matrix
//! _positions_ selected by the user, so the PIN itself never crosses the channel.
//!
//! ### Changing the PIN
//!
//! [`ChangePin`][signer_proto::pin::ChangePin] requires confirmation then
//! (where a PIN is set) entry of the current PIN, followed by the new PIN.

pub use signer_proto::{self as proto};

pub mod consts;

pub mod engine;

pub mod signing;

pub mod helpers;
