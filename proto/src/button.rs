// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Confirmation (button) messages

use crate::{empty_message, MessageKind};

/// Device is displaying a confirmation prompt and awaits a button decision.
///
/// Carries no payload: the content under confirmation is only shown
/// on the device display.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct ButtonRequest {}

empty_message!(ButtonRequest, MessageKind::ButtonRequest);

/// Host acknowledges a [ButtonRequest], arming the prompt for button input
/// where the device requires acknowledgement.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct ButtonAck {}

empty_message!(ButtonAck, MessageKind::ButtonAck);
