// Copyright (c) 2022-2023 The MobileCoin Foundation

use encdec::Decode;

use signer_proto::{prelude::*, split_frame};

/// [`Engine`][super::Engine] input events, typically decoded from host message frames
/// or produced by the device button driver.
#[derive(Clone, Debug, PartialEq)]
pub enum Event<'a> {
    None,

    /// Request a signature over a plugin configuration
    SignPluginConfig {
        config: &'a [u8],
        protospec: &'a [u8],
    },

    /// Host acknowledges a confirmation prompt
    ButtonAck,

    /// Matrix-encoded PIN response
    PinMatrixAck { pin: &'a str },

    /// Request a PIN change
    ChangePin,

    /// Physical button decision (`true` for accept)
    Button(bool),

    /// Frame of unrecognised or device-originated kind
    Unknown(u8),
}

fn decode_event<'a, T>(buff: &'a [u8]) -> Result<Event<'a>, ProtoError>
where
    T: Decode<'a, Error = ProtoError>,
    Event<'a>: From<<T as Decode<'a>>::Output>,
{
    T::decode(buff).map(|(m, _n)| Event::from(m))
}

impl<'a> Event<'a> {
    /// Parse a host message frame to an [Event]
    ///
    /// Unrecognised kinds produce [Event::Unknown], malformed bodies of
    /// recognised kinds return an error.
    pub fn parse(frame: &'a [u8]) -> Result<Self, ProtoError> {
        let (kind, body) = match split_frame(frame) {
            Ok(v) => v,
            Err(ProtoError::UnknownKind(k)) => return Ok(Event::Unknown(k)),
            Err(e) => return Err(e),
        };

        match kind {
            MessageKind::SignPluginConfig => decode_event::<SignPluginConfig>(body),
            MessageKind::ButtonAck => decode_event::<ButtonAck>(body),
            MessageKind::PinMatrixAck => decode_event::<PinMatrixAck>(body),
            MessageKind::ChangePin => decode_event::<ChangePin>(body),
            _ => Ok(Event::Unknown(kind as u8)),
        }
    }
}

impl<'a> From<SignPluginConfig<'a>> for Event<'a> {
    fn from(m: SignPluginConfig<'a>) -> Self {
        Event::SignPluginConfig {
            config: m.config,
            protospec: m.protospec,
        }
    }
}

impl<'a> From<ButtonAck> for Event<'a> {
    fn from(_: ButtonAck) -> Self {
        Event::ButtonAck
    }
}

impl<'a> From<PinMatrixAck<'a>> for Event<'a> {
    fn from(m: PinMatrixAck<'a>) -> Self {
        Event::PinMatrixAck { pin: m.pin }
    }
}

impl<'a> From<ChangePin> for Event<'a> {
    fn from(_: ChangePin) -> Self {
        Event::ChangePin
    }
}
