// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Handle for connected signing devices
//!
//! This provides methods for interacting with the device
//! and is generic over [Transport] types

use std::{sync::Arc, time::Duration};

use log::{debug, warn};
use tokio::sync::Mutex;
use zeroize::Zeroizing;

use signer_core::signing::SignedArtifact;
use signer_proto::{from_frame, prelude::*, split_frame, to_frame};

use crate::{transport::Transport, Error};

/// Source of PIN input, called each time the device issues a PIN matrix.
///
/// The returned value is the sequence of matrix positions (`1`..`9`) matching
/// the PIN digits as laid out on the device display.
pub trait PinEntry: Send {
    fn pin(&mut self) -> Result<Zeroizing<String>, Error>;
}

impl<F: FnMut() -> Result<Zeroizing<String>, Error> + Send> PinEntry for F {
    fn pin(&mut self) -> Result<Zeroizing<String>, Error> {
        (self)()
    }
}

/// Signer handle for a connected [Transport].
///
/// This is generic over [Transport] types to support different
/// underlying channels / providers
pub struct DeviceHandle<T: Transport> {
    /// Transport for communication
    t: Arc<Mutex<T>>,
    /// Timeout for user interaction (buttons, PIN entry)
    user_timeout_s: usize,
    /// Timeout for device responses
    request_timeout_s: usize,
    /// Acknowledge confirmation prompts (for devices requiring `ButtonAck`)
    button_ack: bool,
}

impl<T: Transport> Clone for DeviceHandle<T> {
    fn clone(&self) -> Self {
        Self {
            t: self.t.clone(),
            user_timeout_s: self.user_timeout_s,
            request_timeout_s: self.request_timeout_s,
            button_ack: self.button_ack,
        }
    }
}

/// Create a [DeviceHandle] wrapper from a type implementing [Transport]
impl<T: Transport> From<T> for DeviceHandle<T> {
    fn from(t: T) -> Self {
        Self {
            t: Arc::new(Mutex::new(t)),
            user_timeout_s: 60,
            request_timeout_s: 5,
            button_ack: false,
        }
    }
}

/// Terminal device replies
enum Reply {
    Signed(Vec<u8>),
    Success(String),
}

impl<T: Transport> DeviceHandle<T> {
    /// Override user interaction and request timeouts
    pub fn with_timeouts(mut self, user_timeout_s: usize, request_timeout_s: usize) -> Self {
        self.user_timeout_s = user_timeout_s;
        self.request_timeout_s = request_timeout_s;
        self
    }

    /// Send `ButtonAck` in response to confirmation prompts.
    ///
    /// This must match the device `require_button_ack` setting, an
    /// acknowledgement arriving after the user has already decided
    /// is rejected as unexpected.
    pub fn with_button_ack(mut self, button_ack: bool) -> Self {
        self.button_ack = button_ack;
        self
    }

    /// Helper to fetch user interaction timeout
    fn user_timeout(&self) -> Duration {
        Duration::from_secs(self.user_timeout_s as u64)
    }

    /// Helper to fetch request timeout
    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_s as u64)
    }

    /// Request a plugin configuration signature.
    ///
    /// Resolves once the user has confirmed on the device (and entered
    /// the PIN where required), returning the issued artifact.
    pub async fn sign_plugin(
        &self,
        config: &[u8],
        protospec: &[u8],
        mut pin_entry: impl PinEntry,
    ) -> Result<SignedArtifact, Error> {
        debug!(
            "Requesting signature (config: {} bytes, protospec: {} bytes)",
            config.len(),
            protospec.len()
        );

        let req = to_frame(&SignPluginConfig::new(config, protospec))?;

        match self.exchange(&req, &mut pin_entry).await? {
            Reply::Signed(payload) => {
                let s = std::str::from_utf8(&payload).map_err(|_| ProtoError::InvalidUtf8)?;
                Ok(SignedArtifact::from_hex(s)?)
            }
            Reply::Success(_) => Err(Error::UnexpectedResponse(MessageKind::Success)),
        }
    }

    /// Change (or set) the device PIN, returning the device status message
    pub async fn change_pin(&self, mut pin_entry: impl PinEntry) -> Result<String, Error> {
        debug!("Requesting PIN change");

        let req = to_frame(&ChangePin {})?;

        match self.exchange(&req, &mut pin_entry).await? {
            Reply::Success(m) => Ok(m),
            Reply::Signed(_) => Err(Error::UnexpectedResponse(MessageKind::SignedObject)),
        }
    }

    /// Issue a request and drive the confirmation / PIN exchange to a terminal reply
    async fn exchange(&self, req: &[u8], pin_entry: &mut impl PinEntry) -> Result<Reply, Error> {
        let mut t = self.t.lock().await;

        t.session_begin().await?;

        let r = self.exchange_inner(&mut *t, req, pin_entry).await;

        if let Err(e) = t.session_end().await {
            warn!("Failed to end session: {}", e);
        }

        r
    }

    async fn exchange_inner(
        &self,
        t: &mut T,
        req: &[u8],
        pin_entry: &mut impl PinEntry,
    ) -> Result<Reply, Error> {
        t.write(req).await?;

        // First response is immediate, later ones wait on the user
        let mut timeout = self.request_timeout();
        let mut waiting = false;

        loop {
            let resp = match t.read(timeout).await {
                Ok(v) => v,
                Err(Error::RequestTimeout) if waiting => return Err(Error::UserTimeout),
                Err(e) => return Err(e),
            };

            let (kind, _) = split_frame(&resp)?;
            debug!("Received: {}", kind);

            match kind {
                MessageKind::ButtonRequest => {
                    debug!("Waiting for user confirmation");

                    if self.button_ack {
                        t.write(&to_frame(&ButtonAck {})?).await?;
                    }
                }
                MessageKind::PinMatrixRequest => {
                    let pin = pin_entry.pin()?;
                    t.write(&to_frame(&PinMatrixAck::new(&pin))?).await?;
                }
                MessageKind::SignedObject => {
                    let o = from_frame::<SignedObject>(&resp)?;
                    return Ok(Reply::Signed(o.payload.to_vec()));
                }
                MessageKind::Success => {
                    let o = from_frame::<Success>(&resp)?;
                    return Ok(Reply::Success(o.message.to_string()));
                }
                MessageKind::Failure => {
                    let f = from_frame::<Failure>(&resp)?;
                    return Err(Error::failure(f.code, f.message));
                }
                k => return Err(Error::UnexpectedResponse(k)),
            }

            timeout = self.user_timeout();
            waiting = true;
        }
    }
}
