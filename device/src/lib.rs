// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Plugin signer device control loop
//!
//! [Device] owns an [Engine] and alternates between polling button input
//! and incoming host frames on a [ByteChannel], sleeping while idle.
//! Exactly one operation is outstanding at a time, the only blocking call
//! is the PIN mismatch backoff within the engine.
//!
//! For emulation [MemoryChannel] provides an in-process channel pair,
//! [StdinButtons] reads decisions from the terminal and [ConsoleDriver]
//! renders prompts to a writer with file-backed key and PIN storage.

use std::{
    sync::atomic::{AtomicBool, Ordering},
    thread,
    time::Duration,
};

use log::{debug, warn};
use rand_core::{CryptoRng, RngCore};

use signer_core::{
    consts::IDLE_PERIOD_MS,
    engine::{Driver, Engine, Error as EngineError, Event, Output},
    signing::DescriptorCompiler,
};
use signer_proto::ByteChannel;

mod buttons;
pub use buttons::{parse_button, Buttons, StdinButtons};

mod channel;
pub use channel::{ChannelError, MemoryChannel};

mod console;
pub use console::{ConsoleDriver, PinStore};

/// Device control loop errors
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// Channel read / write failed
    #[error("channel error: {0}")]
    Channel(String),

    /// Response encoding failed
    #[error("encoding error: {0}")]
    Proto(#[from] signer_proto::ProtoError),
}

/// Device control loop
pub struct Device<CH, BTN, DRV, CMP, RNG>
where
    CH: ByteChannel,
    BTN: Buttons,
    DRV: Driver,
    CMP: DescriptorCompiler,
    RNG: RngCore + CryptoRng,
{
    engine: Engine<DRV, CMP, RNG>,
    channel: CH,
    buttons: BTN,
}

impl<CH, BTN, DRV, CMP, RNG> Device<CH, BTN, DRV, CMP, RNG>
where
    CH: ByteChannel,
    BTN: Buttons,
    DRV: Driver,
    CMP: DescriptorCompiler,
    RNG: RngCore + CryptoRng,
{
    /// Create a new device over the provided engine, channel and buttons
    pub fn new(engine: Engine<DRV, CMP, RNG>, channel: CH, buttons: BTN) -> Self {
        Self {
            engine,
            channel,
            buttons,
        }
    }

    /// Fetch the device engine
    pub fn engine(&self) -> &Engine<DRV, CMP, RNG> {
        &self.engine
    }

    /// Poll buttons then the host channel once, returning true where an input was handled
    pub fn poll(&mut self) -> Result<bool, DeviceError> {
        let mut busy = false;

        // Handle button presses
        if let Some(accept) = self.buttons.poll() {
            debug!("button: {}", accept);

            let o = self.engine.update(&Event::Button(accept));
            self.reply(&o)?;
            busy = true;
        }

        // Handle incoming host messages
        let frame = self
            .channel
            .read()
            .map_err(|e| DeviceError::Channel(e.to_string()))?;

        if let Some(frame) = frame {
            let o = match Event::parse(&frame) {
                Ok(evt) => self.engine.update(&evt),
                Err(e) => self.engine.reject(EngineError::Proto(e)),
            };
            self.reply(&o)?;
            busy = true;
        }

        Ok(busy)
    }

    /// Run the control loop until `exit` is set, closing the channel on return
    pub fn run(&mut self, exit: &AtomicBool) -> Result<(), DeviceError> {
        self.channel
            .session_begin()
            .map_err(|e| DeviceError::Channel(e.to_string()))?;

        let r = self.run_inner(exit);

        if let Err(e) = self.channel.session_end() {
            warn!("failed to end session: {}", e);
        }
        if let Err(e) = self.channel.close() {
            warn!("failed to close channel: {}", e);
        }

        r
    }

    fn run_inner(&mut self, exit: &AtomicBool) -> Result<(), DeviceError> {
        while !exit.load(Ordering::Relaxed) {
            if !self.poll()? {
                thread::sleep(Duration::from_millis(IDLE_PERIOD_MS));
            }
        }

        Ok(())
    }

    /// Write an output to the host (skipping empty outputs)
    fn reply(&mut self, o: &Output) -> Result<(), DeviceError> {
        if *o == Output::None {
            return Ok(());
        }

        debug!("reply: {:?}", o);

        let f = o.encode()?;
        self.channel
            .write(&f)
            .map_err(|e| DeviceError::Channel(e.to_string()))
    }
}
