// Copyright (c) 2022-2023 The MobileCoin Foundation

//! The [Engine] mediates privileged operations on the signing appliance.
//!
//! This handles [Event] inputs and returns [Output] responses to the caller,
//! see [proto][crate::proto] for message encodings.

use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use rand_core::{CryptoRng, OsRng, RngCore};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, EnumVariantNames};
use zeroize::Zeroizing;

use crate::{
    consts::{
        ACCEPT_LABEL, CHANGE_PIN_PROMPT, DECLINE_LABEL, IDLE_LABEL, PREVIEW_WIDTH, SIGN_PROMPT,
    },
    helpers::wrap_lines,
    signing::{self, DescriptorCompiler, Protoc},
};

mod action;
pub use action::{Action, Continuation, PendingAction};

mod confirm;
pub use confirm::{ConfirmState, ConfirmationGate};

mod error;
pub use error::Error;

mod event;
pub use event::Event;

mod output;
pub use output::Output;

pub mod pin;
pub use pin::{PinGate, PinMatrix, PinMode};

/// Engine internal state enumeration
#[derive(Copy, Clone, PartialEq, Debug, EnumString, Display, EnumVariantNames, EnumIter)]
pub enum State {
    /// Idle, no operation pending
    Idle,
    /// Privileged action pending user confirmation
    AwaitingConfirmation,
    /// PIN challenge outstanding
    AwaitingPin,
}

/// Device settings
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Require entry of the stored PIN (where set) before signing
    pub require_pin: bool,
    /// Require a host `ButtonAck` before accepting button input
    pub require_button_ack: bool,
    /// Characters per preview line
    pub preview_width: usize,
    /// Idle screen label
    pub idle_label: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            require_pin: false,
            require_button_ack: false,
            preview_width: PREVIEW_WIDTH,
            idle_label: IDLE_LABEL.to_string(),
        }
    }
}

/// [`Driver`] trait provides platform support (display, key and PIN storage, time)
/// for [`Engine`] instances
pub trait Driver {
    /// Display a confirmation prompt
    fn show_question(&mut self, pending: &PendingAction);

    /// Display a PIN matrix
    fn show_matrix(&mut self, matrix: &PinMatrix);

    /// Display the idle screen
    fn show_idle(&mut self, label: &str);

    /// Load the signing key (PEM)
    fn key_pem(&self) -> Result<Zeroizing<String>, Error>;

    /// Fetch the stored PIN, if set
    fn pin(&self) -> Option<Zeroizing<String>>;

    /// Replace the stored PIN
    fn set_pin(&mut self, pin: &str) -> Result<(), Error>;

    /// Fetch the persisted failed PIN attempt counter
    fn pin_attempts(&self) -> u32;

    /// Update the persisted failed PIN attempt counter
    fn set_pin_attempts(&mut self, attempts: u32) -> Result<(), Error>;

    /// Block for the provided duration
    fn delay(&mut self, d: Duration) {
        std::thread::sleep(d)
    }

    /// Fetch the current unix time in seconds
    fn now(&self) -> Result<u64, Error> {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .map_err(|_| Error::Clock)
    }
}

impl<T: Driver> Driver for &mut T {
    fn show_question(&mut self, pending: &PendingAction) {
        T::show_question(self, pending)
    }

    fn show_matrix(&mut self, matrix: &PinMatrix) {
        T::show_matrix(self, matrix)
    }

    fn show_idle(&mut self, label: &str) {
        T::show_idle(self, label)
    }

    fn key_pem(&self) -> Result<Zeroizing<String>, Error> {
        T::key_pem(self)
    }

    fn pin(&self) -> Option<Zeroizing<String>> {
        T::pin(self)
    }

    fn set_pin(&mut self, pin: &str) -> Result<(), Error> {
        T::set_pin(self, pin)
    }

    fn pin_attempts(&self) -> u32 {
        T::pin_attempts(self)
    }

    fn set_pin_attempts(&mut self, attempts: u32) -> Result<(), Error> {
        T::set_pin_attempts(self, attempts)
    }

    fn delay(&mut self, d: Duration) {
        T::delay(self, d)
    }

    fn now(&self) -> Result<u64, Error> {
        T::now(self)
    }
}

/// [Engine] provides hardware-independent request dispatch for the signing appliance,
/// gating privileged operations behind confirmation and PIN entry.
///
/// Exactly one operation may be pending at a time, every completed or failed
/// operation returns the engine to [State::Idle].
pub struct Engine<DRV: Driver, CMP: DescriptorCompiler = Protoc, RNG: RngCore + CryptoRng = OsRng> {
    state: State,
    settings: Settings,

    confirm: ConfirmationGate,
    pin: PinGate,

    drv: DRV,
    compiler: CMP,
    rng: RNG,
}

impl<DRV: Driver> Engine<DRV> {
    /// Create a new engine instance with the provided driver and settings,
    /// using the default [Protoc] compiler and [OsRng]
    pub fn new(drv: DRV, settings: Settings) -> Self {
        Self::new_with(drv, settings, Protoc::from_env(), OsRng {})
    }
}

impl<DRV: Driver, CMP: DescriptorCompiler, RNG: RngCore + CryptoRng> Engine<DRV, CMP, RNG> {
    /// Create a new engine instance with the provided driver, compiler and rng
    pub fn new_with(mut drv: DRV, settings: Settings, compiler: CMP, rng: RNG) -> Self {
        drv.show_idle(&settings.idle_label);

        Self {
            state: State::Idle,
            settings,
            confirm: ConfirmationGate::new(),
            pin: PinGate::new(),
            drv,
            compiler,
            rng,
        }
    }

    /// Fetch engine state
    pub fn state(&self) -> State {
        self.state
    }

    /// Fetch engine settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Fetch confirmation gate (for display)
    pub fn confirmation(&self) -> &ConfirmationGate {
        &self.confirm
    }

    /// Fetch platform driver
    pub fn driver(&self) -> &DRV {
        &self.drv
    }

    /// Fetch mutable platform driver
    pub fn driver_mut(&mut self) -> &mut DRV {
        &mut self.drv
    }

    /// Handle incoming events.
    ///
    /// Failures are returned as [Output::Failure] and reset the engine to [State::Idle].
    pub fn update(&mut self, evt: &Event) -> Output {
        #[cfg(feature = "log")]
        log::debug!("event: {:02x?} (state: {})", evt, self.state);

        let r = match (self.state, evt) {
            // Empty event, do nothing
            (_, Event::None) => Ok(Output::None),

            // Privileged requests, replacing any pending operation
            (_, Event::SignPluginConfig { config, protospec }) => {
                let mut prompt = vec![SIGN_PROMPT.to_string()];
                prompt.extend(wrap_lines(
                    &String::from_utf8_lossy(config),
                    self.settings.preview_width,
                ));

                self.protect(
                    prompt,
                    Action::SignPluginConfig {
                        config: config.to_vec(),
                        protospec: protospec.to_vec(),
                    },
                )
            }
            (_, Event::ChangePin) => {
                self.protect(vec![CHANGE_PIN_PROMPT.to_string()], Action::ChangePin)
            }

            // Host acknowledgement of the displayed confirmation
            (State::AwaitingConfirmation, Event::ButtonAck) => match self.confirm.acknowledge() {
                true => Ok(Output::None),
                false => Err(Error::UnexpectedMessage),
            },

            // Button decisions, dropped outside of confirmation
            (State::AwaitingConfirmation, Event::Button(accept)) => self.press_button(*accept),
            (_, Event::Button(_)) => Ok(Output::None),

            // PIN entry
            (State::AwaitingPin, Event::PinMatrixAck { pin }) => self.submit_pin(pin),

            // Anything else is unexpected
            _ => Err(Error::UnexpectedMessage),
        };

        let o = match r {
            Ok(o) => o,
            Err(e) => {
                #[cfg(feature = "log")]
                log::warn!("operation failed: {}", e);

                Output::failure(&e)
            }
        };

        if o.is_terminal() {
            self.reset();
        }

        #[cfg(feature = "log")]
        log::debug!("output: {:?} (state: {})", o, self.state);

        o
    }

    /// Report a failure for an event that could not be decoded, resetting to idle
    pub fn reject(&mut self, e: Error) -> Output {
        #[cfg(feature = "log")]
        log::warn!("rejecting message: {}", e);

        self.reset();
        Output::failure(&e)
    }

    /// Reset to idle, discarding any pending operation
    pub fn reset(&mut self) {
        self.confirm.cancel();
        self.pin.cancel();
        self.state = State::Idle;

        self.drv.show_idle(&self.settings.idle_label);
    }

    /// Display a confirmation for a privileged action
    fn protect(&mut self, prompt: Vec<String>, action: Action) -> Result<Output, Error> {
        self.pin.cancel();

        let pending = PendingAction {
            prompt,
            question: String::new(),
            accept_label: ACCEPT_LABEL.to_string(),
            decline_label: DECLINE_LABEL.to_string(),
            action,
        };

        self.confirm
            .request(&mut self.drv, pending, self.settings.require_button_ack);
        self.state = State::AwaitingConfirmation;

        Ok(Output::ButtonRequest)
    }

    fn press_button(&mut self, accept: bool) -> Result<Output, Error> {
        self.confirm.record_button(accept);

        match self.confirm.resolve() {
            None => Ok(Output::None),
            Some(Ok(action)) => {
                self.state = State::Idle;
                self.authorize(action)
            }
            Some(Err(e)) => Err(e),
        }
    }

    /// Execute a confirmed action, issuing a PIN challenge first where required
    fn authorize(&mut self, action: Action) -> Result<Output, Error> {
        let pin_set = self.drv.pin().is_some();

        let verify = match &action {
            Action::SignPluginConfig { .. } => self.settings.require_pin && pin_set,
            Action::ChangePin => pin_set,
        };

        match verify {
            true => self.challenge(PinMode::VerifyStored, Continuation::Run(action)),
            false => self.execute(action),
        }
    }

    fn challenge(&mut self, mode: PinMode, continuation: Continuation) -> Result<Output, Error> {
        self.pin
            .challenge(&mut self.drv, &mut self.rng, mode, continuation);
        self.state = State::AwaitingPin;

        Ok(Output::PinMatrixRequest)
    }

    fn submit_pin(&mut self, encoded: &str) -> Result<Output, Error> {
        let outcome = self.pin.submit(&mut self.drv, encoded)?;
        self.state = State::Idle;

        match outcome.continuation {
            Continuation::Run(action) => self.execute(action),
            Continuation::StorePin => {
                self.drv.set_pin(&outcome.pin)?;

                #[cfg(feature = "log")]
                log::info!("pin updated");

                Ok(Output::Success {
                    message: "PIN changed".to_string(),
                })
            }
        }
    }

    /// Run an authorised action, converting faults to [Error::Other]
    fn execute(&mut self, action: Action) -> Result<Output, Error> {
        #[cfg(feature = "log")]
        log::info!("executing {}", action);

        match panic::catch_unwind(AssertUnwindSafe(|| self.run(action))) {
            Ok(Ok(o)) => Ok(o),
            Ok(Err(e)) => Err(Error::Other(e.to_string())),
            Err(p) => Err(Error::Other(panic_message(p))),
        }
    }

    fn run(&mut self, action: Action) -> Result<Output, Error> {
        match action {
            Action::SignPluginConfig { config, protospec } => {
                let key = self.drv.key_pem()?;
                let now = self.drv.now()?;

                let artifact = signing::sign_at(&self.compiler, &key, &config, &protospec, now)?;

                Ok(Output::SignedObject {
                    payload: artifact.to_hex().into_bytes(),
                })
            }
            Action::ChangePin => self.challenge(PinMode::PassThrough, Continuation::StorePin),
        }
    }
}

fn panic_message(p: Box<dyn Any + Send>) -> String {
    if let Some(s) = p.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = p.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown fault".to_string()
    }
}
