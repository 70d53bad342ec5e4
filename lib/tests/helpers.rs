#![allow(unused)]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use k256::{
    pkcs8::{EncodePrivateKey, LineEnding},
    SecretKey,
};
use lazy_static::lazy_static;
use log::debug;
use prost_types::{FileDescriptorProto, FileDescriptorSet};
use rand_core::OsRng;
use zeroize::Zeroizing;

use signer::{transport::{EmuTransport, Transport}, DeviceHandle, Error as HostError};
use signer_core::{
    engine::{pin::matrix_encode, Driver, Engine, Error, PendingAction, PinMatrix, Settings},
    signing::DescriptorCompiler,
};
use signer_device::Buttons;

/// Fixed issue time for deterministic signing
pub const NOW: u64 = 1_600_000_000;

pub const CONFIG: &str = r#"{"valid_days":1,"whitelist_urls":["https://a"],"blacklist_urls":[],"known_devices":[["0x1234","0x5678"]]}"#;

pub const PROTOSPEC: &str = r#"syntax = "proto2";

message Ping {
    optional string message = 1;
}
"#;

lazy_static! {
    pub static ref KEY_PEM: Zeroizing<String> = SecretKey::random(&mut OsRng)
        .to_pkcs8_pem(LineEnding::LF)
        .unwrap();
}

pub fn setup() {
    let _ = simplelog::SimpleLogger::init(log::LevelFilter::Debug, Default::default());
}

/// Device state shared between the emulated device and the test
#[derive(Debug, Default)]
pub struct Shared {
    pub pin: Option<String>,
    pub attempts: u32,
    pub delays: Vec<Duration>,
    pub matrix: Option<PinMatrix>,
    pub question: Option<Vec<String>>,
}

pub type SharedState = Arc<Mutex<Shared>>;

/// Driver backed by [Shared] state
#[derive(Clone)]
pub struct SharedDriver(pub SharedState);

impl Driver for SharedDriver {
    fn show_question(&mut self, pending: &PendingAction) {
        debug!("question: {:?}", pending.prompt);
        self.0.lock().unwrap().question = Some(pending.prompt.clone());
    }

    fn show_matrix(&mut self, matrix: &PinMatrix) {
        self.0.lock().unwrap().matrix = Some(*matrix);
    }

    fn show_idle(&mut self, _label: &str) {
        let mut s = self.0.lock().unwrap();
        s.question = None;
        s.matrix = None;
    }

    fn key_pem(&self) -> Result<Zeroizing<String>, Error> {
        Ok(KEY_PEM.clone())
    }

    fn pin(&self) -> Option<Zeroizing<String>> {
        self.0.lock().unwrap().pin.clone().map(Zeroizing::new)
    }

    fn set_pin(&mut self, pin: &str) -> Result<(), Error> {
        self.0.lock().unwrap().pin = Some(pin.to_string());
        Ok(())
    }

    fn pin_attempts(&self) -> u32 {
        self.0.lock().unwrap().attempts
    }

    fn set_pin_attempts(&mut self, attempts: u32) -> Result<(), Error> {
        self.0.lock().unwrap().attempts = attempts;
        Ok(())
    }

    fn delay(&mut self, d: Duration) {
        self.0.lock().unwrap().delays.push(d);
    }

    fn now(&self) -> Result<u64, Error> {
        Ok(NOW)
    }
}

/// Buttons pressing a fixed decision once per displayed question
pub struct AutoButtons {
    shared: SharedState,
    accept: bool,
    pressed: bool,
}

impl Buttons for AutoButtons {
    fn poll(&mut self) -> Option<bool> {
        let shown = self.shared.lock().unwrap().question.is_some();

        match (shown, self.pressed) {
            (true, false) => {
                self.pressed = true;
                Some(self.accept)
            }
            (false, _) => {
                self.pressed = false;
                None
            }
            _ => None,
        }
    }
}

/// Descriptor compiler for test use (no protoc required)
pub struct FixedCompiler;

impl DescriptorCompiler for FixedCompiler {
    fn compile(&self, source: &[u8]) -> Result<FileDescriptorSet, Error> {
        Ok(FileDescriptorSet {
            file: vec![FileDescriptorProto {
                name: Some(format!("plugin-{}.proto", source.len())),
                syntax: Some("proto2".to_string()),
                ..Default::default()
            }],
        })
    }
}

/// Spawn an emulated device, returning a handle and the shared device state
pub fn emulator(settings: Settings, accept: bool) -> (DeviceHandle<EmuTransport>, SharedState) {
    setup();

    let shared = SharedState::default();

    let engine = Engine::new_with(SharedDriver(shared.clone()), settings, FixedCompiler, OsRng);
    let buttons = AutoButtons {
        shared: shared.clone(),
        accept,
        pressed: false,
    };

    let t = EmuTransport::spawn(engine, buttons);
    let h = DeviceHandle::from(t).with_timeouts(5, 2);

    (h, shared)
}

/// PIN entry encoding `pin` against the displayed matrix
pub fn matrix_pin(
    shared: SharedState,
    pin: &'static str,
) -> impl FnMut() -> Result<Zeroizing<String>, HostError> + Send {
    move || {
        let m = shared
            .lock()
            .unwrap()
            .matrix
            .ok_or_else(|| HostError::PinEntry("no matrix displayed".to_string()))?;

        let encoded = matrix_encode(&m, pin)
            .ok_or_else(|| HostError::PinEntry("invalid pin".to_string()))?;

        Ok(Zeroizing::new(encoded))
    }
}

/// PIN entry that must not be called
pub fn no_pin() -> impl FnMut() -> Result<Zeroizing<String>, HostError> + Send {
    || Err(HostError::PinEntry("unexpected pin request".to_string()))
}

/// Transport replaying scripted device frames
#[derive(Default)]
pub struct ScriptedTransport {
    pub responses: VecDeque<Vec<u8>>,
    pub written: Vec<Vec<u8>>,
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn write(&mut self, frame: &[u8]) -> Result<(), HostError> {
        self.written.push(frame.to_vec());
        Ok(())
    }

    async fn read(&mut self, _timeout: Duration) -> Result<Vec<u8>, HostError> {
        self.responses.pop_front().ok_or(HostError::RequestTimeout)
    }
}
