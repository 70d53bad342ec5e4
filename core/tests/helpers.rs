#![allow(unused)]

use std::time::Duration;

use k256::{
    pkcs8::{EncodePrivateKey, LineEnding},
    SecretKey,
};
use log::debug;
use prost_types::{FileDescriptorProto, FileDescriptorSet};
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use signer_core::{
    engine::{Driver, Engine, Error, PendingAction, PinMatrix, Settings},
    signing::DescriptorCompiler,
};

/// Fixed issue time for deterministic signing
pub const NOW: u64 = 1_600_000_000;

pub const CONFIG: &str = r#"{"valid_days":1,"whitelist_urls":["https://a"],"blacklist_urls":[],"known_devices":[["0x1234","0x5678"]]}"#;

pub const PROTOSPEC: &str = r#"syntax = "proto2";

message Ping {
    optional string message = 1;
}
"#;

pub type TestEngine = Engine<TestDriver, TestCompiler, OsRng>;

pub fn setup() {
    let _ = simplelog::SimpleLogger::init(log::LevelFilter::Debug, Default::default());
}

/// Create an engine with a fresh signing key
pub fn engine(settings: Settings) -> TestEngine {
    setup();
    Engine::new_with(TestDriver::new(), settings, TestCompiler::Fixed, OsRng)
}

/// Driver implementation for test use
pub struct TestDriver {
    pub key_pem: Zeroizing<String>,
    pub pin: Option<String>,
    pub attempts: u32,
    pub delays: Vec<Duration>,
    pub matrix: Option<PinMatrix>,
    pub question: Option<PendingAction>,
    pub idle: usize,
    pub now: u64,
}

impl TestDriver {
    pub fn new() -> Self {
        let key = SecretKey::random(&mut OsRng);

        Self {
            key_pem: key.to_pkcs8_pem(LineEnding::LF).unwrap(),
            pin: None,
            attempts: 0,
            delays: vec![],
            matrix: None,
            question: None,
            idle: 0,
            now: NOW,
        }
    }
}

impl Driver for TestDriver {
    fn show_question(&mut self, pending: &PendingAction) {
        debug!("question: {:?}", pending.prompt);
        self.question = Some(pending.clone());
    }

    fn show_matrix(&mut self, matrix: &PinMatrix) {
        debug!("matrix: {:?}", matrix);
        self.matrix = Some(*matrix);
    }

    fn show_idle(&mut self, _label: &str) {
        self.idle += 1;
        self.question = None;
        self.matrix = None;
    }

    fn key_pem(&self) -> Result<Zeroizing<String>, Error> {
        Ok(self.key_pem.clone())
    }

    fn pin(&self) -> Option<Zeroizing<String>> {
        self.pin.clone().map(Zeroizing::new)
    }

    fn set_pin(&mut self, pin: &str) -> Result<(), Error> {
        self.pin = Some(pin.to_string());
        Ok(())
    }

    fn pin_attempts(&self) -> u32 {
        self.attempts
    }

    fn set_pin_attempts(&mut self, attempts: u32) -> Result<(), Error> {
        self.attempts = attempts;
        Ok(())
    }

    fn delay(&mut self, d: Duration) {
        self.delays.push(d);
    }

    fn now(&self) -> Result<u64, Error> {
        Ok(self.now)
    }
}

/// Descriptor compiler for test use (no protoc required)
#[derive(Clone, Debug)]
pub enum TestCompiler {
    /// Returns a descriptor set naming the source length
    Fixed,
    /// Fails compilation
    Failing,
    /// Panics during compilation
    Panicking,
}

impl DescriptorCompiler for TestCompiler {
    fn compile(&self, source: &[u8]) -> Result<FileDescriptorSet, Error> {
        match self {
            TestCompiler::Fixed => Ok(FileDescriptorSet {
                file: vec![FileDescriptorProto {
                    name: Some(format!("plugin-{}.proto", source.len())),
                    syntax: Some("proto2".to_string()),
                    ..Default::default()
                }],
            }),
            TestCompiler::Failing => Err(Error::Compile("plugin.proto:1:1: syntax error".to_string())),
            TestCompiler::Panicking => panic!("compiler exploded"),
        }
    }
}
