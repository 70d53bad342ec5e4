// Copyright (c) 2022-2023 The MobileCoin Foundation

use std::{
    fs,
    io::{Stdout, Write},
    path::{Path, PathBuf},
};

use log::{error, info};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use signer_core::engine::{Driver, Error, PendingAction, PinMatrix};

/// Console display width (characters)
const DISPLAY_WIDTH: usize = 25;

/// Persisted PIN state
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct PinStore {
    pub pin: Option<String>,
    pub attempts: u32,
}

impl PinStore {
    /// Load PIN store from a file, defaulting where the file does not exist
    pub fn load(path: &Path) -> Result<Self, Error> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let s = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&s)?)
    }

    /// Write PIN store to a file
    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let s = serde_json::to_string_pretty(self)?;
        fs::write(path, s)?;
        Ok(())
    }
}

/// Console [Driver], rendering the device display to a writer with
/// file-backed key and (optional) PIN storage
pub struct ConsoleDriver<W: Write = Stdout> {
    out: W,
    key_file: PathBuf,
    pin_file: Option<PathBuf>,
    store: PinStore,
}

impl ConsoleDriver<Stdout> {
    /// Create a console driver rendering to stdout
    pub fn new(key_file: PathBuf, pin_file: Option<PathBuf>) -> Result<Self, Error> {
        Self::with_writer(std::io::stdout(), key_file, pin_file)
    }
}

impl<W: Write> ConsoleDriver<W> {
    /// Create a console driver rendering to the provided writer
    pub fn with_writer(out: W, key_file: PathBuf, pin_file: Option<PathBuf>) -> Result<Self, Error> {
        let store = match &pin_file {
            Some(p) => PinStore::load(p)?,
            None => PinStore::default(),
        };

        Ok(Self {
            out,
            key_file,
            pin_file,
            store,
        })
    }

    /// Fetch the display writer
    pub fn writer(&self) -> &W {
        &self.out
    }

    fn persist(&self) -> Result<(), Error> {
        match &self.pin_file {
            Some(p) => self.store.save(p),
            None => Ok(()),
        }
    }

    fn draw(&mut self, lines: &[String]) {
        let border = format!("+{}+", "-".repeat(DISPLAY_WIDTH));

        let mut s = format!("{border}\n");
        for l in lines {
            s.push_str(&format!("|{l:<DISPLAY_WIDTH$}|\n"));
        }
        s.push_str(&border);

        if let Err(e) = writeln!(self.out, "{s}") {
            error!("display write failed: {}", e);
        }
    }
}

impl<W: Write> Driver for ConsoleDriver<W> {
    fn show_question(&mut self, pending: &PendingAction) {
        let mut lines = pending.prompt.clone();
        if !pending.question.is_empty() {
            lines.push(pending.question.clone());
        }
        lines.push(String::new());
        lines.push(format!(
            "{:<w$}{:>w$}",
            pending.decline_label,
            pending.accept_label,
            w = DISPLAY_WIDTH / 2
        ));

        self.draw(&lines);

        if let Err(e) = writeln!(self.out, "Confirm on device: [y/n]") {
            error!("display write failed: {}", e);
        }
    }

    fn show_matrix(&mut self, matrix: &PinMatrix) {
        let mut lines = vec!["Enter PIN".to_string(), String::new()];
        for row in matrix.chunks(3) {
            lines.push(format!("      {}   {}   {}", row[0], row[1], row[2]));
        }

        self.draw(&lines);
    }

    fn show_idle(&mut self, label: &str) {
        self.draw(&[String::new(), format!("{label:^DISPLAY_WIDTH$}"), String::new()]);
    }

    fn key_pem(&self) -> Result<Zeroizing<String>, Error> {
        info!("loading signing key from {}", self.key_file.display());

        Ok(Zeroizing::new(fs::read_to_string(&self.key_file)?))
    }

    fn pin(&self) -> Option<Zeroizing<String>> {
        self.store.pin.clone().map(Zeroizing::new)
    }

    fn set_pin(&mut self, pin: &str) -> Result<(), Error> {
        self.store.pin = Some(pin.to_string());
        self.store.attempts = 0;
        self.persist()
    }

    fn pin_attempts(&self) -> u32 {
        self.store.attempts
    }

    fn set_pin_attempts(&mut self, attempts: u32) -> Result<(), Error> {
        self.store.attempts = attempts;
        self.persist()
    }
}
