// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Plugin signer host library (and CLI)
//!
//! Drives a signing device over a [Transport], answering its
//! confirmation and PIN requests until the operation completes.
//!
//! ```no_run
//! # async fn example() -> Result<(), signer::Error> {
//! use signer::{transport::EmuTransport, DeviceHandle};
//! use signer_core::engine::{Engine, Settings};
//! use signer_device::{ConsoleDriver, StdinButtons};
//!
//! let drv = ConsoleDriver::new("signer_key.pem".into(), None)?;
//! let (buttons, _lines) = StdinButtons::spawn();
//! let t = EmuTransport::spawn(Engine::new(drv, Settings::default()), buttons);
//!
//! let h = DeviceHandle::from(t);
//! let a = h
//!     .sign_plugin(b"{\"valid_days\":1}", b"syntax = \"proto2\";", || {
//!         Err::<zeroize::Zeroizing<String>, _>(signer::Error::PinEntry("no pin".into()))
//!     })
//!     .await?;
//!
//! println!("{}", a.to_hex());
//! # Ok(())
//! # }
//! ```

/// Re-export transports for consumer use
pub mod transport;
use transport::*;

/// Re-export `signer-proto` for consumers
pub use signer_proto::{self as proto};

mod handle;
pub use handle::{DeviceHandle, PinEntry};

mod error;
pub use error::Error;

pub mod load;

/// Device discovery filter
#[derive(Copy, Clone, Debug, PartialEq, clap::ValueEnum, strum::Display)]
#[non_exhaustive]
pub enum Filter {
    /// List all devices available using supported transports
    Any,
    /// List only emulated devices
    Emu,
}

/// Device information for listing, used by connect
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum DeviceInfo {
    /// In-process emulated device
    #[cfg(feature = "emu")]
    Emu,
}

/// List available devices matching the provided filter
pub fn list_devices(filter: Filter) -> Vec<DeviceInfo> {
    #[allow(unused_mut)]
    let mut devices = vec![];

    #[cfg(feature = "emu")]
    if filter == Filter::Any || filter == Filter::Emu {
        devices.push(DeviceInfo::Emu);
    }

    log::debug!("Found {} devices (filter: {}): {:?}", devices.len(), filter, devices);

    devices
}

impl std::fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "emu")]
            DeviceInfo::Emu => write!(f, "{:16} (in-process)", "Emulator"),
            #[allow(unreachable_patterns)]
            _ => Ok(()),
        }
    }
}

/// Emulated device handle
#[cfg(feature = "emu")]
pub type EmuHandle = DeviceHandle<EmuTransport>;
