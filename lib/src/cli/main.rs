// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Command line utility for signing plugin configurations

use std::path::{Path, PathBuf};

use clap::Parser;
use log::{debug, info, LevelFilter};

use signer::{list_devices, load::load, transport::EmuTransport, DeviceHandle, DeviceInfo, Filter};
use signer_core::{
    engine::{Engine, Settings},
    signing::{verifying_key_from_pem, SignedArtifact},
};
use signer_device::{ConsoleDriver, StdinButtons};

mod helpers;
use helpers::*;

/// Plugin signer command line utility
#[derive(Clone, PartialEq, Debug, Parser)]
struct Options {
    /// Supported transports for device discovery
    #[clap(long, value_enum, default_value = "any")]
    target: Filter,

    /// Device index (where more than one device is available)
    #[clap(long, default_value = "0")]
    device_index: usize,

    /// Signing key (PEM) for the emulated device, defaults to `~/.signer_key.pem`
    #[clap(long, env = "SIGNER_KEYFILE")]
    keyfile: Option<PathBuf>,

    /// PIN store for the emulated device
    #[clap(long)]
    pin_file: Option<PathBuf>,

    /// Require PIN entry before signing (where a PIN is set)
    #[clap(long)]
    require_pin: bool,

    /// Require host acknowledgement before accepting button input
    #[clap(long)]
    require_button_ack: bool,

    /// Timeout for user interaction in seconds
    #[clap(long, default_value = "60")]
    user_timeout_s: usize,

    /// Subcommand to execute
    #[clap(subcommand)]
    cmd: Actions,

    /// Enable verbose logging
    #[clap(long, default_value = "info")]
    log_level: LevelFilter,
}

#[derive(Clone, PartialEq, Debug, Parser)]
#[non_exhaustive]
enum Actions {
    /// List available devices
    List,

    /// Sign a plugin configuration
    SignPlugin {
        /// Protocol specification (`.proto`) file or URL
        protospec: String,

        /// Plugin configuration (JSON) file or URL
        config: String,

        /// Output file for the signed artifact
        #[clap(long, default_value = "config_signed.bin")]
        output: PathBuf,
    },

    /// Set or change the device PIN
    ChangePin,

    /// Verify a signed artifact and print its descriptor
    Verify {
        /// Signed artifact file
        artifact: PathBuf,

        /// Signer public (or private) key PEM file
        #[clap(long)]
        public_key: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Options::parse();

    // Setup logging
    let mut c = simplelog::ConfigBuilder::new();
    c.add_filter_ignore_str("reqwest");
    c.add_filter_ignore_str("rustls");

    let _ = simplelog::SimpleLogger::init(args.log_level, c.build());

    // Verification does not require a device
    if let Actions::Verify {
        artifact,
        public_key,
    } = &args.cmd
    {
        return verify(artifact, public_key).await;
    }

    debug!("Using transport: {:?}", args.target);

    // List available devices
    let devices = list_devices(args.target);
    if devices.is_empty() {
        return Err(anyhow::anyhow!("No devices found"));
    }

    // Handle list command
    if args.cmd == Actions::List {
        info!("Devices:");
        for (i, d) in devices.iter().enumerate() {
            info!("  {}: {}", i, d);
        }

        return Ok(());
    }

    // Select device by index
    let d = match devices.get(args.device_index) {
        Some(d) => d.clone(),
        None => {
            return Err(anyhow::anyhow!(
                "Invalid device index: {} (max: {})",
                args.device_index,
                devices.len() - 1
            ))
        }
    };

    debug!("Using device {}: {}", args.device_index, d);

    // Connect to device
    let (h, lines) = match d {
        DeviceInfo::Emu => {
            let key_file = key_file(args.keyfile.clone())?;
            debug!("Using key file: {}", key_file.display());

            let drv = ConsoleDriver::new(key_file, args.pin_file.clone())?;
            let settings = Settings {
                require_pin: args.require_pin,
                require_button_ack: args.require_button_ack,
                ..Default::default()
            };

            let (buttons, lines) = StdinButtons::spawn();
            let t = EmuTransport::spawn(Engine::new(drv, settings), buttons);

            (DeviceHandle::from(t), lines)
        }
        #[allow(unreachable_patterns)]
        _ => return Err(anyhow::anyhow!("Unsupported device: {}", d)),
    };

    let h = h
        .with_timeouts(args.user_timeout_s, 5)
        .with_button_ack(args.require_button_ack);

    // Execute command
    match args.cmd {
        Actions::SignPlugin {
            protospec,
            config,
            output,
        } => {
            let protospec = load(&protospec).await?;
            let config = load(&config).await?;

            info!("Plugin config:\n{}", String::from_utf8_lossy(&config));
            info!("Confirm on the device (y / n)");

            let a = h
                .sign_plugin(&config, &protospec, line_pin_entry(lines))
                .await?;

            write_output(&output, &a.to_hex()).await?;

            info!("Signed config written to '{}'", output.display());
        }
        Actions::ChangePin => {
            info!("Confirm on the device (y / n)");

            let m = h.change_pin(line_pin_entry(lines)).await?;

            info!("{}", m);
        }
        _ => unreachable!(),
    }

    Ok(())
}

/// Verify an issued artifact against the signer key
async fn verify(artifact: &Path, public_key: &Path) -> anyhow::Result<()> {
    debug!("Reading artifact from '{}'", artifact.display());

    let s = tokio::fs::read_to_string(artifact).await?;
    let a = SignedArtifact::from_hex(&s)?;

    let pem = tokio::fs::read_to_string(public_key).await?;
    let key = verifying_key_from_pem(&pem)?;

    a.verify(&key)?;

    info!("Signature OK");
    info!("Descriptor: {:#?}", a.descriptor()?);

    Ok(())
}
