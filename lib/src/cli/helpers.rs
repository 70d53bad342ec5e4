// Copyright (c) 2022-2023 The MobileCoin Foundation

use std::{
    io::Write,
    path::{Path, PathBuf},
    sync::mpsc::Receiver,
};

use log::debug;
use zeroize::Zeroizing;

use signer::Error;

/// Default signing key file name, under the user home directory
pub const DEFAULT_KEY_FILE: &str = ".signer_key.pem";

/// Resolve the signing key file, defaulting to `~/.signer_key.pem`
pub fn key_file(keyfile: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    if let Some(k) = keyfile {
        return Ok(k);
    }

    let home = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("No home directory found, specify --keyfile"))?;

    Ok(home.join(DEFAULT_KEY_FILE))
}

/// PIN entry from terminal lines not consumed as button input
pub fn line_pin_entry(
    lines: Receiver<String>,
) -> impl FnMut() -> Result<Zeroizing<String>, Error> + Send {
    move || {
        print!("Enter PIN positions (1-9) as shown on the device display: ");
        let _ = std::io::stdout().flush();

        // Blocks a runtime worker until a line arrives
        let l = tokio::task::block_in_place(|| lines.recv())
            .map_err(|_| Error::PinEntry("input closed".to_string()))?;

        Ok(Zeroizing::new(l))
    }
}

/// Write a signed artifact to the output file
pub async fn write_output(file_name: &Path, hex: &str) -> anyhow::Result<()> {
    debug!("Writing output to '{}'", file_name.display());

    tokio::fs::write(file_name, hex).await?;

    Ok(())
}
