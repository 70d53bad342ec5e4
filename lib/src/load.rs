// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Input loading from local files or `http(s)` URLs

use log::debug;

use crate::Error;

/// Load an input from a file path or `http://` / `https://` URL
pub async fn load(source: &str) -> Result<Vec<u8>, Error> {
    if is_url(source) {
        debug!("Fetching '{}'", source);

        let resp = reqwest::get(source).await?.error_for_status()?;
        let b = resp.bytes().await?;

        return Ok(b.to_vec());
    }

    debug!("Reading '{}'", source);

    let b = tokio::fs::read(source).await?;
    Ok(b)
}

fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}
