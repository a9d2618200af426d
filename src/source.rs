//! Where the encrypted chart bytes come from: a local file or an HTTP(S) URL.

use anyhow::{Context, Result, bail};
use std::path::Path;

pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Read the raw bytes behind `input`.
pub fn read_source(input: &str) -> Result<Vec<u8>> {
    if is_url(input) {
        fetch(input)
    } else {
        let path = Path::new(input);
        std::fs::read(path).with_context(|| format!("reading {:?}", path))
    }
}

fn fetch(url: &str) -> Result<Vec<u8>> {
    tracing::info!(url, "fetching MIDI");
    let response = reqwest::blocking::get(url).with_context(|| format!("requesting {url}"))?;
    let status = response.status();
    if !status.is_success() {
        bail!("request for {url} failed: {status}");
    }
    let bytes = response.bytes().with_context(|| format!("reading body of {url}"))?;
    tracing::debug!(len = bytes.len(), "fetched MIDI");
    Ok(bytes.to_vec())
}
