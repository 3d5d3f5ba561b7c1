//! CLI command implementations

pub mod check;
pub mod crc;
pub mod decode;
pub mod encode;
pub mod inspect;

use anyhow::{Context, Result};
use namqr_lib::{CodecConfig, NamqrCodec};
use std::io::Read;
use std::path::Path;

/// Build the codec, from a JSON config file when one is given
pub fn load_codec(config: Option<&Path>) -> Result<NamqrCodec> {
    let Some(path) = config else {
        return Ok(NamqrCodec::default());
    };

    tracing::debug!(path = %path.display(), "loading codec config");
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config = CodecConfig::from_json(&json)
        .with_context(|| format!("Invalid config {}", path.display()))?;
    Ok(NamqrCodec::new(config)?)
}

/// Resolve a payload argument. `-` reads stdin; one trailing newline is dropped.
pub fn read_payload(arg: &str) -> Result<String> {
    if arg != "-" {
        return Ok(arg.to_string());
    }
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read payload from stdin")?;
    Ok(strip_newline(&text).to_string())
}

fn strip_newline(text: &str) -> &str {
    text.strip_suffix('\n')
        .map(|rest| rest.strip_suffix('\r').unwrap_or(rest))
        .unwrap_or(text)
}
