//! Encode a payment intent from JSON

use anyhow::{Context, Result};
use namqr_lib::{NamqrCodec, PaymentIntentBuilder};
use std::io::Read;

use crate::ui;

/// Read intent JSON from a file or stdin and print the payload
pub fn run(codec: &NamqrCodec, input: Option<&str>, verbose: bool) -> Result<()> {
    let json = match input {
        None | Some("-") => {
            let mut json = String::new();
            std::io::stdin()
                .read_to_string(&mut json)
                .context("Failed to read intent from stdin")?;
            json
        }
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read intent file {path}"))?,
    };

    let payload = encode_json(codec, &json)?;
    println!("{payload}");

    if verbose {
        ui::success(&format!("Encoded {} characters", payload.chars().count()));
    }
    Ok(())
}

/// Parse builder JSON, validate it and encode
pub fn encode_json(codec: &NamqrCodec, json: &str) -> Result<String> {
    let builder: PaymentIntentBuilder =
        serde_json::from_str(json).context("Intent JSON is malformed")?;
    let intent = builder.build()?;
    tracing::debug!(account_type = %intent.account_type(), "encoding intent");
    Ok(codec.encode(&intent)?)
}
