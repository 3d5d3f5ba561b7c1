//! Decode a payload into a payment intent

use anyhow::Result;
use namqr_lib::{InitiationMethod, NamqrCodec};

use crate::ui;

/// Decode and print the intent as JSON
pub fn run(codec: &NamqrCodec, payload: &str, verbose: bool) -> Result<()> {
    let payload = super::read_payload(payload)?;

    match codec.decode(&payload) {
        Ok(intent) => {
            ui::json(&serde_json::to_value(&intent)?);
            if verbose {
                let kind = match intent.initiation_method() {
                    InitiationMethod::Static => "static",
                    InitiationMethod::Dynamic => "dynamic",
                };
                ui::success(&format!("Decoded {kind} code for {}", intent.account_type()));
            }
            Ok(())
        }
        Err(err) => {
            ui::warning(&format!("[{}] {}", err.code() as i32, err.user_message()));
            Err(err.into())
        }
    }
}
