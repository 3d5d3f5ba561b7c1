//! Append a checksum to a payload body

use anyhow::{bail, Result};
use namqr_lib::crc::{append_crc, CRC_PREFIX};

use crate::ui;

/// Print the body with `6304` and its CRC appended
pub fn run(payload: &str) -> Result<()> {
    let body = super::read_payload(payload)?;
    println!("{}", checksum(&body)?);
    ui::success("Checksum appended");
    Ok(())
}

fn checksum(body: &str) -> Result<String> {
    if body.is_empty() {
        bail!("Payload body is empty");
    }
    if body.ends_with(CRC_PREFIX) {
        ui::warning(&format!(
            "Body already ends with {CRC_PREFIX}; pass it without the CRC field"
        ));
    }
    Ok(append_crc(body))
}
