//! Scanner prefilter

use anyhow::{bail, Result};
use namqr_lib::looks_like_namqr;

use crate::ui;

/// Report whether the text is worth a full decode
pub fn run(payload: &str) -> Result<()> {
    let text = super::read_payload(payload)?;
    if !looks_like_namqr(&text) {
        bail!("Input does not look like a NAMQR payload");
    }
    ui::success("Looks like a NAMQR payload; run `namqr decode` to validate it");
    Ok(())
}
