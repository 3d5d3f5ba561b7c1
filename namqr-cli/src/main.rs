//! NAMQR CLI
//!
//! Command-line interface for decoding, encoding and inspecting NAMQR payment codes.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod ui;

#[derive(Parser)]
#[command(name = "namqr")]
#[command(about = "NAMQR CLI - Decode, encode and inspect NAMQR payment codes", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Codec configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a payload into a payment intent
    Decode {
        /// NAMQR payload, or "-" to read from stdin
        payload: String,
    },

    /// Encode a payment intent into a payload
    Encode {
        /// JSON file with the intent fields, or "-" for stdin (default)
        #[arg(short, long)]
        input: Option<String>,
    },

    /// Print the TLV tree of a payload
    Inspect {
        /// NAMQR payload, or "-" to read from stdin
        payload: String,

        /// Print the tree as JSON
        #[arg(long)]
        json: bool,
    },

    /// Append the CRC field to a payload body
    Crc {
        /// Payload without the trailing CRC field, or "-" to read from stdin
        payload: String,
    },

    /// Quick check whether text looks like a NAMQR payload
    Check {
        /// Text to check, or "-" to read from stdin
        payload: String,
    },
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so payloads on stdout stay pipeable
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("namqr_cli=debug,namqr_lib=debug")
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("namqr_cli=info,namqr_lib=warn")
            .with_writer(std::io::stderr)
            .init();
    }

    if let Err(err) = run(cli) {
        ui::error(&format!("{err:#}"));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let codec = commands::load_codec(cli.config.as_deref())?;

    match cli.command {
        Commands::Decode { payload } => {
            commands::decode::run(&codec, &payload, cli.verbose)?;
        }
        Commands::Encode { input } => {
            commands::encode::run(&codec, input.as_deref(), cli.verbose)?;
        }
        Commands::Inspect { payload, json } => {
            commands::inspect::run(&codec, &payload, json)?;
        }
        Commands::Crc { payload } => {
            commands::crc::run(&payload)?;
        }
        Commands::Check { payload } => {
            commands::check::run(&payload)?;
        }
    }

    Ok(())
}
