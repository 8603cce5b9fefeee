//! Decode a saved Volna card dump from the command line.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use tracing::warn;

use volna_rs::fields::ParsedRecord;
use volna_rs::keys::VOLNA_1K_KEYS;
use volna_rs::{RawCardImage, dump};

#[derive(Parser)]
#[command(version, about = "Decode a saved Volna card dump")]
struct Cli {
    /// Path to the dump file
    dump: PathBuf,

    /// Print the decoded record as JSON
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity.tracing_level_filter())
        .init();

    let image = dump::load(&cli.dump)
        .with_context(|| format!("failed to load dump {}", cli.dump.display()))?;
    check_trailers(&image);

    let record = ParsedRecord::decode(&image, &VOLNA_1K_KEYS).context("failed to decode card")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        println!("{}", record);
    }

    Ok(())
}

fn check_trailers(image: &RawCardImage) {
    for sector in 0..image.variant().total_sectors() as u8 {
        match image.trailer(sector) {
            Ok(trailer) if !trailer.access_bits().is_consistent() => {
                warn!("sector {} has inconsistent access bits", sector);
            }
            Ok(_) => {}
            Err(err) => warn!("sector {} trailer unreadable: {}", sector, err),
        }
    }
}
