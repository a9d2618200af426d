use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use jam_lyrics::{decrypt, lyrics, source, wiki};

#[derive(Parser, Debug)]
#[command(version, about = "Print the lyrics of a jam track chart as wiki markup")]
struct Opt {
    /// Path or http(s) URL of the chart (.dat or plain .mid)
    input: String,
    /// AES key as hex. Not needed when the input is already plain MIDI
    #[arg(long, env = "JAM_LYRICS_KEY", hide_env_values = true)]
    key: Option<String>,
    /// Wrap the lines in the article's `== Lyrics ==` section
    #[arg(long)]
    section: bool,
    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let opt = Opt::parse();

    let bytes = source::read_source(&opt.input)?;
    tracing::info!(len = bytes.len(), input = %opt.input, "read chart");

    let midi = load_midi(&bytes, opt.key.as_deref())?;
    let lines = lyrics::extract_pro_vocals_lyrics(&midi)
        .with_context(|| format!("extracting lyrics from {}", opt.input))?;

    let text = if opt.section {
        wiki::lyrics_section(&lines)
    } else {
        lines.iter().map(|l| format!("{l}\n")).collect()
    };

    match &opt.output {
        Some(path) => {
            std::fs::write(path, &text).with_context(|| format!("writing {:?}", path))?;
            tracing::info!(lines = lines.len(), path = ?path, "wrote lyrics");
        }
        None => print!("{text}"),
    }
    Ok(())
}

/// Decrypt when a key is given, otherwise accept only plain MIDI.
fn load_midi(bytes: &[u8], key: Option<&str>) -> Result<Vec<u8>> {
    match key {
        Some(key) => Ok(decrypt::decrypt_midi(bytes, key)?),
        None if decrypt::find_midi_header(bytes).is_some() => {
            Ok(decrypt::normalize_midi_buffer(bytes)?.to_vec())
        }
        None => bail!("input is not plain MIDI; pass --key (or JAM_LYRICS_KEY) to decrypt it"),
    }
}
