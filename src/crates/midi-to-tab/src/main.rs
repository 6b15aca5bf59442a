use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use midi_to_tab::{render_tab, CellLayout, MidiNoteReader};
use score_core::note_name;

const MIDI_EXTENSIONS: [&str; 2] = ["mid", "midi"];

#[derive(Parser, Debug)]
#[command(name = "midi-to-tab")]
#[command(about = "Convert MIDI files to guitar tablature", long_about = None)]
struct Args {
    /// Path to the MIDI file (default: first .mid/.midi file in the current directory, by name)
    #[arg(short, long)]
    midi: Option<PathBuf>,

    /// Output file path (default: `<midi-name>.tab`)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print output to stdout instead of file
    #[arg(long)]
    stdout: bool,

    /// Print the fretted notes as JSON instead of the diagram
    #[arg(long)]
    json: bool,

    /// Suppress informational messages (only errors)
    #[arg(short, long)]
    quiet: bool,

    /// Log the inferred key, hand position and every fretted note
    #[arg(short, long)]
    verbose: bool,

    /// Fret cell layout: overlap (one character per fret) or padded (three)
    #[arg(short, long, default_value = "overlap")]
    layout: CellLayout,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.quiet, args.verbose);

    // Find MIDI file
    let midi_path = if let Some(path) = args.midi {
        if !path.exists() {
            anyhow::bail!("MIDI file not found: {}", path.display());
        }
        path
    } else {
        find_first_midi_file()?
    };

    // Determine output path (use .tab extension)
    let output_path = if let Some(path) = args.output {
        path
    } else {
        let stem = midi_path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("output");
        PathBuf::from(format!("{}.tab", stem))
    };

    info!("Processing MIDI file: {}", midi_path.display());

    let bytes = fs::read(&midi_path)
        .with_context(|| format!("Failed to read MIDI file: {}", midi_path.display()))?;
    let reading = MidiNoteReader::default().analyze(&bytes)?;

    info!("Key: {}, starting at fret {}", reading.key, reading.start);
    for note in &reading.notes {
        tracing::debug!(
            "{:<4} string {} fret {}",
            note_name(note.pitch),
            note.string,
            note.fret
        );
    }

    let output = if args.json {
        serde_json::to_string_pretty(&reading.notes)?
    } else {
        render_tab(&reading.notes, args.layout)?
    };

    if args.stdout {
        // Print directly to stdout (clean, no logs)
        println!("{}", output);
    } else {
        fs::write(&output_path, format!("{}\n", output))
            .with_context(|| format!("Failed to write {}", output_path.display()))?;

        info!("Output saved to {}", output_path.display());
    }

    Ok(())
}

fn init_logging(quiet: bool, verbose: bool) {
    let default = match (quiet, verbose) {
        (true, _) => "warn",
        (false, true) => "debug",
        (false, false) => "info",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn find_first_midi_file() -> Result<PathBuf> {
    first_midi_in(Path::new("."))
}

fn first_midi_in(dir: &Path) -> Result<PathBuf> {
    let mut candidates: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .and_then(|s| s.to_str())
                .map(|ext| MIDI_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                .unwrap_or(false)
        })
        .collect();

    // read_dir order is platform dependent
    candidates.sort();
    candidates
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("No MIDI files found in {}", dir.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_midi_by_name() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["notes.txt", "b.MID", "c.midi", "a.png"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }

        let found = first_midi_in(dir.path()).unwrap();
        assert_eq!(found.file_name().unwrap(), "b.MID");
    }

    #[test]
    fn test_no_midi_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("score.png"), b"").unwrap();
        assert!(first_midi_in(dir.path()).is_err());
    }
}
