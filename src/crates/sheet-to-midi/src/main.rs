use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sheet_to_midi::{
    detect_regions_in_file, encode_track, sequence, CyclicPitch, DetectorOptions, RegionOrder,
    TrackBuilder,
};

const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "bmp", "gif", "tif"];

#[derive(Parser, Debug)]
#[command(name = "sheet-to-midi")]
#[command(about = "Convert a sheet music image to a MIDI track", long_about = None)]
struct Args {
    /// Path to the image (default: uses first image file in current directory)
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// Output file path (default: `<image-name>.mid`)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the note events as JSON to stdout instead of writing a MIDI file
    #[arg(long)]
    json: bool,

    /// Suppress informational messages (only errors)
    #[arg(short, long)]
    quiet: bool,

    /// Region ordering: detection or left-to-right
    #[arg(long, default_value = "detection")]
    order: RegionOrder,

    /// Ignore regions whose bounding box covers fewer pixels than this
    #[arg(long, default_value = "0")]
    min_area: u64,

    /// Track tempo in BPM
    #[arg(long, default_value = "120")]
    tempo: u32,

    /// Track name stored in the MIDI file
    #[arg(long, default_value = "Guitar Track")]
    name: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.quiet);

    // Find image file
    let image_path = if let Some(path) = args.image {
        if !path.exists() {
            anyhow::bail!("Image file not found: {}", path.display());
        }
        path
    } else {
        find_first_image_file()?
    };

    let output_path = if let Some(path) = args.output {
        path
    } else {
        let stem = image_path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("output");
        PathBuf::from(format!("{}.mid", stem))
    };

    info!("Processing image: {}", image_path.display());

    let options = DetectorOptions {
        order: args.order,
        min_area: args.min_area,
    };
    let regions = detect_regions_in_file(&image_path, &options)?;
    let events = sequence(&regions, &CyclicPitch::default());
    let track = TrackBuilder::new()
        .name(args.name)
        .tempo(args.tempo)
        .build(events);

    info!("Detected {} regions", regions.len());

    if args.json {
        // Print directly to stdout (clean, no logs)
        println!("{}", serde_json::to_string_pretty(&track)?);
    } else {
        let bytes = encode_track(&track)?;
        fs::write(&output_path, bytes)
            .with_context(|| format!("Failed to write {}", output_path.display()))?;

        info!("MIDI saved to {}", output_path.display());
    }

    Ok(())
}

fn init_logging(quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn find_first_image_file() -> Result<PathBuf> {
    let entries = fs::read_dir(".")
        .context("Failed to read current directory")?;

    for entry in entries {
        let entry = entry?;
        let path = entry.path();

        let is_image = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false);
        if is_image {
            return Ok(path);
        }
    }

    anyhow::bail!("No image files found in current directory")
}
