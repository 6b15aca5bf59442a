use std::fs;
use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use midi_to_tab::CellLayout;
use sheet2tab::{ConvertService, Pipeline, ServiceConfig, Upload, UploadRoot};
use sheet_to_midi::RegionOrder;

#[derive(Parser, Debug)]
#[command(name = "sheet2tab")]
#[command(about = "Turn photographed sheet music into guitar tablature", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Suppress informational messages (only errors)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP conversion service
    Serve(ServeArgs),
    /// Convert a single image and print the tab
    Convert(ConvertArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// JSON config file; flags given here take precedence over it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on (default: 127.0.0.1:5000)
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Directory for request workspaces (default: a temp dir removed on exit)
    #[arg(long)]
    upload_dir: Option<PathBuf>,

    /// Per-request deadline in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Largest accepted request body in bytes
    #[arg(long)]
    max_upload_bytes: Option<usize>,

    #[command(flatten)]
    conversion: ConversionArgs,
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Sheet music image
    image: PathBuf,

    /// JSON config file (only the conversion options are used)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the JSON response body instead of the raw tab
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    conversion: ConversionArgs,
}

#[derive(Args, Debug)]
struct ConversionArgs {
    /// Region ordering: detection or left-to-right
    #[arg(long)]
    order: Option<RegionOrder>,

    /// Ignore regions whose bounding box covers fewer pixels than this
    #[arg(long)]
    min_area: Option<u64>,

    /// Fret cell layout: overlap or padded
    #[arg(long)]
    layout: Option<CellLayout>,
}

impl ConversionArgs {
    fn apply(&self, config: &mut ServiceConfig) {
        if let Some(order) = self.order {
            config.conversion.region_order = order;
        }
        if let Some(min_area) = self.min_area {
            config.conversion.min_region_area = min_area;
        }
        if let Some(layout) = self.layout {
            config.conversion.cell_layout = layout;
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<ServiceConfig> {
    match path {
        Some(path) => Ok(ServiceConfig::from_file(path)?),
        None => Ok(ServiceConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    match cli.command {
        Command::Serve(args) => {
            let mut config = load_config(args.config.as_ref())?;
            if let Some(bind) = args.bind {
                config.bind = bind;
            }
            if let Some(dir) = args.upload_dir {
                config.upload_dir = Some(dir);
            }
            if let Some(timeout) = args.timeout {
                config.request_timeout_secs = timeout;
            }
            if let Some(max) = args.max_upload_bytes {
                config.max_upload_bytes = max;
            }
            args.conversion.apply(&mut config);

            sheet2tab::serve(config).await
        }
        Command::Convert(args) => convert(args),
    }
}

fn convert(args: ConvertArgs) -> Result<()> {
    let mut config = load_config(args.config.as_ref())?;
    args.conversion.apply(&mut config);

    let bytes = fs::read(&args.image)
        .with_context(|| format!("Failed to read {}", args.image.display()))?;
    let filename = args
        .image
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    info!("Converting {}", args.image.display());

    let root = UploadRoot::create(None).context("Failed to create scratch directory")?;
    let service = ConvertService::new(root, Pipeline::new(config.conversion));
    let result = service.convert(Some(Upload::new(filename, bytes)));

    if args.json {
        let (_, body) = sheet2tab::ConvertResponse::from_result(&result);
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    let tab = result?;
    write_tab(&mut std::io::stdout().lock(), &tab)?;
    Ok(())
}

/// Tab text followed by a newline, so shell prompts start on their own line
fn write_tab(out: &mut impl Write, tab: &str) -> std::io::Result<()> {
    writeln!(out, "{}", tab)
}

fn init_logging(quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_output_ends_with_newline() {
        let mut out = Vec::new();
        write_tab(&mut out, "e|--\nB|--").unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "e|--\nB|--\n");
    }
}
