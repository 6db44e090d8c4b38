//! nd2 CLI: inspect Nikon ND2 files through the vendor nd2ReadSDK.
//!
//! This is the main entry point for the `nd2` tool.

mod config;
mod export;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::{CliConfig, FormatSetting};
use lib_nd2_ffi::{Nd2Document, Nd2File, Nd2Library};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "nd2")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML, or JSON with a .json extension)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the nd2ReadSDK shared library
    #[arg(long, global = true)]
    library: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl From<FormatSetting> for OutputFormat {
    fn from(setting: FormatSetting) -> Self {
        match setting {
            FormatSetting::Text => Self::Text,
            FormatSetting::Json => Self::Json,
            FormatSetting::Csv => Self::Csv,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print attributes, metadata, experiment and text info
    Info {
        /// Path to the .nd2 file
        file: PathBuf,
    },

    /// Convert between sequence indices and loop coordinates
    Coords {
        /// Path to the .nd2 file
        file: PathBuf,

        /// Sequence index to convert to coordinates
        #[arg(long, conflicts_with = "coords", required_unless_present = "coords")]
        seq: Option<u32>,

        /// Coordinates to convert, as T,M,Z,O
        #[arg(long, value_delimiter = ',')]
        coords: Option<Vec<u32>>,
    },

    /// Decode frames and print their timestamps and stage positions
    Frames {
        /// Path to the .nd2 file
        file: PathBuf,

        /// First sequence index
        #[arg(long, default_value = "0")]
        start: u32,

        /// Number of frames (default: to the end)
        #[arg(long)]
        count: Option<u32>,

        /// Directory for frame_<seq>.raw dumps
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from {:?}", path);
            config::load_config(path)?
        }
        None => CliConfig::default(),
    };

    let format = cli.format.unwrap_or_else(|| config.output.format.into());
    let library_path = cli.library.or_else(|| config.library.path.clone());
    let sdk = Nd2Library::locate_and_load(library_path.as_deref())
        .context("Failed to load the nd2ReadSDK library")?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Info { file } => {
            show_info(sdk, &file, format, &mut out)?;
        }
        Commands::Coords { file, seq, coords } => {
            convert_coords(sdk, &file, seq, coords, format, &mut out)?;
        }
        Commands::Frames {
            file,
            start,
            count,
            output,
        } => {
            let output = output.or(config.output.frames_dir);
            export_frames(sdk, &file, start, count, output, format, &mut out)?;
        }
    }

    out.flush()?;
    Ok(())
}

fn open_document(sdk: Arc<Nd2Library>, file: &Path) -> Result<Nd2Document> {
    tracing::info!("Opening ND2 file: {:?}", file);
    Nd2Document::open(sdk, file).with_context(|| format!("Failed to open {:?}", file))
}

fn show_info<W: Write>(sdk: Arc<Nd2Library>, file: &Path, format: OutputFormat, out: &mut W) -> Result<()> {
    let document = open_document(sdk, file)?;

    let report = output::InfoReport {
        path: file.display().to_string(),
        dimensions: document.dimensions(),
        picture: document.picture_geometry(),
        summary: document.summary(),
    };
    output::write_info(out, &report, format)?;

    document.close()?;
    Ok(())
}

fn convert_coords<W: Write>(
    sdk: Arc<Nd2Library>,
    file: &Path,
    seq: Option<u32>,
    coords: Option<Vec<u32>>,
    format: OutputFormat,
    out: &mut W,
) -> Result<()> {
    let mut nd2 = Nd2File::open(sdk, file).with_context(|| format!("Failed to open {:?}", file))?;
    nd2.experiment()?;

    let report = match (seq, coords) {
        (Some(seq_index), _) => output::CoordsReport {
            seq_index,
            coords: nd2.coords_from_seq_index(seq_index)?,
        },
        (None, Some(coords)) => {
            let seq_index = nd2.seq_index_from_coords(&coords)?;
            output::CoordsReport {
                seq_index,
                coords: nd2.coords_from_seq_index(seq_index)?,
            }
        }
        (None, None) => anyhow::bail!("Either --seq or --coords is required"),
    };
    output::write_coords(out, &report, format)?;

    nd2.close()?;
    Ok(())
}

fn export_frames<W: Write>(
    sdk: Arc<Nd2Library>,
    file: &Path,
    start: u32,
    count: Option<u32>,
    output_dir: Option<PathBuf>,
    format: OutputFormat,
    out: &mut W,
) -> Result<()> {
    let mut document = open_document(sdk, file)?;
    let range = export::frame_range(start, count, document.attributes().sequence_count);

    tracing::info!("Exporting frames {}..{}", range.start, range.end);
    let rows = export::FrameExporter::new(&mut document, output_dir)?.run(range)?;
    output::write_frames(out, &rows, format)?;

    document.close()?;
    Ok(())
}
