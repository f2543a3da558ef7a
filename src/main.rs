use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use dicom_dictionary_std::tags;
use dicom_stack::{
    Interpolation, NiftiWriter, Orientation, ReadMode, SeriesCollection, SeriesLoader,
    SpacingStrategy, VolumeAssembler, VolumeWriter,
    metadata::get_as_string,
    preview::{self, Window},
    report::SeriesReport,
};
use log::{info, warn};
use web_time::Instant;

/// Convert a directory of DICOM slices into a NIfTI volume
#[derive(Parser, Debug)]
#[command(name = "dicom-stack")]
#[command(about = "DICOM to NIfTI converter")]
#[command(version)]
struct Cli {
    /// Directory containing DICOM images
    #[arg(short = 'd', long = "dicom", value_name = "DIR")]
    dicom: PathBuf,

    /// Output NIfTI filename
    #[arg(short = 'n', long = "nifti", default_value = "./output.nii.gz")]
    nifti: PathBuf,

    /// List slices and series metadata instead of exporting
    #[arg(long)]
    dry_run: bool,

    /// Source of the spacing between slices
    #[arg(long, default_value = "declared")]
    spacing: SpacingArg,

    /// Dry-run report format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Include the embedded JSON block (6819,0011) in the report
    #[arg(long)]
    parse_json: bool,

    /// Also save the centre plane of the volume as an image
    #[arg(long, value_name = "PNG")]
    preview: Option<PathBuf>,

    /// Plane used for --preview
    #[arg(long, default_value = "axial")]
    preview_axis: AxisArg,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, ValueEnum)]
enum SpacingArg {
    /// Slice Thickness of the first slice
    Declared,
    /// Most frequent distance between neighbouring slices
    Robust,
}

impl From<SpacingArg> for SpacingStrategy {
    fn from(arg: SpacingArg) -> Self {
        match arg {
            SpacingArg::Declared => SpacingStrategy::Declared,
            SpacingArg::Robust => SpacingStrategy::Robust,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable text format
    Text,
    /// JSON format
    Json,
}

#[derive(Debug, Clone, ValueEnum)]
enum AxisArg {
    Axial,
    Coronal,
    Sagittal,
}

impl From<AxisArg> for Orientation {
    fn from(arg: AxisArg) -> Self {
        match arg {
            AxisArg::Axial => Orientation::Axial,
            AxisArg::Coronal => Orientation::Coronal,
            AxisArg::Sagittal => Orientation::Sagittal,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    if cli.dry_run {
        let series = SeriesLoader::load_from_directory(&cli.dicom, ReadMode::HeaderOnly)
            .with_context(|| format!("Failed to read DICOM series from {}", cli.dicom.display()))?;
        let report = SeriesReport::new(&series, cli.parse_json);
        let stdout = io::stdout().lock();
        match cli.format {
            OutputFormat::Text => report.write_text(stdout)?,
            OutputFormat::Json => report.write_json(stdout)?,
        }
        return Ok(());
    }

    let series = SeriesLoader::load_from_directory(&cli.dicom, ReadMode::Full)
        .with_context(|| format!("Failed to read DICOM series from {}", cli.dicom.display()))?;
    if cli.nifti.is_file() {
        warn!("{} already exists! It will be overwritten.", cli.nifti.display());
    }

    let window = display_window(&series);
    let volume = VolumeAssembler::new(cli.spacing.into())
        .assemble(series)
        .context("Failed to assemble volume")?;

    info!("Writing image to {}...", cli.nifti.display());
    let tic = Instant::now();
    let written = NiftiWriter.write(&volume, &cli.nifti);
    if written.is_ok() {
        info!("Done ({:.3} s)", tic.elapsed().as_secs_f64());
    }

    if let Some(path) = &cli.preview {
        let window = window.or_else(|| {
            volume
                .value_range()
                .map(|(min, max)| Window::from_range(min, max))
        });
        if let Some(window) = window {
            save_preview(&volume, cli.preview_axis.into(), window, path)?;
        }
    }

    written.with_context(|| format!("Failed to write {}", cli.nifti.display()))
}

/// Window Center / Width of the first slice, if the series declares one.
fn display_window(series: &SeriesCollection) -> Option<Window> {
    let (_, slice) = series.iter().next()?;
    Window::parse(
        &get_as_string(slice.object(), tags::WINDOW_CENTER),
        &get_as_string(slice.object(), tags::WINDOW_WIDTH),
    )
}

fn save_preview(
    volume: &dicom_stack::Volume,
    orientation: Orientation,
    window: Window,
    path: &Path,
) -> Result<()> {
    preview::save_center_plane(volume, orientation, Interpolation::Bilinear, window, path)
        .with_context(|| format!("Failed to save preview {}", path.display()))?;
    info!("Saved {:?} preview to {}", orientation, path.display());
    Ok(())
}
