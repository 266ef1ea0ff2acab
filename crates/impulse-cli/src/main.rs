//! s21-impulse: turn a VNA S21 sweep into a time-domain impulse response.
//!
//! This is the main entry point for the command-line tool.

mod config;
mod output;
mod pipeline;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::{ColumnFormat, FreqUnit, Method, Overrides, RunConfig};
use lib_dsp::diagnostics::spectrum_rows;
use lib_dsp::grid::FrequencyGrid;
use lib_types::units::{FrequencyUnit, Hertz};
use lib_vna::LoadOptions;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "s21-impulse")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a sweep into its impulse response
    Transform {
        /// Path to the sweep file (frequency, real, imag)
        #[arg(short, long, required_unless_present = "config")]
        input: Option<PathBuf>,

        /// Path to a TOML or JSON run configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Sampling rate as a multiple of the highest bin
        #[arg(short, long)]
        oversampling: Option<usize>,

        /// Meaning of the two value columns
        #[arg(long)]
        columns: Option<ColumnFormat>,

        /// Unit of the frequency column
        #[arg(long)]
        freq_unit: Option<FreqUnit>,

        /// Inverse transform flavor
        #[arg(short, long)]
        method: Option<Method>,

        /// Directory to export diagnostic CSV series into
        #[arg(short, long)]
        export: Option<PathBuf>,
    },

    /// Load a sweep and report its frequency grid without transforming
    Inspect {
        /// Path to the sweep file
        file: PathBuf,

        /// Meaning of the two value columns
        #[arg(long, default_value = "ri")]
        columns: ColumnFormat,

        /// Unit of the frequency column
        #[arg(long, default_value = "hz")]
        freq_unit: FreqUnit,
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

    match cli.command {
        Commands::Transform { input, config, oversampling, columns, freq_unit, method, export } => {
            let overrides = Overrides { input, columns, freq_unit, oversampling, method, export };
            run_transform(config.as_deref(), &overrides, cli.format)?;
        }
        Commands::Inspect { file, columns, freq_unit } => {
            let options = LoadOptions {
                format: columns.into(),
                unit: freq_unit.into(),
            };
            inspect(&file, &options, cli.format)?;
        }
    }

    Ok(())
}

fn run_transform(config_path: Option<&Path>, overrides: &Overrides, format: OutputFormat) -> Result<()> {
    let mut config = match (config_path, &overrides.input) {
        (Some(path), _) => {
            tracing::info!("Loading configuration from {:?}", path);
            config::load_config(path)?
        }
        (None, Some(input)) => RunConfig::for_input(input.clone()),
        (None, None) => anyhow::bail!("Either --input or --config is required"),
    };
    config.apply(overrides);
    config::validate_config(&config)?;

    let pipeline = pipeline::Pipeline::new(config);
    let results = pipeline.run()?;

    output::print_summary(&results, format)?;

    if let Some(dir) = &pipeline.config().output.export_dir {
        let written = output::write_exports(&results, dir, &pipeline.config().output)?;
        tracing::info!("Exported {} files to {:?}", written.len(), dir);
    }

    Ok(())
}

fn inspect(file: &Path, options: &LoadOptions, format: OutputFormat) -> Result<()> {
    tracing::info!("Inspecting sweep: {:?}", file);

    let measurement = lib_vna::load_measurement(file, options)
        .with_context(|| format!("Failed to load sweep from {:?}", file))?;
    let grid = FrequencyGrid::from_measurement(&measurement);

    match format {
        OutputFormat::Csv => {
            println!("frequency_hz,re,im,magnitude_db,phase_deg");
            for row in spectrum_rows(&measurement) {
                println!("{},{},{},{},{}", row.frequency_hz, row.re, row.im, row.magnitude_db, row.phase_deg);
            }
        }
        OutputFormat::Json => {
            let range = measurement.frequency_range();
            let json = serde_json::json!({
                "points": measurement.len(),
                "f_min_hz": range.map(|(lo, _)| lo.0),
                "f_max_hz": range.map(|(_, hi)| hi.0),
                "grid": match &grid {
                    Ok(g) => serde_json::json!({ "df_hz": g.df.0, "f1": g.f1, "f2": g.f2 }),
                    Err(e) => serde_json::json!({ "error": e.to_string() }),
                },
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            println!("Sweep: {:?}", file);
            println!("  Points: {}", measurement.len());

            if let Some((lo, hi)) = measurement.frequency_range() {
                println!("  Frequency range: {}", format_frequency_range(lo, hi));
            }

            let peak_db = measurement.to_db().into_iter().fold(f64::NEG_INFINITY, f64::max);
            if peak_db.is_finite() {
                println!("  Peak |S21|: {:.2} dB", peak_db);
            }

            match &grid {
                Ok(g) => {
                    println!("  Grid: uniform");
                    println!("    df: {} Hz", g.df.0);
                    println!("    Bins: {}..{} ({} bins)", g.f1, g.f2, g.num_bins());
                    println!("    Minimum oversampling: 2 (Fs = {})", 2 * g.f2);
                }
                Err(e) => {
                    println!("  Grid: not usable ({})", e);
                }
            }
        }
    }

    Ok(())
}

/// Both ends of a sweep in the unit that suits its upper end.
fn format_frequency_range(lo: Hertz, hi: Hertz) -> String {
    let unit = [FrequencyUnit::GHz, FrequencyUnit::MHz, FrequencyUnit::KHz]
        .into_iter()
        .find(|u| hi.0.abs() >= u.multiplier())
        .unwrap_or(FrequencyUnit::Hz);
    let scale = unit.multiplier();

    format!("{:.6} {} - {:.6} {}", lo.0 / scale, unit, hi.0 / scale, unit)
}
