//! Result output formatting and writing.

use crate::config::OutputConfig;
use crate::pipeline::PipelineResults;
use crate::OutputFormat;
use anyhow::{Context, Result};
use lib_dsp::diagnostics::{
    construction_rows, spectrum_rows, step_rows, time_rows, ImpulseSummary, Section, TimeRow,
};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Write the run summary in the requested format.
pub fn write_summary<W: Write>(w: &mut W, summary: &ImpulseSummary, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            writeln!(w, "S21 Impulse Response")?;
            writeln!(w, "====================")?;
            writeln!(w, "Points:          {}", summary.points)?;
            writeln!(w, "Spacing (df):    {} Hz", summary.df_hz)?;
            writeln!(w, "Band:            {} Hz - {} Hz", summary.f_start_hz, summary.f_stop_hz)?;
            writeln!(w, "Bins (f1..f2):   {}..{}", summary.f1, summary.f2)?;
            writeln!(w, "Sampling rate:   {}", summary.sampling_rate)?;
            writeln!(w, "Spectrum length: {}", summary.spectrum_len)?;
            writeln!(w, "Time step:       {:.6e} s", summary.dt_s)?;
            writeln!(w, "Duration:        {:.6e} s", summary.duration_s)?;
            writeln!(w, "Peak:            {:.6e} at sample {} ({:.6e} s)",
                summary.peak_amplitude, summary.peak_index, summary.peak_time_s)?;
            writeln!(w, "RMS:             {:.6e}", summary.rms)?;
            writeln!(w, "Energy:          {:.6e}", summary.energy)?;
            writeln!(w, "Imag residual:   {:.3e}", summary.imag_residual)?;
        }
        OutputFormat::Json => {
            writeln!(w, "{}", serde_json::to_string_pretty(summary)?)?;
        }
        OutputFormat::Csv => {
            let value = serde_json::to_value(summary)?;
            writeln!(w, "metric,value")?;
            if let serde_json::Value::Object(map) = value {
                for (key, v) in map {
                    writeln!(w, "{},{}", key, v)?;
                }
            }
        }
    }
    Ok(())
}

/// Print the run summary to stdout.
pub fn print_summary(results: &PipelineResults, format: OutputFormat) -> Result<()> {
    let summary = ImpulseSummary::from_conversion(&results.conversion);
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    write_summary(&mut lock, &summary, format)
}

/// Export the diagnostic series selected in `config` into `dir`.
///
/// Returns the paths written.
pub fn write_exports(results: &PipelineResults, dir: &Path, config: &OutputConfig) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory {:?}", dir))?;

    let mut written = Vec::new();

    if config.spectrum {
        let path = dir.join("spectrum.csv");
        let mut f = create(&path)?;
        writeln!(f, "frequency_hz,re,im,magnitude,magnitude_db,phase_deg,phase_unwrapped_deg,group_delay_s")?;
        for row in spectrum_rows(&results.measurement) {
            writeln!(
                f,
                "{},{},{},{},{},{},{},{}",
                row.frequency_hz,
                row.re,
                row.im,
                row.magnitude,
                row.magnitude_db,
                row.phase_deg,
                row.phase_unwrapped_deg,
                row.group_delay_s
            )?;
        }
        f.flush()?;
        tracing::info!("Wrote spectrum to {:?}", path);
        written.push(path);
    }

    if config.construction {
        let path = dir.join("construction.csv");
        let mut f = create(&path)?;
        writeln!(f, "bin,frequency_hz,section,magnitude,phase_deg")?;
        for row in construction_rows(&results.conversion) {
            let section = match row.section {
                Section::Left => "left",
                Section::Right => "right",
            };
            writeln!(
                f,
                "{},{},{},{},{}",
                row.bin,
                row.frequency_hz,
                section,
                row.magnitude,
                row.phase_deg
            )?;
        }
        f.flush()?;
        tracing::info!("Wrote spectrum construction to {:?}", path);
        written.push(path);
    }

    if config.impulse {
        let path = dir.join("impulse.csv");
        write_time_rows(&path, &time_rows(&results.conversion))?;
        tracing::info!("Wrote impulse response to {:?}", path);
        written.push(path);
    }

    if config.step {
        let path = dir.join("step.csv");
        write_time_rows(&path, &step_rows(&results.conversion))?;
        tracing::info!("Wrote step response to {:?}", path);
        written.push(path);
    }

    let path = dir.join("summary.txt");
    let mut f = create(&path)?;
    let summary = ImpulseSummary::from_conversion(&results.conversion);
    write_summary(&mut f, &summary, OutputFormat::Text)?;
    f.flush()?;
    tracing::info!("Wrote summary to {:?}", path);
    written.push(path);

    Ok(written)
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    let f = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    Ok(BufWriter::new(f))
}

fn write_time_rows(path: &Path, rows: &[TimeRow]) -> Result<()> {
    let mut f = create(path)?;
    writeln!(f, "index,time_s,amplitude,residual_im")?;
    for row in rows {
        writeln!(f, "{},{},{},{}", row.index, row.time_s, row.amplitude, row.residual_im)?;
    }
    f.flush()?;
    Ok(())
}
