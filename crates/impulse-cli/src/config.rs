//! Run configuration loading and validation.

use anyhow::{Context, Result};
use lib_dsp::impulse::{ConversionConfig, InverseMethod};
use lib_types::measurement::DataFormat;
use lib_types::units::FrequencyUnit;
use lib_vna::LoadOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level run configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunConfig {
    /// Path to the sweep file.
    pub input: PathBuf,

    /// Interpretation of the two value columns.
    #[serde(default)]
    pub columns: ColumnFormat,

    /// Unit of the frequency column.
    #[serde(default)]
    pub freq_unit: FreqUnit,

    /// Transform parameters.
    #[serde(default)]
    pub transform: TransformParams,

    /// Output configuration.
    #[serde(default)]
    pub output: OutputConfig,
}

impl RunConfig {
    /// Configuration with defaults for everything but the input path.
    pub fn for_input(input: PathBuf) -> Self {
        Self {
            input,
            columns: ColumnFormat::default(),
            freq_unit: FreqUnit::default(),
            transform: TransformParams::default(),
            output: OutputConfig::default(),
        }
    }

    /// Apply command-line overrides on top of file values.
    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(input) = &overrides.input {
            self.input = input.clone();
        }
        if let Some(columns) = overrides.columns {
            self.columns = columns;
        }
        if let Some(unit) = overrides.freq_unit {
            self.freq_unit = unit;
        }
        if let Some(m) = overrides.oversampling {
            self.transform.oversampling = m;
        }
        if let Some(method) = overrides.method {
            self.transform.method = method;
        }
        if let Some(dir) = &overrides.export {
            self.output.export_dir = Some(dir.clone());
        }
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            format: self.columns.into(),
            unit: self.freq_unit.into(),
        }
    }

    pub fn conversion_config(&self) -> ConversionConfig {
        ConversionConfig {
            oversampling: self.transform.oversampling,
            method: self.transform.method.into(),
            realness_tolerance: self.transform.realness_tolerance,
        }
    }
}

/// Values given on the command line.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub input: Option<PathBuf>,
    pub columns: Option<ColumnFormat>,
    pub freq_unit: Option<FreqUnit>,
    pub oversampling: Option<usize>,
    pub method: Option<Method>,
    pub export: Option<PathBuf>,
}

/// Value column interpretation.
///
/// `ri` is the literal reading; the polar forms must be asked for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ColumnFormat {
    #[default]
    Ri,
    Ma,
    Db,
}

impl From<ColumnFormat> for DataFormat {
    fn from(format: ColumnFormat) -> Self {
        match format {
            ColumnFormat::Ri => DataFormat::RI,
            ColumnFormat::Ma => DataFormat::MA,
            ColumnFormat::Db => DataFormat::DB,
        }
    }
}

/// Frequency column unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FreqUnit {
    #[default]
    Hz,
    Khz,
    Mhz,
    Ghz,
}

impl From<FreqUnit> for FrequencyUnit {
    fn from(unit: FreqUnit) -> Self {
        match unit {
            FreqUnit::Hz => FrequencyUnit::Hz,
            FreqUnit::Khz => FrequencyUnit::KHz,
            FreqUnit::Mhz => FrequencyUnit::MHz,
            FreqUnit::Ghz => FrequencyUnit::GHz,
        }
    }
}

/// Inverse transform selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Method {
    #[default]
    Complex,
    HalfSpectrum,
}

impl From<Method> for InverseMethod {
    fn from(method: Method) -> Self {
        match method {
            Method::Complex => InverseMethod::Complex,
            Method::HalfSpectrum => InverseMethod::HalfSpectrum,
        }
    }
}

/// Transform parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransformParams {
    /// Sampling rate as a multiple of the highest measured bin.
    #[serde(default = "default_oversampling")]
    pub oversampling: usize,

    /// Inverse transform flavor.
    #[serde(default)]
    pub method: Method,

    /// Largest accepted relative imaginary residual.
    #[serde(default = "default_realness_tolerance")]
    pub realness_tolerance: f64,
}

fn default_oversampling() -> usize { 4 }
fn default_realness_tolerance() -> f64 { 1e-9 }

impl Default for TransformParams {
    fn default() -> Self {
        Self {
            oversampling: default_oversampling(),
            method: Method::default(),
            realness_tolerance: default_realness_tolerance(),
        }
    }
}

/// Output configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for diagnostic CSV series. Nothing is written when unset.
    #[serde(default)]
    pub export_dir: Option<PathBuf>,

    /// Export the raw spectrum view.
    #[serde(default = "default_true")]
    pub spectrum: bool,

    /// Export the spectrum construction view.
    #[serde(default = "default_true")]
    pub construction: bool,

    /// Export the impulse response.
    #[serde(default = "default_true")]
    pub impulse: bool,

    /// Export the step response.
    #[serde(default)]
    pub step: bool,
}

fn default_true() -> bool { true }

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            export_dir: None,
            spectrum: true,
            construction: true,
            impulse: true,
            step: false,
        }
    }
}

/// Load configuration from a file.
pub fn load_config(path: &Path) -> Result<RunConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    parse_config(&content, path.extension().map_or(false, |e| e == "json"))
}

fn parse_config(content: &str, is_json: bool) -> Result<RunConfig> {
    if is_json {
        serde_json::from_str(content).with_context(|| "Failed to parse config as JSON")
    } else {
        // Assume TOML
        toml::from_str(content).with_context(|| "Failed to parse config as TOML")
    }
}

/// Validate configuration.
pub fn validate_config(config: &RunConfig) -> Result<()> {
    if !config.input.exists() {
        anyhow::bail!("Input file not found: {:?}", config.input);
    }

    if config.transform.oversampling == 0 {
        anyhow::bail!("Oversampling multiplier must be at least 1");
    }

    let tol = config.transform.realness_tolerance;
    if !tol.is_finite() || tol <= 0.0 {
        anyhow::bail!("Realness tolerance must be a positive number, got {}", tol);
    }

    Ok(())
}
