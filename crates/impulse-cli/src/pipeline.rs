//! Conversion pipeline: load, synthesize, transform.

use crate::config::RunConfig;
use anyhow::{Context, Result};
use lib_dsp::impulse::{s21_to_impulse, ImpulseConversion};
use lib_types::measurement::Measurement;

/// Runs one conversion from a validated configuration.
pub struct Pipeline {
    config: RunConfig,
}

impl Pipeline {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run the conversion.
    pub fn run(&self) -> Result<PipelineResults> {
        let measurement = self.load()?;

        let conversion_config = self.config.conversion_config();
        tracing::info!(
            "Converting {} points (oversampling {}, method {:?})",
            measurement.len(),
            conversion_config.oversampling,
            conversion_config.method
        );

        let conversion = s21_to_impulse(&measurement, &conversion_config)
            .with_context(|| format!("Failed to convert {:?} to an impulse response", self.config.input))?;

        Ok(PipelineResults {
            measurement,
            conversion,
        })
    }

    fn load(&self) -> Result<Measurement> {
        let measurement = lib_vna::load_measurement(&self.config.input, &self.config.load_options())
            .with_context(|| format!("Failed to load sweep from {:?}", self.config.input))?;

        if let Some((lo, hi)) = measurement.frequency_range() {
            tracing::debug!("Sweep spans {} Hz to {} Hz", lo.0, hi.0);
        }

        Ok(measurement)
    }
}

/// Everything a run produces.
#[derive(Debug)]
pub struct PipelineResults {
    /// Sweep as loaded.
    pub measurement: Measurement,

    /// Full conversion record.
    pub conversion: ImpulseConversion,
}
