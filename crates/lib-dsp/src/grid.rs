//! Frequency grid recovery from a measured sweep.
//!
//! A sweep is only usable if every measured frequency sits on an integer
//! multiple of the frequency step. The step comes from the first two rows;
//! every row is then mapped to its bin `k = round(f / df)` and checked.

use crate::error::{DspError, DspResult};
use lib_types::measurement::Measurement;
use lib_types::units::{Hertz, Seconds};

/// Smallest allowed distance (in bins) between `f / df` and its rounded value.
pub const BIN_TOLERANCE: f64 = 1e-6;

/// Allowed distance per bin of index.
///
/// The step comes from two printed frequencies, so its rounding error is
/// multiplied by `k` at bin `k`.
pub const RELATIVE_BIN_TOLERANCE: f64 = 1e-8;

/// Tolerance applied at fractional bin `k`.
#[inline]
pub fn bin_tolerance(k: f64) -> f64 {
    BIN_TOLERANCE.max(RELATIVE_BIN_TOLERANCE * k.abs())
}

/// Uniform frequency grid occupied by a sweep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrequencyGrid {
    /// Frequency step between consecutive rows.
    pub df: Hertz,

    /// Bin of the first measured frequency.
    pub f1: usize,

    /// Bin of the last measured frequency.
    pub f2: usize,
}

impl FrequencyGrid {
    /// Derive the grid from a measurement and check it holds one value per bin.
    pub fn from_measurement(measurement: &Measurement) -> DspResult<Self> {
        if measurement.values.len() != measurement.frequencies.len() {
            return Err(DspError::LengthMismatch {
                expected: measurement.frequencies.len(),
                actual: measurement.values.len(),
            });
        }
        Self::from_frequencies(&measurement.frequencies)
    }

    /// Derive the grid from ascending, uniformly spaced frequencies.
    pub fn from_frequencies(frequencies: &[Hertz]) -> DspResult<Self> {
        if frequencies.len() < 2 {
            return Err(DspError::invalid_input(format!(
                "need at least 2 frequency points to derive the step, got {}",
                frequencies.len()
            )));
        }

        let df = frequencies[1].0 - frequencies[0].0;
        if !df.is_finite() || df <= 0.0 {
            return Err(DspError::invalid_input(format!(
                "frequency step must be positive, got {} Hz",
                df
            )));
        }
        let df = Hertz(df);

        let f1 = bin_index(frequencies[0], df, 0)?;
        for (row, &freq) in frequencies.iter().enumerate().skip(1) {
            let k = bin_index(freq, df, row)?;
            if k != f1 + row {
                return Err(DspError::invalid_input(format!(
                    "non-uniform spacing: row {} ({} Hz) maps to bin {}, expected {}",
                    row,
                    freq.0,
                    k,
                    f1 + row
                )));
            }
        }
        let f2 = f1 + frequencies.len() - 1;

        tracing::debug!(df = df.0, f1, f2, "recovered frequency grid");

        Ok(Self { df, f1, f2 })
    }

    /// Number of measured bins, `f2 - f1 + 1`.
    #[inline]
    pub fn num_bins(&self) -> usize {
        self.f2 - self.f1 + 1
    }

    /// Frequency of bin `k`.
    #[inline]
    pub fn bin_frequency(&self, k: usize) -> Hertz {
        self.df * k as f64
    }

    /// Sample spacing of the time signal for a sampling rate of `fs` bins.
    #[inline]
    pub fn time_step(&self, fs: usize) -> Seconds {
        Seconds(1.0 / (fs as f64 * self.df.0))
    }
}

/// Map a frequency to its bin, rejecting negative and off-grid values.
fn bin_index(freq: Hertz, df: Hertz, row: usize) -> DspResult<usize> {
    let k = freq / df;
    if !k.is_finite() {
        return Err(DspError::invalid_input(format!(
            "row {} has non-finite frequency {}",
            row, freq.0
        )));
    }

    let rounded = k.round();
    if (k - rounded).abs() > bin_tolerance(k) {
        return Err(DspError::invalid_input(format!(
            "non-uniform spacing: row {} ({} Hz) is {} bins, not an integer multiple of {} Hz",
            row, freq.0, k, df.0
        )));
    }
    if rounded < 0.0 {
        return Err(DspError::invalid_input(format!(
            "row {} ({} Hz) maps to negative bin {}",
            row, freq.0, rounded
        )));
    }

    Ok(rounded as usize)
}
