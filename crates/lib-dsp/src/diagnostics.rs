//! Plot-ready series for visual verification of a conversion.
//!
//! Nothing here feeds back into the numeric pipeline. Phase is always taken
//! with a four-quadrant arctangent so a zero real part never yields NaN.

use crate::impulse::{impulse_to_step, ImpulseConversion};
use lib_types::measurement::Measurement;
use serde::Serialize;

/// One row of the raw measured spectrum.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SpectrumRow {
    pub frequency_hz: f64,
    pub re: f64,
    pub im: f64,
    pub magnitude: f64,
    pub magnitude_db: f64,
    pub phase_deg: f64,
    pub phase_unwrapped_deg: f64,
    pub group_delay_s: f64,
}

/// Which construction buffer a bin belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Left,
    Right,
}

/// One bin of the full spectrum.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConstructionRow {
    /// Position in the full spectrum.
    pub bin: usize,
    /// `bin * df`, the natural x-axis of the full buffer.
    pub frequency_hz: f64,
    pub section: Section,
    pub magnitude: f64,
    pub phase_deg: f64,
}

/// One sample of the time response.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TimeRow {
    pub index: usize,
    pub time_s: f64,
    pub amplitude: f64,
    /// Imaginary part discarded when taking the real signal.
    pub residual_im: f64,
}

/// Headline numbers of a conversion.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ImpulseSummary {
    pub points: usize,
    pub df_hz: f64,
    pub f_start_hz: f64,
    pub f_stop_hz: f64,
    pub f1: usize,
    pub f2: usize,
    pub sampling_rate: usize,
    pub spectrum_len: usize,
    pub dt_s: f64,
    pub duration_s: f64,
    pub peak_index: usize,
    pub peak_time_s: f64,
    pub peak_amplitude: f64,
    pub rms: f64,
    pub energy: f64,
    pub imag_residual: f64,
}

impl ImpulseSummary {
    pub fn from_conversion(conversion: &ImpulseConversion) -> Self {
        let grid = &conversion.grid;
        let impulse = &conversion.impulse;
        let (peak_index, peak_amplitude) = impulse.peak().unwrap_or((0, 0.0));

        Self {
            points: conversion.spectrum.len(),
            df_hz: grid.df.0,
            f_start_hz: grid.bin_frequency(grid.f1).0,
            f_stop_hz: grid.bin_frequency(grid.f2).0,
            f1: grid.f1,
            f2: grid.f2,
            sampling_rate: conversion.synthesized.sampling_rate,
            spectrum_len: conversion.synthesized.len(),
            dt_s: impulse.dt.0,
            duration_s: impulse.duration().0,
            peak_index,
            peak_time_s: impulse.time_at(peak_index).0,
            peak_amplitude,
            rms: impulse.rms(),
            energy: impulse.energy(),
            imag_residual: conversion.imag_residual,
        }
    }
}

/// Raw spectrum view: magnitude, phase and group delay per measured point.
pub fn spectrum_rows(measurement: &Measurement) -> Vec<SpectrumRow> {
    let db = measurement.to_db();
    let phase = measurement.to_phase_deg();
    let unwrapped = measurement.to_phase_unwrapped_deg();
    let delay = measurement.group_delay();

    measurement
        .iter()
        .enumerate()
        .map(|(i, point)| SpectrumRow {
            frequency_hz: point.frequency.0,
            re: point.value.re,
            im: point.value.im,
            magnitude: point.value.norm(),
            magnitude_db: db[i],
            phase_deg: phase[i],
            phase_unwrapped_deg: unwrapped[i],
            group_delay_s: delay.get(i).copied().unwrap_or(0.0),
        })
        .collect()
}

/// Construction view: every bin of the full spectrum on a `k * df` axis.
pub fn construction_rows(conversion: &ImpulseConversion) -> Vec<ConstructionRow> {
    let left_len = conversion.synthesized.left.len();

    conversion
        .synthesized
        .full
        .iter()
        .enumerate()
        .map(|(bin, value)| ConstructionRow {
            bin,
            frequency_hz: conversion.grid.bin_frequency(bin).0,
            section: if bin < left_len { Section::Left } else { Section::Right },
            magnitude: value.norm(),
            phase_deg: value.arg().to_degrees(),
        })
        .collect()
}

/// Time view of the impulse response.
pub fn time_rows(conversion: &ImpulseConversion) -> Vec<TimeRow> {
    conversion
        .impulse
        .iter_timed()
        .zip(conversion.time_signal.iter())
        .enumerate()
        .map(|(index, ((t, amplitude), raw))| TimeRow {
            index,
            time_s: t.0,
            amplitude,
            residual_im: raw.im,
        })
        .collect()
}

/// Time view of the step response.
pub fn step_rows(conversion: &ImpulseConversion) -> Vec<TimeRow> {
    impulse_to_step(&conversion.impulse)
        .iter_timed()
        .enumerate()
        .map(|(index, (t, amplitude))| TimeRow {
            index,
            time_s: t.0,
            amplitude,
            residual_im: 0.0,
        })
        .collect()
}
