//! S21 to time-domain conversion.

use crate::error::DspResult;
use crate::fft::FftEngine;
use crate::grid::FrequencyGrid;
use crate::synthesis::{SpectrumSynthesizer, SynthesizedSpectrum};
use lib_types::measurement::Measurement;
use lib_types::units::Seconds;
use lib_types::waveform::Waveform;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// How the full spectrum is brought back to the time domain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InverseMethod {
    /// Complex inverse DFT of the full Hermitian spectrum.
    ///
    /// The imaginary part of the result is kept so its residual can be
    /// reported.
    #[default]
    Complex,

    /// Complex-to-real inverse DFT of the non-negative half only.
    HalfSpectrum,
}

/// Configuration for S21 to impulse response conversion.
#[derive(Clone, Debug, PartialEq)]
pub struct ConversionConfig {
    /// Sampling rate as a multiple of the highest measured bin.
    pub oversampling: usize,

    /// Inverse transform flavor.
    pub method: InverseMethod,

    /// Largest accepted `max|imag| / max|x|` before a warning is logged.
    pub realness_tolerance: f64,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            oversampling: SpectrumSynthesizer::DEFAULT_OVERSAMPLING,
            method: InverseMethod::default(),
            realness_tolerance: 1e-9,
        }
    }
}

/// Every intermediate artifact of one conversion run.
#[derive(Clone, Debug, PartialEq)]
pub struct ImpulseConversion {
    /// Measured (left) spectrum in file order.
    pub spectrum: Vec<Complex64>,

    /// Grid the measurement sits on.
    pub grid: FrequencyGrid,

    /// Left, right and full spectrum buffers.
    pub synthesized: SynthesizedSpectrum,

    /// Inverse transform output, same length as the full spectrum.
    pub time_signal: Vec<Complex64>,

    /// Real part of `time_signal` on its time axis.
    pub impulse: Waveform,

    /// `max|imag| / max|x|` over `time_signal`.
    pub imag_residual: f64,
}

/// Convert an S21 sweep to its impulse response.
pub fn s21_to_impulse(
    measurement: &Measurement,
    config: &ConversionConfig,
) -> DspResult<ImpulseConversion> {
    let grid = FrequencyGrid::from_measurement(measurement)?;
    let spectrum = measurement.values.clone();

    let synthesizer = SpectrumSynthesizer::new(config.oversampling);
    let synthesized = synthesizer.synthesize(&spectrum, &grid)?;

    let mut engine = FftEngine::new();
    let time_signal = inverse_transform(&mut engine, &synthesized, config.method)?;

    let imag_residual = imaginary_residual(&time_signal);
    if imag_residual > config.realness_tolerance {
        tracing::warn!(
            "Time signal is not real: imaginary residual {:.3e} exceeds tolerance {:.1e}",
            imag_residual,
            config.realness_tolerance
        );
    }

    let samples: Vec<f64> = time_signal.iter().map(|c| c.re).collect();
    let dt = grid.time_step(synthesized.sampling_rate);

    tracing::info!(
        "Impulse response: {} samples, dt = {:.3} ps, Fs = {} bins",
        samples.len(),
        dt.as_ps(),
        synthesized.sampling_rate
    );

    Ok(ImpulseConversion {
        spectrum,
        grid,
        synthesized,
        time_signal,
        impulse: Waveform::new(samples, dt, Seconds::ZERO),
        imag_residual,
    })
}

/// Inverse-transform a synthesized spectrum.
///
/// Both methods return `synthesized.len()` samples.
pub fn inverse_transform(
    engine: &mut FftEngine,
    synthesized: &SynthesizedSpectrum,
    method: InverseMethod,
) -> DspResult<Vec<Complex64>> {
    match method {
        InverseMethod::Complex => engine.ifft(&synthesized.full),
        InverseMethod::HalfSpectrum => {
            let real = engine.irfft(&synthesized.left, synthesized.len())?;
            Ok(real.into_iter().map(|re| Complex64::new(re, 0.0)).collect())
        }
    }
}

/// Largest imaginary magnitude relative to the largest sample magnitude.
///
/// Zero for an all-zero signal.
pub fn imaginary_residual(signal: &[Complex64]) -> f64 {
    let peak = signal.iter().map(|c| c.norm()).fold(0.0, f64::max);
    if peak == 0.0 {
        return 0.0;
    }
    signal.iter().map(|c| c.im.abs()).fold(0.0, f64::max) / peak
}

/// Convert impulse response to step response.
///
/// Running integral of the impulse over its time axis.
pub fn impulse_to_step(impulse: &Waveform) -> Waveform {
    let mut cumsum = 0.0;
    let step = impulse
        .samples
        .iter()
        .map(|&sample| {
            cumsum += sample * impulse.dt.0;
            cumsum
        })
        .collect();

    Waveform {
        samples: step,
        dt: impulse.dt,
        t_start: impulse.t_start,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DspError;
    use crate::synthesis::is_hermitian;
    use lib_types::units::Hertz;
    use std::f64::consts::PI;

    fn three_point_sweep() -> Measurement {
        Measurement::from_points([
            (Hertz(1.0), Complex64::new(1.0, 0.0)),
            (Hertz(2.0), Complex64::new(0.0, 1.0)),
            (Hertz(3.0), Complex64::new(-1.0, 0.0)),
        ])
    }

    /// Bandpass-like S21: Gaussian magnitude around `center`, delay `tau`.
    fn bandpass_sweep(points: usize, df: f64, center: f64, tau: f64) -> Measurement {
        Measurement::from_points((1..=points).map(|i| {
            let f = i as f64 * df;
            let mag = (-((f - center) / (0.1 * center)).powi(2)).exp();
            (Hertz(f), Complex64::from_polar(mag, -2.0 * PI * f * tau))
        }))
    }

    #[test]
    fn test_three_point_sweep() {
        let result = s21_to_impulse(&three_point_sweep(), &ConversionConfig::default()).unwrap();

        assert_eq!(result.grid.df, Hertz(1.0));
        assert_eq!((result.grid.f1, result.grid.f2), (1, 3));
        assert_eq!(result.synthesized.sampling_rate, 12);
        assert_eq!(result.synthesized.left.len(), 7);
        assert_eq!(result.synthesized.right.len(), 6);
        assert_eq!(result.synthesized.full.len(), 13);
        assert_eq!(result.time_signal.len(), 13);
        assert_eq!(result.impulse.len(), 13);

        for (i, c) in result.time_signal.iter().enumerate() {
            assert!(c.im.abs() < 1e-12, "sample {} has imaginary part {}", i, c.im);
        }
        assert!(result.imag_residual < 1e-9);
        assert!((result.impulse.dt.0 - 1.0 / 12.0).abs() < 1e-15);
    }

    #[test]
    fn test_three_point_sweep_values() {
        // x[n] = (2/N) * (cos(w n) - sin(2 w n) - cos(3 w n)), w = 2 pi / 13
        let result = s21_to_impulse(&three_point_sweep(), &ConversionConfig::default()).unwrap();
        let n = 13.0;
        let w = 2.0 * PI / n;

        for (i, &x) in result.impulse.samples.iter().enumerate() {
            let t = i as f64;
            let expected = 2.0 / n * ((w * t).cos() - (2.0 * w * t).sin() - (3.0 * w * t).cos());
            assert!((x - expected).abs() < 1e-12, "sample {}: {} vs {}", i, x, expected);
        }
    }

    #[test]
    fn test_single_row_is_invalid() {
        let m = Measurement::from_points([(Hertz(1.0), Complex64::new(1.0, 0.0))]);
        let result = s21_to_impulse(&m, &ConversionConfig::default());
        assert!(matches!(result, Err(DspError::InvalidInput(_))));
    }

    #[test]
    fn test_irregular_spacing_is_invalid() {
        let m = Measurement::from_points([
            (Hertz(1.0), Complex64::new(1.0, 0.0)),
            (Hertz(2.0), Complex64::new(1.0, 0.0)),
            (Hertz(3.7), Complex64::new(1.0, 0.0)),
        ]);
        let result = s21_to_impulse(&m, &ConversionConfig::default());
        assert!(matches!(result, Err(DspError::InvalidInput(_))));
    }

    #[test]
    fn test_non_finite_value_is_numeric_error() {
        let m = Measurement::from_points([
            (Hertz(1.0), Complex64::new(1.0, 0.0)),
            (Hertz(2.0), Complex64::new(f64::NAN, 0.0)),
        ]);
        let result = s21_to_impulse(&m, &ConversionConfig::default());
        assert!(matches!(result, Err(DspError::NumericError(_))));
    }

    #[test]
    fn test_pathological_multiplier_is_out_of_range() {
        let config = ConversionConfig {
            oversampling: 1,
            ..Default::default()
        };
        let result = s21_to_impulse(&three_point_sweep(), &config);
        assert!(matches!(result, Err(DspError::IndexOutOfRange { .. })));
    }

    #[test]
    fn test_bandpass_properties() {
        let m = bandpass_sweep(200, 10e6, 1e9, 2e-9);
        let result = s21_to_impulse(&m, &ConversionConfig::default()).unwrap();
        let fs = result.synthesized.sampling_rate;

        assert_eq!(fs, 800);
        assert_eq!(result.synthesized.full.len(), fs + 1);
        assert_eq!(result.impulse.len(), fs + 1);
        assert!(is_hermitian(&result.synthesized.full));
        assert!(result.imag_residual < 1e-9, "residual {}", result.imag_residual);

        // One period of the response spans 1 / df = 100 ns.
        assert!((result.impulse.dt.as_ps() - 125.0).abs() < 1e-6);
    }

    #[test]
    fn test_bandpass_envelope_peaks_at_delay() {
        let tau = 20e-9;
        let m = bandpass_sweep(200, 10e6, 1e9, tau);
        let result = s21_to_impulse(&m, &ConversionConfig::default()).unwrap();

        // Analytic envelope via the one-sided spectrum (no mirror).
        let mut one_sided = result.synthesized.left.clone();
        one_sided.resize(result.synthesized.len(), Complex64::new(0.0, 0.0));
        let envelope = FftEngine::new().ifft(&one_sided).unwrap();
        let peak_index = envelope
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.norm().total_cmp(&b.1.norm()))
            .map(|(i, _)| i)
            .unwrap();

        let peak_time = result.impulse.time_at(peak_index);
        assert!(
            (peak_time.as_ns() - 20.0).abs() < 0.5,
            "envelope peak at {:.2} ns, expected ~20 ns",
            peak_time.as_ns()
        );
    }

    #[test]
    fn test_half_spectrum_method_matches_complex() {
        let m = bandpass_sweep(64, 1e6, 32e6, 1e-7);

        let complex = s21_to_impulse(&m, &ConversionConfig::default()).unwrap();
        let half = s21_to_impulse(
            &m,
            &ConversionConfig {
                method: InverseMethod::HalfSpectrum,
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(complex.impulse.len(), half.impulse.len());
        for (a, b) in complex.impulse.samples.iter().zip(half.impulse.samples.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
        assert_eq!(half.imag_residual, 0.0);
    }

    #[test]
    fn test_half_spectrum_rejects_complex_dc() {
        let m = Measurement::from_points([
            (Hertz(0.0), Complex64::new(1.0, 0.5)),
            (Hertz(1.0), Complex64::new(1.0, 0.0)),
        ]);
        let config = ConversionConfig {
            method: InverseMethod::HalfSpectrum,
            ..Default::default()
        };
        assert!(matches!(s21_to_impulse(&m, &config), Err(DspError::NumericError(_))));
    }

    #[test]
    fn test_forward_transform_recovers_left_half() {
        let m = bandpass_sweep(40, 1.0, 20.0, 0.05);
        let result = s21_to_impulse(&m, &ConversionConfig::default()).unwrap();

        let forward = FftEngine::new().rfft(&result.impulse.samples).unwrap();

        assert_eq!(forward.len(), result.synthesized.left.len());
        for (k, (x, expected)) in forward.iter().zip(result.synthesized.left.iter()).enumerate() {
            assert!((x - expected).norm() < 1e-12, "bin {}", k);
        }
    }

    #[test]
    fn test_conversion_is_deterministic() {
        let m = bandpass_sweep(100, 5e6, 250e6, 4e-9);
        let config = ConversionConfig::default();

        let first = s21_to_impulse(&m, &config).unwrap();
        let second = s21_to_impulse(&m, &config).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_imaginary_residual() {
        assert_eq!(imaginary_residual(&[]), 0.0);
        assert_eq!(imaginary_residual(&[Complex64::new(0.0, 0.0)]), 0.0);

        let r = imaginary_residual(&[Complex64::new(2.0, 0.0), Complex64::new(0.0, 0.5)]);
        assert!((r - 0.25).abs() < 1e-15);
    }

    #[test]
    fn test_impulse_to_step() {
        let impulse = Waveform::new(vec![0.0, 2.0, 0.0, -1.0], Seconds(0.5), Seconds::ZERO);
        let step = impulse_to_step(&impulse);

        assert_eq!(step.samples, vec![0.0, 1.0, 1.0, 0.5]);
        assert_eq!(step.dt, impulse.dt);
    }
}
