//! Hermitian spectrum synthesis.
//!
//! A network analyzer only measures non-negative frequencies. The inverse
//! transform of a real time signal needs the whole period, so the measured
//! half is zero-padded up to the chosen sampling rate and then mirrored.
//!
//! For a real-valued time-domain signal the spectrum satisfies
//! `X[N-k] = conj(X[k])` for `k = 1..N/2`. With `L = Fs/2 + 1` left bins the
//! mirrored right half has `L - 1` bins and the full spectrum has odd length
//! `2L - 1`, which is `Fs + 1` whenever `Fs` is even.

use crate::error::{DspError, DspResult};
use crate::grid::FrequencyGrid;
use num_complex::Complex64;

/// Builds the full spectrum from a measured half at a given oversampling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpectrumSynthesizer {
    oversampling: usize,
}

impl SpectrumSynthesizer {
    /// Sampling rate as a multiple of the highest measured bin.
    pub const DEFAULT_OVERSAMPLING: usize = 4;

    /// Largest full spectrum the synthesizer will allocate (2 GiB of `Complex64`).
    pub const MAX_SPECTRUM_LEN: usize = 1 << 27;

    /// Create a synthesizer with `Fs = oversampling * f2`.
    pub fn new(oversampling: usize) -> Self {
        Self { oversampling }
    }

    pub fn oversampling(&self) -> usize {
        self.oversampling
    }

    /// Sampling rate in bins for a grid, `m * f2`.
    pub fn sampling_rate(&self, grid: &FrequencyGrid) -> DspResult<usize> {
        self.oversampling.checked_mul(grid.f2).ok_or_else(|| {
            DspError::invalid_input(format!(
                "sampling rate {} x {} overflows",
                self.oversampling, grid.f2
            ))
        })
    }

    /// Place `spectrum` into bins `f1..=f2` and mirror it into a full period.
    pub fn synthesize(
        &self,
        spectrum: &[Complex64],
        grid: &FrequencyGrid,
    ) -> DspResult<SynthesizedSpectrum> {
        if spectrum.len() != grid.num_bins() {
            return Err(DspError::LengthMismatch {
                expected: grid.num_bins(),
                actual: spectrum.len(),
            });
        }

        let sampling_rate = self.sampling_rate(grid)?;
        let half = sampling_rate / 2;
        let left_len = half + 1;

        if grid.f2 > half {
            return Err(DspError::IndexOutOfRange {
                index: grid.f2,
                len: left_len,
            });
        }

        let full_len = 2 * half + 1;
        if full_len > Self::MAX_SPECTRUM_LEN {
            return Err(DspError::invalid_input(format!(
                "spectrum of {} bins exceeds the limit of {} (f2 = {}, oversampling {})",
                full_len,
                Self::MAX_SPECTRUM_LEN,
                grid.f2,
                self.oversampling
            )));
        }

        let mut left = vec![Complex64::new(0.0, 0.0); left_len];
        left[grid.f1..=grid.f2].copy_from_slice(spectrum);

        let right = mirror_conjugate(&left);

        let mut full = Vec::with_capacity(left.len() + right.len());
        full.extend_from_slice(&left);
        full.extend_from_slice(&right);

        tracing::debug!(
            sampling_rate,
            left = left.len(),
            right = right.len(),
            full = full.len(),
            "synthesized Hermitian spectrum"
        );

        Ok(SynthesizedSpectrum {
            sampling_rate,
            left,
            right,
            full,
        })
    }
}

impl Default for SpectrumSynthesizer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_OVERSAMPLING)
    }
}

/// The three construction stages of a synthesized spectrum.
#[derive(Clone, Debug, PartialEq)]
pub struct SynthesizedSpectrum {
    /// Sampling rate `Fs` in bins.
    pub sampling_rate: usize,

    /// Bins `0..=Fs/2`, measured values in `f1..=f2`, zeros elsewhere.
    pub left: Vec<Complex64>,

    /// Conjugated reverse of `left[1..]`.
    pub right: Vec<Complex64>,

    /// `left ++ right`.
    pub full: Vec<Complex64>,
}

impl SynthesizedSpectrum {
    /// Length of the full spectrum.
    #[inline]
    pub fn len(&self) -> usize {
        self.full.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.full.is_empty()
    }

    /// Highest non-negative bin, `Fs / 2`.
    #[inline]
    pub fn half(&self) -> usize {
        self.left.len() - 1
    }
}

/// Right half of a Hermitian spectrum: `right[i] = conj(left[L-1-i])`.
///
/// The DC bin (`left[0]`) has no mirror image and is skipped.
pub fn mirror_conjugate(left: &[Complex64]) -> Vec<Complex64> {
    left.iter().skip(1).rev().map(|c| c.conj()).collect()
}

/// Exact check of `X[N-k] == conj(X[k])` for every `k` in `1..N`.
pub fn is_hermitian(spectrum: &[Complex64]) -> bool {
    let n = spectrum.len();
    (1..n).all(|k| spectrum[n - k] == spectrum[k].conj())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_types::units::Hertz;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    fn grid(df: f64, f1: usize, f2: usize) -> FrequencyGrid {
        FrequencyGrid { df: Hertz(df), f1, f2 }
    }

    fn zero() -> Complex64 {
        c(0.0, 0.0)
    }

    #[test]
    fn test_three_bin_sweep_layout() {
        let spectrum = [c(1.0, 0.0), c(0.0, 1.0), c(-1.0, 0.0)];
        let synth = SpectrumSynthesizer::default()
            .synthesize(&spectrum, &grid(1.0, 1, 3))
            .unwrap();

        assert_eq!(synth.sampling_rate, 12);
        assert_eq!(synth.half(), 6);
        assert_eq!(
            synth.left,
            vec![zero(), c(1.0, 0.0), c(0.0, 1.0), c(-1.0, 0.0), zero(), zero(), zero()]
        );
        assert_eq!(
            synth.right,
            vec![zero(), zero(), zero(), c(-1.0, 0.0), c(0.0, -1.0), c(1.0, 0.0)]
        );
        assert_eq!(synth.len(), 13);
        assert_eq!(&synth.full[..7], &synth.left[..]);
        assert_eq!(&synth.full[7..], &synth.right[..]);
    }

    #[test]
    fn test_full_spectrum_is_hermitian() {
        let spectrum: Vec<Complex64> = (0..25)
            .map(|i| Complex64::from_polar(1.0 / (1.0 + i as f64), -0.3 * i as f64))
            .collect();
        let synth = SpectrumSynthesizer::new(4)
            .synthesize(&spectrum, &grid(1e6, 5, 29))
            .unwrap();
        let n = synth.len();

        assert_eq!(n, synth.sampling_rate + 1);
        assert!(is_hermitian(&synth.full));
        for i in 1..synth.half() {
            assert_eq!(synth.full[n - i], synth.full[i].conj());
        }
    }

    #[test]
    fn test_unmeasured_bins_are_exactly_zero() {
        let spectrum = vec![c(0.7, -0.2); 4];
        let g = grid(1.0, 3, 6);
        let synth = SpectrumSynthesizer::new(4).synthesize(&spectrum, &g).unwrap();
        let n = synth.len();

        for k in 0..n {
            let measured = (g.f1..=g.f2).contains(&k);
            let mirrored = (g.f1..=g.f2).contains(&(n - k)) && k > 0;
            if !measured && !mirrored {
                assert_eq!(synth.full[k], zero(), "bin {} should be zero", k);
            } else {
                assert_ne!(synth.full[k], zero(), "bin {} should carry data", k);
            }
        }
    }

    #[test]
    fn test_multiplier_below_two_is_out_of_range() {
        let spectrum = [c(1.0, 0.0), c(1.0, 0.0), c(1.0, 0.0)];

        let result = SpectrumSynthesizer::new(1).synthesize(&spectrum, &grid(1.0, 1, 3));
        assert!(matches!(result, Err(DspError::IndexOutOfRange { index: 3, len: 2 })));

        let result = SpectrumSynthesizer::new(0).synthesize(&spectrum, &grid(1.0, 1, 3));
        assert!(matches!(result, Err(DspError::IndexOutOfRange { index: 3, len: 1 })));
    }

    #[test]
    fn test_oversized_spectrum_is_rejected() {
        // Three bins near 1 GHz on a 1 Hz step.
        let f2 = 1 << 30;
        let spectrum = [c(1.0, 0.0), c(0.5, 0.0), c(0.25, 0.0)];
        let result = SpectrumSynthesizer::new(4).synthesize(&spectrum, &grid(1.0, f2 - 2, f2));
        assert!(matches!(result, Err(DspError::InvalidInput(_))), "{:?}", result.map(|s| s.len()));
    }

    #[test]
    fn test_multiplier_of_two_fills_to_nyquist() {
        let spectrum = [c(1.0, 0.0), c(2.0, 0.0)];
        let synth = SpectrumSynthesizer::new(2)
            .synthesize(&spectrum, &grid(1.0, 1, 2))
            .unwrap();

        assert_eq!(synth.sampling_rate, 4);
        assert_eq!(synth.left, vec![zero(), c(1.0, 0.0), c(2.0, 0.0)]);
        assert_eq!(synth.full.len(), 5);
    }

    #[test]
    fn test_odd_sampling_rate_rounds_half_down() {
        let spectrum = [c(1.0, 1.0), c(2.0, 2.0), c(3.0, 3.0)];
        let synth = SpectrumSynthesizer::new(3)
            .synthesize(&spectrum, &grid(1.0, 1, 3))
            .unwrap();

        assert_eq!(synth.sampling_rate, 9);
        assert_eq!(synth.half(), 4);
        assert_eq!(synth.len(), 9);
        assert!(is_hermitian(&synth.full));
    }

    #[test]
    fn test_spectrum_length_must_match_grid() {
        let result = SpectrumSynthesizer::default().synthesize(&[c(1.0, 0.0)], &grid(1.0, 1, 3));
        assert!(matches!(
            result,
            Err(DspError::LengthMismatch { expected: 3, actual: 1 })
        ));
    }

    #[test]
    fn test_mirror_conjugate_skips_dc() {
        let right = mirror_conjugate(&[c(5.0, 0.0), c(1.0, 2.0), c(3.0, -4.0)]);
        assert_eq!(right, vec![c(3.0, 4.0), c(1.0, -2.0)]);
    }

    #[test]
    fn test_is_hermitian_detects_asymmetry() {
        assert!(is_hermitian(&[c(1.0, 0.0), c(1.0, 1.0), c(1.0, -1.0)]));
        assert!(!is_hermitian(&[c(1.0, 0.0), c(1.0, 1.0), c(1.0, 1.0)]));
    }
}
