//! FFT/IFFT operations using rustfft.
//!
//! This module provides a high-level wrapper around rustfft with:
//! - Planner caching for repeated transforms
//! - Arbitrary transform lengths (synthesized spectra are usually odd)
//! - Real-to-complex and complex-to-real transforms via realfft
//! - Finite-value checks before any data reaches a planner

use crate::error::{DspError, DspResult};
use num_complex::Complex64;
use realfft::RealFftPlanner;
use rustfft::FftPlanner;

/// FFT engine with cached planners.
pub struct FftEngine {
    /// Complex FFT planner.
    complex_planner: FftPlanner<f64>,

    /// Real FFT planner.
    real_planner: RealFftPlanner<f64>,
}

impl FftEngine {
    /// Create a new FFT engine.
    pub fn new() -> Self {
        Self {
            complex_planner: FftPlanner::new(),
            real_planner: RealFftPlanner::new(),
        }
    }

    /// Perform forward FFT on complex data in-place.
    pub fn fft_inplace(&mut self, data: &mut [Complex64]) -> DspResult<()> {
        check_transform_input(data)?;

        let fft = self.complex_planner.plan_fft_forward(data.len());
        fft.process(data);
        Ok(())
    }

    /// Perform inverse FFT on complex data in-place.
    ///
    /// Normalized by `1/N`, so `x[n] = (1/N) Σ X[k]·exp(+2πi·k·n/N)`.
    pub fn ifft_inplace(&mut self, data: &mut [Complex64]) -> DspResult<()> {
        check_transform_input(data)?;

        let len = data.len();
        let fft = self.complex_planner.plan_fft_inverse(len);
        fft.process(data);

        // Normalize
        let scale = 1.0 / len as f64;
        for x in data.iter_mut() {
            *x *= scale;
        }

        Ok(())
    }

    /// Perform forward FFT on complex data, returning new buffer.
    pub fn fft(&mut self, data: &[Complex64]) -> DspResult<Vec<Complex64>> {
        let mut result = data.to_vec();
        self.fft_inplace(&mut result)?;
        Ok(result)
    }

    /// Perform inverse FFT on complex data, returning new buffer.
    pub fn ifft(&mut self, data: &[Complex64]) -> DspResult<Vec<Complex64>> {
        let mut result = data.to_vec();
        self.ifft_inplace(&mut result)?;
        Ok(result)
    }

    /// Perform forward real-to-complex FFT.
    ///
    /// Input: N real samples
    /// Output: N/2 + 1 complex samples (Hermitian symmetry exploited)
    pub fn rfft(&mut self, data: &[f64]) -> DspResult<Vec<Complex64>> {
        if data.is_empty() {
            return Err(DspError::invalid_input("cannot transform an empty signal"));
        }
        if let Some(i) = data.iter().position(|v| !v.is_finite()) {
            return Err(DspError::NumericError(format!(
                "non-finite sample {} at index {}",
                data[i], i
            )));
        }

        let r2c = self.real_planner.plan_fft_forward(data.len());
        let mut input = data.to_vec();
        let mut output = r2c.make_output_vec();

        r2c.process(&mut input, &mut output)
            .map_err(|e| DspError::NumericError(e.to_string()))?;

        Ok(output)
    }

    /// Perform inverse complex-to-real FFT.
    ///
    /// Input: N/2 + 1 complex samples (the non-negative frequency half)
    /// Output: N real samples
    ///
    /// The DC bin (and the Nyquist bin for even N) must be real; realfft
    /// reports anything else and the error is returned as-is.
    pub fn irfft(&mut self, data: &[Complex64], output_len: usize) -> DspResult<Vec<f64>> {
        if output_len == 0 {
            return Err(DspError::invalid_input("inverse transform length must be positive"));
        }

        let expected_input_len = output_len / 2 + 1;
        if data.len() != expected_input_len {
            return Err(DspError::LengthMismatch {
                expected: expected_input_len,
                actual: data.len(),
            });
        }
        check_transform_input(data)?;

        let c2r = self.real_planner.plan_fft_inverse(output_len);
        let mut input = data.to_vec();
        let mut output = c2r.make_output_vec();

        c2r.process(&mut input, &mut output)
            .map_err(|e| DspError::NumericError(e.to_string()))?;

        // Normalize
        let scale = 1.0 / output_len as f64;
        for x in output.iter_mut() {
            *x *= scale;
        }

        Ok(output)
    }
}

impl Default for FftEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Reject empty buffers and any bin that is NaN or infinite.
fn check_transform_input(data: &[Complex64]) -> DspResult<()> {
    if data.is_empty() {
        return Err(DspError::invalid_input("cannot transform an empty spectrum"));
    }
    if let Some(i) = data.iter().position(|c| !c.is_finite()) {
        return Err(DspError::NumericError(format!(
            "non-finite value {} at bin {}",
            data[i], i
        )));
    }
    Ok(())
}
