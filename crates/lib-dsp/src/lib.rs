//! # lib-dsp
//!
//! Numeric core for turning a swept S21 measurement into an impulse response.
//!
//! - **Grid recovery**: frequency step and bin bounds, with uniformity checks
//! - **Spectrum synthesis**: zero-padded, conjugate-mirrored full spectrum
//! - **FFT/IFFT**: arbitrary-length transforms with finite-value checks
//! - **Impulse conversion**: the straight-line pipeline returning every artifact
//! - **Diagnostics**: plot-ready series and summary metrics

pub mod error;
pub mod fft;
pub mod grid;
pub mod synthesis;
pub mod impulse;
pub mod diagnostics;

pub use error::{DspError, DspResult};
pub use fft::FftEngine;
pub use grid::FrequencyGrid;
pub use synthesis::{SpectrumSynthesizer, SynthesizedSpectrum};
pub use impulse::{s21_to_impulse, ConversionConfig, ImpulseConversion, InverseMethod};
