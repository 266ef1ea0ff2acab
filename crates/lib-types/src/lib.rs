//! # lib-types
//!
//! Core type definitions shared across the S21 impulse workspace.
//!
//! This crate provides the foundational value types:
//! - Physical units (frequency, time) with compile-time safety
//! - Swept S21 measurements as recorded by a network analyzer
//! - Waveform representation for time-domain signals

pub mod units;
pub mod measurement;
pub mod waveform;

pub use units::*;
pub use measurement::*;
pub use waveform::*;

/// Re-export num_complex for convenience
pub use num_complex::Complex64;
