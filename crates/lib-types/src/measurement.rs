//! Swept S21 measurement data.
//!
//! A [`Measurement`] is what a network analyzer hands back for one
//! transmission sweep: ascending frequencies with one complex sample each.
//! Nothing here checks the grid spacing; that is the preprocessor's job.

use crate::units::Hertz;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// One measured frequency with its complex S21 value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeasurementPoint {
    pub frequency: Hertz,
    pub value: Complex64,
}

/// Complete S21 sweep in file order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Measurement {
    /// Frequency points in Hz.
    pub frequencies: Vec<Hertz>,

    /// Complex S21 value at each frequency.
    /// Length matches `frequencies`.
    pub values: Vec<Complex64>,
}

impl Measurement {
    /// Create an empty measurement.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a measurement from `(frequency, value)` pairs.
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = (Hertz, Complex64)>,
    {
        let (frequencies, values) = points.into_iter().unzip();
        Self { frequencies, values }
    }

    /// Append a frequency point.
    pub fn add_point(&mut self, freq: Hertz, value: Complex64) {
        self.frequencies.push(freq);
        self.values.push(value);
    }

    /// Number of frequency points.
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Iterate over the points in file order.
    pub fn iter(&self) -> impl Iterator<Item = MeasurementPoint> + '_ {
        self.frequencies
            .iter()
            .zip(self.values.iter())
            .map(|(&frequency, &value)| MeasurementPoint { frequency, value })
    }

    /// First and last measured frequency.
    pub fn frequency_range(&self) -> Option<(Hertz, Hertz)> {
        Some((*self.frequencies.first()?, *self.frequencies.last()?))
    }

    /// Magnitude in dB.
    pub fn to_db(&self) -> Vec<f64> {
        self.values.iter().map(|c| 20.0 * c.norm().log10()).collect()
    }

    /// Phase in degrees, four-quadrant.
    pub fn to_phase_deg(&self) -> Vec<f64> {
        self.values.iter().map(|c| c.arg().to_degrees()).collect()
    }

    /// Unwrapped phase in degrees (360-degree jumps removed).
    pub fn to_phase_unwrapped_deg(&self) -> Vec<f64> {
        unwrap_phase_deg(&self.to_phase_deg())
    }

    /// Group delay in seconds.
    /// d(phase)/d(omega) = -d(phase_deg)/(360 * df)
    ///
    /// Returns an empty vector for fewer than two points.
    pub fn group_delay(&self) -> Vec<f64> {
        let n = self.frequencies.len();
        if n < 2 {
            return Vec::new();
        }

        let phases = self.to_phase_unwrapped_deg();
        let f = &self.frequencies;

        (0..n)
            .map(|i| {
                // Forward, central, backward difference at the edges and inside
                let (lo, hi) = if i == 0 {
                    (0, 1)
                } else if i == n - 1 {
                    (n - 2, n - 1)
                } else {
                    (i - 1, i + 1)
                };
                let df = f[hi].0 - f[lo].0;
                -(phases[hi] - phases[lo]) / (360.0 * df)
            })
            .collect()
    }
}

/// Unwrap a phase trace in degrees.
pub fn unwrap_phase_deg(phases: &[f64]) -> Vec<f64> {
    let mut unwrapped: Vec<f64> = Vec::with_capacity(phases.len());
    let mut offset = 0.0;

    for &phase in phases {
        if let Some(&prev) = unwrapped.last() {
            let diff = phase + offset - prev;
            if diff > 180.0 {
                offset -= 360.0;
            } else if diff < -180.0 {
                offset += 360.0;
            }
        }
        unwrapped.push(phase + offset);
    }

    unwrapped
}

/// How the two value columns of a sweep are interpreted.
///
/// `RI` is the literal reading and the default. The polar forms are only
/// used when the caller (or a Touchstone option line) says so.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataFormat {
    /// Real/Imaginary
    #[default]
    RI,
    /// Magnitude/Angle (degrees)
    MA,
    /// dB/Angle (degrees)
    DB,
}

impl DataFormat {
    /// Convert a column pair to a complex number.
    pub fn to_complex(&self, val1: f64, val2: f64) -> Complex64 {
        match self {
            Self::RI => Complex64::new(val1, val2),
            Self::MA => Complex64::from_polar(val1, val2.to_radians()),
            Self::DB => {
                let magnitude = 10.0_f64.powf(val1 / 20.0);
                Complex64::from_polar(magnitude, val2.to_radians())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_format_conversion() {
        let ri = DataFormat::RI.to_complex(1.0, -2.0);
        assert_eq!(ri, Complex64::new(1.0, -2.0));

        let ma = DataFormat::MA.to_complex(1.0, 90.0);
        assert!(ma.re.abs() < 1e-10);
        assert!((ma.im - 1.0).abs() < 1e-10);

        let db = DataFormat::DB.to_complex(-20.0, 0.0); // -20 dB = magnitude 0.1
        assert!((db.re - 0.1).abs() < 1e-10);
        assert!(db.im.abs() < 1e-10);
    }

    #[test]
    fn test_measurement_basics() {
        let m = Measurement::from_points([
            (Hertz(1.0), Complex64::new(1.0, 0.0)),
            (Hertz(2.0), Complex64::new(0.0, 1.0)),
            (Hertz(3.0), Complex64::new(-1.0, 0.0)),
        ]);

        assert_eq!(m.len(), 3);
        assert_eq!(m.frequency_range(), Some((Hertz(1.0), Hertz(3.0))));

        let points: Vec<_> = m.iter().collect();
        assert_eq!(points[1].frequency, Hertz(2.0));
        assert_eq!(points[1].value, Complex64::new(0.0, 1.0));
    }

    #[test]
    fn test_phase_uses_all_four_quadrants() {
        let m = Measurement::from_points([
            (Hertz(1.0), Complex64::new(0.0, 1.0)),
            (Hertz(2.0), Complex64::new(-1.0, 0.0)),
            (Hertz(3.0), Complex64::new(0.0, -1.0)),
        ]);

        // A zero real part must not produce NaN.
        let phase = m.to_phase_deg();
        assert!((phase[0] - 90.0).abs() < 1e-10);
        assert!((phase[1] - 180.0).abs() < 1e-10);
        assert!((phase[2] + 90.0).abs() < 1e-10);
    }

    #[test]
    fn test_unwrap_phase_removes_jumps() {
        let unwrapped = unwrap_phase_deg(&[170.0, -170.0, -150.0]);
        assert!((unwrapped[1] - 190.0).abs() < 1e-10);
        assert!((unwrapped[2] - 210.0).abs() < 1e-10);
    }

    #[test]
    fn test_group_delay_of_linear_phase() {
        // exp(-j 2 pi f tau) with tau = 1 ns
        let tau = 1e-9;
        let m = Measurement::from_points((1..=20).map(|i| {
            let f = i as f64 * 1e7;
            (Hertz(f), Complex64::from_polar(1.0, -2.0 * std::f64::consts::PI * f * tau))
        }));

        for d in m.group_delay() {
            assert!((d - tau).abs() < 1e-12, "group delay {} != {}", d, tau);
        }
    }

    #[test]
    fn test_group_delay_needs_two_points() {
        let m = Measurement::from_points([(Hertz(1.0), Complex64::new(1.0, 0.0))]);
        assert!(m.group_delay().is_empty());
    }
}
