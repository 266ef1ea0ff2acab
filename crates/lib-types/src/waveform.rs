//! Time-domain waveform representation.
//!
//! Samples in a `Waveform` are point values at uniformly spaced instants:
//!
//! ```text
//! t[i] = t_start + i * dt,  for i = 0, 1, ..., N-1
//! ```
//!
//! `t_end()` is the time of the last sample, while `duration()` is `N * dt`,
//! one step past it. An impulse response recovered from a sweep with
//! frequency step `df` covers exactly one period `1 / df` of the response.

use crate::units::Seconds;
use serde::{Deserialize, Serialize};

/// A uniformly-sampled time-domain waveform.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Waveform {
    /// Sample values.
    pub samples: Vec<f64>,

    /// Time step between consecutive samples.
    pub dt: Seconds,

    /// Time of the first sample.
    pub t_start: Seconds,
}

impl Waveform {
    /// Create a new waveform from samples.
    pub fn new(samples: Vec<f64>, dt: Seconds, t_start: Seconds) -> Self {
        Self { samples, dt, t_start }
    }

    /// Number of samples in the waveform.
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the waveform is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Total duration of the waveform.
    #[inline]
    pub fn duration(&self) -> Seconds {
        Seconds(self.samples.len() as f64 * self.dt.0)
    }

    /// Time of the last sample, or `t_start` when empty.
    #[inline]
    pub fn t_end(&self) -> Seconds {
        if self.samples.is_empty() {
            return self.t_start;
        }
        self.time_at(self.samples.len() - 1)
    }

    /// Get the time value for a given sample index.
    #[inline]
    pub fn time_at(&self, index: usize) -> Seconds {
        Seconds(self.t_start.0 + index as f64 * self.dt.0)
    }

    /// Sample rate (reciprocal of dt).
    #[inline]
    pub fn sample_rate(&self) -> f64 {
        1.0 / self.dt.0
    }

    /// Iterate over `(time, value)` pairs.
    pub fn iter_timed(&self) -> impl Iterator<Item = (Seconds, f64)> + '_ {
        self.samples
            .iter()
            .enumerate()
            .map(|(i, &v)| (self.time_at(i), v))
    }

    /// Maximum absolute value.
    pub fn max_abs(&self) -> f64 {
        self.samples.iter().map(|v| v.abs()).fold(0.0, f64::max)
    }

    /// Index and value of the sample with the largest magnitude.
    ///
    /// Ties resolve to the earliest sample.
    pub fn peak(&self) -> Option<(usize, f64)> {
        self.samples
            .iter()
            .copied()
            .enumerate()
            .fold(None, |best, (i, v)| match best {
                Some((_, b)) if f64::abs(b) >= v.abs() => best,
                _ => Some((i, v)),
            })
    }

    /// Peak-to-peak amplitude.
    pub fn peak_to_peak(&self) -> f64 {
        let (min, max) = self.samples.iter().fold((f64::MAX, f64::MIN), |(min, max), &v| {
            (min.min(v), max.max(v))
        });
        max - min
    }

    /// Root mean square value.
    pub fn rms(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        (self.energy() / self.samples.len() as f64).sqrt()
    }

    /// Sum of squared samples.
    pub fn energy(&self) -> f64 {
        self.samples.iter().map(|v| v * v).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waveform_basics() {
        let samples = vec![0.0, 0.5, 1.0, 0.5, 0.0];
        let wf = Waveform::new(samples, Seconds::from_ps(10.0), Seconds::ZERO);

        assert_eq!(wf.len(), 5);
        assert!((wf.duration().as_ps() - 50.0).abs() < 0.01);
        assert!((wf.t_end().as_ps() - 40.0).abs() < 0.01);
        assert!((wf.peak_to_peak() - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_peak_picks_largest_magnitude() {
        let wf = Waveform::new(vec![0.1, -0.9, 0.5, 0.9], Seconds(1.0), Seconds::ZERO);

        assert_eq!(wf.peak(), Some((1, -0.9)));
        assert!((wf.max_abs() - 0.9).abs() < 1e-12);
        assert_eq!(Waveform::new(Vec::new(), Seconds(1.0), Seconds::ZERO).peak(), None);
    }

    #[test]
    fn test_rms_and_energy() {
        let wf = Waveform::new(vec![1.0, -1.0, 1.0, -1.0], Seconds(1.0), Seconds::ZERO);

        assert!((wf.energy() - 4.0).abs() < 1e-12);
        assert!((wf.rms() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_timed_iteration() {
        let wf = Waveform::new(vec![3.0, 4.0], Seconds(0.5), Seconds(1.0));
        let timed: Vec<_> = wf.iter_timed().collect();

        assert_eq!(timed, vec![(Seconds(1.0), 3.0), (Seconds(1.5), 4.0)]);
    }
}
