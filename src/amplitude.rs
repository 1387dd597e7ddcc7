//! Peak-to-peak amplitude of the sample window.
//!
//! The evaluator is a pure function over a window snapshot. [`AmplitudeEvaluator`]
//! adds a tick counter so consumers can order readings, and attaches the
//! window [`Statistics`] to each one.

use crate::window::SampleWindow;

/// Peak-to-peak range (`max - min`) of `samples`, or `None` when empty
///
/// The result is finite as long as every sample lies within
/// ±[`MAX_SAMPLE_MAGNITUDE`](crate::constants::MAX_SAMPLE_MAGNITUDE), which
/// [`SampleWindow::push`] enforces. Arbitrary slices with wider spread, such as
/// `[f64::MAX, -f64::MAX]`, overflow to infinity.
#[must_use]
pub fn evaluate(samples: &[f64]) -> Option<f64> {
    let (min, max) = min_max(samples)?;
    Some(max - min)
}

fn min_max(samples: &[f64]) -> Option<(f64, f64)> {
    let first = *samples.first()?;
    Some(
        samples
            .iter()
            .skip(1)
            .fold((first, first), |(min, max), &x| (min.min(x), max.max(x))),
    )
}

/// Statistical summary of a data window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    /// Mean value of the data
    pub mean: f64,
    /// Population standard deviation of the data
    pub std_dev: f64,
    /// Minimum value in the window
    pub min: f64,
    /// Maximum value in the window
    pub max: f64,
    /// Range (max - min) of the data
    pub range: f64,
}

impl Statistics {
    /// Summarise `samples`; `None` for an empty slice
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // window sizes are tiny
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        let (min, max) = min_max(samples)?;
        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;

        Some(Self {
            mean,
            std_dev: variance.sqrt(),
            min,
            max,
            range: max - min,
        })
    }
}

/// One evaluator tick over a non-empty window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmplitudeReading {
    /// Tick number, starting at 1
    pub sequence: u64,
    /// `max - min` of the window
    pub amplitude: f64,
    /// Samples the reading was computed from
    pub sample_count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Population standard deviation of the window
    pub std_dev: f64,
}

/// Stateful wrapper numbering the readings of successive ticks
#[derive(Debug, Default)]
pub struct AmplitudeEvaluator {
    ticks: u64,
}

impl AmplitudeEvaluator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate one tick. Empty windows still consume a tick but yield `None`.
    pub fn tick(&mut self, window: &SampleWindow) -> Option<AmplitudeReading> {
        self.ticks += 1;

        let samples = window.snapshot();
        let amplitude = evaluate(&samples)?;
        let stats = Statistics::from_samples(&samples)?;

        Some(AmplitudeReading {
            sequence: self.ticks,
            amplitude,
            sample_count: samples.len(),
            min: stats.min,
            max: stats.max,
            mean: stats.mean,
            std_dev: stats.std_dev,
        })
    }

    /// Number of ticks evaluated so far
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
