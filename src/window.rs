//! Bounded sample window.
//!
//! Keeps the most recent `capacity` pitch measurements, newest first. Once the
//! window is full every push evicts exactly one sample, the oldest.
//!
//! The window has a single owner and no interior synchronisation. The tracking
//! session keeps it on the evaluator thread and feeds it through a channel, so
//! readers never observe a half-applied push.

use crate::{constants::MAX_SAMPLE_MAGNITUDE, Error, Result};
use std::collections::VecDeque;

/// Fixed-capacity buffer of the latest samples, most recent first
#[derive(Debug, Clone)]
pub struct SampleWindow {
    capacity: usize,
    samples: VecDeque<f64>,
}

impl SampleWindow {
    /// Create an empty window holding at most `capacity` samples
    ///
    /// # Errors
    ///
    /// Returns an error if `capacity` is zero
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::ConfigError(
                "Window capacity must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            capacity,
            samples: VecDeque::with_capacity(capacity + 1),
        })
    }

    /// Insert `value` as the newest sample, evicting the oldest when over capacity
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidSample` for NaN, infinite values and values whose
    /// magnitude exceeds [`MAX_SAMPLE_MAGNITUDE`]; the window is left unchanged
    /// in that case. The bound keeps `max - min` of any window finite.
    pub fn push(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() || value.abs() > MAX_SAMPLE_MAGNITUDE {
            return Err(Error::InvalidSample(value));
        }

        self.samples.push_front(value);
        if self.samples.len() > self.capacity {
            self.samples.pop_back();
        }

        Ok(())
    }

    /// Copy of the current contents, most recent first
    #[must_use]
    pub fn snapshot(&self) -> Vec<f64> {
        self.samples.iter().copied().collect()
    }

    /// Iterate over the samples, most recent first
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().copied()
    }

    /// Most recently pushed sample
    #[must_use]
    pub fn latest(&self) -> Option<f64> {
        self.samples.front().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.samples.len() == self.capacity
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every sample, keeping the capacity
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
