//! Rolling history of pointer samples.
//!
//! Samples are kept only while they fall inside a fixed time window measured
//! back from the newest sample. The history is what the shake detector looks
//! at to judge direction between consecutive retained samples.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A single pointer observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    /// Horizontal position in pixels
    pub x: f64,
    /// Monotonic timestamp in milliseconds
    pub timestamp_ms: f64,
}

impl PointerSample {
    pub fn new(x: f64, timestamp_ms: f64) -> Self {
        Self { x, timestamp_ms }
    }

    /// Whether both coordinates are usable numbers.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.timestamp_ms.is_finite()
    }
}

/// Time-bounded sequence of samples, oldest first.
#[derive(Debug, Clone)]
pub struct SampleHistory {
    window_ms: f64,
    samples: VecDeque<PointerSample>,
}

impl SampleHistory {
    /// Create an empty history retaining samples for `window_ms`.
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms: window_ms as f64,
            samples: VecDeque::new(),
        }
    }

    /// Append a sample and evict everything older than the window,
    /// measured from the appended sample.
    ///
    /// Returns the number of evicted samples.
    pub fn push(&mut self, sample: PointerSample) -> usize {
        self.samples.push_back(sample);
        self.evict_before(sample.timestamp_ms - self.window_ms)
    }

    /// Drop samples with a timestamp strictly before `cutoff_ms`.
    fn evict_before(&mut self, cutoff_ms: f64) -> usize {
        let mut evicted = 0;
        while let Some(front) = self.samples.front() {
            if front.timestamp_ms < cutoff_ms {
                self.samples.pop_front();
                evicted += 1;
            } else {
                break;
            }
        }
        evicted
    }

    /// The newest two retained samples as `(previous, latest)`.
    pub fn last_pair(&self) -> Option<(PointerSample, PointerSample)> {
        let len = self.samples.len();
        if len < 2 {
            return None;
        }
        Some((self.samples[len - 2], self.samples[len - 1]))
    }

    /// Newest retained sample.
    pub fn latest(&self) -> Option<&PointerSample> {
        self.samples.back()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Span between the oldest and newest retained samples, in milliseconds.
    pub fn span_ms(&self) -> f64 {
        match (self.samples.front(), self.samples.back()) {
            (Some(first), Some(last)) => last.timestamp_ms - first.timestamp_ms,
            _ => 0.0,
        }
    }
}
