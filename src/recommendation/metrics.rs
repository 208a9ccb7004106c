//! Performance monitoring for recommendation serving
//!
//! Lightweight timing used around request handling and offline batch runs.

use std::time::Instant;

/// Performance timer for tracking operation duration
pub struct PerformanceTimer {
    start: Instant,
    label: String,
}

impl PerformanceTimer {
    pub fn new(label: &str) -> Self {
        Self {
            start: Instant::now(),
            label: label.to_string(),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    pub fn log_if_slow(&self, threshold_ms: u64) {
        let elapsed = self.elapsed_ms();
        if elapsed > threshold_ms {
            tracing::warn!(
                "Slow operation: {} took {}ms (threshold: {}ms)",
                self.label,
                elapsed,
                threshold_ms
            );
        }
    }
}

impl Drop for PerformanceTimer {
    fn drop(&mut self) {
        let elapsed = self.elapsed_ms();
        tracing::debug!("{} completed in {}ms", self.label, elapsed);
    }
}
