//! Global atomic counters for validation activity.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event (e.g. at the end of a CLI run).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    values_validated: AtomicU64,
    diagnostics_reported: AtomicU64,
    validators_resolved: AtomicU64,
    safe_fallbacks: AtomicU64,
    artifact_updates: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            values_validated: AtomicU64::new(0),
            diagnostics_reported: AtomicU64::new(0),
            validators_resolved: AtomicU64::new(0),
            safe_fallbacks: AtomicU64::new(0),
            artifact_updates: AtomicU64::new(0),
        }
    }

    pub fn inc_values_validated(&self) {
        self.values_validated.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "values_validated", "counter incremented");
    }

    /// Add `count` reported diagnostics. Zero is a no-op.
    pub fn add_diagnostics(&self, count: u64) {
        if count == 0 {
            return;
        }
        self.diagnostics_reported.fetch_add(count, Ordering::Relaxed);
        tracing::trace!(metric = "diagnostics_reported", count, "counter incremented");
    }

    /// Increment on every validator built (cache misses only).
    pub fn inc_validators_resolved(&self) {
        self.validators_resolved.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "validators_resolved", "counter incremented");
    }

    pub fn inc_safe_fallbacks(&self) {
        self.safe_fallbacks.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "safe_fallbacks", "counter incremented");
    }

    pub fn inc_artifact_updates(&self) {
        self.artifact_updates.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "artifact_updates", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            values_validated = self.values_validated(),
            diagnostics_reported = self.diagnostics_reported(),
            validators_resolved = self.validators_resolved(),
            safe_fallbacks = self.safe_fallbacks(),
            artifact_updates = self.artifact_updates(),
        );
    }

    pub fn values_validated(&self) -> u64 {
        self.values_validated.load(Ordering::Relaxed)
    }

    pub fn diagnostics_reported(&self) -> u64 {
        self.diagnostics_reported.load(Ordering::Relaxed)
    }

    pub fn validators_resolved(&self) -> u64 {
        self.validators_resolved.load(Ordering::Relaxed)
    }

    pub fn safe_fallbacks(&self) -> u64 {
        self.safe_fallbacks.load(Ordering::Relaxed)
    }

    pub fn artifact_updates(&self) -> u64 {
        self.artifact_updates.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.values_validated.store(0, Ordering::Relaxed);
        self.diagnostics_reported.store(0, Ordering::Relaxed);
        self.validators_resolved.store(0, Ordering::Relaxed);
        self.safe_fallbacks.store(0, Ordering::Relaxed);
        self.artifact_updates.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_increment() {
        let m = Metrics::new();
        m.inc_values_validated();
        m.inc_values_validated();
        assert_eq!(m.values_validated(), 2);

        m.add_diagnostics(3);
        m.add_diagnostics(0);
        assert_eq!(m.diagnostics_reported(), 3);

        m.inc_validators_resolved();
        m.inc_safe_fallbacks();
        m.inc_artifact_updates();
        assert_eq!(m.validators_resolved(), 1);
        assert_eq!(m.safe_fallbacks(), 1);
        assert_eq!(m.artifact_updates(), 1);
    }

    #[test]
    fn reset_zeroes_all() {
        let m = Metrics::new();
        m.inc_values_validated();
        m.add_diagnostics(2);
        m.inc_validators_resolved();
        m.inc_safe_fallbacks();
        m.inc_artifact_updates();
        m.reset();
        assert_eq!(m.values_validated(), 0);
        assert_eq!(m.diagnostics_reported(), 0);
        assert_eq!(m.validators_resolved(), 0);
        assert_eq!(m.safe_fallbacks(), 0);
        assert_eq!(m.artifact_updates(), 0);
    }
}
