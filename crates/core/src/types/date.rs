//! Date, duration and stopwatch (§3), backed by `chrono`.
//!
//! The teacher's pack has no first-class date story of its own (it leans on the host
//! language's datetime objects passed through as opaque values); this module is
//! enriched from the broader example pack's use of `chrono` for host-facing timestamp
//! handling, applied in the teacher's adapter style: a thin wrapper struct per concept,
//! with every operation a plain method rather than operator overloading magic.

use std::time::Instant;

use chrono::{DateTime, Duration as ChronoDuration, Utc};

use crate::error::{CodeLoc, LoxError, RunResult};

/// A point in time, stored as UTC. Display uses RFC3339 per §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Date {
    pub inner: DateTime<Utc>,
}

impl Date {
    #[must_use]
    pub fn now() -> Self {
        Self { inner: Utc::now() }
    }

    #[must_use]
    pub fn from_epoch_millis(millis: i64) -> Self {
        Self { inner: DateTime::from_timestamp_millis(millis).unwrap_or_default() }
    }

    #[must_use]
    pub fn epoch_millis(&self) -> i64 {
        self.inner.timestamp_millis()
    }

    pub fn parse_rfc3339(s: &str, at: CodeLoc) -> RunResult<Self> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| Self { inner: dt.with_timezone(&Utc) })
            .map_err(|e| LoxError::runtime(format!("Invalid date string: {e}"), at))
    }

    #[must_use]
    pub fn plus(&self, d: &Duration) -> Self {
        Self { inner: self.inner + d.inner }
    }

    #[must_use]
    pub fn minus(&self, d: &Duration) -> Self {
        Self { inner: self.inner - d.inner }
    }

    #[must_use]
    pub fn diff(&self, other: &Self) -> Duration {
        Duration { inner: self.inner - other.inner }
    }

    #[must_use]
    pub fn display(&self) -> String {
        self.inner.to_rfc3339()
    }
}

/// A span of time. Stored as a `chrono::Duration` internally; displayed via the
/// host-library standard form (`PnDTnHnMnS`-free, chrono's human `Display`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Duration {
    pub inner: ChronoDuration,
}

impl Duration {
    #[must_use]
    pub fn from_millis(ms: i64) -> Self {
        Self { inner: ChronoDuration::milliseconds(ms) }
    }

    #[must_use]
    pub fn from_seconds(s: f64) -> Self {
        Self { inner: ChronoDuration::milliseconds((s * 1000.0) as i64) }
    }

    #[must_use]
    pub fn as_millis(&self) -> i64 {
        self.inner.num_milliseconds()
    }

    #[must_use]
    pub fn as_seconds(&self) -> f64 {
        self.inner.num_milliseconds() as f64 / 1000.0
    }

    pub fn plus(&self, other: &Self) -> Self {
        Self { inner: self.inner + other.inner }
    }

    pub fn minus(&self, other: &Self) -> Self {
        Self { inner: self.inner - other.inner }
    }

    /// Dividing by a zero-length duration fails per §8 boundary behavior.
    pub fn divide(&self, other: &Self, at: CodeLoc) -> RunResult<f64> {
        if other.inner.is_zero() {
            return Err(LoxError::runtime("Cannot divide duration by a duration of 0.", at));
        }
        Ok(self.as_millis() as f64 / other.as_millis() as f64)
    }

    /// Blocks the evaluator for this duration (§5 suspension point).
    pub fn sleep(&self) {
        if let Ok(std_dur) = self.inner.to_std() {
            std::thread::sleep(std_dur);
        }
    }

    #[must_use]
    pub fn display(&self) -> String {
        format!("{}ms", self.as_millis())
    }
}

/// A monotonic elapsed-time counter, independent of wall-clock adjustments.
#[derive(Debug)]
pub struct Stopwatch {
    started_at: Instant,
    accumulated: std::time::Duration,
    running: bool,
}

impl Stopwatch {
    #[must_use]
    pub fn new() -> Self {
        Self { started_at: Instant::now(), accumulated: std::time::Duration::ZERO, running: true }
    }

    pub fn stop(&mut self) {
        if self.running {
            self.accumulated += self.started_at.elapsed();
            self.running = false;
        }
    }

    pub fn resume(&mut self) {
        if !self.running {
            self.started_at = Instant::now();
            self.running = true;
        }
    }

    pub fn reset(&mut self) {
        self.started_at = Instant::now();
        self.accumulated = std::time::Duration::ZERO;
        self.running = true;
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        let total = if self.running { self.accumulated + self.started_at.elapsed() } else { self.accumulated };
        Duration::from_millis(total.as_millis() as i64)
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}
