//! Source of simulated telemetry.
//!
//! No physical device feeds this backend. Every synthesized value (scan
//! results, tank levels, inspection ages, SOS reference ids) is drawn from a
//! [`TelemetrySource`] held in the application state, so tests can swap the
//! random source for [`FixedTelemetry`].

use chrono::{DateTime, Utc};
use rand::Rng;
use std::ops::RangeInclusive;

pub trait TelemetrySource: Send + Sync {
    /// A value in `range`.
    fn uniform(&self, range: RangeInclusive<f64>) -> f64;

    /// An integer in `range`.
    fn integer(&self, range: RangeInclusive<i64>) -> i64;

    /// Whether the simulated sensor reports a leak.
    fn leak(&self) -> bool;
}

/// Thread-local RNG backed source used in production.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomTelemetry;

impl TelemetrySource for RandomTelemetry {
    fn uniform(&self, range: RangeInclusive<f64>) -> f64 {
        rand::rng().random_range(range)
    }

    fn integer(&self, range: RangeInclusive<i64>) -> i64 {
        rand::rng().random_range(range)
    }

    fn leak(&self) -> bool {
        rand::rng().random_bool(0.5)
    }
}

/// Deterministic source: every range yields the point at `position`
/// (0.0 = start, 1.0 = end) and `leak` is constant.
#[derive(Debug, Clone, Copy)]
pub struct FixedTelemetry {
    pub position: f64,
    pub leak: bool,
}

impl FixedTelemetry {
    #[must_use]
    pub const fn new(position: f64, leak: bool) -> Self {
        Self { position, leak }
    }
}

impl Default for FixedTelemetry {
    fn default() -> Self {
        Self::new(0.5, false)
    }
}

impl TelemetrySource for FixedTelemetry {
    fn uniform(&self, range: RangeInclusive<f64>) -> f64 {
        let (start, end) = range.into_inner();
        start + (end - start) * self.position.clamp(0.0, 1.0)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn integer(&self, range: RangeInclusive<i64>) -> i64 {
        let (start, end) = range.into_inner();
        let span = (end - start) as f64;
        start + (span * self.position.clamp(0.0, 1.0)).round() as i64
    }

    fn leak(&self) -> bool {
        self.leak
    }
}

/// A sensor is online while its newest reading is strictly younger than the
/// freshness window.
#[must_use]
pub fn is_online(last_reading: DateTime<Utc>, now: DateTime<Utc>, window_seconds: i64) -> bool {
    (now - last_reading).num_seconds() < window_seconds
}
