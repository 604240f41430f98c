//! Simulation time model.
//!
//! # Design
//!
//! Time is continuous: a `SimTime` wraps a finite, non-negative `f64` of
//! simulated seconds.  Events, visit records and generator outputs all use it.
//!
//! `f64` is not `Ord`, but the event queue needs a total order.  `SimTime`
//! compares with [`f64::total_cmp`]; because construction rejects NaN and
//! negative values, that order coincides with the numeric one for every
//! value that can exist.

use std::cmp::Ordering;
use std::fmt;

use crate::{CoreError, CoreResult};

// ── SimTime ───────────────────────────────────────────────────────────────────

/// An absolute point on the simulated timeline, in seconds.
#[derive(Copy, Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimTime(f64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0.0);

    /// Validate and wrap `secs`.
    pub fn new(secs: f64) -> CoreResult<Self> {
        if secs.is_finite() && secs >= 0.0 {
            // Normalise -0.0 so that total_cmp and numeric order agree.
            Ok(SimTime(secs + 0.0))
        } else {
            Err(CoreError::InvalidTime(secs))
        }
    }

    /// Raw seconds.
    #[inline]
    pub fn as_secs(self) -> f64 {
        self.0
    }

    /// Seconds elapsed from `earlier` to `self` (negative if `earlier` is later).
    #[inline]
    pub fn since(self, earlier: SimTime) -> f64 {
        self.0 - earlier.0
    }
}

impl PartialEq for SimTime {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for SimTime {}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={:.9}", self.0)
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Run-level configuration.
///
/// Typically deserialised from a scenario file by the application crate and
/// passed to the scheduler builder.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Master RNG seed.  The same seed always produces identical histories.
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self { seed: 42 }
    }
}

impl SimConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self { seed }
    }
}
