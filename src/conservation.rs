// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Coin Economy Engine - Conservation Audit

use serde::{Deserialize, Serialize};

/// Relative tolerance: error below `RELATIVE_TOLERANCE * max(1, |expected|)`
/// is considered balanced.
const RELATIVE_TOLERANCE: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Free function
// ---------------------------------------------------------------------------

/// Market cap a day should end with.
///
/// Redistribution and collapse only move value between coins, so the total
/// changes by the curve delta, plus debt dropped when nobody was left to
/// absorb it, minus delta that had no coin to land on:
///
///   after = before + curve_delta + dropped_debt - undistributed
pub fn expected_total(before: f64, curve_delta: f64, dropped_debt: f64, undistributed: f64) -> f64 {
    before + curve_delta + dropped_debt - undistributed
}

// ---------------------------------------------------------------------------
// Conservation result
// ---------------------------------------------------------------------------

/// Outcome of a single day's conservation check.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct ConservationResult {
    pub balanced: bool,
    /// Absolute error for this day.
    pub error: f64,
    pub circuit_breaker_tripped: bool,
    /// Unbalanced days in a row, this one included.
    pub consecutive_violations: u32,
}

// ---------------------------------------------------------------------------
// Conservation law (circuit breaker)
// ---------------------------------------------------------------------------

/// Accumulates conservation error across days and trips a breaker when the
/// total exceeds a threshold. The breaker is informational: the engine keeps
/// running and reports it.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ConservationLaw {
    /// Running total of absolute errors across days that violated tolerance.
    pub cumulative_error: f64,
    pub circuit_breaker_threshold: f64,
    pub circuit_breaker_tripped: bool,
    pub consecutive_violations: u32,
}

impl ConservationLaw {
    pub fn new(threshold: f64) -> Self {
        Self {
            cumulative_error: 0.0,
            circuit_breaker_threshold: threshold,
            circuit_breaker_tripped: false,
            consecutive_violations: 0,
        }
    }

    /// Verify a completed day.
    pub fn verify_day(&mut self, actual: f64, expected: f64) -> ConservationResult {
        let error = (actual - expected).abs();
        let balanced = error <= RELATIVE_TOLERANCE * expected.abs().max(1.0);

        if balanced {
            self.consecutive_violations = 0;
        } else {
            self.cumulative_error += error;
            self.consecutive_violations += 1;
        }

        if self.cumulative_error > self.circuit_breaker_threshold {
            self.circuit_breaker_tripped = true;
        }

        ConservationResult {
            balanced,
            error,
            circuit_breaker_tripped: self.circuit_breaker_tripped,
            consecutive_violations: self.consecutive_violations,
        }
    }

    pub fn reset_circuit_breaker(&mut self) {
        self.cumulative_error = 0.0;
        self.circuit_breaker_tripped = false;
        self.consecutive_violations = 0;
    }

    pub fn is_tripped(&self) -> bool {
        self.circuit_breaker_tripped
    }
}

impl Default for ConservationLaw {
    fn default() -> Self {
        Self::new(1.0)
    }
}
