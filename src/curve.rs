// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Coin Economy Engine - Market Curve
//
// The aggregate market value follows a nested sine wave on top of a linear
// growth trend:
//
//   T(day) = base * sin(x/v + sin(f*x / 2v)) + base + growth*day + minimum
//   x = day + offset, v = volatility
//
// The daily delta T(day) - T(day - 1) is what the engine distributes.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::MarketError;
use crate::types::Day;

/// Integer draw ranges for the six curve constants (upper bound exclusive).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveRanges {
    pub base: (i64, i64),
    pub offset: (i64, i64),
    pub volatility: (i64, i64),
    pub frequency: (i64, i64),
    /// Multiplied by `growth_step`.
    pub growth: (i64, i64),
    pub growth_step: f64,
    pub minimum: (i64, i64),
}

impl Default for CurveRanges {
    fn default() -> Self {
        Self {
            base: (2_500_000, 5_000_000),
            offset: (0, 100),
            volatility: (10, 30),
            frequency: (1, 10),
            growth: (1, 13),
            growth_step: 1000.0,
            minimum: (20_000, 200_000),
        }
    }
}

impl CurveRanges {
    pub(crate) fn named(&self) -> [(&'static str, (i64, i64)); 6] {
        [
            ("base", self.base),
            ("offset", self.offset),
            ("volatility", self.volatility),
            ("frequency", self.frequency),
            ("growth", self.growth),
            ("minimum", self.minimum),
        ]
    }
}

/// Per-campaign curve constants, drawn once and persisted. The zeroed
/// default stands for "not drawn yet".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CurveParameters {
    pub base: f64,
    pub offset: f64,
    pub volatility: f64,
    pub frequency: f64,
    pub growth: f64,
    pub minimum: f64,
}

impl CurveParameters {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, ranges: &CurveRanges) -> Self {
        Self {
            base: draw(rng, ranges.base),
            offset: draw(rng, ranges.offset),
            volatility: draw(rng, ranges.volatility),
            frequency: draw(rng, ranges.frequency),
            growth: draw(rng, ranges.growth) * ranges.growth_step,
            minimum: draw(rng, ranges.minimum),
        }
    }

    /// Constants that keep `T(day)` finite and non-negative for `day >= 0`.
    pub fn validate(&self) -> Result<(), MarketError> {
        let fields = [
            ("base", self.base),
            ("offset", self.offset),
            ("volatility", self.volatility),
            ("frequency", self.frequency),
            ("growth", self.growth),
            ("minimum", self.minimum),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(MarketError::InvalidConfig(format!("curve.{} = {} is not finite", name, value)));
        }
        if self.volatility <= 0.0 {
            return Err(MarketError::InvalidConfig("curve.volatility must be positive".into()));
        }
        if self.base < 0.0 || self.growth < 0.0 || self.minimum < 0.0 {
            return Err(MarketError::InvalidConfig(
                "curve base, growth and minimum must be non-negative".into(),
            ));
        }
        Ok(())
    }

    /// A zero base means the parameters were never drawn.
    pub fn is_initialized(&self) -> bool {
        self.base != 0.0
    }

    pub fn total_market_value(&self, day: Day) -> f64 {
        let x = day as f64 + self.offset;
        let v = self.volatility;
        self.base * (x / v + (self.frequency * x / (2.0 * v)).sin()).sin()
            + self.base
            + self.growth * day as f64
            + self.minimum
    }

    pub fn daily_delta(&self, day: Day) -> f64 {
        self.total_market_value(day) - self.total_market_value(day.saturating_sub(1))
    }
}

fn draw<R: Rng + ?Sized>(rng: &mut R, (lo, hi): (i64, i64)) -> f64 {
    if hi <= lo {
        return lo as f64;
    }
    rng.gen_range(lo..hi) as f64
}
