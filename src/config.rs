// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Coin Economy Engine - Market Configuration
//
// Every policy constant of the engine lives here, defaulted to the tuned
// campaign values. Configs deserialize from partial JSON: any omitted field
// keeps its default.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::clock::DayClock;
use crate::curve::CurveRanges;
use crate::error::MarketError;
use crate::registry::SupplyPolicy;
use crate::release::ReleasePolicy;
use crate::shock::ShockPolicy;
use crate::types::{CatalogEntry, CoinId};

/// Default catalog: (id, market name).
const DEFAULT_CATALOG: [(&str, &str); 10] = [
    ("RimCoin", "RimCoin"),
    ("ThrumboCoin", "TurboThrumbo"),
    ("BoomalopeCoin", "BoomalopeChain"),
    ("GlitterCoin", "GlitterGold"),
    ("LuciferiumCoin", "BitLuciferium"),
    ("MuffaloCoin", "MetaMuffalo"),
    ("PoplarCoin", "PoplarCash"),
    ("RaidersCoin", "MiniRaiders"),
    ("RitualCoin", "RitualOS"),
    ("FalloutCoin", "CyberFallout"),
];

pub fn default_catalog() -> Vec<CatalogEntry> {
    DEFAULT_CATALOG
        .iter()
        .map(|(id, name)| CatalogEntry::new(id, name))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    pub catalog: Vec<CatalogEntry>,
    /// Coin always released at bootstrap.
    pub anchor: CoinId,
    pub curve: CurveRanges,
    pub supply: SupplyPolicy,
    pub release: ReleasePolicy,
    pub shock: ShockPolicy,
    pub clock: DayClock,
    /// Cumulative conservation error that trips the audit breaker.
    pub conservation_threshold: f64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            catalog: default_catalog(),
            anchor: CoinId::from("RimCoin"),
            curve: CurveRanges::default(),
            supply: SupplyPolicy::default(),
            release: ReleasePolicy::default(),
            shock: ShockPolicy::default(),
            clock: DayClock::default(),
            conservation_threshold: 1.0,
        }
    }
}

impl MarketConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, MarketError> {
        let config: MarketConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MarketError> {
        if self.catalog.is_empty() {
            return invalid("catalog is empty");
        }
        let mut seen = HashSet::new();
        for entry in &self.catalog {
            if entry.id.as_str().is_empty() {
                return invalid("catalog entry with empty id");
            }
            if !seen.insert(entry.id.as_str()) {
                return invalid(format!("duplicate catalog id {}", entry.id));
            }
        }

        for (name, (lo, hi)) in self.curve.named() {
            if hi <= lo {
                return invalid(format!("curve.{} range [{}, {}) is empty", name, lo, hi));
            }
        }
        if self.curve.volatility.0 <= 0 {
            return invalid("curve.volatility must be positive");
        }
        // base*sin(..) >= -base, so T(day) >= growth*day + minimum for day >= 0
        for (name, (lo, _)) in [
            ("base", self.curve.base),
            ("growth", self.curve.growth),
            ("minimum", self.curve.minimum),
        ] {
            if lo < 0 {
                return invalid(format!("curve.{} range must not go below zero", name));
            }
        }
        if !(self.curve.growth_step.is_finite() && self.curve.growth_step >= 0.0) {
            return invalid("curve.growth_step must be a non-negative number");
        }

        if !(self.supply.unit > 0.0) {
            return invalid("supply.unit must be positive");
        }
        if self.supply.min_multiple == 0 || self.supply.max_multiple < self.supply.min_multiple {
            return invalid("supply multiples must satisfy 1 <= min <= max");
        }

        check_probability("release.daily_chance", self.release.daily_chance)?;
        check_fraction_range("release.entry_fraction", self.release.entry_fraction)?;
        check_probability("shock.chance", self.shock.chance)?;
        check_fraction_range("shock.fraction", self.shock.fraction)?;

        if self.clock.ticks_per_day == 0 {
            return invalid("clock.ticks_per_day must be positive");
        }
        if self.clock.update_tick_of_day >= self.clock.ticks_per_day {
            return invalid("clock.update_tick_of_day must fall inside the day");
        }
        if !(self.conservation_threshold >= 0.0) {
            return invalid("conservation_threshold must be non-negative");
        }
        Ok(())
    }
}

fn invalid<T>(msg: impl Into<String>) -> Result<T, MarketError> {
    Err(MarketError::InvalidConfig(msg.into()))
}

fn check_probability(name: &str, p: f64) -> Result<(), MarketError> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        invalid(format!("{} = {} is not a probability", name, p))
    }
}

fn check_fraction_range(name: &str, (lo, hi): (f64, f64)) -> Result<(), MarketError> {
    if (0.0..=1.0).contains(&lo) && (0.0..=1.0).contains(&hi) && lo <= hi {
        Ok(())
    } else {
        invalid(format!("{} = [{}, {}] must be an ordered range within [0, 1]", name, lo, hi))
    }
}
