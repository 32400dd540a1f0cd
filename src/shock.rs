// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Coin Economy Engine - Shock Events
//
// Shocks run against the market's direction: a rising market produces
// crashes, a falling one produces pumps. Either way the moved value goes
// back through the day's redistribution pool, so shocks reshuffle value
// between coins without changing the total.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::types::CoinRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShockPolicy {
    /// Per-coin daily probability of a shock.
    pub chance: f64,
    /// Fraction of the coin's cap moved by a shock.
    pub fraction: (f64, f64),
}

impl Default for ShockPolicy {
    fn default() -> Self {
        Self { chance: 0.10, fraction: (0.05, 0.30) }
    }
}

/// Direction of the day's aggregate delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Regime {
    Expansion,
    Contraction,
}

impl Regime {
    pub fn of(delta: f64) -> Self {
        if delta > 0.0 {
            Regime::Expansion
        } else {
            Regime::Contraction
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "fraction", rename_all = "snake_case")]
pub enum Shock {
    Crash(f64),
    Pump(f64),
}

impl Shock {
    /// Roll one coin's shock for the day.
    pub fn roll<R: Rng + ?Sized>(rng: &mut R, regime: Regime, policy: &ShockPolicy) -> Option<Shock> {
        if !rng.gen_bool(policy.chance) {
            return None;
        }
        let (lo, hi) = policy.fraction;
        let fraction = if hi > lo { rng.gen_range(lo..=hi) } else { lo };
        Some(match regime {
            Regime::Expansion => Shock::Crash(fraction),
            Regime::Contraction => Shock::Pump(fraction),
        })
    }

    pub fn fraction(&self) -> f64 {
        match *self {
            Shock::Crash(f) | Shock::Pump(f) => f,
        }
    }

    /// Apply to a coin's cap. Returns the adjustment to the day's
    /// redistribution pool: a crash releases value into it, a pump draws
    /// value out of it.
    pub fn apply(&self, coin: &mut CoinRecord) -> f64 {
        let moved = coin.market_cap * self.fraction();
        match self {
            Shock::Crash(_) => {
                coin.market_cap -= moved;
                moved
            }
            Shock::Pump(_) => {
                coin.market_cap += moved;
                -moved
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn coin(cap: f64, supply: f64) -> CoinRecord {
        let mut c = CoinRecord::new("RimCoin", "RimCoin");
        c.is_released = true;
        c.market_cap = cap;
        c.circulating_supply = supply;
        c
    }

    #[test]
    fn test_regime_boundary() {
        assert_eq!(Regime::of(0.01), Regime::Expansion);
        assert_eq!(Regime::of(0.0), Regime::Contraction);
        assert_eq!(Regime::of(-3.0), Regime::Contraction);
    }

    #[test]
    fn test_pump_raises_cap_and_next_price() {
        let mut c = coin(100.0, 10.0);
        let adjustment = Shock::Pump(0.2).apply(&mut c);
        assert!((c.market_cap - 120.0).abs() < 1e-12);
        assert!((adjustment + 20.0).abs() < 1e-12);
        c.record_price();
        assert!((c.price_history.last().copied().unwrap() - 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_crash_returns_lost_value() {
        let mut c = coin(200.0, 10.0);
        let adjustment = Shock::Crash(0.25).apply(&mut c);
        assert!((c.market_cap - 150.0).abs() < 1e-12);
        assert!((adjustment - 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_roll_matches_regime_and_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let policy = ShockPolicy::default();
        let mut hits = 0;
        for _ in 0..5_000 {
            if let Some(shock) = Shock::roll(&mut rng, Regime::Expansion, &policy) {
                hits += 1;
                assert!(matches!(shock, Shock::Crash(_)));
                assert!(shock.fraction() >= 0.05 && shock.fraction() <= 0.30);
            }
            if let Some(shock) = Shock::roll(&mut rng, Regime::Contraction, &policy) {
                assert!(matches!(shock, Shock::Pump(_)));
            }
        }
        // ~10% of 5000
        assert!(hits > 380 && hits < 620, "crash count {}", hits);
    }

    #[test]
    fn test_zero_chance_never_shocks() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let policy = ShockPolicy { chance: 0.0, ..ShockPolicy::default() };
        assert!((0..1000).all(|_| Shock::roll(&mut rng, Regime::Expansion, &policy).is_none()));
    }
}
