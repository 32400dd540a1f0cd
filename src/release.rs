// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Coin Economy Engine - Release Scheduler
//
// Two entry paths into the market: the one-off bootstrap that seeds the
// opening set of coins, and the daily draw that lets at most one new coin in
// per day, funded out of that day's delta.

use log::{info, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::MarketConfig;
use crate::curve::CurveParameters;
use crate::observer::MarketObserver;
use crate::partition::random_partition;
use crate::registry::CoinRegistry;
use crate::types::{CoinId, Day, MarketEntry};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleasePolicy {
    /// Coins released at bootstrap besides the anchor.
    pub bootstrap_extra: usize,
    pub daily_chance: f64,
    /// Share of `total_market_value(day)` funding a new entrant.
    pub entry_fraction: (f64, f64),
}

impl Default for ReleasePolicy {
    fn default() -> Self {
        Self {
            bootstrap_extra: 2,
            daily_chance: 1.0 / 60.0,
            entry_fraction: (0.01, 0.05),
        }
    }
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

/// Release the anchor plus `bootstrap_extra` random coins and split
/// `total_market_value(day)` across them.
///
/// Each opening coin's history is seeded with its cap. Returns the released
/// ids in registry order.
pub fn bootstrap<R: Rng + ?Sized, O: MarketObserver + ?Sized>(
    registry: &mut CoinRegistry,
    curve: &CurveParameters,
    config: &MarketConfig,
    day: Day,
    rng: &mut R,
    observer: &mut O,
) -> Vec<CoinId> {
    if let Err(err) = registry.release(config.anchor.as_str(), rng, &config.supply) {
        warn!("bootstrap: anchor not released ({}), continuing with random picks", err);
    }

    let pool = registry.unreleased_ids();
    let picks: Vec<CoinId> = pool
        .choose_multiple(rng, config.release.bootstrap_extra)
        .cloned()
        .collect();
    for id in &picks {
        if let Err(err) = registry.release(id.as_str(), rng, &config.supply) {
            warn!("bootstrap: {}", err);
        }
    }

    let released = registry.released_ids();
    if released.is_empty() {
        warn!("bootstrap: nothing to release, registry has no coins");
        return released;
    }

    let total = curve.total_market_value(day);
    let shares = random_partition(rng, total, released.len());
    for (id, share) in released.iter().zip(shares) {
        if let Some(coin) = registry.get_mut(id.as_str()) {
            coin.market_cap = share;
            coin.price_history.push(share);
        }
    }

    for id in &released {
        if let Some(coin) = registry.get(id.as_str()) {
            info!(
                "bootstrap day {}: released {} (cap {:.2}, supply {})",
                day, coin.id, coin.market_cap, coin.circulating_supply
            );
            observer.notify_release(coin, day);
        }
    }
    released
}

// ---------------------------------------------------------------------------
// Daily draw
// ---------------------------------------------------------------------------

/// Release at most one coin for `day`.
///
/// A queued coin takes precedence; a stale queue entry (unknown or already
/// released) is dropped and the random draw runs instead. The entrant's cap
/// is `U[entry_fraction] * total_market_value(day)`, and its first history
/// point is its opening price.
pub fn daily_draw<R: Rng + ?Sized, O: MarketObserver + ?Sized>(
    registry: &mut CoinRegistry,
    queued: &mut Option<CoinId>,
    curve: &CurveParameters,
    config: &MarketConfig,
    day: Day,
    rng: &mut R,
    observer: &mut O,
) -> Option<MarketEntry> {
    let pending = queued.take().filter(|id| {
        let eligible = registry.get(id.as_str()).map_or(false, |c| !c.is_released);
        if !eligible {
            info!("dropping stale queued release {}", id);
        }
        eligible
    });

    let chosen = match pending {
        Some(id) => id,
        None => pick_random_unreleased(registry, config.release.daily_chance, rng)?,
    };

    match registry.release(chosen.as_str(), rng, &config.supply) {
        Ok(true) => {}
        Ok(false) => return None,
        Err(err) => {
            warn!("daily draw: {}", err);
            return None;
        }
    }

    let (lo, hi) = config.release.entry_fraction;
    let fraction = if hi > lo { rng.gen_range(lo..=hi) } else { lo };
    // The entrant sits outside the collapse pass, so it must not open in debt.
    let allocation = (fraction * curve.total_market_value(day)).max(0.0);

    let coin = registry.get_mut(chosen.as_str())?;
    coin.market_cap = allocation;
    coin.record_price();
    info!(
        "day {}: {} entered the market (cap {:.2}, supply {}, price {:.4})",
        day,
        coin.id,
        allocation,
        coin.circulating_supply,
        coin.current_price()
    );
    observer.notify_release(coin, day);

    Some(MarketEntry { coin: chosen, allocation })
}

/// With probability `chance`, one unreleased coin chosen uniformly.
pub fn pick_random_unreleased<R: Rng + ?Sized>(
    registry: &CoinRegistry,
    chance: f64,
    rng: &mut R,
) -> Option<CoinId> {
    let pool = registry.unreleased_ids();
    if pool.is_empty() || !rng.gen_bool(chance) {
        return None;
    }
    pool.choose(rng).cloned()
}
