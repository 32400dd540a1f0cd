// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Coin Economy Engine - Collapse Resolution
//
// A coin whose cap reaches zero or below collapses back to dormant. Its
// negative cap is debt, split across the working set's survivors with the
// random partition. That can push a survivor under in turn, so resolution
// repeats until the set is solvent. Every pass collapses at least one coin,
// which bounds the loop by the size of the working set.

use log::{debug, info, warn};
use rand::Rng;
use serde::Serialize;

use crate::observer::MarketObserver;
use crate::partition::random_partition;
use crate::registry::CoinRegistry;
use crate::types::CoinId;

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollapseOutcome {
    /// Collapsed coins, in the order they went under.
    pub collapsed: Vec<CoinId>,
    /// Debt that had no survivor left to absorb it.
    pub dropped_debt: f64,
    pub passes: usize,
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Resolve insolvency within `working_set`.
///
/// On return every released coin of the working set has a positive cap.
/// Coins outside the working set are neither collapsed nor charged.
pub fn resolve_collapses<R: Rng + ?Sized, O: MarketObserver + ?Sized>(
    registry: &mut CoinRegistry,
    working_set: &[CoinId],
    rng: &mut R,
    observer: &mut O,
) -> CollapseOutcome {
    let max_passes = working_set.len() + 1;
    let mut outcome = CollapseOutcome::default();

    loop {
        let insolvent = insolvent_coins(registry, working_set);
        if insolvent.is_empty() {
            break;
        }

        if outcome.passes == max_passes {
            let debt = collapse_all(registry, &insolvent, observer, &mut outcome.collapsed);
            warn!(
                "collapse resolution unsettled after {} passes, dropping {:.2} of debt",
                max_passes, debt
            );
            outcome.dropped_debt += debt;
            break;
        }
        outcome.passes += 1;

        let debt = collapse_all(registry, &insolvent, observer, &mut outcome.collapsed);
        if debt <= 0.0 {
            continue;
        }

        let survivors: Vec<CoinId> = working_set
            .iter()
            .filter(|id| registry.is_released(id.as_str()))
            .cloned()
            .collect();
        if survivors.is_empty() {
            warn!("no survivors left to absorb {:.2} of collapse debt, dropping it", debt);
            outcome.dropped_debt += debt;
            break;
        }

        debug!(
            "collapse pass {}: spreading {:.2} of debt across {} survivors",
            outcome.passes,
            debt,
            survivors.len()
        );
        let shares = random_partition(rng, debt, survivors.len());
        for (id, share) in survivors.iter().zip(shares) {
            if let Some(coin) = registry.get_mut(id.as_str()) {
                coin.market_cap -= share;
            }
        }
    }

    outcome
}

fn insolvent_coins(registry: &CoinRegistry, working_set: &[CoinId]) -> Vec<CoinId> {
    working_set
        .iter()
        .filter(|id| {
            registry
                .get(id.as_str())
                .map_or(false, |c| c.is_released && c.market_cap <= 0.0)
        })
        .cloned()
        .collect()
}

/// Collapse each coin and return the total debt they leave behind.
fn collapse_all<O: MarketObserver + ?Sized>(
    registry: &mut CoinRegistry,
    ids: &[CoinId],
    observer: &mut O,
    collapsed: &mut Vec<CoinId>,
) -> f64 {
    let mut debt = 0.0;
    for id in ids {
        if let Some(cap) = registry.collapse(id.as_str()) {
            let owed = cap.abs();
            debt += owed;
            info!("{} collapsed with {:.2} of debt", id, owed);
            observer.notify_collapse(id, owed);
            collapsed.push(id.clone());
        }
    }
    debt
}
