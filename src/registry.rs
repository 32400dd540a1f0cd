// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Coin Economy Engine - Coin Registry

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::MarketError;
use crate::types::{CoinId, CoinRecord};

// ---------------------------------------------------------------------------
// Supply policy
// ---------------------------------------------------------------------------

/// Circulating supply assigned at release: `unit * U{min_multiple..=max_multiple}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupplyPolicy {
    pub unit: f64,
    pub min_multiple: u32,
    pub max_multiple: u32,
}

impl Default for SupplyPolicy {
    fn default() -> Self {
        Self { unit: 5_000.0, min_multiple: 1, max_multiple: 30 }
    }
}

impl SupplyPolicy {
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let hi = self.max_multiple.max(self.min_multiple);
        self.unit * rng.gen_range(self.min_multiple..=hi) as f64
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Catalog of coins and their economic state.
///
/// Ordered by id: every pass over the registry (shocks, redistribution,
/// history commits) visits coins in the same order for a given state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoinRegistry {
    coins: BTreeMap<CoinId, CoinRecord>,
}

impl CoinRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<CoinRecord>) -> Self {
        Self {
            coins: records.into_iter().map(|c| (c.id.clone(), c)).collect(),
        }
    }

    /// Insert a dormant coin. Returns `false` if the id already exists.
    pub fn add(&mut self, id: impl Into<CoinId>, display_name: impl Into<String>) -> bool {
        let id = id.into();
        if self.coins.contains_key(&id) {
            return false;
        }
        let record = CoinRecord::new(id.clone(), display_name);
        self.coins.insert(id, record);
        true
    }

    /// Assign a circulating supply and mark the coin released.
    ///
    /// Returns `Ok(false)` for a coin that is already released.
    pub fn release<R: Rng + ?Sized>(
        &mut self,
        id: &str,
        rng: &mut R,
        supply: &SupplyPolicy,
    ) -> Result<bool, MarketError> {
        let coin = self
            .coins
            .get_mut(id)
            .ok_or_else(|| MarketError::UnknownCoin(CoinId::from(id)))?;
        if coin.is_released {
            return Ok(false);
        }
        coin.circulating_supply = supply.draw(rng);
        coin.is_released = true;
        Ok(true)
    }

    /// Reset a coin to dormant and return the cap it held (possibly negative).
    pub fn collapse(&mut self, id: &str) -> Option<f64> {
        let coin = self.coins.get_mut(id)?;
        let cap = coin.market_cap;
        coin.reset_to_dormant();
        Some(cap)
    }

    pub fn get(&self, id: &str) -> Option<&CoinRecord> {
        self.coins.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut CoinRecord> {
        self.coins.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.coins.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.coins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CoinRecord> {
        self.coins.values()
    }

    pub fn released(&self) -> impl Iterator<Item = &CoinRecord> {
        self.coins.values().filter(|c| c.is_released)
    }

    pub(crate) fn released_mut(&mut self) -> impl Iterator<Item = &mut CoinRecord> {
        self.coins.values_mut().filter(|c| c.is_released)
    }

    pub fn released_ids(&self) -> Vec<CoinId> {
        self.released().map(|c| c.id.clone()).collect()
    }

    pub fn unreleased_ids(&self) -> Vec<CoinId> {
        self.coins
            .values()
            .filter(|c| !c.is_released)
            .map(|c| c.id.clone())
            .collect()
    }

    pub fn released_count(&self) -> usize {
        self.released().count()
    }

    pub fn any_released(&self) -> bool {
        self.coins.values().any(|c| c.is_released)
    }

    /// Sum of released caps.
    pub fn total_market_cap(&self) -> f64 {
        self.released().map(|c| c.market_cap).sum()
    }

    pub fn current_price(&self, id: &str) -> f64 {
        self.get(id).map_or(0.0, CoinRecord::current_price)
    }

    pub fn market_cap(&self, id: &str) -> f64 {
        self.get(id).map_or(0.0, |c| c.market_cap)
    }

    pub fn is_released(&self, id: &str) -> bool {
        self.get(id).map_or(false, |c| c.is_released)
    }

    pub fn records(&self) -> Vec<CoinRecord> {
        self.coins.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn registry() -> CoinRegistry {
        let mut reg = CoinRegistry::new();
        reg.add("RimCoin", "RimCoin");
        reg.add("MuffaloCoin", "MetaMuffalo");
        reg
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut reg = registry();
        reg.get_mut("RimCoin").unwrap().market_cap = 42.0;
        assert!(!reg.add("RimCoin", "Renamed"));
        let coin = reg.get("RimCoin").unwrap();
        assert_eq!(coin.display_name, "RimCoin");
        assert!((coin.market_cap - 42.0).abs() < f64::EPSILON);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_release_assigns_supply_in_units() {
        let mut reg = registry();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let policy = SupplyPolicy::default();
        assert!(reg.release("RimCoin", &mut rng, &policy).unwrap());
        let coin = reg.get("RimCoin").unwrap();
        assert!(coin.is_released);
        assert!(coin.circulating_supply >= 5_000.0 && coin.circulating_supply <= 150_000.0);
        assert_eq!(coin.circulating_supply % 5_000.0, 0.0);
    }

    #[test]
    fn test_release_twice_keeps_supply() {
        let mut reg = registry();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let policy = SupplyPolicy::default();
        reg.release("RimCoin", &mut rng, &policy).unwrap();
        let supply = reg.get("RimCoin").unwrap().circulating_supply;
        assert!(!reg.release("RimCoin", &mut rng, &policy).unwrap());
        assert_eq!(reg.get("RimCoin").unwrap().circulating_supply, supply);
    }

    #[test]
    fn test_release_unknown_coin() {
        let mut reg = registry();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let err = reg.release("DogeCoin", &mut rng, &SupplyPolicy::default()).unwrap_err();
        assert!(matches!(err, MarketError::UnknownCoin(id) if id.as_str() == "DogeCoin"));
    }

    #[test]
    fn test_collapse_resets_and_returns_cap() {
        let mut reg = registry();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        reg.release("MuffaloCoin", &mut rng, &SupplyPolicy::default()).unwrap();
        {
            let coin = reg.get_mut("MuffaloCoin").unwrap();
            coin.market_cap = -3.5;
            coin.price_history = vec![1.0, 2.0];
        }
        assert_eq!(reg.collapse("MuffaloCoin"), Some(-3.5));
        let coin = reg.get("MuffaloCoin").unwrap();
        assert!(!coin.is_released);
        assert_eq!(coin.market_cap, 0.0);
        assert_eq!(coin.circulating_supply, 0.0);
        assert!(coin.price_history.is_empty());
        assert_eq!(reg.collapse("Nope"), None);
    }

    #[test]
    fn test_queries_fall_back_for_unknown() {
        let reg = registry();
        assert_eq!(reg.current_price("Nope"), 0.0);
        assert_eq!(reg.market_cap("Nope"), 0.0);
        assert!(!reg.is_released("Nope"));
    }

    #[test]
    fn test_iteration_is_id_ordered() {
        let reg = registry();
        let ids: Vec<&str> = reg.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["MuffaloCoin", "RimCoin"]);
        assert_eq!(reg.unreleased_ids().len(), 2);
        assert!(!reg.any_released());
    }

    #[test]
    fn test_total_cap_counts_released_only() {
        let mut reg = registry();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        reg.release("RimCoin", &mut rng, &SupplyPolicy::default()).unwrap();
        reg.get_mut("RimCoin").unwrap().market_cap = 10.0;
        reg.get_mut("MuffaloCoin").unwrap().market_cap = 99.0;
        assert!((reg.total_market_cap() - 10.0).abs() < f64::EPSILON);
        assert_eq!(reg.released_count(), 1);
    }
}
