// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Coin Economy Engine - Snapshots
//
// Curve constants, last processed day and every coin record (histories
// included) round-trip exactly. The queued release and the rng stream are
// session state and are not saved.

use log::info;
use serde::{Deserialize, Serialize};

use crate::config::MarketConfig;
use crate::curve::CurveParameters;
use crate::engine::{CoinMarket, EngineState};
use crate::error::MarketError;
use crate::registry::CoinRegistry;
use crate::types::{CoinRecord, Day};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub version: u32,
    #[serde(default)]
    pub curve: Option<CurveParameters>,
    #[serde(default)]
    pub last_updated_day: Option<Day>,
    #[serde(default)]
    pub coins: Vec<CoinRecord>,
}

impl MarketSnapshot {
    pub fn capture(market: &CoinMarket) -> Self {
        let state = market.state();
        Self {
            version: SNAPSHOT_VERSION,
            curve: Some(state.curve),
            last_updated_day: state.last_updated_day,
            coins: state.registry.records(),
        }
    }

    pub fn to_json(&self) -> Result<String, MarketError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, MarketError> {
        let snapshot: MarketSnapshot = serde_json::from_str(json)?;
        if snapshot.version > SNAPSHOT_VERSION {
            return Err(MarketError::UnsupportedSnapshot {
                found: snapshot.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        Ok(snapshot)
    }
}

impl CoinMarket {
    pub fn save_json(&self) -> Result<String, MarketError> {
        MarketSnapshot::capture(self).to_json()
    }

    /// Rebuild a market from a saved snapshot. Call [`CoinMarket::start`]
    /// afterwards: it reseeds and bootstraps an empty registry.
    pub fn load_json(config: MarketConfig, json: &str, seed: u64) -> Result<Self, MarketError> {
        let snapshot = MarketSnapshot::from_json(json)?;
        Self::restore(config, snapshot, seed)
    }

    pub fn restore(config: MarketConfig, snapshot: MarketSnapshot, seed: u64) -> Result<Self, MarketError> {
        let restored_curve = snapshot.curve.filter(CurveParameters::is_initialized);
        if let Some(curve) = &restored_curve {
            curve.validate()?;
        }
        let has_curve = restored_curve.is_some();
        let state = EngineState {
            registry: CoinRegistry::from_records(snapshot.coins),
            last_updated_day: snapshot.last_updated_day,
            queued_release: None,
            // Zeroed constants are redrawn by `start`.
            curve: restored_curve.unwrap_or_default(),
        };
        info!(
            "restored market: {} coins, last day {:?}, curve {}",
            state.registry.len(),
            state.last_updated_day,
            if has_curve { "kept" } else { "pending redraw" }
        );
        Self::from_state(config, state, seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn played(seed: u64, days: Day) -> CoinMarket {
        let mut market = CoinMarket::with_config(MarketConfig::default(), seed).unwrap();
        market.start(0, &mut ());
        for day in 1..=days {
            market.on_day_elapsed(day, &mut ());
        }
        market
    }

    #[test]
    fn test_save_load_save_is_identical() {
        let market = played(1, 40);
        let first = market.save_json().unwrap();
        let loaded = CoinMarket::load_json(MarketConfig::default(), &first, 99).unwrap();
        let second = loaded.save_json().unwrap();
        assert_eq!(first, second);
        assert_eq!(loaded.registry(), market.registry());
        assert_eq!(loaded.curve(), market.curve());
    }

    #[test]
    fn test_queue_not_persisted() {
        let mut market = played(2, 3);
        assert!(market.queue_random_release().is_some());
        let json = market.save_json().unwrap();
        let loaded = CoinMarket::load_json(MarketConfig::default(), &json, 2).unwrap();
        assert!(loaded.queued_release().is_none());
    }

    #[test]
    fn test_empty_snapshot_bootstraps_on_start() {
        let json = r#"{ "version": 1 }"#;
        let mut market = CoinMarket::load_json(MarketConfig::default(), json, 3).unwrap();
        assert!(market.registry().is_empty());
        assert!(!market.curve().is_initialized());

        let released = market.start(12, &mut ());

        assert_eq!(released.len(), 3);
        assert_eq!(market.registry().len(), 10);
        assert!(market.curve().is_initialized());
        assert_eq!(market.last_updated_day(), Some(12));
    }

    #[test]
    fn test_snapshot_with_degenerate_curve_rejected() {
        let json = r#"{
            "version": 1,
            "curve": { "base": 3000000.0, "offset": 10.0, "volatility": 0.0,
                       "frequency": 5.0, "growth": 2000.0, "minimum": 50000.0 }
        }"#;
        assert!(matches!(
            CoinMarket::load_json(MarketConfig::default(), json, 5),
            Err(MarketError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_newer_version_rejected() {
        let err = MarketSnapshot::from_json(r#"{ "version": 7 }"#).unwrap_err();
        assert!(matches!(err, MarketError::UnsupportedSnapshot { found: 7, supported: 1 }));
    }

    #[test]
    fn test_records_without_ledger_fields_load() {
        let json = r#"{
            "version": 1,
            "last_updated_day": 5,
            "coins": [{
                "id": "RimCoin", "display_name": "RimCoin", "is_released": true,
                "market_cap": 1000.0, "circulating_supply": 50.0, "price_history": [20.0]
            }]
        }"#;
        let market = CoinMarket::load_json(MarketConfig::default(), json, 4).unwrap();
        let coin = market.coin("RimCoin").unwrap();
        assert_eq!(coin.total_units_bought, 0.0);
        assert!((market.current_price("RimCoin") - 20.0).abs() < f64::EPSILON);
    }
}
