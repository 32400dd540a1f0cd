// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Coin Economy Engine - Type Definitions

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

use crate::conservation::ConservationResult;
use crate::shock::Shock;

/// Simulation day index. Signed because the curve is also sampled at `day - 1`.
pub type Day = i64;

// ─── CoinId ──────────────────────────────────────────────────────────────────

/// Catalog identifier of a coin (e.g. `"RimCoin"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoinId(pub String);

impl CoinId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CoinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CoinId {
    fn from(s: String) -> Self { CoinId(s) }
}

impl From<&str> for CoinId {
    fn from(s: &str) -> Self { CoinId(s.to_string()) }
}

impl Borrow<str> for CoinId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// ─── CoinRecord ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinRecord {
    pub id: CoinId,
    pub display_name: String,
    pub is_released: bool,
    pub market_cap: f64,
    pub circulating_supply: f64,
    pub price_history: Vec<f64>,
    #[serde(default)]
    pub total_units_bought: f64,
    #[serde(default)]
    pub total_spent_on_purchases: f64,
}

impl CoinRecord {
    /// A dormant coin: unreleased, no cap, no supply, no history.
    pub fn new(id: impl Into<CoinId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            is_released: false,
            market_cap: 0.0,
            circulating_supply: 0.0,
            price_history: Vec::new(),
            total_units_bought: 0.0,
            total_spent_on_purchases: 0.0,
        }
    }

    pub fn current_price(&self) -> f64 {
        if self.circulating_supply > 0.0 {
            self.market_cap / self.circulating_supply
        } else {
            0.0
        }
    }

    pub fn average_buy_price(&self) -> f64 {
        if self.total_units_bought > 0.0 {
            self.total_spent_on_purchases / self.total_units_bought
        } else {
            0.0
        }
    }

    /// Price movement against the previous history entry, as shown next to
    /// the buy price in the trade dialog.
    pub fn daily_change(&self) -> Option<f64> {
        let n = self.price_history.len();
        if n < 2 {
            return None;
        }
        Some(self.current_price() - self.price_history[n - 2])
    }

    /// Append today's price to the history.
    pub fn record_price(&mut self) {
        let price = self.current_price();
        self.price_history.push(price);
    }

    /// Back to the dormant state. Purchase accumulators are the player's
    /// bookkeeping and survive a collapse.
    pub(crate) fn reset_to_dormant(&mut self) {
        self.is_released = false;
        self.market_cap = 0.0;
        self.circulating_supply = 0.0;
        self.price_history.clear();
    }
}

// ─── CatalogEntry ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: CoinId,
    pub display_name: String,
}

impl CatalogEntry {
    pub fn new(id: &str, display_name: &str) -> Self {
        Self { id: CoinId::from(id), display_name: display_name.to_string() }
    }
}

// ─── MarketEvent ─────────────────────────────────────────────────────────────

/// Outbound notification, in the order the engine produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MarketEvent {
    Released { coin: CoinId, day: Day, market_cap: f64, supply: f64 },
    Shocked { coin: CoinId, shock: Shock },
    Collapsed { coin: CoinId, debt: f64 },
    PricesUpdated { day: Day },
}

// ─── Entry ───────────────────────────────────────────────────────────────────

/// A coin that entered the market during a daily draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketEntry {
    pub coin: CoinId,
    /// Cap funded out of the day's delta.
    pub allocation: f64,
}

// ─── DayReport ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct DayReport {
    pub day: Day,
    /// `total_market_value(day) - total_market_value(day - 1)`.
    pub curve_delta: f64,
    /// Delta after entry funding and shocks; the amount redistributed.
    pub adjusted_delta: f64,
    pub entry: Option<MarketEntry>,
    pub shocks: Vec<(CoinId, Shock)>,
    pub collapsed: Vec<CoinId>,
    pub collapse_passes: usize,
    pub dropped_debt: f64,
    /// Delta that had no coin to land on (nothing released besides the entrant).
    pub undistributed: f64,
    pub released_count: usize,
    pub total_market_cap: f64,
    pub total_market_value: f64,
    pub conservation: ConservationResult,
}

// ─── PriceQuote ──────────────────────────────────────────────────────────────

/// One row of the price board the host syncs its displayed values from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub id: CoinId,
    pub display_name: String,
    pub is_released: bool,
    pub price: f64,
    pub market_cap: f64,
    pub circulating_supply: f64,
    pub daily_change: Option<f64>,
    pub average_buy_price: f64,
}

impl From<&CoinRecord> for PriceQuote {
    fn from(coin: &CoinRecord) -> Self {
        Self {
            id: coin.id.clone(),
            display_name: coin.display_name.clone(),
            is_released: coin.is_released,
            price: coin.current_price(),
            market_cap: coin.market_cap,
            circulating_supply: coin.circulating_supply,
            daily_change: coin.daily_change(),
            average_buy_price: coin.average_buy_price(),
        }
    }
}
