// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Coin Economy Engine - Trading Ledger
//
// Trades never move market caps. They only feed the purchase accumulators
// behind the average buy price shown to the player.

use log::warn;

use crate::engine::CoinMarket;
use crate::types::{CoinRecord, PriceQuote};

/// Value of `units` at `unit_price`, rounded to a whole amount.
pub fn trade_value(units: u32, unit_price: f64) -> f64 {
    (unit_price * units as f64).round()
}

impl CoinRecord {
    /// Returns the total cost charged.
    pub fn record_purchase(&mut self, units: u32, unit_price: f64) -> f64 {
        let total_cost = trade_value(units, unit_price);
        self.total_units_bought += units as f64;
        self.total_spent_on_purchases += total_cost;
        total_cost
    }

    /// Returns the proceeds. Selling out resets the purchase accumulators.
    pub fn record_sale(&mut self, units: u32, unit_price: f64, units_still_held: u32) -> f64 {
        let proceeds = trade_value(units, unit_price);
        if units_still_held == 0 {
            self.total_units_bought = 0.0;
            self.total_spent_on_purchases = 0.0;
        }
        proceeds
    }
}

impl CoinMarket {
    pub fn record_purchase(&mut self, id: &str, units: u32, unit_price: f64) -> f64 {
        match self.state.registry.get_mut(id) {
            Some(coin) => coin.record_purchase(units, unit_price),
            None => {
                warn!("purchase of unknown coin {}", id);
                trade_value(units, unit_price)
            }
        }
    }

    pub fn record_sale(&mut self, id: &str, units: u32, unit_price: f64, units_still_held: u32) -> f64 {
        match self.state.registry.get_mut(id) {
            Some(coin) => coin.record_sale(units, unit_price, units_still_held),
            None => {
                warn!("sale of unknown coin {}", id);
                trade_value(units, unit_price)
            }
        }
    }

    /// One quote per catalog entry, in registry order.
    pub fn price_board(&self) -> Vec<PriceQuote> {
        self.state.registry.iter().map(PriceQuote::from).collect()
    }
}
