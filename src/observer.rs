// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Coin Economy Engine - Market Observer
//
// Outbound notifications to the host. Delivery is best-effort: the engine has
// already committed its state when an observer is called.

use crate::shock::Shock;
use crate::types::{CoinId, CoinRecord, Day, MarketEvent};

pub trait MarketObserver {
    /// A coin entered the market.
    fn notify_release(&mut self, _coin: &CoinRecord, _day: Day) {}

    /// A coin collapsed. The host removes every physical unit of it and
    /// resets devices configured to produce it.
    fn notify_collapse(&mut self, _coin: &CoinId, _debt: f64) {}

    fn notify_shock(&mut self, _coin: &CoinId, _shock: Shock) {}

    /// Prices were committed for `day`; displayed values should be resynced.
    fn notify_price_update(&mut self, _day: Day) {}
}

impl MarketObserver for () {}

/// Records every notification as a [`MarketEvent`], in delivery order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventLog(pub Vec<MarketEvent>);

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[MarketEvent] {
        &self.0
    }

    pub fn take(&mut self) -> Vec<MarketEvent> {
        std::mem::take(&mut self.0)
    }

    pub fn collapses(&self) -> usize {
        self.0
            .iter()
            .filter(|e| matches!(e, MarketEvent::Collapsed { .. }))
            .count()
    }
}

impl MarketObserver for EventLog {
    fn notify_release(&mut self, coin: &CoinRecord, day: Day) {
        self.0.push(MarketEvent::Released {
            coin: coin.id.clone(),
            day,
            market_cap: coin.market_cap,
            supply: coin.circulating_supply,
        });
    }

    fn notify_collapse(&mut self, coin: &CoinId, debt: f64) {
        self.0.push(MarketEvent::Collapsed { coin: coin.clone(), debt });
    }

    fn notify_shock(&mut self, coin: &CoinId, shock: Shock) {
        self.0.push(MarketEvent::Shocked { coin: coin.clone(), shock });
    }

    fn notify_price_update(&mut self, day: Day) {
        self.0.push(MarketEvent::PricesUpdated { day });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_log_keeps_order() {
        let mut log = EventLog::new();
        let coin = CoinRecord::new("RimCoin", "RimCoin");
        log.notify_release(&coin, 3);
        log.notify_shock(&coin.id, Shock::Crash(0.1));
        log.notify_collapse(&coin.id, 4.0);
        log.notify_price_update(3);

        assert_eq!(log.events().len(), 4);
        assert!(matches!(log.events()[0], MarketEvent::Released { day: 3, .. }));
        assert!(matches!(log.events()[3], MarketEvent::PricesUpdated { day: 3 }));
        assert_eq!(log.collapses(), 1);

        let drained = log.take();
        assert_eq!(drained.len(), 4);
        assert!(log.events().is_empty());
    }

    #[test]
    fn test_unit_observer_ignores_everything() {
        let mut sink = ();
        sink.notify_price_update(1);
        sink.notify_collapse(&CoinId::from("RimCoin"), 1.0);
    }
}
