// Per-Day Metric Tracker: invariants, conservation and event counts
// Doubles as the run's market observer so events are counted as they are delivered

use coin_economy::*;
use coin_economy::shock::Shock;

// ─── Market Tracker ─────────────────────────────────────────────────────────

pub struct MarketTracker {
    pub days: u64,
    /// Caps observed below zero after a completed day.
    pub negative_caps: u32,
    pub min_cap: f64,
    pub max_abs_error: f64,
    /// max over days of error / max(1, total cap)
    pub max_normalized_error: f64,
    pub breaker_tripped: bool,
    pub bootstrap_releases: u32,
    pub entries: u32,
    pub shocks: u32,
    pub crashes: u32,
    pub collapses: u32,
    pub collapse_passes_max: usize,
    pub dropped_debt: f64,
    pub empty_days: u32,
    pub peak_released: usize,
    pub over_catalog_days: u32,
}

impl MarketTracker {
    pub fn new() -> Self {
        Self {
            days: 0,
            negative_caps: 0,
            min_cap: f64::INFINITY,
            max_abs_error: 0.0,
            max_normalized_error: 0.0,
            breaker_tripped: false,
            bootstrap_releases: 0,
            entries: 0,
            shocks: 0,
            crashes: 0,
            collapses: 0,
            collapse_passes_max: 0,
            dropped_debt: 0.0,
            empty_days: 0,
            peak_released: 0,
            over_catalog_days: 0,
        }
    }

    /// Record a completed day against the market it left behind.
    pub fn record_day(&mut self, report: &DayReport, market: &CoinMarket) {
        self.days += 1;

        for coin in market.registry().released() {
            self.min_cap = self.min_cap.min(coin.market_cap);
            if coin.market_cap < 0.0 {
                self.negative_caps += 1;
            }
        }

        let error = report.conservation.error;
        self.max_abs_error = self.max_abs_error.max(error);
        let normalized = error / report.total_market_cap.abs().max(1.0);
        self.max_normalized_error = self.max_normalized_error.max(normalized);
        self.breaker_tripped |= report.conservation.circuit_breaker_tripped;

        self.collapse_passes_max = self.collapse_passes_max.max(report.collapse_passes);
        self.dropped_debt += report.dropped_debt;
        if report.undistributed != 0.0 {
            self.empty_days += 1;
        }
        self.peak_released = self.peak_released.max(report.released_count);
        if report.released_count > market.config().catalog.len() {
            self.over_catalog_days += 1;
        }
    }
}

impl MarketObserver for MarketTracker {
    fn notify_release(&mut self, _coin: &CoinRecord, _day: Day) {
        if self.days == 0 {
            self.bootstrap_releases += 1;
        } else {
            self.entries += 1;
        }
    }

    fn notify_collapse(&mut self, _coin: &CoinId, _debt: f64) {
        self.collapses += 1;
    }

    fn notify_shock(&mut self, _coin: &CoinId, shock: Shock) {
        self.shocks += 1;
        if matches!(shock, Shock::Crash(_)) {
            self.crashes += 1;
        }
    }
}
