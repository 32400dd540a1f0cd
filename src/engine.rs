// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Coin Economy Engine - Daily Update Engine

use log::{error, info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use wasm_bindgen::prelude::*;

use crate::collapse;
use crate::config::MarketConfig;
use crate::conservation::{self, ConservationLaw};
use crate::curve::CurveParameters;
use crate::error::MarketError;
use crate::observer::MarketObserver;
use crate::partition::random_partition;
use crate::registry::CoinRegistry;
use crate::release;
use crate::shock::{Regime, Shock};
use crate::types::*;

// ─── Engine state ────────────────────────────────────────────────────────────

/// The campaign's authoritative market state.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineState {
    pub registry: CoinRegistry,
    /// Unset until the market is first started.
    pub last_updated_day: Option<Day>,
    /// Administrative override consumed by the next daily draw. Not persisted.
    pub queued_release: Option<CoinId>,
    pub curve: CurveParameters,
}

// ─── CoinMarket struct ───────────────────────────────────────────────────────

#[wasm_bindgen]
pub struct CoinMarket {
    pub(crate) config: MarketConfig,
    pub(crate) state: EngineState,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) conservation: ConservationLaw,
}

// ─── Construction ────────────────────────────────────────────────────────────

impl CoinMarket {
    /// Validate `config` and build a market with a freshly drawn curve and a
    /// dormant catalog. Call [`CoinMarket::start`] before the first day.
    pub fn with_config(config: MarketConfig, seed: u64) -> Result<Self, MarketError> {
        config.validate()?;
        Ok(Self::build(config, seed))
    }

    /// Like [`CoinMarket::with_config`] but with fixed curve constants.
    pub fn with_curve(
        config: MarketConfig,
        curve: CurveParameters,
        seed: u64,
    ) -> Result<Self, MarketError> {
        curve.validate()?;
        let mut market = Self::with_config(config, seed)?;
        market.state.curve = curve;
        Ok(market)
    }

    /// Wrap an existing state, e.g. one restored from a snapshot.
    pub fn from_state(config: MarketConfig, state: EngineState, seed: u64) -> Result<Self, MarketError> {
        config.validate()?;
        let conservation = ConservationLaw::new(config.conservation_threshold);
        Ok(Self {
            config,
            state,
            rng: ChaCha8Rng::seed_from_u64(seed),
            conservation,
        })
    }

    /// Infallible constructor for configs already known to be valid.
    pub(crate) fn build(config: MarketConfig, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let curve = CurveParameters::generate(&mut rng, &config.curve);
        let mut registry = CoinRegistry::new();
        for entry in &config.catalog {
            registry.add(entry.id.clone(), entry.display_name.clone());
        }
        let conservation = ConservationLaw::new(config.conservation_threshold);
        Self {
            config,
            state: EngineState {
                registry,
                last_updated_day: None,
                queued_release: None,
                curve,
            },
            rng,
            conservation,
        }
    }
}

// ─── Internal Logic (Testable, pure Rust) ────────────────────────────────────

impl CoinMarket {
    /// Campaign start or load.
    ///
    /// Clears the release queue, pins `last_updated_day` if unset, redraws an
    /// uninitialized curve, seeds catalog entries missing from the registry,
    /// and bootstraps when no coin is released. Returns the bootstrapped ids.
    pub fn start<O: MarketObserver + ?Sized>(&mut self, current_day: Day, observer: &mut O) -> Vec<CoinId> {
        self.state.queued_release = None;
        if self.state.last_updated_day.is_none() {
            self.state.last_updated_day = Some(current_day);
        }
        if !self.state.curve.is_initialized() {
            info!("curve parameters missing, drawing a new set");
            self.state.curve = CurveParameters::generate(&mut self.rng, &self.config.curve);
        }
        for entry in &self.config.catalog {
            self.state.registry.add(entry.id.clone(), entry.display_name.clone());
        }
        if self.state.registry.any_released() {
            return Vec::new();
        }
        release::bootstrap(
            &mut self.state.registry,
            &self.state.curve,
            &self.config,
            current_day,
            &mut self.rng,
            observer,
        )
    }

    /// Run the daily transition for `day`.
    ///
    /// Returns `None` when `day` was already processed. A market that was
    /// never started is started at `day - 1` first.
    pub fn on_day_elapsed<O: MarketObserver + ?Sized>(&mut self, day: Day, observer: &mut O) -> Option<DayReport> {
        match self.state.last_updated_day {
            Some(last) if day <= last => return None,
            Some(_) => {}
            None => {
                self.start(day.saturating_sub(1), observer);
            }
        }
        self.state.last_updated_day = Some(day);

        let curve = self.state.curve;
        let total_market_value = curve.total_market_value(day);
        let curve_delta = curve.daily_delta(day);
        let caps_before = self.state.registry.total_market_cap();

        // 1-2. Entry draw, funded out of the delta
        let entry = release::daily_draw(
            &mut self.state.registry,
            &mut self.state.queued_release,
            &curve,
            &self.config,
            day,
            &mut self.rng,
            observer,
        );
        let delta = curve_delta - entry.as_ref().map_or(0.0, |e| e.allocation);

        let working: Vec<CoinId> = self
            .state
            .registry
            .released_ids()
            .into_iter()
            .filter(|id| entry.as_ref().map_or(true, |e| &e.coin != id))
            .collect();

        let mut report = DayReport {
            day,
            curve_delta,
            adjusted_delta: delta,
            entry,
            shocks: Vec::new(),
            collapsed: Vec::new(),
            collapse_passes: 0,
            dropped_debt: 0.0,
            undistributed: 0.0,
            released_count: 0,
            total_market_cap: 0.0,
            total_market_value,
            conservation: Default::default(),
        };

        if working.is_empty() {
            warn!(
                "day {}: no released coins besides today's entrant, {:.2} left undistributed",
                day, delta
            );
            report.undistributed = delta;
            return Some(self.finish_day(report, caps_before));
        }

        // 3. Shock pass
        let regime = Regime::of(delta);
        let mut adjusted_delta = delta;
        for id in &working {
            let Some(shock) = Shock::roll(&mut self.rng, regime, &self.config.shock) else {
                continue;
            };
            if let Some(coin) = self.state.registry.get_mut(id.as_str()) {
                adjusted_delta += shock.apply(coin);
                info!("day {}: {} {:?}, cap now {:.2}", day, id, shock, coin.market_cap);
                observer.notify_shock(id, shock);
                report.shocks.push((id.clone(), shock));
            }
        }
        report.adjusted_delta = adjusted_delta;

        // 4. Redistribution
        let shares = random_partition(&mut self.rng, adjusted_delta.abs(), working.len());
        for (id, share) in working.iter().zip(shares) {
            if let Some(coin) = self.state.registry.get_mut(id.as_str()) {
                match regime {
                    Regime::Expansion => coin.market_cap += share,
                    Regime::Contraction => coin.market_cap -= share,
                }
            }
        }

        // 5. Collapse resolution
        let outcome = collapse::resolve_collapses(
            &mut self.state.registry,
            &working,
            &mut self.rng,
            observer,
        );
        report.collapsed = outcome.collapsed;
        report.collapse_passes = outcome.passes;
        report.dropped_debt = outcome.dropped_debt;

        // 6-7. Commit prices
        for coin in self.state.registry.released_mut() {
            coin.record_price();
        }
        observer.notify_price_update(day);

        Some(self.finish_day(report, caps_before))
    }

    /// Run the daily transition if the clock says one is due at `ticks_abs`.
    pub fn on_tick<O: MarketObserver + ?Sized>(&mut self, ticks_abs: u64, observer: &mut O) -> Option<DayReport> {
        let day = self
            .config
            .clock
            .due_day(ticks_abs, self.state.last_updated_day)?;
        self.on_day_elapsed(day, observer)
    }

    fn finish_day(&mut self, mut report: DayReport, caps_before: f64) -> DayReport {
        let caps_after = self.state.registry.total_market_cap();
        let expected = conservation::expected_total(
            caps_before,
            report.curve_delta,
            report.dropped_debt,
            report.undistributed,
        );
        let was_tripped = self.conservation.is_tripped();
        report.conservation = self.conservation.verify_day(caps_after, expected);
        if report.conservation.circuit_breaker_tripped && !was_tripped {
            error!(
                "day {}: conservation breaker tripped, cumulative error {:.6} over {} unbalanced day(s)",
                report.day, self.conservation.cumulative_error, report.conservation.consecutive_violations
            );
        }

        report.released_count = self.state.registry.released_count();
        report.total_market_cap = caps_after;
        info!(
            "day {}: delta {:.2}, {} released, {} shocks, {} collapsed, cap {:.2}",
            report.day,
            report.curve_delta,
            report.released_count,
            report.shocks.len(),
            report.collapsed.len(),
            caps_after
        );
        report
    }

    // ─── Administrative overrides ────────────────────────────────────────────

    /// Queue `id` for the next daily draw. Returns whether it was queued.
    pub fn queue_release(&mut self, id: &str) -> bool {
        match self.state.registry.get(id) {
            None => {
                warn!("cannot queue unknown coin {}", id);
                false
            }
            Some(coin) if coin.is_released => {
                info!("{} is already released, nothing to queue", id);
                false
            }
            Some(coin) => {
                info!("queued {} for release", coin.id);
                self.state.queued_release = Some(coin.id.clone());
                true
            }
        }
    }

    /// Queue one unreleased coin chosen at random.
    pub fn queue_random_release(&mut self) -> Option<CoinId> {
        let Some(id) = release::pick_random_unreleased(&self.state.registry, 1.0, &mut self.rng) else {
            info!("every coin is already released, nothing to queue");
            return None;
        };
        info!("queued {} for release", id);
        self.state.queued_release = Some(id.clone());
        Some(id)
    }

    pub fn reset_conservation_breaker(&mut self) {
        self.conservation.reset_circuit_breaker();
    }

    // ─── Queries ─────────────────────────────────────────────────────────────

    pub fn current_price(&self, id: &str) -> f64 {
        self.state.registry.current_price(id)
    }

    pub fn market_cap(&self, id: &str) -> f64 {
        self.state.registry.market_cap(id)
    }

    pub fn is_released(&self, id: &str) -> bool {
        self.state.registry.is_released(id)
    }

    pub fn coin(&self, id: &str) -> Option<&CoinRecord> {
        self.state.registry.get(id)
    }

    pub fn registry(&self) -> &CoinRegistry {
        &self.state.registry
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn curve(&self) -> &CurveParameters {
        &self.state.curve
    }

    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    pub fn last_updated_day(&self) -> Option<Day> {
        self.state.last_updated_day
    }

    pub fn queued_release(&self) -> Option<&CoinId> {
        self.state.queued_release.as_ref()
    }

    pub fn conservation(&self) -> &ConservationLaw {
        &self.conservation
    }

    /// Aggregate market value the curve prescribes for `day`.
    pub fn total_market_value(&self, day: Day) -> f64 {
        self.state.curve.total_market_value(day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::EventLog;

    fn reference_curve() -> CurveParameters {
        CurveParameters {
            base: 3_000_000.0,
            offset: 10.0,
            volatility: 20.0,
            frequency: 5.0,
            growth: 2000.0,
            minimum: 50_000.0,
        }
    }

    fn started(seed: u64) -> CoinMarket {
        let mut market =
            CoinMarket::with_curve(MarketConfig::default(), reference_curve(), seed).unwrap();
        market.start(0, &mut ());
        market
    }

    #[test]
    fn test_start_bootstraps_three() {
        let market = started(1);
        assert_eq!(market.registry().released_count(), 3);
        assert_eq!(market.last_updated_day(), Some(0));
        let total = reference_curve().total_market_value(0);
        assert!((market.registry().total_market_cap() - total).abs() < 1e-9 * total);
    }

    #[test]
    fn test_start_twice_does_not_rebootstrap() {
        let mut market = started(2);
        let before = market.registry().clone();
        assert!(market.start(0, &mut ()).is_empty());
        assert_eq!(market.registry(), &before);
    }

    #[test]
    fn test_repeated_day_is_noop() {
        let mut market = started(3);
        assert!(market.on_day_elapsed(1, &mut ()).is_some());
        let snapshot = market.state().clone();
        assert!(market.on_day_elapsed(1, &mut ()).is_none());
        assert!(market.on_day_elapsed(0, &mut ()).is_none());
        assert_eq!(market.state(), &snapshot);
    }

    #[test]
    fn test_day_commits_one_price_per_released_coin() {
        let mut market = started(4);
        let mut log = EventLog::new();
        let report = market.on_day_elapsed(1, &mut log).unwrap();
        if report.entry.is_none() {
            for coin in market.registry().released() {
                assert_eq!(coin.price_history.len(), 2);
            }
        }
        assert!(matches!(log.events().last(), Some(MarketEvent::PricesUpdated { day: 1 })));
        assert!(report.conservation.balanced);
    }

    #[test]
    fn test_queued_release_excluded_from_shocks() {
        let mut config = MarketConfig::default();
        config.shock.chance = 1.0;
        let mut market = CoinMarket::with_curve(config, reference_curve(), 5).unwrap();
        market.start(0, &mut ());
        let target = market.registry().unreleased_ids()[0].clone();
        assert!(market.queue_release(target.as_str()));

        let report = market.on_day_elapsed(1, &mut ()).unwrap();

        let entry = report.entry.as_ref().unwrap();
        assert_eq!(entry.coin, target);
        assert_eq!(report.shocks.len(), 3);
        assert!(report.shocks.iter().all(|(id, _)| id != &target));
        assert!(market.queued_release().is_none());
    }

    #[test]
    fn test_queue_rejects_unknown_and_released() {
        let mut market = started(6);
        assert!(!market.queue_release("DogeCoin"));
        assert!(!market.queue_release("RimCoin"));
        assert!(market.queued_release().is_none());
        let queued = market.queue_random_release().unwrap();
        assert!(!market.is_released(queued.as_str()));
        assert_eq!(market.queued_release(), Some(&queued));
    }

    #[test]
    fn test_empty_market_reports_undistributed() {
        let mut config = MarketConfig::default();
        config.catalog.truncate(1);
        config.release.bootstrap_extra = 0;
        config.release.daily_chance = 0.0;
        let mut market = CoinMarket::with_curve(config, reference_curve(), 7).unwrap();
        market.start(0, &mut ());
        market.state.registry.collapse("RimCoin");

        let report = market.on_day_elapsed(1, &mut ()).unwrap();

        assert!((report.undistributed - report.curve_delta).abs() < f64::EPSILON);
        assert!(report.conservation.balanced);
        assert_eq!(report.released_count, 0);
    }

    #[test]
    fn test_on_tick_runs_due_day_once() {
        let mut market = started(8);
        assert!(market.on_tick(60_000 + 100, &mut ()).is_none());
        let report = market.on_tick(60_000 + 12_500, &mut ()).unwrap();
        assert_eq!(report.day, 1);
        assert!(market.on_tick(60_000 + 30_000, &mut ()).is_none());
    }

    #[test]
    fn test_unstarted_market_starts_before_first_day() {
        let mut market =
            CoinMarket::with_curve(MarketConfig::default(), reference_curve(), 9).unwrap();
        let report = market.on_day_elapsed(4, &mut ()).unwrap();
        assert_eq!(report.day, 4);
        assert!(market.registry().released_count() >= 3);
    }

    #[test]
    fn test_entrant_on_negative_total_day_stays_solvent() {
        let mut config = MarketConfig::default();
        config.release.daily_chance = 0.0;
        config.shock.chance = 0.0;
        let mut market = CoinMarket::with_curve(config, reference_curve(), 10).unwrap();
        market.start(0, &mut ());
        market.state.curve.minimum = -8_500_000.0;
        let target = market.registry().unreleased_ids()[0].clone();
        assert!(market.queue_release(target.as_str()));

        let report = market.on_day_elapsed(1, &mut ()).unwrap();

        assert!(report.conservation.balanced);
        let coin = market.coin(target.as_str()).unwrap();
        assert!(coin.is_released);
        assert!(coin.market_cap >= 0.0);
        assert!(coin.price_history.iter().all(|p| *p >= 0.0));
    }

    #[test]
    fn test_with_curve_rejects_zero_volatility() {
        let mut curve = reference_curve();
        curve.volatility = 0.0;
        assert!(matches!(
            CoinMarket::with_curve(MarketConfig::default(), curve, 11),
            Err(MarketError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = MarketConfig::default();
        config.catalog.clear();
        assert!(matches!(
            CoinMarket::with_config(config, 1),
            Err(MarketError::InvalidConfig(_))
        ));
    }
}
