// Scenario Definitions: market soak runs over named configurations
// Scenario logic lives in config builders and setup/event closures; the engine is untouched

use coin_economy::{CoinMarket, CurveParameters, Day, MarketConfig};

// ─── Scenario Configuration ─────────────────────────────────────────────────

pub struct Scenario {
    pub name: &'static str,
    pub label: &'static str,
    pub category: &'static str,
    pub days: Day,
    pub config: fn() -> MarketConfig,
    /// Fixed curve constants; drawn from the seed when `None`.
    pub curve: Option<CurveParameters>,
    pub criteria: PassCriteria,
    /// Pre-run setup, after the market is started.
    pub setup: Option<Box<dyn Fn(&mut CoinMarket) + Send + Sync>>,
    /// Called before each day is processed.
    pub mid_event: Option<Box<dyn Fn(&mut CoinMarket, Day) + Send + Sync>>,
}

pub struct PassCriteria {
    /// Largest per-day conservation error, relative to the day's total cap.
    pub max_normalized_conservation: f64,
    pub require_non_negative: bool,
    /// Minimum number of daily-draw entries over the run.
    pub min_entries: Option<u32>,
}

impl Default for PassCriteria {
    fn default() -> Self {
        Self {
            max_normalized_conservation: 1e-9,
            require_non_negative: true,
            min_entries: None,
        }
    }
}

// ─── Config Builders ────────────────────────────────────────────────────────

fn default_config() -> MarketConfig {
    MarketConfig::default()
}

fn release_rush_config() -> MarketConfig {
    let mut config = MarketConfig::default();
    config.release.daily_chance = 0.5;
    config
}

fn shock_storm_config() -> MarketConfig {
    let mut config = MarketConfig::default();
    config.shock.chance = 0.9;
    config.shock.fraction = (0.3, 0.9);
    config
}

fn no_random_release_config() -> MarketConfig {
    let mut config = MarketConfig::default();
    config.release.daily_chance = 0.0;
    config
}

/// Short volatility period with a high frequency term: deep, fast swings.
fn deep_contraction_curve() -> CurveParameters {
    CurveParameters {
        base: 4_900_000.0,
        offset: 0.0,
        volatility: 10.0,
        frequency: 9.0,
        growth: 1000.0,
        minimum: 20_000.0,
    }
}

// ─── Scenarios ──────────────────────────────────────────────────────────────

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "BASELINE_YEAR",
            label: "Baseline: one year (60 days)",
            category: "baseline",
            days: 60,
            config: default_config,
            curve: None,
            criteria: PassCriteria::default(),
            setup: None,
            mid_event: None,
        },
        Scenario {
            name: "DECADE",
            label: "Baseline: ten years (600 days)",
            category: "baseline",
            days: 600,
            config: default_config,
            curve: None,
            criteria: PassCriteria::default(),
            setup: None,
            mid_event: None,
        },
        Scenario {
            name: "RELEASE_RUSH",
            label: "Release rush (50% daily draw)",
            category: "release",
            days: 120,
            config: release_rush_config,
            curve: None,
            criteria: PassCriteria {
                min_entries: Some(7),
                ..PassCriteria::default()
            },
            setup: None,
            mid_event: None,
        },
        Scenario {
            name: "SHOCK_STORM",
            label: "Shock storm (90% shock chance)",
            category: "stress",
            days: 240,
            config: shock_storm_config,
            curve: None,
            criteria: PassCriteria::default(),
            setup: None,
            mid_event: None,
        },
        Scenario {
            name: "DEEP_CONTRACTION",
            label: "Fixed curve: deep contraction cycles",
            category: "stress",
            days: 200,
            config: default_config,
            curve: Some(deep_contraction_curve()),
            criteria: PassCriteria::default(),
            setup: None,
            mid_event: None,
        },
        Scenario {
            name: "ADMIN_LAUNCHES",
            label: "Admin queued launch every 7 days",
            category: "release",
            days: 70,
            config: no_random_release_config,
            curve: None,
            criteria: PassCriteria {
                min_entries: Some(7),
                ..PassCriteria::default()
            },
            setup: Some(Box::new(|market: &mut CoinMarket| {
                market.queue_random_release();
            })),
            mid_event: Some(Box::new(|market: &mut CoinMarket, day: Day| {
                if day % 7 == 1 && day > 1 {
                    market.queue_random_release();
                }
            })),
        },
    ]
}
