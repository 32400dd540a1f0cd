// Monte Carlo Infrastructure: N runs per scenario with statistical aggregation
// Each scenario runs N=30 times with seeds base..base+N, computing mean ± 95% CI

use coin_economy::*;

use crate::metrics::MarketTracker;
use crate::report::*;
use crate::scenarios::Scenario;
use crate::time_series::TimeSeriesRecorder;

use std::time::Instant;

/// Run a single scenario iteration with a specific seed.
pub fn run_single(
    scenario: &Scenario,
    seed: u64,
    time_series_dir: Option<&std::path::Path>,
) -> Result<BenchResult, MarketError> {
    let start = Instant::now();
    let config = (scenario.config)();
    let mut market = match scenario.curve {
        Some(curve) => CoinMarket::with_curve(config, curve, seed)?,
        None => CoinMarket::with_config(config, seed)?,
    };

    let mut tracker = MarketTracker::new();
    let mut time_series = time_series_dir.map(|_| TimeSeriesRecorder::new());

    market.start(0, &mut tracker);

    // Pre-scenario setup (queue launches, adjust state, etc.)
    if let Some(setup) = &scenario.setup {
        setup(&mut market);
    }

    for day in 1..=scenario.days {
        if let Some(event) = &scenario.mid_event {
            event(&mut market, day);
        }

        let Some(report) = market.on_day_elapsed(day, &mut tracker) else {
            continue;
        };
        tracker.record_day(&report, &market);
        if let Some(ts) = time_series.as_mut() {
            ts.record(&report, &market);
        }
    }

    if let (Some(ts), Some(dir)) = (&time_series, time_series_dir) {
        let path = dir.join(format!("seed-{}.jsonl", seed));
        if let Err(e) = ts.write_jsonl(&path) {
            eprintln!("  Warning: failed to write time series: {}", e);
        }
    }

    let elapsed = start.elapsed();
    let elapsed_secs = elapsed.as_secs_f64().max(0.001);
    let final_day = market.last_updated_day().unwrap_or(0);

    // Evaluate pass/fail
    let criteria = &scenario.criteria;
    let mut pass = tracker.max_normalized_error <= criteria.max_normalized_conservation
        && tracker.over_catalog_days == 0;
    if criteria.require_non_negative && tracker.negative_caps > 0 {
        pass = false;
    }
    if let Some(min_entries) = criteria.min_entries {
        if tracker.entries < min_entries {
            pass = false;
        }
    }

    Ok(BenchResult {
        scenario: scenario.label.to_string(),
        name: scenario.name.to_string(),
        category: scenario.category.to_string(),
        seed,
        pass,
        days: tracker.days,
        bootstrap_releases: tracker.bootstrap_releases,
        entries: tracker.entries,
        shocks: tracker.shocks,
        crashes: tracker.crashes,
        collapses: tracker.collapses,
        collapse_passes_max: tracker.collapse_passes_max,
        dropped_debt: tracker.dropped_debt,
        empty_days: tracker.empty_days,
        negative_caps: tracker.negative_caps,
        min_cap: if tracker.min_cap.is_finite() { tracker.min_cap } else { 0.0 },
        conservation_error: tracker.max_abs_error,
        normalized_conservation_error: tracker.max_normalized_error,
        breaker_tripped: tracker.breaker_tripped,
        peak_released: tracker.peak_released,
        over_catalog_days: tracker.over_catalog_days,
        final_released: market.registry().released_count(),
        final_market_cap: market.registry().total_market_cap(),
        final_market_value: market.total_market_value(final_day),
        elapsed_ms: elapsed.as_millis(),
        days_per_sec: tracker.days as f64 / elapsed_secs,
    })
}

/// Run Monte Carlo: N runs of a scenario, aggregate stats.
pub fn run_monte_carlo(
    scenario: &Scenario,
    n_runs: usize,
    base_seed: u64,
    time_series_base: Option<&std::path::Path>,
) -> MonteCarloReport {
    let ts_dir = time_series_base.map(|base| base.join(scenario.name.to_lowercase()));

    let mut results = Vec::with_capacity(n_runs);
    let mut errored_runs = 0;
    for i in 0..n_runs {
        let seed = base_seed + i as u64;
        match run_single(scenario, seed, ts_dir.as_deref()) {
            Ok(result) => results.push(result),
            Err(e) => {
                eprintln!("  {} seed {}: {}", scenario.name, seed, e);
                errored_runs += 1;
            }
        }
    }

    aggregate(scenario, n_runs, errored_runs, results)
}

/// Aggregate individual runs into a MonteCarloReport.
fn aggregate(
    scenario: &Scenario,
    n_runs: usize,
    errored_runs: usize,
    results: Vec<BenchResult>,
) -> MonteCarloReport {
    let passed = results.iter().filter(|r| r.pass).count();
    let pass_rate = if n_runs > 0 { passed as f64 / n_runs as f64 } else { 0.0 };

    let stat = |f: fn(&BenchResult) -> f64| {
        Stats::from_samples(&results.iter().map(f).collect::<Vec<_>>())
    };

    MonteCarloReport {
        scenario_name: scenario.name.to_string(),
        label: scenario.label.to_string(),
        category: scenario.category.to_string(),
        n_runs,
        errored_runs,
        pass_rate,
        normalized_conservation_error: stat(|r| r.normalized_conservation_error),
        collapses: stat(|r| r.collapses as f64),
        entries: stat(|r| r.entries as f64),
        shocks: stat(|r| r.shocks as f64),
        dropped_debt: stat(|r| r.dropped_debt),
        final_released: stat(|r| r.final_released as f64),
        final_market_cap: stat(|r| r.final_market_cap),
        elapsed_ms: stat(|r| r.elapsed_ms as f64),
        days_per_sec: stat(|r| r.days_per_sec),
        individual_runs: results,
    }
}
