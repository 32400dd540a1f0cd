// Benchmark Report Types
// Structured output for independent analysis of market soak runs

use serde::Serialize;

// ─── Statistics (per-metric Monte Carlo aggregation) ────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub mean: f64,
    pub std_dev: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub min: f64,
    pub max: f64,
    pub n: usize,
}

impl Stats {
    pub fn from_samples(samples: &[f64]) -> Self {
        let n = samples.len();
        if n == 0 {
            return Self { mean: 0.0, std_dev: 0.0, ci_lower: 0.0, ci_upper: 0.0, min: 0.0, max: 0.0, n: 0 };
        }
        let mean = samples.iter().sum::<f64>() / n as f64;
        let variance = if n > 1 {
            samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };
        let std_dev = variance.sqrt();
        let stderr = std_dev / (n as f64).sqrt();
        let z = 1.96; // 95% CI
        Self {
            mean,
            std_dev,
            ci_lower: mean - z * stderr,
            ci_upper: mean + z * stderr,
            min: samples.iter().cloned().fold(f64::INFINITY, f64::min),
            max: samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            n,
        }
    }

    pub fn half_width(&self) -> f64 {
        (self.ci_upper - self.ci_lower) / 2.0
    }
}

// ─── Single-Run Result ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct BenchResult {
    pub scenario: String,
    pub name: String,
    pub category: String,
    pub seed: u64,
    pub pass: bool,
    pub days: u64,
    pub bootstrap_releases: u32,
    pub entries: u32,
    pub shocks: u32,
    pub crashes: u32,
    pub collapses: u32,
    pub collapse_passes_max: usize,
    pub dropped_debt: f64,
    pub empty_days: u32,
    pub negative_caps: u32,
    pub min_cap: f64,
    pub conservation_error: f64,
    pub normalized_conservation_error: f64,
    pub breaker_tripped: bool,
    pub peak_released: usize,
    pub over_catalog_days: u32,
    pub final_released: usize,
    pub final_market_cap: f64,
    pub final_market_value: f64,
    pub elapsed_ms: u128,
    pub days_per_sec: f64,
}

// ─── Monte Carlo Report (per-scenario aggregation) ──────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct MonteCarloReport {
    pub scenario_name: String,
    pub label: String,
    pub category: String,
    pub n_runs: usize,
    /// Runs that could not be constructed.
    pub errored_runs: usize,
    pub pass_rate: f64,
    pub normalized_conservation_error: Stats,
    pub collapses: Stats,
    pub entries: Stats,
    pub shocks: Stats,
    pub dropped_debt: Stats,
    pub final_released: Stats,
    pub final_market_cap: Stats,
    pub elapsed_ms: Stats,
    pub days_per_sec: Stats,
    pub individual_runs: Vec<BenchResult>,
}

// ─── Invariant Summary ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct InvariantSummary {
    pub non_negative_caps: bool,
    pub conservation_balanced: bool,
    pub released_within_catalog: bool,
    pub max_normalized_conservation: f64,
}

impl InvariantSummary {
    pub fn all_pass(&self) -> bool {
        self.non_negative_caps && self.conservation_balanced && self.released_within_catalog
    }
}

// ─── Top-Level Report ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct BenchReport {
    pub timestamp: String,
    pub version: &'static str,
    pub prng: &'static str,
    pub n_runs_per_scenario: usize,
    pub summary: Summary,
    pub invariants: InvariantSummary,
    pub scenarios: Vec<MonteCarloReport>,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: f64,
}
