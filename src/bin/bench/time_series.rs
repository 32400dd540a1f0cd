// Per-Day JSONL Time Series Recorder
// Outputs one JSON line per market day for independent analysis

use coin_economy::{CoinMarket, Day, DayReport};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

#[derive(Debug, Serialize)]
pub struct DaySnapshot {
    pub day: Day,
    pub total_market_value: f64,
    pub total_market_cap: f64,
    pub curve_delta: f64,
    pub adjusted_delta: f64,
    pub entry: Option<String>,
    pub shocks: usize,
    pub collapsed: Vec<String>,
    pub dropped_debt: f64,
    pub undistributed: f64,
    pub released_count: usize,
    pub conservation_error: f64,
    pub consecutive_violations: u32,
    pub prices: BTreeMap<String, f64>,
}

impl DaySnapshot {
    pub fn from_report(report: &DayReport, market: &CoinMarket) -> Self {
        Self {
            day: report.day,
            total_market_value: report.total_market_value,
            total_market_cap: report.total_market_cap,
            curve_delta: report.curve_delta,
            adjusted_delta: report.adjusted_delta,
            entry: report.entry.as_ref().map(|e| e.coin.to_string()),
            shocks: report.shocks.len(),
            collapsed: report.collapsed.iter().map(|id| id.to_string()).collect(),
            dropped_debt: report.dropped_debt,
            undistributed: report.undistributed,
            released_count: report.released_count,
            conservation_error: report.conservation.error,
            consecutive_violations: report.conservation.consecutive_violations,
            prices: market
                .registry()
                .released()
                .map(|c| (c.id.to_string(), c.current_price()))
                .collect(),
        }
    }
}

/// Time series recorder that accumulates snapshots and writes JSONL
pub struct TimeSeriesRecorder {
    snapshots: Vec<DaySnapshot>,
}

impl TimeSeriesRecorder {
    pub fn new() -> Self {
        Self { snapshots: Vec::new() }
    }

    pub fn record(&mut self, report: &DayReport, market: &CoinMarket) {
        self.snapshots.push(DaySnapshot::from_report(report, market));
    }

    /// Write all snapshots to a JSONL file
    pub fn write_jsonl(&self, path: &std::path::Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::File::create(path)?;
        for snapshot in &self.snapshots {
            let line = serde_json::to_string(snapshot)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
            writeln!(file, "{}", line)?;
        }
        Ok(())
    }
}
