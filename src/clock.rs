// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Coin Economy Engine - Day Clock

use serde::{Deserialize, Serialize};

use crate::types::Day;

/// Maps the host's absolute tick counter onto market days.
///
/// The market updates once per day, the first time the counter passes
/// `update_tick_of_day` within a day that has not been processed yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DayClock {
    pub ticks_per_day: u64,
    pub update_tick_of_day: u64,
}

impl Default for DayClock {
    fn default() -> Self {
        Self { ticks_per_day: 60_000, update_tick_of_day: 12_500 }
    }
}

impl DayClock {
    pub fn day_of(&self, ticks_abs: u64) -> Day {
        Day::try_from(ticks_abs / self.ticks_per_day.max(1)).unwrap_or(Day::MAX)
    }

    pub fn tick_of_day(&self, ticks_abs: u64) -> u64 {
        ticks_abs % self.ticks_per_day.max(1)
    }

    /// The day to process at `ticks_abs`, if one is due.
    pub fn due_day(&self, ticks_abs: u64, last_updated_day: Option<Day>) -> Option<Day> {
        let day = self.day_of(ticks_abs);
        if day <= 0 || self.tick_of_day(ticks_abs) < self.update_tick_of_day {
            return None;
        }
        match last_updated_day {
            Some(last) if day <= last => None,
            _ => Some(day),
        }
    }
}
