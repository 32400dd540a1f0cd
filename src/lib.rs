// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Coin Economy Engine

pub mod types;
pub mod error;
pub mod config;
pub mod clock;
pub mod curve;
pub mod partition;
pub mod registry;
pub mod release;
pub mod shock;
pub mod collapse;
pub mod conservation;
pub mod observer;
pub mod engine;
pub mod trading;
pub mod persistence;

pub use types::*;
pub use config::MarketConfig;
pub use curve::CurveParameters;
pub use engine::{CoinMarket, EngineState};
pub use error::MarketError;
pub use observer::{EventLog, MarketObserver};
pub use persistence::MarketSnapshot;

use serde::Serialize;
use wasm_bindgen::prelude::*;

// ─── Console logging ─────────────────────────────────────────────────────────

#[cfg(target_arch = "wasm32")]
mod console {
    use log::{LevelFilter, Log, Metadata, Record};
    use wasm_bindgen::prelude::*;

    #[wasm_bindgen]
    extern "C" {
        #[wasm_bindgen(js_namespace = console, js_name = log)]
        fn console_log(s: &str);
    }

    struct ConsoleLogger;

    impl Log for ConsoleLogger {
        fn enabled(&self, metadata: &Metadata) -> bool {
            metadata.level() <= log::max_level()
        }

        fn log(&self, record: &Record) {
            if self.enabled(record.metadata()) {
                console_log(&format!("[{}] {}", record.level(), record.args()));
            }
        }

        fn flush(&self) {}
    }

    static LOGGER: ConsoleLogger = ConsoleLogger;

    /// Install once; later calls are no-ops.
    pub fn init() {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(LevelFilter::Info);
        }
    }
}

fn init_host() {
    #[cfg(target_arch = "wasm32")]
    {
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));
        console::init();
    }
}

fn js_error(err: MarketError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// What a day update hands back to the host.
#[derive(Serialize)]
struct DayOutput {
    report: Option<DayReport>,
    events: Vec<MarketEvent>,
}

// ─── WASM Interface ──────────────────────────────────────────────────────────

#[wasm_bindgen]
impl CoinMarket {
    /// Default market, started at `current_day`.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64, current_day: i64) -> Self {
        init_host();
        let mut market = CoinMarket::build(MarketConfig::default(), seed);
        market.start(current_day, &mut ());
        market
    }

    #[wasm_bindgen(js_name = withConfig)]
    pub fn js_with_config(config_json: &str, seed: u64, current_day: i64) -> Result<CoinMarket, JsValue> {
        init_host();
        let config = MarketConfig::from_json(config_json).map_err(js_error)?;
        let mut market = CoinMarket::with_config(config, seed).map_err(js_error)?;
        market.start(current_day, &mut ());
        Ok(market)
    }

    #[wasm_bindgen(js_name = onDayElapsed)]
    pub fn js_on_day_elapsed(&mut self, day: i64) -> JsValue {
        let mut events = EventLog::new();
        let report = self.on_day_elapsed(day, &mut events);
        let output = DayOutput { report, events: events.take() };
        serde_wasm_bindgen::to_value(&output).unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen(js_name = onTick)]
    pub fn js_on_tick(&mut self, ticks_abs: u64) -> JsValue {
        let mut events = EventLog::new();
        let report = self.on_tick(ticks_abs, &mut events);
        let output = DayOutput { report, events: events.take() };
        serde_wasm_bindgen::to_value(&output).unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen(js_name = queueRelease)]
    pub fn js_queue_release(&mut self, coin_id: &str) -> bool {
        self.queue_release(coin_id)
    }

    #[wasm_bindgen(js_name = queueRandomRelease)]
    pub fn js_queue_random_release(&mut self) -> Option<String> {
        self.queue_random_release().map(|id| id.0)
    }

    #[wasm_bindgen(js_name = currentPrice)]
    pub fn js_current_price(&self, coin_id: &str) -> f64 {
        self.current_price(coin_id)
    }

    #[wasm_bindgen(js_name = marketCap)]
    pub fn js_market_cap(&self, coin_id: &str) -> f64 {
        self.market_cap(coin_id)
    }

    #[wasm_bindgen(js_name = isReleased)]
    pub fn js_is_released(&self, coin_id: &str) -> bool {
        self.is_released(coin_id)
    }

    #[wasm_bindgen(js_name = getPrices)]
    pub fn js_get_prices(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.price_board()).unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen(js_name = getCoin)]
    pub fn js_get_coin(&self, coin_id: &str) -> JsValue {
        match self.coin(coin_id) {
            Some(coin) => serde_wasm_bindgen::to_value(coin).unwrap_or(JsValue::NULL),
            None => JsValue::NULL,
        }
    }

    #[wasm_bindgen(js_name = recordPurchase)]
    pub fn js_record_purchase(&mut self, coin_id: &str, units: u32, unit_price: f64) -> f64 {
        self.record_purchase(coin_id, units, unit_price)
    }

    #[wasm_bindgen(js_name = recordSale)]
    pub fn js_record_sale(
        &mut self,
        coin_id: &str,
        units: u32,
        unit_price: f64,
        units_still_held: u32,
    ) -> f64 {
        self.record_sale(coin_id, units, unit_price, units_still_held)
    }

    #[wasm_bindgen(js_name = save)]
    pub fn js_save(&self) -> Result<String, JsValue> {
        self.save_json().map_err(js_error)
    }

    /// Restore a saved market under the default config and start it.
    #[wasm_bindgen(js_name = load)]
    pub fn js_load(json: &str, seed: u64, current_day: i64) -> Result<CoinMarket, JsValue> {
        init_host();
        let mut market =
            CoinMarket::load_json(MarketConfig::default(), json, seed).map_err(js_error)?;
        market.start(current_day, &mut ());
        Ok(market)
    }
}
