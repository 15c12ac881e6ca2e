#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use papertrade::domain::market::{Market, MarketConfig};
pub use papertrade::domain::ohlcv::{day_ordinal, OhlcBar};
use papertrade::domain::universe::SymbolDef;
use papertrade::ports::quote_port::QuotePort;
use std::collections::HashMap;

pub struct MockQuotePort {
    pub prices: HashMap<String, f64>,
    pub histories: HashMap<String, Vec<OhlcBar>>,
}

impl MockQuotePort {
    pub fn new() -> Self {
        Self {
            prices: HashMap::new(),
            histories: HashMap::new(),
        }
    }

    pub fn with_price(mut self, symbol: &str, price: f64) -> Self {
        self.prices.insert(symbol.to_string(), price);
        self
    }

    pub fn with_history(mut self, symbol: &str, bars: Vec<OhlcBar>) -> Self {
        self.histories.insert(symbol.to_string(), bars);
        self
    }
}

impl QuotePort for MockQuotePort {
    fn current_price(&self, symbol: &str) -> Option<f64> {
        self.prices.get(symbol).copied()
    }

    fn daily_history(&self, symbol: &str) -> Option<Vec<OhlcBar>> {
        self.histories.get(symbol).cloned()
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn time(year: i32, month: u32, day: u32, h: u32, m: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, h, m, s).unwrap()
}

pub fn make_bar(day: NaiveDate, close: f64) -> OhlcBar {
    OhlcBar {
        day: day_ordinal(day),
        open: close,
        high: close + 1.0,
        low: (close - 1.0).max(0.01),
        close,
        volume: 1_000_000.0,
    }
}

/// `days` consecutive daily bars ending the day before `end`, every close equal
/// to `close`.
pub fn flat_history(end: NaiveDate, days: usize, close: f64) -> Vec<OhlcBar> {
    let end_ordinal = day_ordinal(end);
    (0..days)
        .map(|i| OhlcBar {
            day: end_ordinal - days as i64 + i as i64,
            open: close,
            high: close,
            low: close,
            close,
            volume: 1_000_000.0,
        })
        .collect()
}

/// Bars climbing by `step` per day, ending the day before `end`.
pub fn rising_history(end: NaiveDate, days: usize, start_close: f64, step: f64) -> Vec<OhlcBar> {
    let end_ordinal = day_ordinal(end);
    (0..days)
        .map(|i| {
            let close = start_close + step * i as f64;
            OhlcBar {
                day: end_ordinal - days as i64 + i as i64,
                open: close,
                high: close + 0.5,
                low: close - 0.5,
                close,
                volume: 1_000_000.0,
            }
        })
        .collect()
}

pub fn def(symbol: &str, volatility: f64) -> SymbolDef {
    SymbolDef {
        symbol: symbol.to_string(),
        name: format!("{symbol} Test Co."),
        volatility,
    }
}

pub fn seeded_config(seed: u64) -> MarketConfig {
    MarketConfig {
        initial_cash: 100_000.0,
        market_impact: 0.5,
        seed: Some(seed),
    }
}

/// A seeded market whose symbols all start from a flat 100.0 history, so
/// starting prices are known exactly.
pub fn flat_market(defs: &[SymbolDef], start: DateTime<Utc>, seed: u64) -> Market {
    let mut quotes = MockQuotePort::new();
    for def in defs {
        quotes
            .histories
            .insert(def.symbol.clone(), flat_history(start.date_naive(), 60, 100.0));
    }
    Market::open(defs, Some(&quotes), &seeded_config(seed), start)
}
