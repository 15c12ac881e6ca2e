//! Daily OHLC bar representation.
//!
//! Bars are keyed by day ordinal (days since 0001-01-01, matching
//! `chrono::Datelike::num_days_from_ce`) rather than a calendar date so a bar
//! sequence can be compared and persisted as plain numbers.

use chrono::{Datelike, NaiveDate};

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcBar {
    pub day: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl OhlcBar {
    /// Open a fresh bar from the first trade of a new day.
    pub fn opening(day: i64, price: f64, volume: f64) -> Self {
        OhlcBar {
            day,
            open: price,
            high: price,
            low: price,
            close: price,
            volume,
        }
    }

    /// Fold one simulated tick into the bar: high/low widen as needed, close
    /// tracks the latest price and volume accumulates.
    pub fn apply_tick(&mut self, price: f64, volume: f64) {
        self.high = self.high.max(price);
        self.low = self.low.min(price);
        self.close = price;
        self.volume += volume;
    }

    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::from_num_days_from_ce_opt(self.day as i32)
    }
}

/// Day ordinal for a calendar date.
pub fn day_ordinal(date: NaiveDate) -> i64 {
    date.num_days_from_ce() as i64
}
