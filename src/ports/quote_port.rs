//! Market-data collaborator port trait.
//!
//! Both operations degrade to `None` on any failure (missing data, timeout,
//! malformed source); the simulation must never block on or surface a quote
//! error. Adapters own their own timeout bounds.

use crate::domain::ohlcv::OhlcBar;

pub trait QuotePort {
    /// Latest real price for a symbol, if the source can answer.
    fn current_price(&self, symbol: &str) -> Option<f64>;

    /// Daily OHLC history for seeding a symbol, oldest bar first.
    fn daily_history(&self, symbol: &str) -> Option<Vec<OhlcBar>>;
}
