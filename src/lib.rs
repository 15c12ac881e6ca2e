//! papertrade — a simulated trading venue.
//!
//! Prices for a configurable universe of symbols follow a volatility-driven
//! random walk, aggregated into daily OHLC bars with rolling indicators
//! (MA20, MA50, RSI14) recomputed as bars change. A paper portfolio executes
//! market orders immediately and queues limit orders against future prices,
//! with the whole venue state persisting to JSON between sessions.
//!
//! The crate follows a hexagonal layout: `domain` holds the simulation and
//! ledger logic, `ports` the trait seams, and `adapters` the file-backed
//! implementations.

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
