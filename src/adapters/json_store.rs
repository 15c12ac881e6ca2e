//! JSON persistence for portfolio and market state.
//!
//! Wire schema (stable, shared with other tooling):
//!
//! ```text
//! portfolio file: { "cash", "holdings", "transaction_history": [
//!     { "type", "symbol", "shares", "price", "total", "time", "order_type" }],
//!   "pending_orders": [
//!     { "type", "symbol", "shares", "price", "kind", "time", "filled", "status" }] }
//! market file: { "<symbol>": { "name", "volatility", "price_history",
//!     "volume_history", "ohlc_data": [[day, open, high, low, close, volume]] } }
//! ```
//!
//! Times are RFC 3339. A missing file loads as `None` (caller starts fresh);
//! a malformed file is a fatal [`PapertradeError::CorruptState`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use crate::domain::error::PapertradeError;
use crate::domain::market::Market;
use crate::domain::ohlcv::OhlcBar;
use crate::domain::order::{Order, OrderKind, OrderStatus, Side, Transaction};
use crate::domain::portfolio::Portfolio;
use crate::domain::stock::Stock;

#[derive(Debug, Serialize, Deserialize)]
struct StoredTransaction {
    #[serde(rename = "type")]
    side: Side,
    symbol: String,
    shares: u64,
    price: f64,
    total: f64,
    time: DateTime<Utc>,
    order_type: OrderKind,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredOrder {
    #[serde(rename = "type")]
    side: Side,
    symbol: String,
    shares: u64,
    price: f64,
    kind: OrderKind,
    time: DateTime<Utc>,
    filled: u64,
    status: OrderStatus,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredPortfolio {
    cash: f64,
    holdings: HashMap<String, u64>,
    transaction_history: Vec<StoredTransaction>,
    #[serde(default)]
    pending_orders: Vec<StoredOrder>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredStock {
    name: String,
    volatility: f64,
    price_history: Vec<f64>,
    volume_history: Vec<f64>,
    ohlc_data: Vec<(i64, f64, f64, f64, f64, f64)>,
}

impl From<&Transaction> for StoredTransaction {
    fn from(t: &Transaction) -> Self {
        StoredTransaction {
            side: t.side,
            symbol: t.symbol.clone(),
            shares: t.shares,
            price: t.price,
            total: t.total,
            time: t.time,
            order_type: t.order_kind,
        }
    }
}

impl From<StoredTransaction> for Transaction {
    fn from(t: StoredTransaction) -> Self {
        Transaction {
            side: t.side,
            symbol: t.symbol,
            shares: t.shares,
            price: t.price,
            total: t.total,
            time: t.time,
            order_kind: t.order_type,
        }
    }
}

impl From<&Order> for StoredOrder {
    fn from(o: &Order) -> Self {
        StoredOrder {
            side: o.side,
            symbol: o.symbol.clone(),
            shares: o.shares,
            price: o.price,
            kind: o.kind,
            time: o.time,
            filled: o.filled,
            status: o.status,
        }
    }
}

impl From<StoredOrder> for Order {
    fn from(o: StoredOrder) -> Self {
        Order {
            // Ids are assigned by Portfolio::from_parts on restore.
            id: 0,
            side: o.side,
            symbol: o.symbol,
            shares: o.shares,
            price: o.price,
            kind: o.kind,
            time: o.time,
            filled: o.filled,
            status: o.status,
        }
    }
}

fn corrupt(path: &Path, reason: impl ToString) -> PapertradeError {
    PapertradeError::CorruptState {
        file: path.display().to_string(),
        reason: reason.to_string(),
    }
}

pub fn save_portfolio(portfolio: &Portfolio, path: &Path) -> Result<(), PapertradeError> {
    let stored = StoredPortfolio {
        cash: portfolio.cash,
        holdings: portfolio.holdings.clone(),
        transaction_history: portfolio.transactions.iter().map(Into::into).collect(),
        pending_orders: portfolio.orders.iter().map(Into::into).collect(),
    };
    let json = serde_json::to_string(&stored).map_err(|e| corrupt(path, e))?;
    fs::write(path, json)?;
    Ok(())
}

/// `Ok(None)` when the file does not exist; `CorruptState` when it exists but
/// cannot be parsed.
pub fn load_portfolio(path: &Path) -> Result<Option<Portfolio>, PapertradeError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let stored: StoredPortfolio =
        serde_json::from_str(&content).map_err(|e| corrupt(path, e))?;

    let portfolio = Portfolio::from_parts(
        stored.cash,
        stored.holdings,
        stored.transaction_history.into_iter().map(Into::into).collect(),
        stored.pending_orders.into_iter().map(Into::into).collect(),
    );
    Ok(Some(portfolio))
}

pub fn save_market(market: &Market, path: &Path) -> Result<(), PapertradeError> {
    // BTreeMap keeps symbol order stable across saves.
    let stored: BTreeMap<String, StoredStock> = market
        .stocks()
        .map(|stock| {
            (
                stock.symbol.clone(),
                StoredStock {
                    name: stock.name.clone(),
                    volatility: stock.volatility,
                    price_history: stock.price_history.clone(),
                    volume_history: stock.volume_history.clone(),
                    ohlc_data: stock
                        .bars
                        .iter()
                        .map(|b| (b.day, b.open, b.high, b.low, b.close, b.volume))
                        .collect(),
                },
            )
        })
        .collect();
    let json = serde_json::to_string(&stored).map_err(|e| corrupt(path, e))?;
    fs::write(path, json)?;
    Ok(())
}

/// Load persisted stocks. Indicators are recomputed, not stored.
pub fn load_stocks(
    path: &Path,
    now: DateTime<Utc>,
) -> Result<Option<Vec<Stock>>, PapertradeError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let stored: BTreeMap<String, StoredStock> =
        serde_json::from_str(&content).map_err(|e| corrupt(path, e))?;

    let stocks = stored
        .into_iter()
        .map(|(symbol, s)| {
            let bars = s
                .ohlc_data
                .into_iter()
                .map(|(day, open, high, low, close, volume)| OhlcBar {
                    day,
                    open,
                    high,
                    low,
                    close,
                    volume,
                })
                .collect();
            Stock::from_parts(
                symbol,
                s.name,
                s.volatility,
                s.price_history,
                s.volume_history,
                bars,
                now,
            )
        })
        .collect();
    Ok(Some(stocks))
}
