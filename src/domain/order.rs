//! Order and transaction entities.
//!
//! Tagged structs with enumerated side/kind/status fields; the string forms
//! ("buy", "market", "pending", ...) only appear at the serialization
//! boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderKind {
    Market,
    Limit,
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderKind::Market => write!(f, "market"),
            OrderKind::Limit => write!(f, "limit"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Filled,
    Cancelled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Filled => write!(f, "filled"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// An order in the book. Filled and Cancelled are terminal states; only
/// Pending orders are ever re-evaluated against prices.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: u64,
    pub side: Side,
    pub symbol: String,
    pub shares: u64,
    /// Reference price: the execution price for market orders and the trigger
    /// *and* fill price for limit orders.
    pub price: f64,
    pub kind: OrderKind,
    pub time: DateTime<Utc>,
    pub filled: u64,
    pub status: OrderStatus,
}

impl Order {
    pub fn is_pending(&self) -> bool {
        self.status == OrderStatus::Pending
    }

    /// Whether the current market price crosses this limit order's trigger:
    /// buys trigger at or below the reference price, sells at or above it.
    pub fn limit_triggered(&self, current_price: f64) -> bool {
        match self.side {
            Side::Buy => current_price <= self.price,
            Side::Sell => current_price >= self.price,
        }
    }
}

/// A completed trade. Append-only; never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub side: Side,
    pub symbol: String,
    pub shares: u64,
    pub price: f64,
    pub total: f64,
    pub time: DateTime<Utc>,
    pub order_kind: OrderKind,
}

/// Why a trade was rejected. A rejection mutates nothing and is recoverable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RejectReason {
    InsufficientFunds { required: f64, available: f64 },
    InsufficientShares { requested: u64, held: u64 },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::InsufficientFunds {
                required,
                available,
            } => write!(
                f,
                "insufficient funds: need {required:.2}, have {available:.2}"
            ),
            RejectReason::InsufficientShares { requested, held } => {
                write!(f, "insufficient shares: need {requested}, hold {held}")
            }
        }
    }
}

/// Outcome of an execution attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    Executed(Transaction),
    Rejected(RejectReason),
}
