//! Cash ledger, holdings, pending order book and transaction log.
//!
//! The portfolio is the single source of truth for money and share mutations.
//! Every trade either applies fully (cash and holdings together, plus a
//! transaction record) or not at all; a rejected trade leaves no trace.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use super::error::PapertradeError;
use super::order::{
    ExecutionOutcome, Order, OrderKind, OrderStatus, RejectReason, Side, Transaction,
};

/// Result of placing an order.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderPlacement {
    /// Market order executed in the same call.
    Filled(Transaction),
    /// Market order bounced; nothing was mutated and nothing was queued.
    Rejected(RejectReason),
    /// Limit order queued pending, identified by its order id.
    Queued(u64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub cash: f64,
    pub holdings: HashMap<String, u64>,
    pub transactions: Vec<Transaction>,
    /// Limit-order book. Filled limit orders stay here in their terminal
    /// state; market orders never enter (the transaction log records them).
    pub orders: Vec<Order>,
    next_order_id: u64,
}

impl Portfolio {
    pub fn new(initial_cash: f64) -> Self {
        Portfolio {
            cash: initial_cash,
            holdings: HashMap::new(),
            transactions: Vec::new(),
            orders: Vec::new(),
            next_order_id: 1,
        }
    }

    /// Rebuild from persisted state. Order ids are not persisted; fresh ids
    /// are assigned in queue order.
    pub fn from_parts(
        cash: f64,
        holdings: HashMap<String, u64>,
        transactions: Vec<Transaction>,
        mut orders: Vec<Order>,
    ) -> Self {
        let mut next_order_id = 1;
        for order in &mut orders {
            order.id = next_order_id;
            next_order_id += 1;
        }
        Portfolio {
            cash,
            holdings,
            transactions,
            orders,
            next_order_id,
        }
    }

    /// Validate and place an order. Market orders execute immediately; limit
    /// orders queue pending. Non-positive shares or price never enter the
    /// book.
    pub fn place_order(
        &mut self,
        side: Side,
        symbol: &str,
        shares: u64,
        price: f64,
        kind: OrderKind,
        now: DateTime<Utc>,
    ) -> Result<OrderPlacement, PapertradeError> {
        if shares == 0 {
            return Err(PapertradeError::InvalidOrder {
                reason: "shares must be positive".into(),
            });
        }
        if !(price > 0.0) {
            return Err(PapertradeError::InvalidOrder {
                reason: "price must be positive".into(),
            });
        }

        match kind {
            OrderKind::Market => {
                let outcome = self.execute(side, symbol, shares, price, OrderKind::Market, now);
                Ok(match outcome {
                    ExecutionOutcome::Executed(tx) => OrderPlacement::Filled(tx),
                    ExecutionOutcome::Rejected(reason) => OrderPlacement::Rejected(reason),
                })
            }
            OrderKind::Limit => {
                let id = self.next_order_id;
                self.next_order_id += 1;
                self.orders.push(Order {
                    id,
                    side,
                    symbol: symbol.to_string(),
                    shares,
                    price,
                    kind: OrderKind::Limit,
                    time: now,
                    filled: 0,
                    status: OrderStatus::Pending,
                });
                Ok(OrderPlacement::Queued(id))
            }
        }
    }

    /// Execute a trade at `price`. The only path that moves cash or shares.
    fn execute(
        &mut self,
        side: Side,
        symbol: &str,
        shares: u64,
        price: f64,
        order_kind: OrderKind,
        now: DateTime<Utc>,
    ) -> ExecutionOutcome {
        let total = shares as f64 * price;
        match side {
            Side::Buy => {
                if total > self.cash {
                    return ExecutionOutcome::Rejected(RejectReason::InsufficientFunds {
                        required: total,
                        available: self.cash,
                    });
                }
                self.cash -= total;
                *self.holdings.entry(symbol.to_string()).or_insert(0) += shares;
            }
            Side::Sell => {
                let held = self.holdings.get(symbol).copied().unwrap_or(0);
                if held < shares {
                    return ExecutionOutcome::Rejected(RejectReason::InsufficientShares {
                        requested: shares,
                        held,
                    });
                }
                self.cash += total;
                let remaining = held - shares;
                if remaining == 0 {
                    self.holdings.remove(symbol);
                } else {
                    self.holdings.insert(symbol.to_string(), remaining);
                }
            }
        }

        let tx = Transaction {
            side,
            symbol: symbol.to_string(),
            shares,
            price,
            total,
            time: now,
            order_kind,
        };
        self.transactions.push(tx.clone());
        ExecutionOutcome::Executed(tx)
    }

    /// Evaluate every pending limit order against the price snapshot. A
    /// triggered order fills at its stored reference price, not the live tick
    /// price. Fills rejected for insufficient resources stay pending. Returns
    /// the transactions for this tick's fills.
    pub fn check_limit_orders(
        &mut self,
        prices: &HashMap<String, f64>,
        now: DateTime<Utc>,
    ) -> Vec<Transaction> {
        let mut fills = Vec::new();
        for i in 0..self.orders.len() {
            let order = &self.orders[i];
            if !order.is_pending() || order.kind != OrderKind::Limit {
                continue;
            }
            let Some(&current) = prices.get(&order.symbol) else {
                continue;
            };
            if !order.limit_triggered(current) {
                continue;
            }

            let (side, symbol, shares, price) =
                (order.side, order.symbol.clone(), order.shares, order.price);
            if let ExecutionOutcome::Executed(tx) =
                self.execute(side, &symbol, shares, price, OrderKind::Limit, now)
            {
                let order = &mut self.orders[i];
                order.status = OrderStatus::Filled;
                order.filled = shares;
                fills.push(tx);
            }
        }
        fills
    }

    /// Cancel a pending order, removing it from the book. Cancelling a filled
    /// order (or an unknown id) is an explicit failure.
    pub fn cancel_order(&mut self, id: u64) -> Result<Order, PapertradeError> {
        let index = self
            .orders
            .iter()
            .position(|o| o.id == id)
            .ok_or(PapertradeError::UnknownOrder { id })?;
        if !self.orders[index].is_pending() {
            return Err(PapertradeError::OrderNotPending { id });
        }
        let mut order = self.orders.remove(index);
        order.status = OrderStatus::Cancelled;
        Ok(order)
    }

    pub fn pending_orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter().filter(|o| o.is_pending())
    }

    pub fn has_pending_orders(&self) -> bool {
        self.orders.iter().any(|o| o.is_pending())
    }

    /// Cash plus holdings marked at the given prices. Symbols with no quote
    /// contribute nothing.
    pub fn portfolio_value(&self, prices: &HashMap<String, f64>) -> f64 {
        let stock_value: f64 = self
            .holdings
            .iter()
            .map(|(symbol, &shares)| shares as f64 * prices.get(symbol).copied().unwrap_or(0.0))
            .sum();
        self.cash + stock_value
    }

    /// Lifetime average price across all buys of `symbol`; 0.0 with no buys.
    /// Not adjusted for intervening sells.
    pub fn average_buy_price(&self, symbol: &str) -> f64 {
        let (total_shares, total_cost) = self
            .transactions
            .iter()
            .filter(|t| t.side == Side::Buy && t.symbol == symbol)
            .fold((0u64, 0.0f64), |(shares, cost), t| {
                (shares + t.shares, cost + t.total)
            });
        if total_shares > 0 {
            total_cost / total_shares as f64
        } else {
            0.0
        }
    }
}
