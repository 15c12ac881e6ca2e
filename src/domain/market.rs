//! Market state and the tick driver.
//!
//! A [`Market`] owns every simulated stock, the portfolio, the simulated
//! clock and the RNG; nothing else mutates them, so the core needs no
//! locking. [`Market::tick`] is the pure-ish heart of the scheduler: callers
//! (the CLI loop, tests) decide the pacing and invoke it once per simulated
//! second.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{BTreeMap, HashMap};

use super::error::PapertradeError;
use super::indicator::IndicatorSet;
use super::ohlcv::OhlcBar;
use super::order::{OrderKind, Side, Transaction};
use super::portfolio::{OrderPlacement, Portfolio};
use super::stock::Stock;
use super::universe::SymbolDef;
use crate::ports::quote_port::QuotePort;

/// How many trailing daily bars a snapshot carries per symbol.
pub const SNAPSHOT_BAR_WINDOW: usize = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct MarketConfig {
    pub initial_cash: f64,
    /// Multiplier from traded shares to simulator volume impact.
    pub market_impact: f64,
    /// Fixed RNG seed for reproducible runs; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for MarketConfig {
    fn default() -> Self {
        MarketConfig {
            initial_cash: 100_000.0,
            market_impact: 0.5,
            seed: None,
        }
    }
}

/// Read-only view published to GUI/telemetry consumers after each tick.
#[derive(Debug, Clone)]
pub struct MarketSnapshot {
    pub time: DateTime<Utc>,
    pub symbols: Vec<SymbolSnapshot>,
    pub cash: f64,
    pub portfolio_value: f64,
    /// Limit orders filled during this tick.
    pub fills: Vec<Transaction>,
}

#[derive(Debug, Clone)]
pub struct SymbolSnapshot {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub changed: bool,
    pub bars: Vec<OhlcBar>,
    pub indicators: IndicatorSet,
}

#[derive(Debug)]
pub struct Market {
    stocks: BTreeMap<String, Stock>,
    pub portfolio: Portfolio,
    now: DateTime<Utc>,
    rng: StdRng,
    market_impact: f64,
}

impl Market {
    /// Open a market over the given universe, seeding each symbol's history
    /// from the market-data collaborator when one is supplied and it answers.
    pub fn open(
        defs: &[SymbolDef],
        history_source: Option<&dyn QuotePort>,
        config: &MarketConfig,
        start: DateTime<Utc>,
    ) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut stocks = BTreeMap::new();
        for def in defs {
            let history = history_source.and_then(|source| source.daily_history(&def.symbol));
            let stock = Stock::open(def, history, start, &mut rng);
            stocks.insert(def.symbol.clone(), stock);
        }
        Market {
            stocks,
            portfolio: Portfolio::new(config.initial_cash),
            now: start,
            rng,
            market_impact: config.market_impact,
        }
    }

    /// Reassemble a market from persisted stocks and portfolio.
    pub fn from_parts(
        stocks: Vec<Stock>,
        portfolio: Portfolio,
        config: &MarketConfig,
        start: DateTime<Utc>,
    ) -> Self {
        let stocks = stocks
            .into_iter()
            .map(|s| (s.symbol.clone(), s))
            .collect();
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Market {
            stocks,
            portfolio,
            now: start,
            rng,
            market_impact: config.market_impact,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn stock(&self, symbol: &str) -> Option<&Stock> {
        self.stocks.get(symbol)
    }

    pub fn stocks(&self) -> impl Iterator<Item = &Stock> {
        self.stocks.values()
    }

    /// Current price per symbol.
    pub fn prices(&self) -> HashMap<String, f64> {
        self.stocks
            .iter()
            .map(|(symbol, stock)| (symbol.clone(), stock.current_price()))
            .collect()
    }

    /// Advance the simulation one second:
    ///
    /// 1. snapshot current prices;
    /// 2. evaluate pending limit orders against that snapshot;
    /// 3. advance every symbol's price — unless any order is still pending
    ///    anywhere in the book, which freezes all symbols for the tick;
    /// 4. publish a snapshot with recomputed indicators.
    pub fn tick(&mut self) -> MarketSnapshot {
        self.now += Duration::seconds(1);

        let prices = self.prices();
        let fills = self.portfolio.check_limit_orders(&prices, self.now);

        let mut changed: Vec<String> = Vec::new();
        if !self.portfolio.has_pending_orders() {
            for (symbol, stock) in self.stocks.iter_mut() {
                if stock.advance(self.now, &mut self.rng, 0.0).is_some() {
                    changed.push(symbol.clone());
                }
            }
        }

        self.snapshot_with(fills, &changed)
    }

    /// Place an order against the book. Market orders first nudge the
    /// simulator in proportion to the traded size, then execute at the
    /// supplied reference price.
    pub fn place_order(
        &mut self,
        side: Side,
        symbol: &str,
        shares: u64,
        price: f64,
        kind: OrderKind,
    ) -> Result<OrderPlacement, PapertradeError> {
        let Some(stock) = self.stocks.get_mut(symbol) else {
            return Err(PapertradeError::UnknownSymbol {
                symbol: symbol.to_string(),
            });
        };

        if kind == OrderKind::Market {
            let volume_impact = shares as f64 * self.market_impact;
            stock.advance(self.now, &mut self.rng, volume_impact);
        }

        self.portfolio
            .place_order(side, symbol, shares, price, kind, self.now)
    }

    pub fn cancel_order(&mut self, id: u64) -> Result<(), PapertradeError> {
        self.portfolio.cancel_order(id).map(|_| ())
    }

    /// Poll the live-quote collaborator and blend any answers into the
    /// simulated prices. Absent quotes are skipped; the simulation never
    /// waits on this. Returns the number of symbols updated.
    pub fn apply_quotes(&mut self, quotes: &dyn QuotePort) -> usize {
        let mut applied = 0;
        for stock in self.stocks.values_mut() {
            if let Some(real) = quotes.current_price(&stock.symbol) {
                stock.blend_quote(real);
                applied += 1;
            }
        }
        applied
    }

    pub fn snapshot(&self) -> MarketSnapshot {
        self.snapshot_with(Vec::new(), &[])
    }

    fn snapshot_with(&self, fills: Vec<Transaction>, changed: &[String]) -> MarketSnapshot {
        let prices = self.prices();
        let symbols = self
            .stocks
            .values()
            .map(|stock| SymbolSnapshot {
                symbol: stock.symbol.clone(),
                name: stock.name.clone(),
                price: stock.current_price(),
                changed: changed.iter().any(|s| s == &stock.symbol),
                bars: stock.recent_bars(SNAPSHOT_BAR_WINDOW).to_vec(),
                indicators: stock.indicators.clone(),
            })
            .collect();
        MarketSnapshot {
            time: self.now,
            symbols,
            cash: self.portfolio.cash,
            portfolio_value: self.portfolio.portfolio_value(&prices),
            fills,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::day_ordinal;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 10, 0, 0).unwrap()
    }

    fn flat_defs() -> Vec<SymbolDef> {
        vec![
            SymbolDef::new("AAPL", "Apple Inc.", 0.0),
            SymbolDef::new("MSFT", "Microsoft Corp.", 0.0),
        ]
    }

    fn config() -> MarketConfig {
        MarketConfig {
            initial_cash: 100_000.0,
            market_impact: 0.5,
            seed: Some(42),
        }
    }

    fn market() -> Market {
        Market::open(&flat_defs(), None, &config(), start())
    }

    struct FixedQuotes(HashMap<String, f64>);

    impl QuotePort for FixedQuotes {
        fn current_price(&self, symbol: &str) -> Option<f64> {
            self.0.get(symbol).copied()
        }

        fn daily_history(&self, _symbol: &str) -> Option<Vec<OhlcBar>> {
            None
        }
    }

    struct HistoryQuotes(Vec<OhlcBar>);

    impl QuotePort for HistoryQuotes {
        fn current_price(&self, _symbol: &str) -> Option<f64> {
            None
        }

        fn daily_history(&self, _symbol: &str) -> Option<Vec<OhlcBar>> {
            Some(self.0.clone())
        }
    }

    #[test]
    fn open_synthesizes_when_no_history_source() {
        let market = market();
        let stock = market.stock("AAPL").unwrap();
        assert_eq!(stock.bars.len(), 60);
        assert!(market.stock("XYZ").is_none());
    }

    #[test]
    fn open_seeds_from_history_source() {
        let day = day_ordinal(start().date_naive());
        let bars: Vec<OhlcBar> = (0..5)
            .map(|i| OhlcBar {
                day: day - 5 + i,
                open: 100.0,
                high: 101.0,
                low: 99.0,
                close: 100.5,
                volume: 1000.0,
            })
            .collect();
        let source = HistoryQuotes(bars);
        let market = Market::open(&flat_defs(), Some(&source), &config(), start());
        assert_eq!(market.stock("AAPL").unwrap().bars.len(), 5);
    }

    #[test]
    fn tick_advances_every_symbol_with_empty_book() {
        let mut market = market();
        let before = market.prices();
        let snapshot = market.tick();
        assert_eq!(snapshot.symbols.len(), 2);
        assert!(snapshot.symbols.iter().all(|s| s.changed));
        // Zero volatility, zero impact: prices unchanged in value.
        for sym in &snapshot.symbols {
            assert!((sym.price - before[&sym.symbol]).abs() < 1e-12);
        }
        assert_eq!(
            market.stock("AAPL").unwrap().price_history.len(),
            61,
            "tick appends one price per symbol"
        );
    }

    #[test]
    fn pending_order_freezes_all_symbols() {
        let mut market = market();
        let aapl_price = market.stock("AAPL").unwrap().current_price();
        // A limit buy far below market stays pending.
        market
            .place_order(Side::Buy, "AAPL", 1, aapl_price / 2.0, OrderKind::Limit)
            .unwrap();

        let snapshot = market.tick();
        assert!(snapshot.symbols.iter().all(|s| !s.changed));
        assert_eq!(market.stock("MSFT").unwrap().price_history.len(), 60);
    }

    #[test]
    fn tick_fills_limit_order_then_resumes_advancing() {
        let mut market = market();
        let aapl_price = market.stock("AAPL").unwrap().current_price();
        market
            .place_order(Side::Buy, "AAPL", 10, aapl_price + 1.0, OrderKind::Limit)
            .unwrap();

        // Trigger is above market, so the first tick fills it at the stored
        // price, and with the book empty again the same tick advances prices.
        let snapshot = market.tick();
        assert_eq!(snapshot.fills.len(), 1);
        assert!((snapshot.fills[0].price - (aapl_price + 1.0)).abs() < f64::EPSILON);
        assert!(snapshot.symbols.iter().all(|s| s.changed));
        assert_eq!(market.portfolio.holdings["AAPL"], 10);
    }

    #[test]
    fn market_order_nudges_price_through_volume_impact() {
        let mut market = market();
        let msft_price = market.stock("MSFT").unwrap().current_price();
        // Freeze the ambient tick with a far-off limit order so the clock
        // moves but AAPL stays un-advanced and eligible for the trade nudge.
        market
            .place_order(Side::Buy, "MSFT", 1, msft_price / 2.0, OrderKind::Limit)
            .unwrap();
        market.tick();

        let before = market.stock("AAPL").unwrap().current_price();
        market
            .place_order(Side::Buy, "AAPL", 1000, before, OrderKind::Market)
            .unwrap();
        let after = market.stock("AAPL").unwrap().current_price();
        // 1000 shares * 0.5 impact * 0.0001 = +5% on a zero-volatility stock.
        assert!((after - before * 1.05).abs() < 1e-9);
    }

    #[test]
    fn market_order_nudge_debounced_within_tick_second() {
        let mut market = market();
        market.tick();
        let before = market.stock("AAPL").unwrap().current_price();
        // The ambient advance already ran this simulated second; the trade
        // still executes but cannot move the price again.
        market
            .place_order(Side::Buy, "AAPL", 10, before, OrderKind::Market)
            .unwrap();
        let after = market.stock("AAPL").unwrap().current_price();
        assert!((after - before).abs() < 1e-12);
        assert_eq!(market.portfolio.holdings["AAPL"], 10);
    }

    #[test]
    fn place_order_unknown_symbol() {
        let mut market = market();
        assert!(matches!(
            market.place_order(Side::Buy, "XYZ", 1, 10.0, OrderKind::Market),
            Err(PapertradeError::UnknownSymbol { .. })
        ));
    }

    #[test]
    fn apply_quotes_blends_present_and_skips_absent() {
        let mut market = market();
        let before = market.stock("AAPL").unwrap().current_price();
        let quotes = FixedQuotes(HashMap::from([("AAPL".to_string(), before * 2.0)]));
        let applied = market.apply_quotes(&quotes);
        assert_eq!(applied, 1);
        let after = market.stock("AAPL").unwrap().current_price();
        assert!((after - before * 1.1).abs() < 1e-9);
    }

    #[test]
    fn snapshot_reports_portfolio_value() {
        let mut market = market();
        market.tick();
        let price = market.stock("AAPL").unwrap().current_price();
        market
            .place_order(Side::Buy, "AAPL", 10, price, OrderKind::Market)
            .unwrap();
        let snapshot = market.snapshot();
        // Round trip at the same price: cash down, holdings up, total flat.
        assert!((snapshot.portfolio_value - 100_000.0).abs() < 1e-6);
        assert!((snapshot.cash - (100_000.0 - 10.0 * price)).abs() < 1e-6);
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let defs = vec![SymbolDef::new("AAPL", "Apple Inc.", 0.02)];
        let mut a = Market::open(&defs, None, &config(), start());
        let mut b = Market::open(&defs, None, &config(), start());
        for _ in 0..20 {
            a.tick();
            b.tick();
        }
        assert_eq!(
            a.stock("AAPL").unwrap().price_history,
            b.stock("AAPL").unwrap().price_history
        );
    }

    #[test]
    fn tick_snapshot_window_is_bounded() {
        let defs = vec![SymbolDef::new("AAPL", "Apple Inc.", 0.02)];
        let mut market = Market::open(&defs, None, &config(), start());
        let snapshot = market.tick();
        assert!(snapshot.symbols[0].bars.len() <= SNAPSHOT_BAR_WINDOW);
    }
}
