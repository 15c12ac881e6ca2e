//! CLI definition and dispatch.

use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::console_snapshot_adapter::ConsoleSnapshotAdapter;
use crate::adapters::csv_quote_adapter::CsvQuoteAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_store;
use crate::domain::analysis;
use crate::domain::error::PapertradeError;
use crate::domain::market::{Market, MarketConfig};
use crate::domain::order::{OrderKind, Side};
use crate::domain::portfolio::OrderPlacement;
use crate::domain::universe::{default_universe, parse_symbols, SymbolDef};
use crate::ports::config_port::ConfigPort;
use crate::ports::quote_port::QuotePort;
use crate::ports::snapshot_port::SnapshotPort;

const DEFAULT_CONFIG_FILE: &str = "papertrade.ini";

#[derive(Parser, Debug)]
#[command(name = "papertrade", about = "Simulated trading venue")]
pub struct Cli {
    /// Path to an INI config file; defaults to ./papertrade.ini when present.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the tick loop with wall-clock pacing, saving state on exit
    Run {
        /// Stop after this many ticks; omit to run until interrupted
        #[arg(long)]
        ticks: Option<u64>,
        /// Print per-symbol lines each tick
        #[arg(short, long)]
        verbose: bool,
    },
    /// Run N ticks as fast as possible (deterministic with --seed)
    Simulate {
        #[arg(long, default_value_t = 300)]
        ticks: u64,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Place an order against the saved market state
    Trade {
        /// buy or sell
        #[arg(long)]
        side: String,
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        shares: u64,
        #[arg(long)]
        price: f64,
        /// market or limit
        #[arg(long, default_value = "market")]
        kind: String,
    },
    /// Cancel a pending order by id
    Cancel {
        #[arg(long)]
        id: u64,
    },
    /// Show portfolio holdings, valuation and recent activity
    Portfolio,
    /// Show a technical-analysis summary
    Analyze {
        /// Restrict to one symbol
        #[arg(long)]
        symbol: Option<String>,
    },
    /// Discard the saved portfolio and start fresh
    Reset,
}

pub fn run(cli: Cli) -> ExitCode {
    let cfg = match load_config(cli.config.as_ref()) {
        Ok(cfg) => cfg,
        Err(code) => return code,
    };

    match cli.command {
        Command::Run { ticks, verbose } => run_loop(&cfg, ticks, verbose),
        Command::Simulate { ticks, seed } => run_simulate(&cfg, ticks, seed),
        Command::Trade {
            side,
            symbol,
            shares,
            price,
            kind,
        } => run_trade(&cfg, &side, &symbol, shares, price, &kind),
        Command::Cancel { id } => run_cancel(&cfg, id),
        Command::Portfolio => run_portfolio(&cfg),
        Command::Analyze { symbol } => run_analyze(&cfg, symbol.as_deref()),
        Command::Reset => run_reset(&cfg),
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, ExitCode> {
    let path = match path {
        Some(path) => path.clone(),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !default.exists() {
                return Ok(FileConfigAdapter::empty());
            }
            default
        }
    };
    FileConfigAdapter::from_file(&path).map_err(|e| {
        let err = PapertradeError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        fail(&err)
    })
}

fn fail(err: &PapertradeError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(err)
}

fn market_config(cfg: &dyn ConfigPort) -> Result<MarketConfig, PapertradeError> {
    let initial_cash = cfg.get_double("portfolio", "initial_cash", 100_000.0);
    if initial_cash < 0.0 {
        return Err(PapertradeError::ConfigInvalid {
            section: "portfolio".to_string(),
            key: "initial_cash".to_string(),
            reason: "must be non-negative".to_string(),
        });
    }
    let market_impact = cfg.get_double("simulation", "market_impact", 0.5);
    if market_impact < 0.0 {
        return Err(PapertradeError::ConfigInvalid {
            section: "simulation".to_string(),
            key: "market_impact".to_string(),
            reason: "must be non-negative".to_string(),
        });
    }
    let seed = cfg.get_int("simulation", "seed", -1);
    Ok(MarketConfig {
        initial_cash,
        market_impact,
        seed: (seed >= 0).then_some(seed as u64),
    })
}

fn state_paths(cfg: &dyn ConfigPort) -> (PathBuf, PathBuf) {
    let portfolio = cfg
        .get_string("persistence", "portfolio_file")
        .unwrap_or_else(|| "portfolio.json".to_string());
    let market = cfg
        .get_string("persistence", "market_file")
        .unwrap_or_else(|| "market.json".to_string());
    (PathBuf::from(portfolio), PathBuf::from(market))
}

fn universe(cfg: &dyn ConfigPort) -> Result<Vec<SymbolDef>, PapertradeError> {
    match cfg.get_string("market", "symbols") {
        Some(spec) => parse_symbols(&spec).map_err(|e| PapertradeError::SymbolList {
            reason: e.to_string(),
        }),
        None => Ok(default_universe()),
    }
}

fn history_source(cfg: &dyn ConfigPort) -> Option<CsvQuoteAdapter> {
    cfg.get_string("data", "history_dir")
        .map(|dir| CsvQuoteAdapter::new(PathBuf::from(dir)))
}

/// Load the market and portfolio from saved state, bootstrapping any missing
/// piece from the configured universe and history source.
fn build_market(cfg: &dyn ConfigPort, config: &MarketConfig) -> Result<Market, PapertradeError> {
    let (portfolio_path, market_path) = state_paths(cfg);
    let now = Utc::now();

    let market = match json_store::load_stocks(&market_path, now)? {
        Some(stocks) => {
            eprintln!("Loaded market state from {}", market_path.display());
            let portfolio = json_store::load_portfolio(&portfolio_path)?
                .unwrap_or_else(|| crate::domain::portfolio::Portfolio::new(config.initial_cash));
            Market::from_parts(stocks, portfolio, config, now)
        }
        None => {
            let defs = universe(cfg)?;
            eprintln!("Bootstrapping {} symbols", defs.len());
            let source = history_source(cfg);
            let mut market = Market::open(
                &defs,
                source.as_ref().map(|s| s as &dyn QuotePort),
                config,
                now,
            );
            if let Some(portfolio) = json_store::load_portfolio(&portfolio_path)? {
                market.portfolio = portfolio;
            }
            market
        }
    };
    Ok(market)
}

fn save_state(market: &Market, cfg: &dyn ConfigPort) -> Result<(), PapertradeError> {
    let (portfolio_path, market_path) = state_paths(cfg);
    json_store::save_portfolio(&market.portfolio, &portfolio_path)?;
    json_store::save_market(market, &market_path)?;
    eprintln!(
        "Saved state to {} and {}",
        portfolio_path.display(),
        market_path.display()
    );
    Ok(())
}

fn run_loop(cfg: &dyn ConfigPort, ticks: Option<u64>, verbose: bool) -> ExitCode {
    let config = match market_config(cfg) {
        Ok(config) => config,
        Err(e) => return fail(&e),
    };
    let mut market = match build_market(cfg, &config) {
        Ok(m) => m,
        Err(e) => return fail(&e),
    };

    let tick_interval = cfg.get_int("simulation", "tick_interval_secs", 1).max(0) as u64;
    let quote_interval = cfg.get_int("data", "quote_interval_secs", 300).max(1) as u64;
    let quotes = history_source(cfg);
    let mut console = ConsoleSnapshotAdapter::new(verbose);

    let mut count: u64 = 0;
    loop {
        let snapshot = market.tick();
        console.publish(&snapshot);

        count += 1;
        if count % quote_interval == 0 {
            if let Some(quotes) = &quotes {
                let applied = market.apply_quotes(quotes);
                if applied > 0 {
                    eprintln!("Blended live quotes for {applied} symbols");
                }
            }
        }
        if let Some(limit) = ticks {
            if count >= limit {
                break;
            }
        }
        if tick_interval > 0 {
            std::thread::sleep(std::time::Duration::from_secs(tick_interval));
        }
    }

    match save_state(&market, cfg) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(&e),
    }
}

fn run_simulate(cfg: &dyn ConfigPort, ticks: u64, seed: Option<u64>) -> ExitCode {
    let mut config = match market_config(cfg) {
        Ok(config) => config,
        Err(e) => return fail(&e),
    };
    if seed.is_some() {
        config.seed = seed;
    }
    let defs = match universe(cfg) {
        Ok(defs) => defs,
        Err(e) => return fail(&e),
    };
    // Simulation runs are self-contained: fresh market, no saved state.
    let mut market = Market::open(&defs, None, &config, Utc::now());

    eprintln!("Simulating {} ticks over {} symbols", ticks, defs.len());
    let mut last = market.snapshot();
    for _ in 0..ticks {
        last = market.tick();
    }

    println!("{:<6} {:>10} {:>10} {:>8}", "symbol", "price", "MA20", "RSI14");
    for sym in &last.symbols {
        let ma20 = sym
            .indicators
            .ma20
            .latest()
            .map(|v| format!("{:.2}", v))
            .unwrap_or_else(|| "-".to_string());
        let rsi = sym
            .indicators
            .rsi14
            .latest()
            .map(|v| format!("{:.1}", v))
            .unwrap_or_else(|| "-".to_string());
        println!("{:<6} {:>10.2} {:>10} {:>8}", sym.symbol, sym.price, ma20, rsi);
    }
    println!("portfolio value: {:.2}", last.portfolio_value);
    ExitCode::SUCCESS
}

fn parse_side(side: &str) -> Result<Side, PapertradeError> {
    match side.to_lowercase().as_str() {
        "buy" => Ok(Side::Buy),
        "sell" => Ok(Side::Sell),
        other => Err(PapertradeError::InvalidOrder {
            reason: format!("side must be buy or sell, got {other:?}"),
        }),
    }
}

fn parse_kind(kind: &str) -> Result<OrderKind, PapertradeError> {
    match kind.to_lowercase().as_str() {
        "market" => Ok(OrderKind::Market),
        "limit" => Ok(OrderKind::Limit),
        other => Err(PapertradeError::InvalidOrder {
            reason: format!("kind must be market or limit, got {other:?}"),
        }),
    }
}

fn run_trade(
    cfg: &dyn ConfigPort,
    side: &str,
    symbol: &str,
    shares: u64,
    price: f64,
    kind: &str,
) -> ExitCode {
    let (side, kind) = match (parse_side(side), parse_kind(kind)) {
        (Ok(side), Ok(kind)) => (side, kind),
        (Err(e), _) | (_, Err(e)) => return fail(&e),
    };

    let config = match market_config(cfg) {
        Ok(config) => config,
        Err(e) => return fail(&e),
    };
    let mut market = match build_market(cfg, &config) {
        Ok(m) => m,
        Err(e) => return fail(&e),
    };

    let symbol = symbol.to_uppercase();
    match market.place_order(side, &symbol, shares, price, kind) {
        Ok(OrderPlacement::Filled(tx)) => {
            println!(
                "filled {} {} x{} @ {:.2} (total {:.2})",
                tx.side, tx.symbol, tx.shares, tx.price, tx.total
            );
        }
        Ok(OrderPlacement::Queued(id)) => {
            println!(
                "queued limit {} {} x{} @ {:.2} as order {}",
                side, symbol, shares, price, id
            );
        }
        Ok(OrderPlacement::Rejected(reason)) => {
            println!("rejected: {reason}");
        }
        Err(e) => return fail(&e),
    }

    match save_state(&market, cfg) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(&e),
    }
}

fn run_cancel(cfg: &dyn ConfigPort, id: u64) -> ExitCode {
    let config = match market_config(cfg) {
        Ok(config) => config,
        Err(e) => return fail(&e),
    };
    let mut market = match build_market(cfg, &config) {
        Ok(m) => m,
        Err(e) => return fail(&e),
    };
    if let Err(e) = market.cancel_order(id) {
        return fail(&e);
    }
    println!("cancelled order {id}");
    match save_state(&market, cfg) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(&e),
    }
}

fn run_portfolio(cfg: &dyn ConfigPort) -> ExitCode {
    let config = match market_config(cfg) {
        Ok(config) => config,
        Err(e) => return fail(&e),
    };
    let market = match build_market(cfg, &config) {
        Ok(m) => m,
        Err(e) => return fail(&e),
    };

    let prices = market.prices();
    let portfolio = &market.portfolio;
    println!("cash: {:.2}", portfolio.cash);
    println!("portfolio value: {:.2}", portfolio.portfolio_value(&prices));

    if !portfolio.holdings.is_empty() {
        println!();
        println!(
            "{:<6} {:>8} {:>10} {:>12} {:>10}",
            "symbol", "shares", "price", "value", "avg buy"
        );
        let mut symbols: Vec<&String> = portfolio.holdings.keys().collect();
        symbols.sort();
        for symbol in symbols {
            let shares = portfolio.holdings[symbol];
            let price = prices.get(symbol).copied().unwrap_or(0.0);
            println!(
                "{:<6} {:>8} {:>10.2} {:>12.2} {:>10.2}",
                symbol,
                shares,
                price,
                shares as f64 * price,
                portfolio.average_buy_price(symbol)
            );
        }
    }

    let pending: Vec<_> = portfolio.pending_orders().collect();
    if !pending.is_empty() {
        println!();
        println!("pending orders:");
        for order in pending {
            println!(
                "  #{} {} {} x{} @ {:.2} ({})",
                order.id, order.side, order.symbol, order.shares, order.price, order.kind
            );
        }
    }

    let recent = portfolio.transactions.iter().rev().take(20);
    let mut printed_header = false;
    for tx in recent {
        if !printed_header {
            println!();
            println!("recent transactions:");
            printed_header = true;
        }
        println!(
            "  {} {} {} x{} @ {:.2} total {:.2} ({})",
            tx.time.format("%Y-%m-%d %H:%M:%S"),
            tx.side,
            tx.symbol,
            tx.shares,
            tx.price,
            tx.total,
            tx.order_kind
        );
    }
    ExitCode::SUCCESS
}

fn run_analyze(cfg: &dyn ConfigPort, symbol: Option<&str>) -> ExitCode {
    let config = match market_config(cfg) {
        Ok(config) => config,
        Err(e) => return fail(&e),
    };
    let market = match build_market(cfg, &config) {
        Ok(m) => m,
        Err(e) => return fail(&e),
    };

    let reports: Vec<_> = match symbol {
        Some(symbol) => {
            let symbol = symbol.to_uppercase();
            match market.stock(&symbol) {
                Some(stock) => vec![analysis::analyze(stock)],
                None => return fail(&PapertradeError::UnknownSymbol { symbol }),
            }
        }
        None => market.stocks().map(analysis::analyze).collect(),
    };

    for report in reports {
        println!("{} @ {:.2}", report.symbol, report.price);
        if let Some(change) = report.change_pct {
            println!("  day change: {:+.2}%", change);
        }
        match (report.ma20, report.ma50, report.trend) {
            (Some(ma20), Some(ma50), Some(trend)) => {
                println!("  MA20 {:.2} / MA50 {:.2} — {}", ma20, ma50, trend);
            }
            _ => println!("  moving averages warming up"),
        }
        match (report.rsi, report.rsi_regime) {
            (Some(rsi), Some(regime)) => println!("  RSI14 {:.1} ({})", rsi, regime),
            _ => println!("  RSI14 warming up"),
        }
    }
    ExitCode::SUCCESS
}

fn run_reset(cfg: &dyn ConfigPort) -> ExitCode {
    let (portfolio_path, _) = state_paths(cfg);
    match remove_if_present(&portfolio_path) {
        Ok(true) => eprintln!("Removed {}", portfolio_path.display()),
        Ok(false) => eprintln!("No saved portfolio at {}", portfolio_path.display()),
        Err(e) => return fail(&PapertradeError::Io(e)),
    }
    ExitCode::SUCCESS
}

fn remove_if_present(path: &Path) -> std::io::Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
