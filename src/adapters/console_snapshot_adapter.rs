//! Console snapshot consumer: one status line per published snapshot.

use crate::domain::market::MarketSnapshot;
use crate::ports::snapshot_port::SnapshotPort;

pub struct ConsoleSnapshotAdapter {
    /// Print per-symbol detail lines, not just the summary.
    pub verbose: bool,
}

impl ConsoleSnapshotAdapter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl SnapshotPort for ConsoleSnapshotAdapter {
    fn publish(&mut self, snapshot: &MarketSnapshot) {
        for fill in &snapshot.fills {
            println!(
                "{} FILLED limit {} {} x{} @ {:.2}",
                snapshot.time.format("%H:%M:%S"),
                fill.side,
                fill.symbol,
                fill.shares,
                fill.price
            );
        }
        if self.verbose {
            for sym in &snapshot.symbols {
                let rsi = sym
                    .indicators
                    .rsi14
                    .latest()
                    .map(|v| format!("{:.1}", v))
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{}  {:6} {:>10.2}  RSI {}",
                    snapshot.time.format("%H:%M:%S"),
                    sym.symbol,
                    sym.price,
                    rsi
                );
            }
        }
        println!(
            "{}  portfolio {:.2} (cash {:.2})",
            snapshot.time.format("%H:%M:%S"),
            snapshot.portfolio_value,
            snapshot.cash
        );
    }
}
