//! CSV-backed market-data adapter.
//!
//! Reads per-symbol daily history from `<base>/<SYMBOL>.csv` with columns
//! `date,open,high,low,close,volume` (date as `%Y-%m-%d`, header row
//! expected). This is a history-only source: it never answers live quotes.
//! Per the port contract every failure degrades to `None`; a malformed file
//! is reported on stderr and otherwise treated as absent data.

use chrono::NaiveDate;
use std::path::PathBuf;

use crate::domain::ohlcv::{day_ordinal, OhlcBar};
use crate::ports::quote_port::QuotePort;

pub struct CsvQuoteAdapter {
    base_path: PathBuf,
}

impl CsvQuoteAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn history_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    fn read_history(&self, symbol: &str) -> Result<Vec<OhlcBar>, String> {
        let path = self.history_path(symbol);
        let mut rdr = csv::Reader::from_path(&path)
            .map_err(|e| format!("failed to open {}: {}", path.display(), e))?;

        let mut bars = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| format!("CSV parse error: {}", e))?;

            let field = |i: usize, name: &str| -> Result<&str, String> {
                record
                    .get(i)
                    .ok_or_else(|| format!("missing {} column", name))
            };

            let date = NaiveDate::parse_from_str(field(0, "date")?, "%Y-%m-%d")
                .map_err(|e| format!("invalid date: {}", e))?;
            let open: f64 = field(1, "open")?
                .parse()
                .map_err(|e| format!("invalid open value: {}", e))?;
            let high: f64 = field(2, "high")?
                .parse()
                .map_err(|e| format!("invalid high value: {}", e))?;
            let low: f64 = field(3, "low")?
                .parse()
                .map_err(|e| format!("invalid low value: {}", e))?;
            let close: f64 = field(4, "close")?
                .parse()
                .map_err(|e| format!("invalid close value: {}", e))?;
            let volume: f64 = field(5, "volume")?
                .parse()
                .map_err(|e| format!("invalid volume value: {}", e))?;

            bars.push(OhlcBar {
                day: day_ordinal(date),
                open,
                high,
                low,
                close,
                volume,
            });
        }

        bars.sort_by_key(|b| b.day);
        Ok(bars)
    }
}

impl QuotePort for CsvQuoteAdapter {
    fn current_price(&self, _symbol: &str) -> Option<f64> {
        None
    }

    fn daily_history(&self, symbol: &str) -> Option<Vec<OhlcBar>> {
        match self.read_history(symbol) {
            Ok(bars) if !bars.is_empty() => Some(bars),
            Ok(_) => None,
            Err(reason) => {
                eprintln!("warning: no history for {}: {}", symbol, reason);
                None
            }
        }
    }
}
