//! Tradable symbol universe.
//!
//! Ships a built-in default table; a `symbols` config value of
//! `CODE:Display Name:volatility` triples separated by commas overrides it.

use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolDef {
    pub symbol: String,
    pub name: String,
    /// Fractional per-tick perturbation magnitude, e.g. 0.02.
    pub volatility: f64,
}

impl SymbolDef {
    pub fn new(symbol: &str, name: &str, volatility: f64) -> Self {
        SymbolDef {
            symbol: symbol.to_string(),
            name: name.to_string(),
            volatility,
        }
    }
}

pub fn default_universe() -> Vec<SymbolDef> {
    vec![
        SymbolDef::new("AAPL", "Apple Inc.", 0.02),
        SymbolDef::new("MSFT", "Microsoft Corp.", 0.015),
        SymbolDef::new("GOOGL", "Alphabet Inc.", 0.025),
        SymbolDef::new("AMZN", "Amazon.com Inc.", 0.03),
        SymbolDef::new("TSLA", "Tesla Inc.", 0.04),
        SymbolDef::new("META", "Meta Platforms Inc.", 0.035),
        SymbolDef::new("NVDA", "NVIDIA Corp.", 0.045),
        SymbolDef::new("JPM", "JPMorgan Chase & Co.", 0.025),
        SymbolDef::new("V", "Visa Inc.", 0.02),
        SymbolDef::new("WMT", "Walmart Inc.", 0.015),
    ]
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty entry in symbol list")]
    EmptyEntry,

    #[error("malformed entry {entry:?}: expected SYMBOL:Name:volatility")]
    MalformedEntry { entry: String },

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),

    #[error("invalid volatility for {symbol}: {value:?}")]
    InvalidVolatility { symbol: String, value: String },
}

/// Parse `AAPL:Apple Inc.:0.02, MSFT:Microsoft Corp.:0.015` into symbol
/// definitions. Symbols are upper-cased; volatility must parse as a finite,
/// non-negative number.
pub fn parse_symbols(input: &str) -> Result<Vec<SymbolDef>, UniverseError> {
    let mut defs = Vec::new();
    let mut seen = HashSet::new();

    for entry in input.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            return Err(UniverseError::EmptyEntry);
        }
        let parts: Vec<&str> = entry.splitn(3, ':').map(|p| p.trim()).collect();
        let [symbol, name, volatility] = parts.as_slice() else {
            return Err(UniverseError::MalformedEntry {
                entry: entry.to_string(),
            });
        };
        if symbol.is_empty() || name.is_empty() {
            return Err(UniverseError::MalformedEntry {
                entry: entry.to_string(),
            });
        }

        let symbol = symbol.to_uppercase();
        if !seen.insert(symbol.clone()) {
            return Err(UniverseError::DuplicateSymbol(symbol));
        }

        let volatility: f64 = volatility
            .parse()
            .ok()
            .filter(|v: &f64| v.is_finite() && *v >= 0.0)
            .ok_or_else(|| UniverseError::InvalidVolatility {
                symbol: symbol.clone(),
                value: volatility.to_string(),
            })?;

        defs.push(SymbolDef {
            symbol,
            name: name.to_string(),
            volatility,
        });
    }

    Ok(defs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_universe_has_ten_symbols() {
        let defs = default_universe();
        assert_eq!(defs.len(), 10);
        assert_eq!(defs[0].symbol, "AAPL");
        assert!((defs[4].volatility - 0.04).abs() < f64::EPSILON);
    }

    #[test]
    fn parse_two_symbols() {
        let defs = parse_symbols("AAPL:Apple Inc.:0.02, msft:Microsoft Corp.:0.015").unwrap();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[1].symbol, "MSFT");
        assert_eq!(defs[1].name, "Microsoft Corp.");
        assert!((defs[0].volatility - 0.02).abs() < f64::EPSILON);
    }

    #[test]
    fn parse_rejects_empty_entry() {
        assert!(matches!(
            parse_symbols("AAPL:Apple Inc.:0.02,,"),
            Err(UniverseError::EmptyEntry)
        ));
    }

    #[test]
    fn parse_rejects_missing_fields() {
        assert!(matches!(
            parse_symbols("AAPL:0.02"),
            Err(UniverseError::MalformedEntry { .. })
        ));
    }

    #[test]
    fn parse_rejects_duplicates() {
        assert!(matches!(
            parse_symbols("AAPL:Apple:0.02, aapl:Apple Again:0.03"),
            Err(UniverseError::DuplicateSymbol(_))
        ));
    }

    #[test]
    fn parse_rejects_bad_volatility() {
        assert!(matches!(
            parse_symbols("AAPL:Apple:lots"),
            Err(UniverseError::InvalidVolatility { .. })
        ));
        assert!(matches!(
            parse_symbols("AAPL:Apple:-0.5"),
            Err(UniverseError::InvalidVolatility { .. })
        ));
    }
}
