//! Technical indicator engine.
//!
//! All series are index-aligned to the close-price series they were computed
//! from: one point per close, with a validity flag that stays false until the
//! indicator's warmup window has filled. [`recompute`] rebuilds the full set
//! from scratch on every call — O(n) per tick, which is fine at simulation
//! scale; a consumer needing more history should incrementalize.

pub mod rsi;
pub mod sma;

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorPoint {
    pub valid: bool,
    pub value: f64,
}

impl IndicatorPoint {
    pub fn invalid() -> Self {
        IndicatorPoint {
            valid: false,
            value: 0.0,
        }
    }

    pub fn at(value: f64) -> Self {
        IndicatorPoint { valid: true, value }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorKind {
    Sma(usize),
    Rsi(usize),
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorKind::Sma(period) => write!(f, "MA{}", period),
            IndicatorKind::Rsi(period) => write!(f, "RSI{}", period),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub kind: IndicatorKind,
    pub points: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn empty(kind: IndicatorKind) -> Self {
        IndicatorSeries {
            kind,
            points: Vec::new(),
        }
    }

    /// Most recent valid value, if the warmup window has filled.
    pub fn latest(&self) -> Option<f64> {
        self.points
            .last()
            .filter(|p| p.valid)
            .map(|p| p.value)
    }

    /// Value at index `i`, if valid.
    pub fn at(&self, i: usize) -> Option<f64> {
        self.points.get(i).filter(|p| p.valid).map(|p| p.value)
    }
}

/// The standard indicator set maintained for every simulated symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSet {
    pub ma20: IndicatorSeries,
    pub ma50: IndicatorSeries,
    pub rsi14: IndicatorSeries,
}

impl IndicatorSet {
    pub fn empty() -> Self {
        IndicatorSet {
            ma20: IndicatorSeries::empty(IndicatorKind::Sma(20)),
            ma50: IndicatorSeries::empty(IndicatorKind::Sma(50)),
            rsi14: IndicatorSeries::empty(IndicatorKind::Rsi(14)),
        }
    }
}

/// Recompute MA20, MA50 and RSI14 from a full close-price history.
pub fn recompute(closes: &[f64]) -> IndicatorSet {
    IndicatorSet {
        ma20: sma::calculate_sma(closes, 20),
        ma50: sma::calculate_sma(closes, 50),
        rsi14: rsi::calculate_rsi(closes, 14),
    }
}
