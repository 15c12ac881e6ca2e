//! Technical-analysis summary for a symbol.
//!
//! Pure derivation from the latest indicator values; rendering is up to the
//! consumer.

use std::fmt;

use super::stock::Stock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Bullish,
    Bearish,
    Neutral,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Bullish => write!(f, "bullish"),
            Trend::Bearish => write!(f, "bearish"),
            Trend::Neutral => write!(f, "neutral"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsiRegime {
    Overbought,
    Oversold,
    Neutral,
}

impl fmt::Display for RsiRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RsiRegime::Overbought => write!(f, "overbought"),
            RsiRegime::Oversold => write!(f, "oversold"),
            RsiRegime::Neutral => write!(f, "neutral"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub symbol: String,
    pub price: f64,
    /// Percent change between the last two daily closes; absent with fewer
    /// than two bars.
    pub change_pct: Option<f64>,
    pub ma20: Option<f64>,
    pub ma50: Option<f64>,
    /// Absent until both moving averages have warmed up.
    pub trend: Option<Trend>,
    pub rsi: Option<f64>,
    pub rsi_regime: Option<RsiRegime>,
}

/// Classify trend from moving-average posture: bullish when MA20 > MA50 with
/// price above MA20, bearish when MA20 < MA50 with price below MA20.
fn classify_trend(price: f64, ma20: f64, ma50: f64) -> Trend {
    if ma20 > ma50 && price > ma20 {
        Trend::Bullish
    } else if ma20 < ma50 && price < ma20 {
        Trend::Bearish
    } else {
        Trend::Neutral
    }
}

fn classify_rsi(rsi: f64) -> RsiRegime {
    if rsi > 70.0 {
        RsiRegime::Overbought
    } else if rsi < 30.0 {
        RsiRegime::Oversold
    } else {
        RsiRegime::Neutral
    }
}

pub fn analyze(stock: &Stock) -> AnalysisReport {
    let price = stock.current_price();
    let closes = stock.closes();
    let change_pct = match closes.as_slice() {
        [.., prev, last] if *prev != 0.0 => Some((last - prev) / prev * 100.0),
        _ => None,
    };

    let ma20 = stock.indicators.ma20.latest();
    let ma50 = stock.indicators.ma50.latest();
    let trend = match (ma20, ma50) {
        (Some(ma20), Some(ma50)) => Some(classify_trend(price, ma20, ma50)),
        _ => None,
    };

    let rsi = stock.indicators.rsi14.latest();
    let rsi_regime = rsi.map(classify_rsi);

    AnalysisReport {
        symbol: stock.symbol.clone(),
        price,
        change_pct,
        ma20,
        ma50,
        trend,
        rsi,
        rsi_regime,
    }
}
