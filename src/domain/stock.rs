//! Per-symbol price simulation.
//!
//! A [`Stock`] owns its close-price history, per-tick volume history, daily
//! OHLC bars and derived indicator set. [`Stock::advance`] produces the next
//! simulated price:
//!
//! ```text
//! change = volatility * (uniform(0,1) - 0.5) + volume_impact * 0.0001
//! new_price = max(0.01, last_price * (1 + change))
//! ```
//!
//! Advances are debounced to one per simulated second so a trade-driven nudge
//! and the ambient tick cannot both move the price within the same second.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use super::indicator::{self, IndicatorSet};
use super::ohlcv::{day_ordinal, OhlcBar};
use super::universe::SymbolDef;

pub const PRICE_FLOOR: f64 = 0.01;
const VOLUME_IMPACT_FACTOR: f64 = 0.0001;
const SYNTHETIC_HISTORY_DAYS: i64 = 60;

#[derive(Debug, Clone)]
pub struct Stock {
    pub symbol: String,
    pub name: String,
    pub volatility: f64,
    pub price_history: Vec<f64>,
    pub volume_history: Vec<f64>,
    pub bars: Vec<OhlcBar>,
    pub indicators: IndicatorSet,
    last_update: DateTime<Utc>,
}

impl Stock {
    /// Create a stock seeded from collaborator-provided daily history, or a
    /// synthesized random walk when none is available.
    pub fn open(
        def: &SymbolDef,
        history: Option<Vec<OhlcBar>>,
        now: DateTime<Utc>,
        rng: &mut impl Rng,
    ) -> Self {
        let bars = match history {
            Some(bars) if !bars.is_empty() => bars,
            _ => synthesize_history(day_ordinal(now.date_naive()), rng),
        };
        let price_history: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let volume_history: Vec<f64> = bars.iter().map(|b| b.volume).collect();
        let indicators = indicator::recompute(&price_history);
        Stock {
            symbol: def.symbol.clone(),
            name: def.name.clone(),
            volatility: def.volatility,
            price_history,
            volume_history,
            bars,
            indicators,
            last_update: now,
        }
    }

    /// Rebuild a stock from persisted state. Indicators are derived, not
    /// stored, so they are recomputed here.
    pub fn from_parts(
        symbol: String,
        name: String,
        volatility: f64,
        price_history: Vec<f64>,
        volume_history: Vec<f64>,
        bars: Vec<OhlcBar>,
        now: DateTime<Utc>,
    ) -> Self {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let indicators = indicator::recompute(&closes);
        Stock {
            symbol,
            name,
            volatility,
            price_history,
            volume_history,
            bars,
            indicators,
            // A restored stock has been idle at least a second; make it
            // immediately eligible to advance.
            last_update: now - Duration::seconds(1),
        }
    }

    pub fn current_price(&self) -> f64 {
        self.price_history.last().copied().unwrap_or(0.0)
    }

    /// Close prices of the daily bars, the input series for indicators.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// The trailing `days` bars, oldest first.
    pub fn recent_bars(&self, days: usize) -> &[OhlcBar] {
        let start = self.bars.len().saturating_sub(days);
        &self.bars[start..]
    }

    /// Advance the simulation one step. Returns the new price, or `None` when
    /// debounced (less than one simulated second since the last update).
    pub fn advance(
        &mut self,
        now: DateTime<Utc>,
        rng: &mut impl Rng,
        volume_impact: f64,
    ) -> Option<f64> {
        if (now - self.last_update).num_seconds() < 1 {
            return None;
        }

        let change =
            self.volatility * (rng.gen_range(0.0..1.0) - 0.5) + volume_impact * VOLUME_IMPACT_FACTOR;
        let new_price = (self.current_price() * (1.0 + change)).max(PRICE_FLOOR);

        self.price_history.push(new_price);
        self.volume_history.push(volume_impact);
        self.last_update = now;

        let today = day_ordinal(now.date_naive());
        match self.bars.last_mut() {
            Some(bar) if bar.day == today => bar.apply_tick(new_price, volume_impact),
            _ => self.bars.push(OhlcBar::opening(today, new_price, volume_impact)),
        }

        let closes = self.closes();
        self.indicators = indicator::recompute(&closes);
        Some(new_price)
    }

    /// Blend a live quote into the simulated price: the real price nudges the
    /// current one by 10% rather than replacing it, so the simulation drifts
    /// toward reality without jumping.
    pub fn blend_quote(&mut self, real_price: f64) {
        if let Some(last) = self.price_history.last_mut() {
            *last = (*last * 0.9 + real_price * 0.1).max(PRICE_FLOOR);
        }
    }
}

/// Synthesize ~60 days of plausible OHLC history by random walk: base price in
/// [50, 500], open perturbed ±2% day over day, close ±3% from open, high/low
/// pushed up to 2% beyond the day's extreme.
fn synthesize_history(today: i64, rng: &mut impl Rng) -> Vec<OhlcBar> {
    let mut base = rng.gen_range(50.0..500.0);
    let mut bars = Vec::with_capacity(SYNTHETIC_HISTORY_DAYS as usize);
    for i in 0..SYNTHETIC_HISTORY_DAYS {
        let day = today - (SYNTHETIC_HISTORY_DAYS - i);
        let open: f64 = base * (1.0 + rng.gen_range(-0.02..0.02));
        let close: f64 = open * (1.0 + rng.gen_range(-0.03..0.03));
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.02));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.02));
        let volume = rng.gen_range(1_000_000.0..5_000_000.0);
        bars.push(OhlcBar {
            day,
            open,
            high,
            low,
            close,
            volume,
        });
        base = close;
    }
    bars
}
