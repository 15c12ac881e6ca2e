//! RSI (Relative Strength Index) over a simple rolling mean.
//!
//! Average gain/loss are plain arithmetic means over the trailing `period`
//! price deltas (not Wilder's smoothing):
//!
//! - `gain[i]` = mean of `max(delta, 0)` over deltas `i-period+1 ..= i`
//! - `loss[i]` = mean of `max(-delta, 0)` over the same window
//! - `RSI = 100 - 100 / (1 + gain / loss)`, with `loss == 0` clamped to 100
//!
//! Warmup: a point is valid once `period` deltas exist, i.e. from close index
//! `period` onward. Output is always within [0, 100].

use crate::domain::indicator::{IndicatorKind, IndicatorPoint, IndicatorSeries};

pub fn calculate_rsi(closes: &[f64], period: usize) -> IndicatorSeries {
    let kind = IndicatorKind::Rsi(period);
    if period == 0 || closes.len() < 2 {
        return IndicatorSeries {
            kind,
            points: closes.iter().map(|_| IndicatorPoint::invalid()).collect(),
        };
    }

    let mut gains = Vec::with_capacity(closes.len() - 1);
    let mut losses = Vec::with_capacity(closes.len() - 1);
    for pair in closes.windows(2) {
        let delta = pair[1] - pair[0];
        gains.push(delta.max(0.0));
        losses.push((-delta).max(0.0));
    }

    let mut points = Vec::with_capacity(closes.len());
    for i in 0..closes.len() {
        // Delta j covers the move into close j+1; close i needs deltas
        // i-period .. i, which only exist once i >= period.
        if i < period {
            points.push(IndicatorPoint::invalid());
            continue;
        }
        let window = &gains[i - period..i];
        let avg_gain = window.iter().sum::<f64>() / period as f64;
        let avg_loss = losses[i - period..i].iter().sum::<f64>() / period as f64;

        let rsi = if avg_loss == 0.0 {
            100.0
        } else {
            100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
        };
        points.push(IndicatorPoint::at(rsi));
    }

    IndicatorSeries { kind, points }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rsi_empty_closes() {
        let series = calculate_rsi(&[], 14);
        assert!(series.points.is_empty());
    }

    #[test]
    fn rsi_single_close() {
        let series = calculate_rsi(&[100.0], 14);
        assert_eq!(series.points.len(), 1);
        assert!(!series.points[0].valid);
    }

    #[test]
    fn rsi_warmup_period() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + (i % 5) as f64).collect();
        let series = calculate_rsi(&closes, 14);
        for i in 0..14 {
            assert!(!series.points[i].valid, "index {} should be warming up", i);
        }
        for i in 14..20 {
            assert!(series.points[i].valid, "index {} should be valid", i);
        }
    }

    #[test]
    fn rsi_all_gains_is_100() {
        let closes: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        let series = calculate_rsi(&closes, 14);
        let rsi = series.points[14];
        assert!(rsi.valid);
        assert!((rsi.value - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rsi_all_losses_is_0() {
        let closes: Vec<f64> = (0..15).map(|i| 100.0 - i as f64).collect();
        let series = calculate_rsi(&closes, 14);
        let rsi = series.points[14];
        assert!(rsi.valid);
        assert!(rsi.value.abs() < f64::EPSILON);
    }

    #[test]
    fn rsi_flat_series_is_100() {
        // No movement at all: zero losses, clamp applies.
        let closes = [100.0; 20];
        let series = calculate_rsi(&closes, 14);
        assert!((series.points[14].value - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rsi_balanced_moves_is_50() {
        // Alternating +1/-1 deltas: avg gain == avg loss, RS = 1, RSI = 50.
        let closes: Vec<f64> = (0..21)
            .map(|i| if i % 2 == 0 { 100.0 } else { 101.0 })
            .collect();
        let series = calculate_rsi(&closes, 14);
        let rsi = series.points[20];
        assert!(rsi.valid);
        assert!((rsi.value - 50.0).abs() < 1e-9);
    }

    #[test]
    fn rsi_zero_period_all_invalid() {
        let series = calculate_rsi(&[100.0, 101.0, 102.0], 0);
        assert!(series.points.iter().all(|p| !p.valid));
    }

    proptest! {
        #[test]
        fn rsi_always_within_bounds(closes in proptest::collection::vec(0.01f64..10_000.0, 2..80)) {
            let series = calculate_rsi(&closes, 14);
            for point in &series.points {
                if point.valid {
                    prop_assert!(point.value >= 0.0);
                    prop_assert!(point.value <= 100.0);
                }
            }
        }
    }
}
