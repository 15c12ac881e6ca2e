//! Simple moving average.
//!
//! Warmup: the first `period - 1` points are invalid (not enough closes to
//! fill the window).

use crate::domain::indicator::{IndicatorKind, IndicatorPoint, IndicatorSeries};

pub fn calculate_sma(closes: &[f64], period: usize) -> IndicatorSeries {
    let kind = IndicatorKind::Sma(period);
    if period == 0 {
        return IndicatorSeries {
            kind,
            points: closes.iter().map(|_| IndicatorPoint::invalid()).collect(),
        };
    }

    let mut points = Vec::with_capacity(closes.len());
    let mut window_sum = 0.0;

    for (i, &close) in closes.iter().enumerate() {
        window_sum += close;
        if i >= period {
            window_sum -= closes[i - period];
        }
        if i + 1 >= period {
            points.push(IndicatorPoint::at(window_sum / period as f64));
        } else {
            points.push(IndicatorPoint::invalid());
        }
    }

    IndicatorSeries { kind, points }
}
