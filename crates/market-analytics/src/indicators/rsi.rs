//! Relative Strength Index
//!
//! Rolling gain/loss accumulator over the last `window` deltas:
//!
//! ```text
//! delta[i]  = close[i] - close[i - 1]
//! gains     = sum of positive deltas in the window
//! losses    = sum of |negative deltas| in the window
//! RS        = (gains / W) / (losses / W)
//! RSI       = 100 - 100 / (1 + RS)
//! ```
//!
//! After the first `window` deltas are accumulated, every step drops the
//! delta exactly `window` positions behind and adds the new one, so each
//! emission costs O(1).
//!
//! Degenerate windows never divide by zero: a window with gains and no losses
//! reads exactly 100, and a perfectly flat window reads 0 (`RS = 0 / 1`).

use serde::{Deserialize, Serialize};

use crate::model::{IndicatorPoint, PricePoint};

pub const DEFAULT_RSI_WINDOW: usize = 14;

/// Compute the RSI series.
///
/// Emits one point per input index from `window` to the end, stamped with
/// that sample's timestamp. Fewer than `window + 1` samples (or a zero
/// window) yields an empty vec.
pub fn rsi(points: &[PricePoint], window: usize) -> Vec<IndicatorPoint> {
    if window == 0 || points.len() < window + 1 {
        return Vec::new();
    }

    let mut acc = GainLossWindow::default();
    for i in 1..=window {
        acc.push(delta(points, i));
    }

    let mut out = Vec::with_capacity(points.len() - window);
    out.push(IndicatorPoint::new(points[window].timestamp, acc.rsi(window)));

    for i in (window + 1)..points.len() {
        acc.pop(delta(points, i - window));
        acc.push(delta(points, i));
        out.push(IndicatorPoint::new(points[i].timestamp, acc.rsi(window)));
    }

    out
}

/// Market zone for an RSI reading
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RsiZone {
    Overbought,
    Oversold,
    Neutral,
}

impl RsiZone {
    pub fn classify(value: f64) -> Self {
        if value >= 70.0 {
            Self::Overbought
        } else if value <= 30.0 {
            Self::Oversold
        } else {
            Self::Neutral
        }
    }
}

/// Zone of the latest RSI value, if any
pub fn latest_zone(series: &[IndicatorPoint]) -> Option<RsiZone> {
    series.last().map(|p| RsiZone::classify(p.value))
}

#[inline]
fn delta(points: &[PricePoint], i: usize) -> f64 {
    points[i].value - points[i - 1].value
}

#[derive(Default)]
struct GainLossWindow {
    gains: f64,
    losses: f64,
}

impl GainLossWindow {
    fn push(&mut self, delta: f64) {
        if delta > 0.0 {
            self.gains += delta;
        } else if delta < 0.0 {
            self.losses -= delta;
        }
    }

    // Clamped so float residue never turns an empty side negative.
    fn pop(&mut self, delta: f64) {
        if delta > 0.0 {
            self.gains = (self.gains - delta).max(0.0);
        } else if delta < 0.0 {
            self.losses = (self.losses + delta).max(0.0);
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn rsi(&self, window: usize) -> f64 {
        let w = window as f64;
        rsi_from_averages(self.gains / w, self.losses / w)
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        // Flat window keeps the substituted divisor: RS = 0 / 1.
        return if avg_gain > 0.0 { 100.0 } else { 0.0 };
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn series(values: &[f64]) -> Vec<PricePoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| PricePoint::new(i as i64 * 60_000, v))
            .collect()
    }

    /// O(W) recomputation of every window
    fn naive_rsi(values: &[f64], window: usize) -> Vec<f64> {
        if window == 0 || values.len() < window + 1 {
            return Vec::new();
        }
        (window..values.len())
            .map(|i| {
                let (mut gains, mut losses) = (0.0, 0.0);
                for j in (i + 1 - window)..=i {
                    let d = values[j] - values[j - 1];
                    if d > 0.0 {
                        gains += d;
                    } else {
                        losses -= d;
                    }
                }
                rsi_from_averages(gains / window as f64, losses / window as f64)
            })
            .collect()
    }

    #[test]
    fn test_rsi_empty_and_short_inputs() {
        assert!(rsi(&[], 14).is_empty());
        let fourteen = series(&(1..=14).map(f64::from).collect::<Vec<_>>());
        assert!(rsi(&fourteen, 14).is_empty());
        assert!(rsi(&series(&[1.0, 2.0, 3.0]), 0).is_empty());
    }

    #[test]
    fn test_rsi_output_alignment() {
        let values: Vec<f64> = (0..30).map(|i| f64::from(i % 7)).collect();
        let points = series(&values);
        let out = rsi(&points, 14);

        assert_eq!(out.len(), 30 - 14);
        assert_eq!(out[0].timestamp, points[14].timestamp);
        assert_eq!(out.last().unwrap().timestamp, points[29].timestamp);
    }

    #[test]
    fn test_rsi_all_gains_is_exactly_100() {
        let values: Vec<f64> = (0..40).map(|i| 100.0 + f64::from(i) * 0.37).collect();
        let out = rsi(&series(&values), 14);

        assert!(!out.is_empty());
        for point in &out {
            assert_eq!(point.value, 100.0);
        }
    }

    #[test]
    fn test_rsi_all_losses_is_zero() {
        let values: Vec<f64> = (0..20).map(|i| 50.0 - f64::from(i)).collect();
        for point in rsi(&series(&values), 14) {
            assert_eq!(point.value, 0.0);
        }
    }

    #[test]
    fn test_rsi_flat_price_reads_zero() {
        // No gains and no losses: RS = 0 / 1, so RSI is 0 rather than 50.
        let out = rsi(&series(&[42.0; 20]), 14);
        assert_eq!(out.len(), 6);
        assert!(out.iter().all(|p| p.value == 0.0));
    }

    #[test]
    fn test_rsi_balanced_window_is_50() {
        let values: Vec<f64> = (0..15).map(|i| if i % 2 == 0 { 10.0 } else { 11.0 }).collect();
        let out = rsi(&series(&values), 14);
        assert_eq!(out.len(), 1);
        assert!((out[0].value - 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_rsi_spike_leaves_window_after_exactly_w_steps() {
        let window = 14;
        let spike_index = 20;
        let values: Vec<f64> = (0..60)
            .map(|i| if i < spike_index { 100.0 } else { 150.0 })
            .collect();
        let out = rsi(&series(&values), window);

        // out[k] corresponds to input index k + window.
        for (k, point) in out.iter().enumerate() {
            let i = k + window;
            let spike_in_window = (spike_index..spike_index + window).contains(&i);
            let expected = if spike_in_window { 100.0 } else { 0.0 };
            assert_eq!(point.value, expected, "input index {i}");
        }

        let naive = naive_rsi(&values, window);
        let incremental: Vec<f64> = out.iter().map(|p| p.value).collect();
        assert_eq!(incremental, naive);
    }

    #[test]
    fn test_rsi_is_deterministic() {
        let values: Vec<f64> = (0..80).map(|i| (f64::from(i) * 0.7).sin() * 10.0 + 50.0).collect();
        let points = series(&values);
        let a = rsi(&points, 14);
        let b = rsi(&points, 14);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.value.to_bits(), y.value.to_bits());
        }
    }

    #[test]
    fn test_zone_classification() {
        assert_eq!(RsiZone::classify(75.0), RsiZone::Overbought);
        assert_eq!(RsiZone::classify(30.0), RsiZone::Oversold);
        assert_eq!(RsiZone::classify(50.0), RsiZone::Neutral);
        assert_eq!(latest_zone(&[]), None);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        // Integer-valued closes keep every sum exact, so the sliding update
        // must match the full recomputation bit for bit.
        #[test]
        fn prop_incremental_matches_naive_exact(
            values in prop::collection::vec(0u16..500, 0..160),
            window in 1usize..30,
        ) {
            let values: Vec<f64> = values.into_iter().map(f64::from).collect();
            let incremental: Vec<f64> = rsi(&series(&values), window).iter().map(|p| p.value).collect();
            prop_assert_eq!(incremental, naive_rsi(&values, window));
        }

        #[test]
        fn prop_incremental_matches_naive_float(
            values in prop::collection::vec(1.0f64..1_000.0, 15..200),
        ) {
            let incremental = rsi(&series(&values), DEFAULT_RSI_WINDOW);
            let naive = naive_rsi(&values, DEFAULT_RSI_WINDOW);
            prop_assert_eq!(incremental.len(), naive.len());
            for (got, want) in incremental.iter().zip(&naive) {
                prop_assert!((got.value - want).abs() < 1e-6, "{} vs {}", got.value, want);
                prop_assert!((0.0..=100.0).contains(&got.value));
            }
        }
    }
}
