//! Simple Moving Average

use crate::model::{IndicatorPoint, PricePoint};

/// Unweighted mean of `window` consecutive closes.
///
/// Output has `len - window + 1` points, each stamped with the timestamp of
/// the last sample in its window. A window of zero or one longer than the
/// series yields an empty vec.
#[allow(clippy::cast_precision_loss)]
pub fn sma(points: &[PricePoint], window: usize) -> Vec<IndicatorPoint> {
    if window == 0 || window > points.len() {
        return Vec::new();
    }

    let divisor = window as f64;
    points
        .windows(window)
        .map(|w| {
            let sum: f64 = w.iter().map(|p| p.value).sum();
            let last = &w[window - 1];
            IndicatorPoint::new(last.timestamp, sum / divisor)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::series::from_pairs;
    use proptest::prelude::*;

    fn series(values: &[f64]) -> Vec<PricePoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| PricePoint::new(i as i64 * 1_000, v))
            .collect()
    }

    #[test]
    fn test_sma_hand_computed() {
        let points = series(&[2.0, 4.0, 6.0, 8.0, 10.0]);
        let out = sma(&points, 3);

        assert_eq!(
            out,
            vec![
                IndicatorPoint::new(2_000, 4.0),
                IndicatorPoint::new(3_000, 6.0),
                IndicatorPoint::new(4_000, 8.0),
            ]
        );
    }

    #[test]
    fn test_sma_window_equals_length() {
        let points = series(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(sma(&points, 5), vec![IndicatorPoint::new(4_000, 3.0)]);
    }

    #[test]
    fn test_sma_window_too_large_is_empty() {
        let points = series(&[1.0, 2.0]);
        assert!(sma(&points, 3).is_empty());
        assert!(sma(&points, 0).is_empty());
        assert!(sma(&[], 20).is_empty());
    }

    #[test]
    fn test_sma_uses_input_timestamps() {
        let points = from_pairs(&[(10, 1.0), (25, 3.0), (90, 5.0)]);
        let out = sma(&points, 2);
        assert_eq!(out[0].timestamp, 25);
        assert_eq!(out[1].timestamp, 90);
    }

    proptest! {
        #[test]
        fn prop_sma_length_and_mean(
            values in prop::collection::vec(-1_000.0f64..1_000.0, 0..120),
            window in 1usize..30,
        ) {
            let points = series(&values);
            let out = sma(&points, window);

            prop_assert_eq!(out.len(), (values.len() + 1).saturating_sub(window));
            for (i, point) in out.iter().enumerate() {
                let expected: f64 = values[i..i + window].iter().sum::<f64>() / window as f64;
                prop_assert!((point.value - expected).abs() <= 1e-9);
                prop_assert_eq!(point.timestamp, points[i + window - 1].timestamp);
            }
        }
    }
}
