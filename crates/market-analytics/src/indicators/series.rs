//! Series Normalizer
//!
//! Converts raw provider pairs into ordered `PricePoint` sequences. Input
//! order is trusted: nothing is sorted, deduplicated or interpolated.

use serde_json::Value;

use crate::model::PricePoint;

/// Convert untyped `[timestamp, value]` pairs into price points.
///
/// Rows that are not a two-element array of numbers, or whose value is not
/// finite, are dropped.
pub fn normalize_pairs(raw: &[Value]) -> Vec<PricePoint> {
    let points: Vec<PricePoint> = raw.iter().filter_map(parse_pair).collect();

    let rejected = raw.len() - points.len();
    if rejected > 0 {
        tracing::debug!(rejected, accepted = points.len(), "Dropped malformed series rows");
    }

    points
}

/// Build price points from already-typed pairs
pub fn from_pairs(pairs: &[(i64, f64)]) -> Vec<PricePoint> {
    pairs
        .iter()
        .map(|&(timestamp, value)| PricePoint::new(timestamp, value))
        .collect()
}

/// Closing values in input order
pub fn closes(points: &[PricePoint]) -> Vec<f64> {
    points.iter().map(|p| p.value).collect()
}

#[allow(clippy::cast_possible_truncation)]
fn parse_pair(row: &Value) -> Option<PricePoint> {
    let pair = row.as_array()?;
    if pair.len() != 2 {
        return None;
    }

    let timestamp = match pair[0].as_i64() {
        Some(ts) => ts,
        None => {
            let ts = pair[0].as_f64()?;
            if !ts.is_finite() {
                return None;
            }
            ts as i64
        }
    };

    let value = pair[1].as_f64()?;
    value.is_finite().then(|| PricePoint::new(timestamp, value))
}
