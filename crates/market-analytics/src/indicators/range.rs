//! Support / Resistance Range Extractor

use serde::{Deserialize, Serialize};

use crate::model::PricePoint;

/// Number of most recent samples considered
pub const RANGE_WINDOW: usize = 90;

/// Trailing-window price range
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    /// Lowest close in the window
    pub support: f64,

    /// Highest close in the window
    pub resistance: f64,
}

/// Min and max over the last `RANGE_WINDOW` closes (fewer if the series is
/// shorter). `None` for an empty series.
pub fn support_resistance(points: &[PricePoint]) -> Option<PriceRange> {
    trailing_range(points, RANGE_WINDOW)
}

/// Min and max over the last `window` closes
pub fn trailing_range(points: &[PricePoint], window: usize) -> Option<PriceRange> {
    let start = points.len().saturating_sub(window);
    let mut tail = points[start..].iter().map(|p| p.value);

    let first = tail.next()?;
    let (support, resistance) = tail.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));

    Some(PriceRange { support, resistance })
}
