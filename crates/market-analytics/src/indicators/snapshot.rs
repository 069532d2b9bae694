//! Technical Snapshot
//!
//! Aggregate of every indicator the dashboard charts for one price series.

use serde::{Deserialize, Serialize};

use super::crossover::{crossovers, Crossover};
use super::range::support_resistance;
use super::rsi::{rsi, DEFAULT_RSI_WINDOW};
use super::sma::sma;
use crate::model::{to_chart, ChartPoint, IndicatorPoint, PricePoint};

pub const SHORT_SMA_WINDOW: usize = 20;
pub const LONG_SMA_WINDOW: usize = 50;

/// Indicators derived from one price series.
///
/// Recomputed in full whenever the input changes; never updated in place.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TechnicalSnapshot {
    pub sma20: Vec<IndicatorPoint>,
    pub sma50: Vec<IndicatorPoint>,
    pub rsi14: Vec<IndicatorPoint>,
    pub support: Option<f64>,
    pub resistance: Option<f64>,
}

impl TechnicalSnapshot {
    pub fn compute(points: &[PricePoint]) -> Self {
        let range = support_resistance(points);
        Self {
            sma20: sma(points, SHORT_SMA_WINDOW),
            sma50: sma(points, LONG_SMA_WINDOW),
            rsi14: rsi(points, DEFAULT_RSI_WINDOW),
            support: range.map(|r| r.support),
            resistance: range.map(|r| r.resistance),
        }
    }

    /// SMA20 / SMA50 crossings
    pub fn crossovers(&self) -> Vec<Crossover> {
        crossovers(&self.sma20, &self.sma50)
    }

    pub fn is_empty(&self) -> bool {
        self.sma20.is_empty() && self.rsi14.is_empty() && self.support.is_none()
    }

    /// `{x, y}` form for the rendering target
    pub fn to_chart(&self) -> TechnicalChart {
        TechnicalChart {
            sma20: to_chart(&self.sma20),
            sma50: to_chart(&self.sma50),
            rsi14: to_chart(&self.rsi14),
            support: self.support,
            resistance: self.resistance,
            crossovers: self.crossovers(),
        }
    }
}

/// Plot-ready technical snapshot
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TechnicalChart {
    pub sma20: Vec<ChartPoint>,
    pub sma50: Vec<ChartPoint>,
    pub rsi14: Vec<ChartPoint>,
    pub support: Option<f64>,
    pub resistance: Option<f64>,
    pub crossovers: Vec<Crossover>,
}
