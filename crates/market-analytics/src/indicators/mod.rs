//! Technical Indicators
//!
//! Pure functions over price series. Every engine accepts an empty or short
//! series and answers with an empty vec (or `None`) instead of an error.

pub mod series;
mod sma;
mod rsi;
mod range;
mod risk_return;
mod crossover;
mod snapshot;

pub use sma::sma;
pub use rsi::{latest_zone, rsi, RsiZone, DEFAULT_RSI_WINDOW};
pub use range::{support_resistance, trailing_range, PriceRange, RANGE_WINDOW};
pub use risk_return::{annualize, project_risk_return};
pub use crossover::{crossovers, CrossDirection, Crossover};
pub use snapshot::{TechnicalChart, TechnicalSnapshot, LONG_SMA_WINDOW, SHORT_SMA_WINDOW};
