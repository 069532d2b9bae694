//! Domain Models
//!
//! Core data types for market data and derived indicator series.
//! Prices, market caps and volumes are `rust_decimal` values; ratios and
//! indicator outputs are `f64`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::MarketError;

/// A catalog entry as listed by the market-data provider
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinListing {
    /// Provider identifier (e.g., "bitcoin")
    pub id: String,

    /// Ticker symbol (e.g., "BTC")
    pub symbol: String,

    /// Display name (e.g., "Bitcoin")
    pub name: String,
}

/// A tracked cryptocurrency with its current market snapshot
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Asset {
    /// Provider identifier (e.g., "bitcoin")
    pub id: String,

    /// Ticker symbol (e.g., "BTC", "ETH")
    pub symbol: String,

    /// Full name (e.g., "Bitcoin", "Ethereum")
    pub name: String,

    /// Icon URL
    pub image: Option<String>,

    /// Current price in the quote currency
    pub price_usd: Decimal,

    /// Market capitalization
    pub market_cap: Option<Decimal>,

    /// 24-hour traded volume
    pub total_volume: Option<Decimal>,

    /// 24-hour price change percentage (10.0 means +10%)
    pub change_24h: Option<f64>,

    /// Last snapshot update
    pub updated_at: DateTime<Utc>,
}

impl Asset {
    pub fn new(
        id: impl Into<String>,
        symbol: impl Into<String>,
        name: impl Into<String>,
        price_usd: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            symbol: symbol.into().to_uppercase(),
            name: name.into(),
            image: None,
            price_usd,
            market_cap: None,
            total_volume: None,
            change_24h: None,
            updated_at: Utc::now(),
        }
    }

    pub fn with_change_24h(mut self, change: f64) -> Self {
        self.change_24h = Some(change);
        self
    }

    pub fn with_market_cap(mut self, market_cap: Decimal) -> Self {
        self.market_cap = Some(market_cap);
        self
    }
}

/// A single `(timestamp, value)` sample of a provider series
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Epoch milliseconds
    pub timestamp: i64,
    pub value: f64,
}

impl PricePoint {
    pub const fn new(timestamp: i64, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// A derived indicator value, stamped with the last input sample of its window
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndicatorPoint {
    /// Epoch milliseconds
    pub timestamp: i64,
    pub value: f64,
}

impl IndicatorPoint {
    pub const fn new(timestamp: i64, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Plot-ready point for the rendering target
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub x: f64,
    pub y: f64,
}

impl From<&PricePoint> for ChartPoint {
    #[allow(clippy::cast_precision_loss)]
    fn from(p: &PricePoint) -> Self {
        Self { x: p.timestamp as f64, y: p.value }
    }
}

impl From<&IndicatorPoint> for ChartPoint {
    #[allow(clippy::cast_precision_loss)]
    fn from(p: &IndicatorPoint) -> Self {
        Self { x: p.timestamp as f64, y: p.value }
    }
}

impl From<&RiskReturnPoint> for ChartPoint {
    fn from(p: &RiskReturnPoint) -> Self {
        Self { x: p.risk_volatility, y: p.annualized_return }
    }
}

/// Convert any series into chart points
pub fn to_chart<'a, T>(series: &'a [T]) -> Vec<ChartPoint>
where
    ChartPoint: From<&'a T>,
{
    series.iter().map(ChartPoint::from).collect()
}

/// Historical window requested from the provider
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "1d")]
    Day,
    #[serde(rename = "7d")]
    Week,
    #[default]
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "90d")]
    Quarter,
    #[serde(rename = "1y")]
    Year,
}

impl Period {
    pub const ALL: [Self; 5] = [Self::Day, Self::Week, Self::Month, Self::Quarter, Self::Year];

    /// Number of days passed to the provider
    pub const fn days(self) -> u32 {
        match self {
            Self::Day => 1,
            Self::Week => 7,
            Self::Month => 30,
            Self::Quarter => 90,
            Self::Year => 365,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "1d",
            Self::Week => "7d",
            Self::Month => "30d",
            Self::Quarter => "90d",
            Self::Year => "1y",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1d" | "1" | "24h" => Ok(Self::Day),
            "7d" | "7" => Ok(Self::Week),
            "30d" | "30" => Ok(Self::Month),
            "90d" | "90" => Ok(Self::Quarter),
            "1y" | "365d" | "365" => Ok(Self::Year),
            _ => Err(MarketError::InvalidPeriod(s.to_string())),
        }
    }
}

/// Historical price, volume and market-cap series for one asset
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MarketChart {
    pub coin_id: String,
    pub period: Period,
    pub prices: Vec<PricePoint>,
    pub volumes: Vec<PricePoint>,
    pub market_caps: Vec<PricePoint>,
}

impl MarketChart {
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Most recent closing price
    pub fn last_price(&self) -> Option<f64> {
        self.prices.last().map(|p| p.value)
    }
}

/// One scatter point of the risk/return chart
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskReturnPoint {
    /// `|daily return| * sqrt(365)`, always >= 0
    pub risk_volatility: f64,

    /// `(1 + daily return)^365 - 1`
    pub annualized_return: f64,

    /// Asset label (ticker symbol)
    pub label: String,

    /// Icon reference for the chart marker
    pub icon_ref: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_asset_symbol_uppercased() {
        let asset = Asset::new("bitcoin", "btc", "Bitcoin", dec!(97500));
        assert_eq!(asset.symbol, "BTC");
        assert_eq!(asset.change_24h, None);
    }

    #[test]
    fn test_period_parsing() {
        assert_eq!("7d".parse::<Period>().unwrap(), Period::Week);
        assert_eq!("1Y".parse::<Period>().unwrap(), Period::Year);
        assert_eq!(Period::Quarter.days(), 90);
        assert!("fortnight".parse::<Period>().is_err());
    }

    #[test]
    fn test_period_serde_matches_display() {
        for period in Period::ALL {
            let json = serde_json::to_string(&period).unwrap();
            assert_eq!(json, format!("\"{period}\""));
        }
    }

    #[test]
    fn test_chart_points() {
        let series = [PricePoint::new(1_000, 1.5), PricePoint::new(2_000, 2.5)];
        let chart = to_chart(&series);
        assert_eq!(chart[1], ChartPoint { x: 2_000.0, y: 2.5 });

        let scatter = to_chart(&[RiskReturnPoint {
            risk_volatility: 0.5,
            annualized_return: -0.25,
            label: "BTC".into(),
            icon_ref: String::new(),
        }]);
        assert_eq!(scatter, vec![ChartPoint { x: 0.5, y: -0.25 }]);
    }
}
