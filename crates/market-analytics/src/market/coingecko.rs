//! CoinGecko Market Data Client
//!
//! REST client for the public CoinGecko v3 API. Feed rows are validated one
//! by one: a malformed row is dropped, it never fails the whole response.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{header, StatusCode};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use super::MarketDataProvider;
use crate::error::{MarketError, Result};
use crate::indicators::series::normalize_pairs;
use crate::model::{Asset, CoinListing, MarketChart, Period};

const API_KEY_HEADER: &str = "x-cg-demo-api-key";

/// CoinGecko client configuration
#[derive(Clone, Debug)]
pub struct CoinGeckoConfig {
    /// API root (no trailing slash)
    pub base_url: String,

    /// Optional demo/pro API key
    pub api_key: Option<String>,

    /// Quote currency for prices
    pub vs_currency: String,

    /// Number of assets in the market snapshot
    pub page_size: u32,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for CoinGeckoConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.coingecko.com/api/v3".into(),
            api_key: None,
            vs_currency: "usd".into(),
            page_size: 50,
            timeout_secs: 15,
        }
    }
}

impl CoinGeckoConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            base_url: std::env::var("COINGECKO_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            api_key: std::env::var("COINGECKO_API_KEY").ok().filter(|k| !k.is_empty()),
            vs_currency: std::env::var("VS_CURRENCY").unwrap_or(defaults.vs_currency),
            page_size: std::env::var("MARKET_PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.page_size),
            timeout_secs: std::env::var("MARKET_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout_secs),
        }
    }
}

/// CoinGecko REST client
pub struct CoinGeckoClient {
    http: reqwest::Client,
    config: CoinGeckoConfig,
}

impl CoinGeckoClient {
    pub fn new(config: CoinGeckoConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        if let Some(key) = &config.api_key {
            let value = header::HeaderValue::from_str(key)
                .map_err(|e| MarketError::Config(format!("invalid API key header: {e}")))?;
            headers.insert(API_KEY_HEADER, value);
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self { http, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(CoinGeckoConfig::from_env())
    }

    pub fn config(&self) -> &CoinGeckoConfig {
        &self.config
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.config.base_url, path);
        tracing::debug!(%url, "CoinGecko request");

        let response = self.http.get(&url).query(query).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(MarketError::UnknownAsset(path.to_string()));
        }
        if !status.is_success() {
            return Err(MarketError::Http {
                status: status.as_u16(),
                endpoint: path.to_string(),
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl MarketDataProvider for CoinGeckoClient {
    async fn list_coins(&self) -> Result<Vec<CoinListing>> {
        let rows: Vec<Value> = self.get_json("/coins/list", &[]).await?;
        Ok(parse_listings(rows))
    }

    async fn market_snapshot(&self) -> Result<Vec<Asset>> {
        let query = [
            ("vs_currency", self.config.vs_currency.clone()),
            ("order", "market_cap_desc".to_string()),
            ("per_page", self.config.page_size.to_string()),
            ("page", "1".to_string()),
            ("sparkline", "false".to_string()),
            ("price_change_percentage", "24h".to_string()),
        ];
        let rows: Vec<Value> = self.get_json("/coins/markets", &query).await?;
        Ok(parse_market_rows(rows))
    }

    async fn market_chart(&self, coin_id: &str, period: Period) -> Result<MarketChart> {
        let path = format!("/coins/{coin_id}/market_chart");
        let query = [
            ("vs_currency", self.config.vs_currency.clone()),
            ("days", period.days().to_string()),
        ];

        let raw: RawMarketChart = self
            .get_json(&path, &query)
            .await
            .map_err(|e| match e {
                MarketError::UnknownAsset(_) => MarketError::UnknownAsset(coin_id.to_string()),
                other => other,
            })?;

        Ok(MarketChart {
            coin_id: coin_id.to_string(),
            period,
            prices: normalize_pairs(&raw.prices),
            volumes: normalize_pairs(&raw.total_volumes),
            market_caps: normalize_pairs(&raw.market_caps),
        })
    }

    async fn health_check(&self) -> bool {
        match self.get_json::<Value>("/ping", &[]).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("CoinGecko health check failed: {}", e);
                false
            }
        }
    }

    fn name(&self) -> &str {
        "CoinGecko"
    }
}

// ============================================================================
// Feed schema
// ============================================================================

#[derive(Debug, Default, Deserialize)]
struct RawMarketChart {
    #[serde(default)]
    prices: Vec<Value>,
    #[serde(default)]
    market_caps: Vec<Value>,
    #[serde(default)]
    total_volumes: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RawMarketRow {
    id: String,
    symbol: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    current_price: Option<f64>,
    #[serde(default)]
    market_cap: Option<f64>,
    #[serde(default)]
    total_volume: Option<f64>,
    #[serde(default)]
    price_change_percentage_24h: Option<f64>,
    #[serde(default)]
    last_updated: Option<DateTime<Utc>>,
}

fn parse_listings(rows: Vec<Value>) -> Vec<CoinListing> {
    let total = rows.len();
    let listings: Vec<CoinListing> = rows
        .into_iter()
        .filter_map(|row| serde_json::from_value::<CoinListing>(row).ok())
        .collect();

    if listings.len() < total {
        tracing::debug!(rejected = total - listings.len(), "Dropped malformed catalog rows");
    }
    listings
}

fn parse_market_rows(rows: Vec<Value>) -> Vec<Asset> {
    let total = rows.len();
    let assets: Vec<Asset> = rows
        .into_iter()
        .filter_map(|row| serde_json::from_value::<RawMarketRow>(row).ok())
        .filter_map(RawMarketRow::into_asset)
        .collect();

    if assets.len() < total {
        tracing::debug!(rejected = total - assets.len(), "Dropped malformed market rows");
    }
    assets
}

fn to_decimal(value: Option<f64>) -> Option<Decimal> {
    value.filter(|v| v.is_finite()).and_then(Decimal::from_f64)
}

impl RawMarketRow {
    /// Rows without a usable price are rejected; optional fields default to absent.
    fn into_asset(self) -> Option<Asset> {
        let price = to_decimal(self.current_price)?;
        let name = self.name.unwrap_or_else(|| self.symbol.to_uppercase());

        let mut asset = Asset::new(self.id, self.symbol, name, price);
        asset.image = self.image;
        asset.market_cap = to_decimal(self.market_cap);
        asset.total_volume = to_decimal(self.total_volume);
        asset.change_24h = self.price_change_percentage_24h.filter(|c| c.is_finite());
        if let Some(updated) = self.last_updated {
            asset.updated_at = updated;
        }
        Some(asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_config_defaults() {
        let config = CoinGeckoConfig::default();
        assert_eq!(config.base_url, "https://api.coingecko.com/api/v3");
        assert_eq!(config.vs_currency, "usd");
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_parse_market_rows() {
        let rows = vec![
            json!({
                "id": "bitcoin",
                "symbol": "btc",
                "name": "Bitcoin",
                "image": "https://assets.coingecko.com/coins/images/1/large/bitcoin.png",
                "current_price": 97500.5,
                "market_cap": 1_930_000_000_000.0_f64,
                "total_volume": 25_000_000_000.0_f64,
                "price_change_percentage_24h": 2.5,
                "last_updated": "2024-12-20T10:00:00.000Z"
            }),
            json!({"id": "nulls", "symbol": "nul", "current_price": 1.25, "price_change_percentage_24h": null}),
            json!({"id": "no-price", "symbol": "np", "current_price": null}),
            json!({"symbol": "missing-id", "current_price": 3.0}),
            json!({"id": "bad-type", "symbol": "bt", "current_price": "cheap"}),
        ];

        let assets = parse_market_rows(rows);
        assert_eq!(assets.len(), 2);

        let btc = &assets[0];
        assert_eq!(btc.symbol, "BTC");
        assert_eq!(btc.price_usd, dec!(97500.5));
        assert_eq!(btc.change_24h, Some(2.5));
        assert!(btc.image.is_some());

        let nulls = &assets[1];
        assert_eq!(nulls.name, "NUL");
        assert_eq!(nulls.change_24h, None);
        assert_eq!(nulls.market_cap, None);
    }

    #[test]
    fn test_parse_listings_skips_bad_rows() {
        let rows = vec![
            json!({"id": "ethereum", "symbol": "eth", "name": "Ethereum"}),
            json!({"id": "broken"}),
        ];
        let listings = parse_listings(rows);
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].id, "ethereum");
    }

    #[test]
    fn test_raw_chart_tolerates_missing_series() {
        let raw: RawMarketChart = serde_json::from_value(json!({"prices": [[1, 2.0]]})).unwrap();
        assert_eq!(normalize_pairs(&raw.prices).len(), 1);
        assert!(raw.total_volumes.is_empty());
    }
}
