//! Market Data Providers
//!
//! Abstractions and implementations for public market-data APIs.

mod coingecko;
mod mock;

pub use coingecko::{CoinGeckoClient, CoinGeckoConfig};
pub use mock::MockMarketData;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{Asset, CoinListing, MarketChart, Period};

/// Market-data provider trait (Strategy pattern)
///
/// Implementations convert untyped feed data into typed models at this
/// boundary; nothing untyped travels further inward.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Full asset catalog
    async fn list_coins(&self) -> Result<Vec<CoinListing>>;

    /// Current price, market cap, volume and 24h change for the top assets
    async fn market_snapshot(&self) -> Result<Vec<Asset>>;

    /// Price, volume and market-cap history for one asset
    async fn market_chart(&self, coin_id: &str, period: Period) -> Result<MarketChart>;

    /// Snapshot entry for one asset
    async fn asset(&self, coin_id: &str) -> Result<Asset> {
        self.market_snapshot()
            .await?
            .into_iter()
            .find(|a| a.id == coin_id)
            .ok_or_else(|| crate::error::MarketError::UnknownAsset(coin_id.to_string()))
    }

    /// Check if the provider is reachable
    async fn health_check(&self) -> bool;

    /// Provider name
    fn name(&self) -> &str;
}
