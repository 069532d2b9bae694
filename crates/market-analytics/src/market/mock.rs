//! Mock Market Data
//!
//! For demos, offline runs and tests. Static snapshot prices plus a
//! deterministic synthetic history per asset.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::MarketDataProvider;
use crate::error::{MarketError, Result};
use crate::model::{Asset, CoinListing, MarketChart, Period, PricePoint};

const HOUR_MS: i64 = 3_600_000;
const DAY_MS: i64 = 24 * HOUR_MS;

/// (id, symbol, name, price, 24h change %, market cap)
type CatalogEntry = (&'static str, &'static str, &'static str, Decimal, f64, Decimal);

const CATALOG: &[CatalogEntry] = &[
    ("bitcoin", "BTC", "Bitcoin", dec!(97500), 2.5, dec!(1_930_000_000_000)),
    ("ethereum", "ETH", "Ethereum", dec!(3450), 1.8, dec!(415_000_000_000)),
    ("solana", "SOL", "Solana", dec!(195), 4.2, dec!(93_000_000_000)),
    ("cardano", "ADA", "Cardano", dec!(0.95), -1.2, dec!(33_000_000_000)),
    ("polkadot", "DOT", "Polkadot", dec!(7.20), 0.8, dec!(11_000_000_000)),
    ("chainlink", "LINK", "Chainlink", dec!(24.50), 3.1, dec!(15_400_000_000)),
    ("avalanche-2", "AVAX", "Avalanche", dec!(42.00), 5.5, dec!(17_200_000_000)),
    ("ripple", "XRP", "Ripple", dec!(2.35), 0.9, dec!(134_000_000_000)),
    ("dogecoin", "DOGE", "Dogecoin", dec!(0.38), 12.0, dec!(56_000_000_000)),
    ("litecoin", "LTC", "Litecoin", dec!(105), 1.5, dec!(7_900_000_000)),
];

/// Mock provider with static snapshot and synthetic history
pub struct MockMarketData {
    /// End of every generated history (epoch ms)
    anchor_ms: i64,

    /// Simulate an unreachable provider
    offline: bool,
}

impl Default for MockMarketData {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMarketData {
    pub fn new() -> Self {
        let now = Utc::now();
        let anchor = now.duration_trunc(TimeDelta::hours(1)).unwrap_or(now);
        Self::with_anchor(anchor)
    }

    /// Fixed history end, for reproducible output
    pub fn with_anchor(anchor: DateTime<Utc>) -> Self {
        Self { anchor_ms: anchor.timestamp_millis(), offline: false }
    }

    /// A provider whose every call fails
    pub fn offline() -> Self {
        Self { offline: true, ..Self::new() }
    }

    fn ensure_online(&self) -> Result<()> {
        if self.offline {
            return Err(MarketError::Provider("mock provider is offline".into()));
        }
        Ok(())
    }

    fn lookup(coin_id: &str) -> Option<&'static CatalogEntry> {
        CATALOG.iter().find(|entry| entry.0 == coin_id)
    }

    fn asset_from(entry: &CatalogEntry) -> Asset {
        let (id, symbol, name, price, change, market_cap) = *entry;
        let mut asset = Asset::new(id, symbol, name, price)
            .with_change_24h(change)
            .with_market_cap(market_cap);
        asset.total_volume = Some(market_cap / dec!(40));
        asset.image = Some(format!("/static/icons/{}.svg", symbol.to_lowercase()));
        asset
    }

    /// Deterministic synthetic history ending at the anchor.
    ///
    /// Hourly samples for one day, daily samples otherwise. The walk is seeded
    /// by the coin id, so the same id always produces the same series.
    pub fn synthetic_history(&self, coin_id: &str, base_price: f64, period: Period) -> MarketChart {
        let (samples, step_ms) = match period {
            Period::Day => (24_i64, HOUR_MS),
            other => (i64::from(other.days()), DAY_MS),
        };

        let mut rng = seeded_rng(coin_id);
        let phase = rng.gen_range(0.0..1.0) * std::f64::consts::TAU;
        let drift = (rng.gen_range(0.0..1.0) - 0.5) * 0.004;

        let mut prices = Vec::new();
        let mut volumes = Vec::new();
        let mut market_caps = Vec::new();

        for i in 0..=samples {
            let timestamp = self.anchor_ms - (samples - i) * step_ms;
            #[allow(clippy::cast_precision_loss)]
            let t = (i - samples) as f64;
            let wave = 0.06 * (t * 0.21 + phase).sin();
            let noise = (rng.gen_range(0.0..1.0) - 0.5) * 0.02;
            let value = (base_price * (1.0 + wave + drift * t + noise)).max(base_price * 0.05);

            prices.push(PricePoint::new(timestamp, value));
            volumes.push(PricePoint::new(timestamp, value * 1_000_000.0 * (1.0 + rng.gen_range(0.0..1.0))));
            market_caps.push(PricePoint::new(timestamp, value * 19_000_000.0));
        }

        MarketChart {
            coin_id: coin_id.to_string(),
            period,
            prices,
            volumes,
            market_caps,
        }
    }
}

#[async_trait]
impl MarketDataProvider for MockMarketData {
    async fn list_coins(&self) -> Result<Vec<CoinListing>> {
        self.ensure_online()?;
        Ok(CATALOG
            .iter()
            .map(|&(id, symbol, name, ..)| CoinListing {
                id: id.into(),
                symbol: symbol.to_lowercase(),
                name: name.into(),
            })
            .collect())
    }

    async fn market_snapshot(&self) -> Result<Vec<Asset>> {
        self.ensure_online()?;
        Ok(CATALOG.iter().map(Self::asset_from).collect())
    }

    async fn market_chart(&self, coin_id: &str, period: Period) -> Result<MarketChart> {
        self.ensure_online()?;
        let entry = Self::lookup(coin_id)
            .ok_or_else(|| MarketError::UnknownAsset(coin_id.to_string()))?;
        let base_price = entry.3.to_f64().unwrap_or(1.0);
        Ok(self.synthetic_history(coin_id, base_price, period))
    }

    async fn asset(&self, coin_id: &str) -> Result<Asset> {
        self.ensure_online()?;
        Self::lookup(coin_id)
            .map(Self::asset_from)
            .ok_or_else(|| MarketError::UnknownAsset(coin_id.to_string()))
    }

    async fn health_check(&self) -> bool {
        !self.offline
    }

    fn name(&self) -> &str {
        "MockMarket"
    }
}

/// Generator seeded from the coin id, so each id gets its own stable walk
fn seeded_rng(coin_id: &str) -> StdRng {
    let mut hasher = DefaultHasher::new();
    coin_id.hash(&mut hasher);
    StdRng::seed_from_u64(hasher.finish())
}
