//! # market-analytics
//!
//! Market data models, technical indicators and dashboard state for the
//! crypto market dashboard.
//!
//! ## Data flow
//!
//! ```text
//! ┌──────────────────┐   raw pairs   ┌────────────┐  PricePoint[]  ┌──────────────────┐
//! │ MarketDataProvider│─────────────▶│ normalizer │───────────────▶│ SMA 20 / SMA 50  │
//! │ (CoinGecko, mock) │               └────────────┘        │       │ RSI 14           │
//! └──────────────────┘                                      │       │ support/resist.  │
//!          │ snapshot                                        │       └──────────────────┘
//!          ▼                                                 ▼
//! ┌──────────────────┐                              ┌──────────────────┐
//! │ risk / return     │                              │ TechnicalSnapshot│
//! │ projector         │                              │ → {x, y} charts  │
//! └──────────────────┘                              └──────────────────┘
//! ```
//!
//! Every indicator engine is a pure function: empty or short input gives an
//! empty series (or `None`), never an error.

pub mod dashboard;
pub mod error;
pub mod favorites;
pub mod indicators;
pub mod market;
pub mod model;

pub use dashboard::{Action, Dashboard, Effect, RequestTag, Selection, Theme};
pub use error::{MarketError, Result};
pub use favorites::{Favorites, FavoritesStore, JsonFileStore, MemoryStore};
pub use indicators::{TechnicalChart, TechnicalSnapshot};
pub use market::{CoinGeckoClient, CoinGeckoConfig, MarketDataProvider, MockMarketData};
pub use model::{
    Asset, ChartPoint, CoinListing, IndicatorPoint, MarketChart, Period, PricePoint,
    RiskReturnPoint,
};
