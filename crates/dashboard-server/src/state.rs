//! Application State

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use tokio::sync::Mutex;

use insight_core::{LlmProvider, RiskAnalyst};
use market_analytics::{
    Action, Asset, Dashboard, Effect, FavoritesStore, MarketDataProvider, MarketError,
    MockMarketData,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Live market data (CoinGecko or mock)
    pub market: Arc<dyn MarketDataProvider>,

    /// Deterministic history for the AI variant
    pub mock: Arc<MockMarketData>,

    /// Text-generation backend (Ollama, etc.)
    pub insight: Arc<dyn LlmProvider>,

    /// Risk/return narrative built on `insight`
    pub analyst: Arc<RiskAnalyst>,

    /// Favorite ids, read at startup and written on every change
    pub favorites: Arc<dyn FavoritesStore>,

    /// Dashboard state; only held while applying an action
    pub dashboard: Arc<Mutex<Dashboard>>,
}

impl AppState {
    /// Apply one action and return the effects it requested
    pub async fn dispatch(&self, action: Action) -> Vec<Effect> {
        let mut guard = self.dashboard.lock().await;
        let (next, effects) = std::mem::take(&mut *guard).update(action);
        *guard = next;
        effects
    }

    /// Add or remove a favorite and return the resulting list.
    ///
    /// The new list is written to the store before the dashboard takes it, so
    /// a failed save leaves both unchanged. A no-op when the id is already in
    /// the requested state.
    pub async fn set_favorite(
        &self,
        coin_id: &str,
        favorite: bool,
    ) -> Result<Vec<String>, MarketError> {
        let mut guard = self.dashboard.lock().await;
        if guard.favorites().contains(coin_id) != favorite {
            let toggle = Action::ToggleFavorite(coin_id.to_string());
            let (next, effects) = guard.clone().update(toggle);
            for effect in effects {
                if let Effect::PersistFavorites(ids) = effect {
                    self.favorites.save(&ids)?;
                }
            }
            *guard = next;
        }
        Ok(guard.favorites().ids().to_vec())
    }

    /// Run effects until none are left.
    ///
    /// History fetches happen without the dashboard lock held. A fetch whose
    /// tag was superseded before it started is skipped; one superseded while
    /// in flight is dropped by the dashboard when it lands.
    pub async fn run_effects(&self, effects: Vec<Effect>) -> Result<(), MarketError> {
        let mut queue: VecDeque<Effect> = effects.into();

        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::FetchHistory(tag) => {
                    if !self.dashboard.lock().await.is_current(&tag) {
                        tracing::debug!(generation = tag.generation, "Skipping superseded history fetch");
                        continue;
                    }

                    let result = self
                        .market
                        .market_chart(&tag.selection.coin_id, tag.selection.period)
                        .await;

                    let action = match result {
                        Ok(chart) => Action::HistoryLoaded { tag, chart },
                        Err(e) => {
                            tracing::warn!(coin = %tag.selection.coin_id, "History fetch failed: {}", e);
                            Action::HistoryFailed { tag, message: e.user_message() }
                        }
                    };
                    queue.extend(self.dispatch(action).await);
                }
                Effect::PersistFavorites(ids) => {
                    self.favorites.save(&ids)?;
                }
            }
        }

        Ok(())
    }

    /// Fetch catalog and snapshot concurrently and load the joined assets
    pub async fn load_markets(&self) -> Result<Vec<Asset>, MarketError> {
        let fetched = tokio::try_join!(self.market.list_coins(), self.market.market_snapshot());

        match fetched {
            Ok((catalog, snapshot)) => {
                let known: HashSet<&str> = catalog.iter().map(|c| c.id.as_str()).collect();
                let assets: Vec<Asset> = if known.is_empty() {
                    snapshot
                } else {
                    snapshot.into_iter().filter(|a| known.contains(a.id.as_str())).collect()
                };

                tracing::info!(catalog = catalog.len(), assets = assets.len(), "Loaded markets");
                self.dispatch(Action::MarketsLoaded(assets.clone())).await;
                Ok(assets)
            }
            Err(e) => {
                tracing::warn!(provider = self.market.name(), "Market load failed: {}", e);
                self.dispatch(Action::MarketsFailed(e.user_message())).await;
                Err(e)
            }
        }
    }
}
