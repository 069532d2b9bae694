//! Dashboard State
//!
//! Explicit application state driven by a unidirectional update cycle:
//! `Dashboard::update(state, action) -> (state, effects)`. The caller runs the
//! returned effects (fetch history, persist favorites) and feeds results back
//! as new actions.
//!
//! Every history fetch carries the `RequestTag` in effect when it was issued.
//! A response whose tag no longer matches the current selection is dropped,
//! so a slow, superseded response can never overwrite newer state.

use serde::{Deserialize, Serialize};

use crate::favorites::Favorites;
use crate::indicators::{project_risk_return, TechnicalSnapshot};
use crate::model::{Asset, MarketChart, Period, PricePoint, RiskReturnPoint};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// The asset and period whose history is on screen
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub coin_id: String,
    pub period: Period,
}

/// Identity of one history request
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestTag {
    pub selection: Selection,
    pub generation: u64,
}

#[derive(Debug)]
pub enum Action {
    MarketsLoaded(Vec<Asset>),
    MarketsFailed(String),
    SelectAsset(String),
    SelectPeriod(Period),
    HistoryLoaded { tag: RequestTag, chart: MarketChart },
    HistoryFailed { tag: RequestTag, message: String },
    ToggleFavorite(String),
    ToggleTheme,
}

/// Side effects requested by an update
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    FetchHistory(RequestTag),
    PersistFavorites(Vec<String>),
}

/// Single-slot cache keyed by its input
#[derive(Clone, Debug)]
struct Memo<K, V> {
    key: Option<K>,
    value: Option<V>,
}

impl<K, V> Default for Memo<K, V> {
    fn default() -> Self {
        Self { key: None, value: None }
    }
}

impl<K: PartialEq, V> Memo<K, V> {
    /// Returns `true` when `compute` actually ran
    fn refresh(&mut self, key: K, compute: impl FnOnce() -> V) -> bool {
        if self.key.as_ref() == Some(&key) && self.value.is_some() {
            return false;
        }
        self.value = Some(compute());
        self.key = Some(key);
        true
    }

    fn get(&self) -> Option<&V> {
        self.value.as_ref()
    }
}

#[derive(Clone, Debug, Default)]
pub struct Dashboard {
    theme: Theme,
    favorites: Favorites,
    assets: Vec<Asset>,
    markets_error: Option<String>,
    coin_id: Option<String>,
    period: Period,
    generation: u64,
    loading: bool,
    error: Option<String>,
    chart: Option<MarketChart>,
    technicals: Memo<Vec<PricePoint>, TechnicalSnapshot>,
    risk_return: Vec<RiskReturnPoint>,
    recomputations: u64,
}

impl Dashboard {
    /// Fresh state with favorites loaded from the store
    pub fn new(favorites: Favorites) -> Self {
        Self { favorites, ..Self::default() }
    }

    /// Apply one action, returning the next state and the effects to run
    #[must_use]
    pub fn update(mut self, action: Action) -> (Self, Vec<Effect>) {
        let mut effects = Vec::new();

        match action {
            Action::MarketsLoaded(assets) => {
                self.risk_return = project_risk_return(&assets);
                self.assets = assets;
                self.markets_error = None;
            }
            Action::MarketsFailed(message) => {
                self.markets_error = Some(message);
            }
            Action::SelectAsset(coin_id) => {
                self.coin_id = Some(coin_id);
                effects.extend(self.issue_request());
            }
            Action::SelectPeriod(period) => {
                self.period = period;
                effects.extend(self.issue_request());
            }
            Action::HistoryLoaded { tag, chart } => {
                if self.is_current(&tag) {
                    self.loading = false;
                    self.error = None;
                    if self
                        .technicals
                        .refresh(chart.prices.clone(), || TechnicalSnapshot::compute(&chart.prices))
                    {
                        self.recomputations += 1;
                    }
                    self.chart = Some(chart);
                } else {
                    tracing::debug!(generation = tag.generation, coin = %tag.selection.coin_id, "Discarding stale history response");
                }
            }
            Action::HistoryFailed { tag, message } => {
                if self.is_current(&tag) {
                    self.loading = false;
                    self.error = Some(message);
                } else {
                    tracing::debug!(generation = tag.generation, "Discarding stale history failure");
                }
            }
            Action::ToggleFavorite(coin_id) => {
                self.favorites.toggle(&coin_id);
                effects.push(Effect::PersistFavorites(self.favorites.ids().to_vec()));
            }
            Action::ToggleTheme => {
                self.theme = self.theme.toggled();
            }
        }

        (self, effects)
    }

    fn issue_request(&mut self) -> Option<Effect> {
        let tag = self.bump()?;
        self.loading = true;
        self.error = None;
        Some(Effect::FetchHistory(tag))
    }

    fn bump(&mut self) -> Option<RequestTag> {
        let coin_id = self.coin_id.clone()?;
        self.generation += 1;
        Some(RequestTag {
            selection: Selection { coin_id, period: self.period },
            generation: self.generation,
        })
    }

    /// Tag of the request the dashboard is currently waiting for
    pub fn current_tag(&self) -> Option<RequestTag> {
        let coin_id = self.coin_id.clone()?;
        Some(RequestTag {
            selection: Selection { coin_id, period: self.period },
            generation: self.generation,
        })
    }

    pub fn is_current(&self, tag: &RequestTag) -> bool {
        self.current_tag().as_ref() == Some(tag)
    }

    pub fn selection(&self) -> Option<Selection> {
        self.current_tag().map(|t| t.selection)
    }

    pub const fn theme(&self) -> Theme {
        self.theme
    }

    pub const fn favorites(&self) -> &Favorites {
        &self.favorites
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// History error for the current selection, else the last market-load error
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref().or(self.markets_error.as_deref())
    }

    pub const fn chart(&self) -> Option<&MarketChart> {
        self.chart.as_ref()
    }

    /// Indicators for the accepted history, if any
    pub fn technicals(&self) -> Option<&TechnicalSnapshot> {
        self.chart.as_ref().and(self.technicals.get())
    }

    pub fn risk_return(&self) -> &[RiskReturnPoint] {
        &self.risk_return
    }

    /// Number of times the technical snapshot was rebuilt
    pub const fn recomputations(&self) -> u64 {
        self.recomputations
    }
}
