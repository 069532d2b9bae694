//! HTTP Handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use insight_core::{AnalysisReport, AssetBrief, InsightError};
use market_analytics::{
    indicators::{latest_zone, RsiZone},
    model::to_chart,
    Action, Asset, ChartPoint, Dashboard, MarketChart, MarketDataProvider, MarketError, Period,
    RiskReturnPoint, Selection, TechnicalChart, TechnicalSnapshot, Theme,
};

use crate::state::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub market_provider: String,
    pub market_reachable: bool,
    pub insight_provider: String,
    pub insight_connected: bool,
    pub insight_models: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Serialize)]
pub struct MarketsResponse {
    pub count: usize,
    pub assets: Vec<Asset>,
}

#[derive(Serialize)]
pub struct RiskReturnResponse {
    pub points: Vec<RiskReturnPoint>,
    pub chart: Vec<ChartPoint>,
}

#[derive(Serialize)]
pub struct HistoryResponse {
    pub coin_id: String,
    pub period: Period,
    pub last_price: Option<f64>,
    pub prices: Vec<ChartPoint>,
    pub volumes: Vec<ChartPoint>,
    pub technicals: TechnicalChart,
    pub rsi_zone: Option<RsiZone>,
}

impl From<MarketChart> for HistoryResponse {
    fn from(chart: MarketChart) -> Self {
        let snapshot = TechnicalSnapshot::compute(&chart.prices);
        Self {
            last_price: chart.last_price(),
            prices: to_chart(&chart.prices),
            volumes: to_chart(&chart.volumes),
            technicals: snapshot.to_chart(),
            rsi_zone: latest_zone(&snapshot.rsi14),
            coin_id: chart.coin_id,
            period: chart.period,
        }
    }
}

#[derive(Serialize)]
pub struct DashboardView {
    pub theme: Theme,
    pub favorites: Vec<String>,
    pub selection: Option<Selection>,
    pub loading: bool,
    pub error: Option<String>,
    pub assets: Vec<Asset>,
    pub prices: Vec<ChartPoint>,
    pub volumes: Vec<ChartPoint>,
    pub technicals: Option<TechnicalChart>,
    pub risk_return: Vec<ChartPoint>,
    pub recomputations: u64,
}

impl From<&Dashboard> for DashboardView {
    fn from(d: &Dashboard) -> Self {
        Self {
            theme: d.theme(),
            favorites: d.favorites().ids().to_vec(),
            selection: d.selection(),
            loading: d.is_loading(),
            error: d.error().map(str::to_string),
            assets: d.assets().to_vec(),
            prices: d.chart().map(|c| to_chart(&c.prices)).unwrap_or_default(),
            volumes: d.chart().map(|c| to_chart(&c.volumes)).unwrap_or_default(),
            technicals: d.technicals().map(TechnicalSnapshot::to_chart),
            risk_return: to_chart(d.risk_return()),
            recomputations: d.recomputations(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    #[serde(default)]
    pub period: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    #[serde(default)]
    pub coin_id: Option<String>,
    #[serde(default)]
    pub period: Option<String>,
}

#[derive(Serialize)]
pub struct FavoritesResponse {
    pub favorites: Vec<String>,
}

// ============================================================================
// Error mapping
// ============================================================================

fn market_error(e: &MarketError) -> ApiError {
    let (status, code) = match e {
        MarketError::UnknownAsset(_) => (StatusCode::NOT_FOUND, "UNKNOWN_ASSET"),
        MarketError::InvalidPeriod(_) => (StatusCode::BAD_REQUEST, "INVALID_PERIOD"),
        MarketError::Store(_) | MarketError::Io(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "STORE_ERROR")
        }
        MarketError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
        MarketError::Provider(_)
        | MarketError::Http { .. }
        | MarketError::Network(_)
        | MarketError::Serialization(_) => (StatusCode::BAD_GATEWAY, "MARKET_UNAVAILABLE"),
    };

    if status.is_server_error() {
        tracing::error!("{}", e);
    }

    (
        status,
        Json(ErrorResponse {
            error: e.user_message(),
            code: code.into(),
        }),
    )
}

fn analysis_error(e: &InsightError) -> ApiError {
    tracing::error!("Analysis error: {}", e);
    (
        StatusCode::BAD_GATEWAY,
        Json(ErrorResponse {
            error: e.user_message(),
            code: "ANALYSIS_ERROR".into(),
        }),
    )
}

fn parse_period(raw: Option<&str>) -> Result<Period, ApiError> {
    raw.map_or(Ok(Period::default()), str::parse::<Period>)
        .map_err(|e| market_error(&e))
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (market_reachable, insight, info) = tokio::join!(
        state.market.health_check(),
        state.insight.health_check(),
        state.insight.info(),
    );
    let (insight_provider, insight_models) = info.map_or_else(
        |_| (state.insight.name().to_string(), Vec::new()),
        |info| (info.name, info.models.into_iter().map(|m| m.id).collect()),
    );

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        market_provider: state.market.name().to_string(),
        market_reachable,
        insight_provider,
        insight_connected: insight.unwrap_or(false),
        insight_models,
    })
}

/// Catalog joined with the market snapshot
pub async fn list_markets(
    State(state): State<AppState>,
) -> Result<Json<MarketsResponse>, ApiError> {
    let assets = state.load_markets().await.map_err(|e| market_error(&e))?;

    Ok(Json(MarketsResponse {
        count: assets.len(),
        assets,
    }))
}

/// Risk/return scatter for the loaded snapshot
pub async fn risk_return(
    State(state): State<AppState>,
) -> Result<Json<RiskReturnResponse>, ApiError> {
    if state.dashboard.lock().await.assets().is_empty() {
        state.load_markets().await.map_err(|e| market_error(&e))?;
    }

    let points = state.dashboard.lock().await.risk_return().to_vec();
    Ok(Json(RiskReturnResponse {
        chart: to_chart(&points),
        points,
    }))
}

/// Price history with technical indicators from the configured provider
pub async fn coin_history(
    State(state): State<AppState>,
    Path(coin_id): Path<String>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    history_from(state.market.as_ref(), &coin_id, query.period.as_deref()).await
}

/// Same shape as `coin_history`, from the deterministic mock
pub async fn mock_history(
    State(state): State<AppState>,
    Path(coin_id): Path<String>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    history_from(state.mock.as_ref(), &coin_id, query.period.as_deref()).await
}

async fn history_from(
    provider: &dyn MarketDataProvider,
    coin_id: &str,
    period: Option<&str>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let period = parse_period(period)?;
    let chart = provider
        .market_chart(coin_id, period)
        .await
        .map_err(|e| market_error(&e))?;

    Ok(Json(chart.into()))
}

/// Generative risk/return narrative for one asset
pub async fn analyze_coin(
    State(state): State<AppState>,
    Path(coin_id): Path<String>,
) -> Result<Json<AnalysisReport>, ApiError> {
    let cached = state
        .dashboard
        .lock()
        .await
        .assets()
        .iter()
        .find(|a| a.id == coin_id)
        .cloned();

    let asset = match cached {
        Some(asset) => asset,
        None => state.market.asset(&coin_id).await.map_err(|e| market_error(&e))?,
    };

    let brief = AssetBrief {
        coin_id: asset.id,
        name: asset.name,
        symbol: asset.symbol,
        price_usd: asset.price_usd,
        market_cap: asset.market_cap,
    };

    let report = state.analyst.assess(&brief).await.map_err(|e| analysis_error(&e))?;
    Ok(Json(report))
}

/// Current dashboard view
pub async fn dashboard_view(State(state): State<AppState>) -> Json<DashboardView> {
    Json(DashboardView::from(&*state.dashboard.lock().await))
}

/// Change asset and/or period, then fetch the tagged history
pub async fn select(
    State(state): State<AppState>,
    Json(payload): Json<SelectRequest>,
) -> Result<Json<DashboardView>, ApiError> {
    let period = payload
        .period
        .as_deref()
        .map(str::parse::<Period>)
        .transpose()
        .map_err(|e| market_error(&e))?;

    let mut effects = Vec::new();
    if let Some(period) = period {
        effects.extend(state.dispatch(Action::SelectPeriod(period)).await);
    }
    if let Some(coin_id) = payload.coin_id {
        effects.extend(state.dispatch(Action::SelectAsset(coin_id)).await);
    }

    state.run_effects(effects).await.map_err(|e| market_error(&e))?;
    Ok(Json(DashboardView::from(&*state.dashboard.lock().await)))
}

/// Flip between light and dark
pub async fn toggle_theme(State(state): State<AppState>) -> Json<DashboardView> {
    state.dispatch(Action::ToggleTheme).await;
    Json(DashboardView::from(&*state.dashboard.lock().await))
}

pub async fn list_favorites(State(state): State<AppState>) -> Json<FavoritesResponse> {
    let favorites = state.dashboard.lock().await.favorites().ids().to_vec();
    Json(FavoritesResponse { favorites })
}

pub async fn add_favorite(
    State(state): State<AppState>,
    Path(coin_id): Path<String>,
) -> Result<Json<FavoritesResponse>, ApiError> {
    update_favorite(&state, &coin_id, true).await
}

pub async fn remove_favorite(
    State(state): State<AppState>,
    Path(coin_id): Path<String>,
) -> Result<Json<FavoritesResponse>, ApiError> {
    update_favorite(&state, &coin_id, false).await
}

async fn update_favorite(
    state: &AppState,
    coin_id: &str,
    favorite: bool,
) -> Result<Json<FavoritesResponse>, ApiError> {
    let favorites = state
        .set_favorite(coin_id, favorite)
        .await
        .map_err(|e| market_error(&e))?;
    Ok(Json(FavoritesResponse { favorites }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Method, Request},
        Router,
    };
    use serde_json::Value;
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    use insight_core::{
        provider::{Completion, GenerationOptions, ModelInfo, ProviderInfo},
        LlmProvider, Message, RiskAnalyst,
    };
    use market_analytics::{Favorites, FavoritesStore, MemoryStore, MockMarketData};

    /// Store whose writes always fail
    struct ReadOnlyStore;

    impl FavoritesStore for ReadOnlyStore {
        fn load(&self) -> market_analytics::Result<Vec<String>> {
            Ok(Vec::new())
        }

        fn save(&self, _ids: &[String]) -> market_analytics::Result<()> {
            Err(MarketError::Store("read-only filesystem".into()))
        }
    }

    use super::*;
    use crate::router;

    struct ScriptedProvider {
        reply: Option<String>,
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn info(&self) -> insight_core::Result<ProviderInfo> {
            Ok(ProviderInfo {
                name: "Scripted".into(),
                models: vec![ModelInfo { id: "scripted-1".into(), name: "Scripted One".into() }],
            })
        }

        async fn health_check(&self) -> insight_core::Result<bool> {
            Ok(self.reply.is_some())
        }

        async fn complete(
            &self,
            _messages: &[Message],
            options: &GenerationOptions,
        ) -> insight_core::Result<Completion> {
            self.reply
                .clone()
                .map(|content| Completion { content, model: options.model.clone() })
                .ok_or_else(|| InsightError::ProviderUnavailable("offline".into()))
        }

        async fn list_models(&self) -> insight_core::Result<Vec<ModelInfo>> {
            Ok(Vec::new())
        }

        fn name(&self) -> &str {
            "Scripted"
        }
    }

    fn test_state(market: MockMarketData, reply: Option<&str>) -> (AppState, Arc<MemoryStore>) {
        let insight: Arc<dyn LlmProvider> =
            Arc::new(ScriptedProvider { reply: reply.map(str::to_string) });
        let store = Arc::new(MemoryStore::new());

        let state = AppState {
            market: Arc::new(market),
            mock: Arc::new(MockMarketData::new()),
            analyst: Arc::new(RiskAnalyst::new(insight.clone(), GenerationOptions::default())),
            insight,
            favorites: store.clone(),
            dashboard: Arc::new(Mutex::new(Dashboard::new(Favorites::default()))),
        };
        (state, store)
    }

    fn test_app(reply: Option<&str>) -> (Router, AppState, Arc<MemoryStore>) {
        let (state, store) = test_state(MockMarketData::new(), reply);
        (router(state.clone()), state, store)
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, json)
    }

    #[tokio::test]
    async fn test_health_reports_providers() {
        let (app, ..) = test_app(None);
        let (status, body) = send(&app, Method::GET, "/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["market_provider"], "MockMarket");
        assert_eq!(body["market_reachable"], true);
        assert_eq!(body["insight_connected"], false);
        assert_eq!(body["insight_provider"], "Scripted");
        assert_eq!(body["insight_models"], serde_json::json!(["scripted-1"]));
    }

    #[tokio::test]
    async fn test_markets_load_into_dashboard() {
        let (app, state, _) = test_app(None);
        let (status, body) = send(&app, Method::GET, "/api/markets", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 10);
        assert_eq!(state.dashboard.lock().await.assets().len(), 10);

        let (_, rr) = send(&app, Method::GET, "/api/risk-return", None).await;
        assert_eq!(rr["points"].as_array().unwrap().len(), 10);
        assert_eq!(rr["chart"].as_array().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_markets_unavailable() {
        let (state, _) = test_state(MockMarketData::offline(), None);
        let app = router(state.clone());
        let (status, body) = send(&app, Method::GET, "/api/markets", None).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["code"], "MARKET_UNAVAILABLE");
        assert!(state.dashboard.lock().await.error().is_some());
    }

    #[tokio::test]
    async fn test_history_with_technicals() {
        let (app, ..) = test_app(None);
        let (status, body) = send(&app, Method::GET, "/api/coins/bitcoin/history?period=90d", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["period"], "90d");
        let prices = body["prices"].as_array().unwrap().len();
        assert_eq!(prices, 91);
        assert_eq!(body["technicals"]["sma20"].as_array().unwrap().len(), prices - 19);
        assert_eq!(body["technicals"]["sma50"].as_array().unwrap().len(), prices - 49);
        assert_eq!(body["technicals"]["rsi14"].as_array().unwrap().len(), prices - 14);
        assert!(body["technicals"]["support"].is_number());
        assert!(body["prices"][0]["x"].is_number());
    }

    #[tokio::test]
    async fn test_history_errors() {
        let (app, ..) = test_app(None);

        let (status, body) = send(&app, Method::GET, "/api/coins/bitcoin/history?period=2w", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_PERIOD");

        let (status, body) = send(&app, Method::GET, "/api/coins/not-a-coin/mock-history", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "UNKNOWN_ASSET");
    }

    #[tokio::test]
    async fn test_mock_history_defaults_to_month() {
        let (app, ..) = test_app(None);
        let (status, body) = send(&app, Method::GET, "/api/coins/ethereum/mock-history", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["period"], "30d");
        assert_eq!(body["prices"].as_array().unwrap().len(), 31);
    }

    #[tokio::test]
    async fn test_select_loads_history() {
        let (app, ..) = test_app(None);
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/dashboard/select",
            Some(serde_json::json!({ "coin_id": "solana", "period": "90d" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["selection"]["coin_id"], "solana");
        assert_eq!(body["selection"]["period"], "90d");
        assert_eq!(body["loading"], false);
        assert_eq!(body["recomputations"], 1);
        assert!(!body["technicals"]["rsi14"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_select_unknown_asset_sets_error() {
        let (app, ..) = test_app(None);
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/dashboard/select",
            Some(serde_json::json!({ "coin_id": "nope" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["loading"], false);
        assert!(body["error"].as_str().unwrap().contains("nope"));
        assert!(body["technicals"].is_null());
    }

    #[tokio::test]
    async fn test_theme_toggle() {
        let (app, ..) = test_app(None);
        let (_, body) = send(&app, Method::POST, "/api/dashboard/theme", None).await;
        assert_eq!(body["theme"], "dark");
        let (_, body) = send(&app, Method::POST, "/api/dashboard/theme", None).await;
        assert_eq!(body["theme"], "light");
    }

    #[tokio::test]
    async fn test_favorites_are_persisted() {
        let (app, _, store) = test_app(None);

        send(&app, Method::PUT, "/api/favorites/bitcoin", None).await;
        send(&app, Method::PUT, "/api/favorites/solana", None).await;
        let (status, body) = send(&app, Method::PUT, "/api/favorites/bitcoin", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["favorites"], serde_json::json!(["bitcoin", "solana"]));

        let (_, body) = send(&app, Method::DELETE, "/api/favorites/bitcoin", None).await;
        assert_eq!(body["favorites"], serde_json::json!(["solana"]));
        assert_eq!(store.load().unwrap(), vec!["solana".to_string()]);

        let (_, body) = send(&app, Method::GET, "/api/favorites", None).await;
        assert_eq!(body["favorites"], serde_json::json!(["solana"]));
    }

    #[tokio::test]
    async fn test_failed_save_leaves_favorites_unchanged() {
        let (mut state, _) = test_state(MockMarketData::new(), None);
        state.favorites = Arc::new(ReadOnlyStore);
        let app = router(state.clone());

        let (status, body) = send(&app, Method::PUT, "/api/favorites/bitcoin", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "STORE_ERROR");

        let (_, body) = send(&app, Method::GET, "/api/favorites", None).await;
        assert_eq!(body["favorites"], serde_json::json!([]));
        assert!(!state.dashboard.lock().await.favorites().contains("bitcoin"));
    }

    #[tokio::test]
    async fn test_analysis_report() {
        let reply = r#"{"riskLevel": "Medium", "returnPotential": "High", "justification": "Fast chain, concentrated holders."}"#;
        let (app, ..) = test_app(Some(reply));
        let (status, body) = send(&app, Method::POST, "/api/coins/solana/analysis", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["symbol"], "SOL");
        assert_eq!(body["assessment"]["risk_level"], "Medium");
        assert_eq!(body["assessment"]["return_potential"], "High");
    }

    #[tokio::test]
    async fn test_analysis_failure_is_scoped() {
        let (app, state, _) = test_app(None);
        send(&app, Method::GET, "/api/markets", None).await;

        let (status, body) = send(&app, Method::POST, "/api/coins/bitcoin/analysis", None).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["code"], "ANALYSIS_ERROR");

        // dashboard is untouched
        let dashboard = state.dashboard.lock().await;
        assert!(dashboard.error().is_none());
        assert_eq!(dashboard.assets().len(), 10);
    }

    #[tokio::test]
    async fn test_stale_history_is_not_applied() {
        let (state, _) = test_state(MockMarketData::new(), None);

        let first = state.dispatch(Action::SelectAsset("bitcoin".into())).await;
        let second = state.dispatch(Action::SelectAsset("ethereum".into())).await;

        // the bitcoin fetch was superseded before it ran
        state.run_effects(first).await.unwrap();
        assert!(state.dashboard.lock().await.chart().is_none());

        state.run_effects(second).await.unwrap();
        let dashboard = state.dashboard.lock().await;
        assert_eq!(dashboard.chart().unwrap().coin_id, "ethereum");
        assert_eq!(dashboard.recomputations(), 1);
    }
}
