//! coin-dashboard HTTP Server
//!
//! Axum-based server exposing market data, technical indicators, the
//! risk/return projection and an AI-generated risk narrative as JSON.

mod handlers;
mod state;

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tokio::sync::Mutex;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use insight_core::{GenerationOptions, LlmProvider, RiskAnalyst};
use insight_runtime::OllamaProvider;
use market_analytics::{
    CoinGeckoClient, Dashboard, Favorites, FavoritesStore, JsonFileStore, MarketDataProvider,
    MockMarketData,
};

use crate::handlers::{
    add_favorite, analyze_coin, coin_history, dashboard_view, health_check, list_favorites,
    list_markets, mock_history, remove_favorite, risk_return, select, toggle_theme,
};
use crate::state::AppState;

/// All API routes plus the static frontend
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health
        .route("/health", get(health_check))

        // Market data
        .route("/api/markets", get(list_markets))
        .route("/api/risk-return", get(risk_return))
        .route("/api/coins/{id}/history", get(coin_history))
        .route("/api/coins/{id}/mock-history", get(mock_history))
        .route("/api/coins/{id}/analysis", post(analyze_coin))

        // Dashboard state
        .route("/api/dashboard", get(dashboard_view))
        .route("/api/dashboard/select", post(select))
        .route("/api/dashboard/theme", post(toggle_theme))

        // Favorites
        .route("/api/favorites", get(list_favorites))
        .route("/api/favorites/{id}", put(add_favorite).delete(remove_favorite))

        // Static frontend
        .fallback_service(ServeDir::new("static"))

        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn market_provider() -> anyhow::Result<Arc<dyn MarketDataProvider>> {
    let choice = std::env::var("MARKET_PROVIDER").unwrap_or_else(|_| "coingecko".into());
    match choice.as_str() {
        "mock" => Ok(Arc::new(MockMarketData::new())),
        "coingecko" => Ok(Arc::new(CoinGeckoClient::from_env()?)),
        other => anyhow::bail!("unknown MARKET_PROVIDER '{other}' (expected coingecko or mock)"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    // Market data
    let market = market_provider()?;
    if market.health_check().await {
        tracing::info!("✓ Market provider: {}", market.name());
    } else {
        tracing::warn!("⚠ Market provider {} not reachable - data requests will fail", market.name());
    }

    // Text generation
    let insight: Arc<dyn LlmProvider> = Arc::new(OllamaProvider::from_env());
    match insight.health_check().await {
        Ok(true) => {
            tracing::info!("✓ Connected to Ollama");
            if let Ok(models) = insight.list_models().await {
                for model in models {
                    tracing::info!("  Model: {}", model.id);
                }
            }
        }
        Ok(false) | Err(_) => {
            tracing::warn!("⚠ Ollama not available - analysis requests will fail");
            tracing::warn!("  Make sure Ollama is running: ollama serve");
        }
    }
    let analyst = Arc::new(RiskAnalyst::new(insight.clone(), GenerationOptions::from_env()));

    // Favorites
    let store = JsonFileStore::from_env();
    let favorites = match store.load() {
        Ok(ids) => Favorites::from_ids(ids),
        Err(e) => {
            tracing::warn!(path = %store.path().display(), "Could not read favorites, starting empty: {}", e);
            Favorites::default()
        }
    };
    tracing::info!("Loaded {} favorites", favorites.len());

    // Build application state
    let state = AppState {
        market,
        mock: Arc::new(MockMarketData::new()),
        insight,
        analyst,
        favorites: Arc::new(store),
        dashboard: Arc::new(Mutex::new(Dashboard::new(favorites))),
    };

    // Initial catalog + snapshot; failure is shown on the dashboard, not fatal
    if state.load_markets().await.is_err() {
        tracing::warn!("⚠ Starting without market data");
    }

    let app = router(state);

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 coin-dashboard running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health                        - Health check");
    tracing::info!("  GET  /api/markets                   - Catalog + snapshot");
    tracing::info!("  GET  /api/risk-return               - Risk/return scatter");
    tracing::info!("  GET  /api/coins/{{id}}/history        - History + indicators");
    tracing::info!("  GET  /api/coins/{{id}}/mock-history   - Synthetic history");
    tracing::info!("  POST /api/coins/{{id}}/analysis       - AI risk narrative");
    tracing::info!("  GET  /api/dashboard                 - Dashboard view");
    tracing::info!("  POST /api/dashboard/select          - Change asset/period");
    tracing::info!("  POST /api/dashboard/theme           - Toggle theme");
    tracing::info!("  GET  /api/favorites                 - List favorites");
    tracing::info!("  PUT|DELETE /api/favorites/{{id}}      - Add/remove favorite");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
