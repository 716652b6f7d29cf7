pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use srs_core::{Clock, SystemClock};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::Database;
use crate::services::SrsService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub srs: Arc<SrsService>,
}

impl AppState {
    pub fn new(db: Arc<Database>, clock: Arc<dyn Clock>, due_default_limit: i64) -> Self {
        Self {
            srs: Arc::new(SrsService::new(db, clock, due_default_limit)),
        }
    }
}

/// All routes, without the HTTP middleware stack.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Review engine
        .route("/api/srs/review", post(routes::review::review))
        .route("/api/srs/preview", post(routes::review::preview))
        .route("/api/srs/due", get(routes::review::due))
        .route("/api/srs/reviews", get(routes::review::list))
        .route("/api/srs/reviews/{card_id}", get(routes::review::get_one))
        // Stats
        .route(
            "/api/srs/stats",
            get(routes::stats::get).post(routes::stats::adjust),
        )
        .route("/api/srs/stats/overview", get(routes::stats::overview))
        .route("/api/srs/streak", get(routes::stats::streak))
        .route("/api/srs/diagnostics", get(routes::stats::diagnostics))
        // Settings
        .route(
            "/api/srs/settings",
            get(routes::settings::get).post(routes::settings::update),
        )
        .route("/api/srs/settings/reset", post(routes::settings::reset))
        // Flashcards
        .route(
            "/api/flashcards",
            get(routes::flashcards::list).post(routes::flashcards::create),
        )
        .route(
            "/api/flashcards/{id}",
            get(routes::flashcards::get).delete(routes::flashcards::delete),
        )
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url, config.db_max_connections).await?;

    tracing::info!("Running migrations...");
    db.run_migrations().await?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
    db.ensure_defaults(clock.now_ms()).await?;

    let state = AppState::new(Arc::new(db), clock, config.due_default_limit);

    let app = router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr = config.bind_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
