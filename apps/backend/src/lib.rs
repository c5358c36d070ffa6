pub mod config;
pub mod corpus;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vocab_core::PartitionCache;

use crate::config::Config;
use crate::corpus::SqliteCorpus;
use crate::db::Database;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub corpus: Arc<SqliteCorpus>,
    pub partitions: Arc<PartitionCache>,
}

impl AppState {
    pub fn new(db: Database, corpus: SqliteCorpus) -> Self {
        Self {
            db: Arc::new(db),
            corpus: Arc::new(corpus),
            partitions: Arc::new(PartitionCache::new()),
        }
    }
}

/// Build the router with every endpoint
pub fn app(state: AppState) -> Router {
    let protected_routes = Router::new()
        // Device
        .route("/api/device/status", get(routes::device::status))
        // Categories and words
        .route("/api/categories", get(routes::categories::list))
        .route("/api/categories/:tag/lists", get(routes::categories::lists))
        .route(
            "/api/categories/:tag/lists/:list",
            get(routes::categories::list_words),
        )
        .route(
            "/api/categories/:tag/lists/:list/groups/:group",
            get(routes::categories::group_words),
        )
        .route("/api/words/search", get(routes::words::search))
        // Study
        .route("/api/study/review", post(routes::study::review))
        .route("/api/study/due", get(routes::study::due))
        // Dashboard and stats
        .route("/api/dashboard", get(routes::dashboard::overview))
        .route(
            "/api/dashboard/stage/:stage",
            get(routes::dashboard::stage_words),
        )
        .route(
            "/api/dashboard/today/:kind",
            get(routes::dashboard::today_words),
        )
        .route("/api/dashboard/learned", get(routes::dashboard::learned_words))
        .route("/api/stats/recent", get(routes::stats::recent))
        // Settings
        .route(
            "/api/settings",
            get(routes::settings::get).put(routes::settings::update),
        )
        // Custom modules
        .route(
            "/api/custom-modules",
            get(routes::custom::list).post(routes::custom::create),
        )
        .route(
            "/api/custom-modules/:id",
            get(routes::custom::get).delete(routes::custom::delete),
        )
        .route(
            "/api/custom-modules/:id/lists/:list",
            get(routes::custom::list_words),
        )
        .route(
            "/api/custom-modules/:id/lists/:list/groups/:group",
            get(routes::custom::group_words),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            routes::auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/device/register", post(routes::device::register))
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
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

    tracing::info!("Opening word corpus at {}", config.vocab_db_path.display());
    let corpus = SqliteCorpus::open(&config.vocab_db_path)?;

    let app = app(AppState::new(db, corpus));

    let addr = config.bind_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    fn offline_state() -> AppState {
        // Never connects unless a handler touches the database.
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/openwords_unused")
            .unwrap();
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch(corpus::CORPUS_SCHEMA).unwrap();
        AppState::new(Database::from_pool(pool), SqliteCorpus::from_connection(conn))
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = app(offline_state())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        for uri in ["/api/dashboard", "/api/categories", "/api/settings"] {
            let response = app(offline_state())
                .oneshot(Request::get(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        }
    }
}
