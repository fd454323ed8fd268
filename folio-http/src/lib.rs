//! HTTP adapter for the folio reading tracker.
//!
//! Exposes the title catalog, chapter pages and per-user reading progress
//! as JSON. Sessions ride in a cookie (or `Authorization: Bearer`); title and
//! chapter pages are readable anonymously, but only verified readers have
//! their progress recorded.
//!
//! # Configuration
//!
//! | Variable | Default |
//! |---|---|
//! | `FOLIO_PORT` | `3000` |
//! | `FOLIO_DATABASE` | `./db/folio.db` (`:memory:` for a process-local store) |
//! | `FOLIO_STORAGE_ROOT` | `./storage` |
//! | `FOLIO_TOKEN_SECRET` / `FOLIO_TOKEN_SECRET_FILE` | required, 64 hex chars |
//! | `FOLIO_TOKEN_HOURS` | `24` (2 to 24) |
//! | `FOLIO_COOKIE_NAME` | `session` |
//!
//! Chapter images live under
//! `<storage_root>/<title_id>/chapters/<chapter>/<page>` and are served from `/static`.
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{get, post},
};
use folio_core::Result;
use tokio::{net::TcpListener, signal};
use tower_http::{cors::CorsLayer, services::ServeDir};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use config::Config;
use routes::{
    STATIC_PREFIX, chapter_handler, create_title_handler, list_titles_handler, login_handler,
    logout_handler, reading_list_handler, register_handler, title_view_handler,
};
use state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    let pages = ServeDir::new(state.resolver.scanner().root());

    Router::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .route("/logout", post(logout_handler))
        .route("/titles", get(list_titles_handler).post(create_title_handler))
        .route("/titles/{id}", get(title_view_handler))
        .route("/titles/{id}/chapters/{chapter}", get(chapter_handler))
        .route("/me/progress", get(reading_list_handler))
        .nest_service(STATIC_PREFIX, pages)
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Loading configuration...");
    let config = Config::load()?;

    info!("Initializing state...");
    let state = AppState::new(config).await?;

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to listen for Ctrl+C: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
