//! # Miny API
//!
//! The API crate provides the web server for the Miny appointment service.
//! Owners manage their slots behind a session token; visitors browse an
//! owner's share page and claim slots without an account.
//!
//! ## Architecture
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Translate requests into lifecycle engine calls
//! - **Middleware**: Authentication and error mapping
//! - **Config**: Environment and application configuration
//!
//! The API uses Axum as the web framework; persistence goes through the
//! store ports from `miny-core`, backed by PostgreSQL in production.

/// Configuration module for API settings
pub mod config;
/// Request handlers
pub mod handlers;
/// Middleware for authentication and error handling
pub mod middleware;
/// Claim notification delivery
pub mod notifier;
/// Route definitions and API endpoint structure
pub mod routes;

use std::sync::Arc;

use axum::Router;
use eyre::Result;
use miny_core::{
    clock::{Clock, SystemClock},
    lifecycle::AppointmentService,
    store::AccountStore,
};
use miny_db::PgStore;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

/// Shared application state that is accessible to all request handlers
pub struct ApiState {
    /// Appointment lifecycle engine
    pub service: AppointmentService,
    /// Users and sessions
    pub accounts: Arc<dyn AccountStore>,
    pub clock: Arc<dyn Clock>,
    /// How long a login session stays valid
    pub session_ttl: chrono::Duration,
    /// Base URL for share links
    pub public_url: String,
}

/// Builds the application router with all routes attached to `state`.
pub fn app(state: Arc<ApiState>) -> Router {
    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Registration, login and profile
        .merge(routes::account::routes())
        // Owner appointment management
        .merge(routes::appointments::routes())
        // Share pages and claims
        .merge(routes::public::routes())
        // Calendar feeds
        .merge(routes::calendar::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Starts the API server with the provided configuration and database connection
pub async fn start_server(config: config::ApiConfig, db_pool: PgPool) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Wire the engine to its dependencies
    let store = Arc::new(PgStore::new(db_pool));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let service = AppointmentService::new(
        store.clone(),
        store.clone(),
        Arc::new(notifier::LogNotifier),
        clock.clone(),
        config.lifecycle_config(),
    )
    .with_calendar_config(config.calendar_config());

    let state = Arc::new(ApiState {
        service,
        accounts: store,
        clock,
        session_ttl: chrono::Duration::hours(config.session_ttl_hours),
        public_url: config.public_url.clone(),
    });

    let app = app(state);

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let origins = origins
            .iter()
            .map(|origin| origin.parse::<axum::http::HeaderValue>())
            .collect::<Result<Vec<_>, _>>()?;
        let cors = tower_http::cors::CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PUT,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::AUTHORIZATION,
                axum::http::header::ACCEPT,
            ])
            .allow_origin(origins)
            .allow_credentials(true);

        app.layer(cors)
    } else {
        app
    };

    // Add request timeout middleware
    let app = app.layer(
        tower::ServiceBuilder::new()
            .layer(axum::error_handling::HandleErrorLayer::new(
                |_: tower::BoxError| async { axum::http::StatusCode::REQUEST_TIMEOUT },
            ))
            .timeout(std::time::Duration::from_secs(config.request_timeout)),
    );

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
