//! Authenticated, rate-limited read API over persisted sales records
//!
//! Routes, under the configured version prefix:
//!
//! * `POST /<version>/get_data` returns one cursor-based page of a table
//! * `GET /<version>/users/me` returns the authenticated username

#![warn(missing_docs)]

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod rate_limit;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use sales_data_store::Store;
use tokio::net::TcpListener;

pub use config::{AdminCredentials, ApiConfig};
pub use error::ApiError;
pub use rate_limit::RateLimiter;

/// Shared state of every handler
#[derive(Debug, Clone)]
pub struct ApiState {
    /// API settings
    pub config: Arc<ApiConfig>,

    /// Store the pages are read from
    pub store: Store,

    /// Per-caller request limiter
    pub limiter: RateLimiter,
}

impl ApiState {
    /// Build the state for `config`, reading from `store`
    pub fn new(config: ApiConfig, store: Store) -> Self {
        let limiter = RateLimiter::new(config.per_second, config.per_minute);
        Self {
            config: Arc::new(config),
            store,
            limiter,
        }
    }
}

/// Build the API router
pub fn router(state: ApiState) -> Router {
    let prefix = state.config.prefix();
    Router::new()
        .route(&format!("{prefix}/get_data"), post(handlers::get_data))
        .route(&format!("{prefix}/users/me"), get(handlers::users_me))
        .with_state(state)
}

/// Bind the configured address and serve until the process stops
pub async fn serve(config: ApiConfig, store: Store) -> std::io::Result<()> {
    let address = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&address).await?;
    tracing::info!(%address, prefix = %config.prefix(), "serving read API");

    let app = router(ApiState::new(config, store));
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await
}
