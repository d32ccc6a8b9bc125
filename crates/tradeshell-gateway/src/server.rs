// SPDX-FileCopyrightText: 2026 Tradeshell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state.

use std::time::Instant;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use tradeshell_core::TradeshellError;
use tradeshell_ledger::{BrokerAccountLedger, ProfileLedger};

use crate::auth::{auth_middleware, AuthConfig};
use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub profiles: ProfileLedger,
    pub accounts: BrokerAccountLedger,
    /// Process start time for uptime reporting.
    pub start_time: Instant,
}

/// Gateway server configuration (mirrors GatewayConfig from
/// tradeshell-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Bearer token for auth (None = open, loopback-only use).
    pub bearer_token: Option<String>,
}

/// Build the full route tree: an unauthenticated health endpoint plus the
/// bearer-guarded `/v1` API.
pub fn router(state: GatewayState, auth: AuthConfig) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route(
            "/v1/profiles",
            get(handlers::list_profiles).post(handlers::create_profile),
        )
        .route(
            "/v1/profiles/{id}",
            get(handlers::get_profile)
                .put(handlers::rename_profile)
                .delete(handlers::delete_profile),
        )
        .route("/v1/profiles/{id}/accounts", get(handlers::list_accounts))
        .route(
            "/v1/profiles/{id}/data-source",
            get(handlers::get_data_source).put(handlers::set_data_source),
        )
        .route("/v1/accounts", post(handlers::create_account))
        .route(
            "/v1/accounts/{id}",
            axum::routing::patch(handlers::update_account).delete(handlers::delete_account),
        )
        .route("/v1/accounts/{id}/usage", post(handlers::track_usage))
        .route_layer(axum_middleware::from_fn_with_state(auth, auth_middleware))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(CorsLayer::permissive())
}

/// Start the gateway HTTP server and serve until the process exits.
pub async fn start_server(config: &ServerConfig, state: GatewayState) -> Result<(), TradeshellError> {
    let auth = AuthConfig {
        bearer_token: config.bearer_token.clone(),
    };
    if auth.bearer_token.is_none() {
        tracing::warn!("gateway bearer token not set -- API is open to local callers");
    }

    let app = router(state, auth);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| TradeshellError::Config(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(TradeshellError::storage)?;

    Ok(())
}
