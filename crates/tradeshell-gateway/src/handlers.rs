// SPDX-FileCopyrightText: 2026 Tradeshell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.
//!
//! Every response is wrapped in the `{"success": ..}` envelope the desktop
//! frontend expects. Ledger calls run under a 10 second deadline so a
//! wedged database cannot hang a request forever.

use std::future::Future;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use tradeshell_core::{BrokerAccount, BrokerAccountPatch, NewBrokerAccount, TradeshellError};

use crate::server::GatewayState;

/// Upper bound on a single ledger call. The KDF makes credential writes
/// slow on purpose; ten seconds covers them with a wide margin.
const LEDGER_DEADLINE: Duration = Duration::from_secs(10);

/// Uniform response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// HTTP status for a domain error.
pub(crate) fn status_for(err: &TradeshellError) -> StatusCode {
    match err {
        TradeshellError::NotFound { .. } => StatusCode::NOT_FOUND,
        TradeshellError::DuplicateAccount { .. } => StatusCode::CONFLICT,
        TradeshellError::Constraint(_) => StatusCode::UNPROCESSABLE_ENTITY,
        TradeshellError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        TradeshellError::Config(_) | TradeshellError::Storage { .. } | TradeshellError::Cipher(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

async fn with_deadline<T, F>(fut: F) -> Result<T, TradeshellError>
where
    F: Future<Output = Result<T, TradeshellError>>,
{
    match tokio::time::timeout(LEDGER_DEADLINE, fut).await {
        Ok(result) => result,
        Err(_) => Err(TradeshellError::Timeout {
            duration: LEDGER_DEADLINE,
        }),
    }
}

fn respond<T: Serialize>(result: Result<T, TradeshellError>) -> Response {
    match result {
        Ok(data) => (StatusCode::OK, Json(ApiResponse::ok(data))).into_response(),
        Err(err) => {
            let status = status_for(&err);
            if status.is_server_error() {
                tracing::error!(%err, "request failed");
            }
            (status, Json(ApiResponse::<T>::err(err.to_string()))).into_response()
        }
    }
}

/// Health payload for the unauthenticated endpoint.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Response {
    let health = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    };
    (StatusCode::OK, Json(ApiResponse::ok(health))).into_response()
}

/// Request body for POST /v1/profiles and PUT /v1/profiles/{id}.
#[derive(Debug, Deserialize)]
pub struct ProfileNameRequest {
    pub name: String,
}

/// GET /v1/profiles
pub async fn list_profiles(State(state): State<GatewayState>) -> Response {
    respond(with_deadline(state.profiles.list()).await)
}

/// POST /v1/profiles
pub async fn create_profile(
    State(state): State<GatewayState>,
    Json(body): Json<ProfileNameRequest>,
) -> Response {
    respond(with_deadline(state.profiles.create(&body.name)).await)
}

/// GET /v1/profiles/{id}
pub async fn get_profile(State(state): State<GatewayState>, Path(id): Path<i64>) -> Response {
    respond(with_deadline(state.profiles.get(id)).await)
}

/// PUT /v1/profiles/{id}
pub async fn rename_profile(
    State(state): State<GatewayState>,
    Path(id): Path<i64>,
    Json(body): Json<ProfileNameRequest>,
) -> Response {
    respond(with_deadline(state.profiles.rename(id, &body.name)).await)
}

/// DELETE /v1/profiles/{id}
pub async fn delete_profile(State(state): State<GatewayState>, Path(id): Path<i64>) -> Response {
    respond(with_deadline(state.profiles.delete(id)).await)
}

/// GET /v1/profiles/{id}/accounts
pub async fn list_accounts(State(state): State<GatewayState>, Path(id): Path<i64>) -> Response {
    respond(with_deadline(state.accounts.list_by_profile(id)).await)
}

/// POST /v1/accounts
pub async fn create_account(
    State(state): State<GatewayState>,
    Json(body): Json<NewBrokerAccount>,
) -> Response {
    respond(with_deadline(state.accounts.create(body)).await)
}

/// PATCH /v1/accounts/{id}
pub async fn update_account(
    State(state): State<GatewayState>,
    Path(id): Path<i64>,
    Json(body): Json<BrokerAccountPatch>,
) -> Response {
    respond(with_deadline(state.accounts.update(id, body)).await)
}

/// DELETE /v1/accounts/{id}
pub async fn delete_account(State(state): State<GatewayState>, Path(id): Path<i64>) -> Response {
    respond(with_deadline(state.accounts.delete(id)).await)
}

/// Request body for PUT /v1/profiles/{id}/data-source.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectDataSourceRequest {
    pub account_id: i64,
}

/// PUT /v1/profiles/{id}/data-source
pub async fn set_data_source(
    State(state): State<GatewayState>,
    Path(id): Path<i64>,
    Json(body): Json<SelectDataSourceRequest>,
) -> Response {
    respond(with_deadline(state.accounts.set_data_source(id, body.account_id)).await)
}

/// GET /v1/profiles/{id}/data-source
///
/// `data` is `null` when no data source is selected; that is not an error.
pub async fn get_data_source(State(state): State<GatewayState>, Path(id): Path<i64>) -> Response {
    respond::<Option<BrokerAccount>>(with_deadline(state.accounts.current_data_source(id)).await)
}

/// Request body for POST /v1/accounts/{id}/usage.
#[derive(Debug, Deserialize)]
pub struct TrackUsageRequest {
    #[serde(default = "default_usage_count")]
    pub count: i64,
}

fn default_usage_count() -> i64 {
    1
}

/// POST /v1/accounts/{id}/usage
///
/// The body is optional; a bare POST tracks a single request.
pub async fn track_usage(
    State(state): State<GatewayState>,
    Path(id): Path<i64>,
    body: Option<Json<TrackUsageRequest>>,
) -> Response {
    let count = body.map_or(1, |Json(b)| b.count);
    respond(with_deadline(state.accounts.track_api_usage(id, count)).await)
}
