// SPDX-FileCopyrightText: 2026 Tradeshell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bearer-token authentication middleware.
//!
//! The gateway binds to loopback for a local desktop frontend, so auth is
//! optional: with no token configured every request passes and a warning is
//! logged at startup. With a token configured, requests lacking
//! `Authorization: Bearer <token>` are rejected.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};

/// Authentication configuration for the gateway.
#[derive(Clone)]
pub struct AuthConfig {
    /// Expected bearer token. `None` leaves the API open.
    pub bearer_token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field(
                "bearer_token",
                &self.bearer_token.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}

/// Middleware that validates the bearer token when one is configured.
pub async fn auth_middleware(
    State(auth): State<AuthConfig>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(ref expected_token) = auth.bearer_token else {
        return Ok(next.run(request).await);
    };

    let supplied = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    if supplied == Some(expected_token.as_str()) {
        Ok(next.run(request).await)
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_config_debug_redacts_token() {
        let config = AuthConfig {
            bearer_token: Some("secret-token".to_string()),
        };
        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("secret-token"));
        assert!(debug_output.contains("[redacted]"));
    }
}
