//! Role gate middleware
//!
//! Resolves the caller identity from the `X-User-Id` header against the
//! users table and injects an [`AuthUser`] request extension. Role checks
//! themselves are explicit per-handler preconditions taking the resolved
//! role, not separate per-role routers.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use glossary_common::db::models::UserRole;
use glossary_common::{Error, Result};
use serde::Serialize;
use serde_json::json;
use tracing::warn;

use crate::AppState;

/// Resolved caller identity, available to all protected handlers
#[derive(Debug, Clone, Serialize)]
pub struct AuthUser {
    pub id: String,
    pub username: String,
    pub role: UserRole,
}

/// Identity resolution middleware
///
/// Applied to protected routes only; the health endpoint bypasses it.
pub async fn identity_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> std::result::Result<Response, AuthError> {
    let user_id = request
        .headers()
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or(AuthError::MissingIdentity)?
        .to_string();

    let row: Option<(String, String, String)> =
        sqlx::query_as("SELECT id, username, role FROM users WHERE id = ?")
            .bind(&user_id)
            .fetch_optional(&state.db)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;

    let (id, username, role) = row.ok_or_else(|| {
        warn!(user_id, "Request with unknown identity");
        AuthError::UnknownIdentity
    })?;
    let role = UserRole::parse(&role).map_err(|e| AuthError::Internal(e.to_string()))?;

    request.extensions_mut().insert(AuthUser { id, username, role });

    Ok(next.run(request).await)
}

/// Require an exact role for an operation
pub fn require_role(user: &AuthUser, required: UserRole) -> Result<()> {
    if user.role != required {
        return Err(Error::Forbidden(format!(
            "{} role required",
            required.as_str()
        )));
    }
    Ok(())
}

/// Require a reviewer (linguist or admin) for review queue access
pub fn require_reviewer(user: &AuthUser) -> Result<()> {
    match user.role {
        UserRole::Linguist | UserRole::Admin => Ok(()),
        UserRole::Contributor => Err(Error::Forbidden(
            "linguist or admin role required".to_string(),
        )),
    }
}

/// Identity resolution errors
#[derive(Debug)]
pub enum AuthError {
    MissingIdentity,
    UnknownIdentity,
    Internal(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingIdentity => {
                (StatusCode::UNAUTHORIZED, "Missing X-User-Id header".to_string())
            }
            AuthError::UnknownIdentity => {
                (StatusCode::UNAUTHORIZED, "Unknown user".to_string())
            }
            AuthError::Internal(msg) => {
                warn!("Identity resolution failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
