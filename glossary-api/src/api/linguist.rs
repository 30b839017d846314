//! Linguist review endpoints

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::api::applications::{load_view, ApplicationView};
use crate::api::auth::AuthUser;
use crate::api::ApiResult;
use crate::review::ReviewEngine;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub review: String,
}

fn engine(state: &AppState) -> ReviewEngine {
    ReviewEngine::new(
        state.db.clone(),
        state.events.clone(),
        state.review_min_length,
    )
}

/// PUT /api/linguist/applications/:id/verify
pub async fn linguist_verify(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(application_id): Path<String>,
) -> ApiResult<Json<ApplicationView>> {
    let application = engine(&state)
        .linguist_verify(&application_id, &user.id, user.role)
        .await?;

    let view = load_view(&state.db, application).await?;
    Ok(Json(view))
}

/// PUT /api/linguist/applications/:id/reject
pub async fn linguist_reject(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(application_id): Path<String>,
    Json(request): Json<RejectRequest>,
) -> ApiResult<Json<ApplicationView>> {
    let application = engine(&state)
        .linguist_reject(&application_id, &user.id, user.role, &request.review)
        .await?;

    let view = load_view(&state.db, application).await?;
    Ok(Json(view))
}
