//! Administrator review endpoints

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::api::applications::{load_view, ApplicationView};
use crate::api::auth::AuthUser;
use crate::api::linguist::RejectRequest;
use crate::api::ApiResult;
use crate::review::ReviewEngine;
use crate::AppState;

fn engine(state: &AppState) -> ReviewEngine {
    ReviewEngine::new(
        state.db.clone(),
        state.events.clone(),
        state.review_min_length,
    )
}

/// PUT /api/admin/applications/:id/approve
///
/// Finalizes the application and merges its proposed content into the
/// canonical term in one transaction.
pub async fn admin_approve(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(application_id): Path<String>,
) -> ApiResult<Json<ApplicationView>> {
    let application = engine(&state)
        .admin_approve(&application_id, &user.id, user.role)
        .await?;

    let view = load_view(&state.db, application).await?;
    Ok(Json(view))
}

/// PUT /api/admin/applications/:id/reject
pub async fn admin_reject(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(application_id): Path<String>,
    Json(request): Json<RejectRequest>,
) -> ApiResult<Json<ApplicationView>> {
    let application = engine(&state)
        .admin_reject(&application_id, &user.id, user.role, &request.review)
        .await?;

    let view = load_view(&state.db, application).await?;
    Ok(Json(view))
}
