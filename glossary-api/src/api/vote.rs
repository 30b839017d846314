//! Crowd vote endpoint

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::api::applications::ApplicationView;
use crate::api::auth::AuthUser;
use crate::api::ApiResult;
use crate::review::CrowdVoting;
use crate::AppState;

/// POST /api/applications/:id/vote
///
/// Any authenticated user other than the submitter may vote while the
/// application is pending verification. Crossing the threshold promotes
/// the application to CROWD_VERIFIED in the same transaction.
pub async fn cast_vote(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(application_id): Path<String>,
) -> ApiResult<Json<ApplicationView>> {
    let voting = CrowdVoting::new(
        state.db.clone(),
        state.events.clone(),
        state.vote_threshold,
    );
    let (application, vote_count) = voting.cast_vote(&application_id, &user.id).await?;

    let view = ApplicationView::build(application, vote_count)?;
    Ok(Json(view))
}
