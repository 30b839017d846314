//! Submission intake endpoint

use axum::{extract::State, http::StatusCode, Extension, Json};
use glossary_common::db::models::TermPatch;
use serde::Deserialize;
use tracing::info;

use crate::api::applications::ApplicationView;
use crate::api::auth::AuthUser;
use crate::api::ApiResult;
use crate::review::SubmissionIntake;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    /// Proposed term fields
    #[serde(flatten)]
    pub content: TermPatch,
    /// Identifier of an existing term this submission edits, if any
    #[serde(default)]
    pub edit_target: Option<String>,
}

/// POST /api/terms/submit
///
/// Creates the review ticket; new-term submissions also create a
/// placeholder term. Returns 201 with the application and a zero vote
/// count.
pub async fn submit_term(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<SubmitRequest>,
) -> ApiResult<(StatusCode, Json<ApplicationView>)> {
    info!(
        submitter = %user.id,
        edit_target = ?request.edit_target,
        "Term submission received"
    );

    let intake = SubmissionIntake::new(state.db.clone(), state.events.clone());
    let application = intake
        .submit(
            request.content,
            &user.id,
            user.role,
            request.edit_target.as_deref(),
        )
        .await?;

    let view = ApplicationView::build(application, 0)?;
    Ok((StatusCode::CREATED, Json(view)))
}
