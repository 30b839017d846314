//! Application listing, fetch, and deletion endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use glossary_common::db::models::{ApplicationStatus, TermApplication, TermPatch, UserRole};
use glossary_common::Result;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::api::auth::{require_reviewer, require_role, AuthUser};
use crate::api::ApiResult;
use crate::review::{self, TermSynchronizer};
use crate::AppState;

/// Application representation returned by every workflow endpoint
///
/// `crowd_votes_count` is derived at read time, never stored on the row.
#[derive(Debug, Serialize)]
pub struct ApplicationView {
    pub id: String,
    pub term_id: Option<String>,
    pub submitter_id: String,
    pub proposed_content: TermPatch,
    pub status: ApplicationStatus,
    pub is_edit_for_term_id: Option<String>,
    pub review: Option<String>,
    pub linguist_id: Option<String>,
    pub admin_id: Option<String>,
    pub submitted_at: String,
    pub reviewed_at: Option<String>,
    pub crowd_votes_count: i64,
}

impl ApplicationView {
    pub fn build(application: TermApplication, crowd_votes_count: i64) -> Result<Self> {
        Ok(Self {
            status: application.status()?,
            proposed_content: application.patch()?,
            id: application.id,
            term_id: application.term_id,
            submitter_id: application.submitter_id,
            is_edit_for_term_id: application.is_edit_for_term_id,
            review: application.review,
            linguist_id: application.linguist_id,
            admin_id: application.admin_id,
            submitted_at: application.submitted_at,
            reviewed_at: application.reviewed_at,
            crowd_votes_count,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ApplicationListResponse {
    pub applications: Vec<ApplicationView>,
}

pub(crate) async fn load_view(
    db: &SqlitePool,
    application: TermApplication,
) -> Result<ApplicationView> {
    let votes = review::count_votes(db, &application.id).await?;
    ApplicationView::build(application, votes)
}

async fn list_by_status(
    db: &SqlitePool,
    statuses: [ApplicationStatus; 2],
) -> Result<Vec<ApplicationView>> {
    let applications = sqlx::query_as::<_, TermApplication>(
        "SELECT * FROM term_applications WHERE status IN (?, ?) ORDER BY submitted_at",
    )
    .bind(statuses[0].as_str())
    .bind(statuses[1].as_str())
    .fetch_all(db)
    .await?;

    let mut views = Vec::with_capacity(applications.len());
    for application in applications {
        views.push(load_view(db, application).await?);
    }
    Ok(views)
}

/// GET /api/applications/pending-verification
///
/// Linguist/admin review queue: applications awaiting linguist attention.
pub async fn pending_verification(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<ApplicationListResponse>> {
    require_reviewer(&user)?;

    let applications = list_by_status(
        &state.db,
        [
            ApplicationStatus::PendingVerification,
            ApplicationStatus::CrowdVerified,
        ],
    )
    .await?;

    Ok(Json(ApplicationListResponse { applications }))
}

/// GET /api/applications/pending-admin-verification
///
/// Admin queue: applications ready for final approval.
pub async fn pending_admin_verification(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<ApplicationListResponse>> {
    require_role(&user, UserRole::Admin)?;

    let applications = list_by_status(
        &state.db,
        [
            ApplicationStatus::CrowdVerified,
            ApplicationStatus::LinguistVerified,
        ],
    )
    .await?;

    Ok(Json(ApplicationListResponse { applications }))
}

/// GET /api/applications/:id
pub async fn get_application(
    State(state): State<AppState>,
    Extension(_user): Extension<AuthUser>,
    Path(application_id): Path<String>,
) -> ApiResult<Json<ApplicationView>> {
    let application = review::fetch_application(&state.db, &application_id).await?;
    let view = load_view(&state.db, application).await?;
    Ok(Json(view))
}

/// DELETE /api/applications/:id
///
/// Submitter or admin only; distinct from rejection and silent.
pub async fn delete_application(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(application_id): Path<String>,
) -> ApiResult<StatusCode> {
    let synchronizer = TermSynchronizer::new(state.db.clone(), state.events.clone());
    synchronizer
        .delete_application(&application_id, &user.id, user.role)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
