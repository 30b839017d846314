//! Canonical term read endpoints

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use glossary_common::db::models::{ApplicationStatus, Term, TermApplication};
use glossary_common::{Error, Result};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::api::auth::AuthUser;
use crate::api::ApiResult;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct TermView {
    pub id: String,
    pub term: String,
    pub definition: Option<String>,
    pub language: String,
    pub category: Option<String>,
    pub usage_example: Option<String>,
    pub extra_fields: Option<serde_json::Value>,
    pub status: ApplicationStatus,
    pub owner_id: String,
    /// Identifiers of linked translations in other languages
    pub translations: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

async fn load_term_view(db: &SqlitePool, term_id: &str) -> Result<TermView> {
    let term = sqlx::query_as::<_, Term>("SELECT * FROM terms WHERE id = ?")
        .bind(term_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Term {} not found", term_id)))?;

    let translations: Vec<String> = sqlx::query_scalar(
        "SELECT translated_term_id FROM term_translations WHERE term_id = ? ORDER BY created_at",
    )
    .bind(term_id)
    .fetch_all(db)
    .await?;

    let extra_fields = term
        .extra_fields
        .as_deref()
        .map(serde_json::from_str)
        .transpose()
        .map_err(|e| Error::Internal(format!("Corrupt extra_fields for term {}: {}", term_id, e)))?;

    Ok(TermView {
        status: term.status()?,
        id: term.id,
        term: term.term,
        definition: term.definition,
        language: term.language,
        category: term.category,
        usage_example: term.usage_example,
        extra_fields,
        owner_id: term.owner_id,
        translations,
        created_at: term.created_at,
        updated_at: term.updated_at,
    })
}

/// GET /api/terms/:id
pub async fn get_term(
    State(state): State<AppState>,
    Extension(_user): Extension<AuthUser>,
    Path(term_id): Path<String>,
) -> ApiResult<Json<TermView>> {
    let view = load_term_view(&state.db, &term_id).await?;
    Ok(Json(view))
}

/// One rejection and its feedback, from a term's application history
#[derive(Debug, Serialize)]
pub struct ReviewEntry {
    pub application_id: String,
    pub status: ApplicationStatus,
    pub review: String,
    pub linguist_id: Option<String>,
    pub admin_id: Option<String>,
    pub reviewed_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReviewHistoryResponse {
    pub term_id: String,
    pub reviews: Vec<ReviewEntry>,
}

/// GET /api/terms/:id/reviews
///
/// Rejection feedback is retained and independently retrievable so the
/// submitter can see why an application failed.
pub async fn term_reviews(
    State(state): State<AppState>,
    Extension(_user): Extension<AuthUser>,
    Path(term_id): Path<String>,
) -> ApiResult<Json<ReviewHistoryResponse>> {
    let applications = sqlx::query_as::<_, TermApplication>(
        "SELECT * FROM term_applications
         WHERE (term_id = ? OR is_edit_for_term_id = ?) AND review IS NOT NULL
         ORDER BY reviewed_at DESC",
    )
    .bind(&term_id)
    .bind(&term_id)
    .fetch_all(&state.db)
    .await?;

    let mut reviews = Vec::with_capacity(applications.len());
    for application in applications {
        let status = application.status()?;
        if let Some(review) = application.review {
            reviews.push(ReviewEntry {
                application_id: application.id,
                status,
                review,
                linguist_id: application.linguist_id,
                admin_id: application.admin_id,
                reviewed_at: application.reviewed_at,
            });
        }
    }

    Ok(Json(ReviewHistoryResponse { term_id, reviews }))
}
