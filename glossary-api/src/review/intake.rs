//! Submission intake
//!
//! Creates the review ticket for a new term or an edit proposal. New-term
//! submissions also create the placeholder term, in the same transaction,
//! with a status mirroring the application's initial status.

use glossary_common::db::models::{ApplicationStatus, TermApplication, TermPatch, UserRole};
use glossary_common::events::{EventBus, GlossaryEvent};
use glossary_common::{Error, Result};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use super::fetch_application_tx;

pub struct SubmissionIntake {
    db: SqlitePool,
    events: EventBus,
}

impl SubmissionIntake {
    pub fn new(db: SqlitePool, events: EventBus) -> Self {
        Self { db, events }
    }

    /// Create a term application (and, for new terms, the placeholder term)
    ///
    /// The patch is validated up front, before any state is touched.
    /// Initial status follows the submitter's role: contributors start at
    /// PENDING_VERIFICATION, linguists are self-verified.
    pub async fn submit(
        &self,
        patch: TermPatch,
        submitter_id: &str,
        role: UserRole,
        edit_target: Option<&str>,
    ) -> Result<TermApplication> {
        match edit_target {
            Some(_) => patch.validate_edit()?,
            None => patch.validate_new()?,
        }

        let status = ApplicationStatus::initial_for(role);
        let application_id = Uuid::new_v4().to_string();
        let proposed_content = patch.to_json()?;

        // Linguist submissions record the submitter as the verifier
        let linguist_id = if status == ApplicationStatus::LinguistVerified {
            Some(submitter_id)
        } else {
            None
        };

        let mut tx = self.db.begin().await?;

        let (term_id, is_edit_for_term_id) = match edit_target {
            Some(target) => {
                let exists: Option<String> =
                    sqlx::query_scalar("SELECT id FROM terms WHERE id = ?")
                        .bind(target)
                        .fetch_optional(&mut *tx)
                        .await?;
                if exists.is_none() {
                    return Err(Error::NotFound(format!("Term {} not found", target)));
                }
                (target.to_string(), Some(target.to_string()))
            }
            None => {
                // Validation guarantees these are present for new terms
                let term_text = patch.term.clone().unwrap_or_default();
                let language = patch.language.clone().unwrap_or_default();

                let duplicate: Option<String> = sqlx::query_scalar(
                    "SELECT id FROM terms WHERE term = ? COLLATE NOCASE AND language = ? LIMIT 1",
                )
                .bind(&term_text)
                .bind(&language)
                .fetch_optional(&mut *tx)
                .await?;
                if duplicate.is_some() {
                    return Err(Error::Conflict(format!(
                        "Term '{}' already exists for language {}",
                        term_text, language
                    )));
                }

                let placeholder_id = Uuid::new_v4().to_string();
                sqlx::query(
                    "INSERT INTO terms (id, term, definition, language, category,
                            usage_example, extra_fields, status, owner_id)
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(&placeholder_id)
                .bind(&term_text)
                .bind(&patch.definition)
                .bind(&language)
                .bind(&patch.category)
                .bind(&patch.usage_example)
                .bind(patch.extra_fields.as_ref().map(|v| v.to_string()))
                .bind(status.as_str())
                .bind(submitter_id)
                .execute(&mut *tx)
                .await?;

                (placeholder_id, None)
            }
        };

        sqlx::query(
            "INSERT INTO term_applications (id, term_id, submitter_id, proposed_content,
                    status, is_edit_for_term_id, linguist_id)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&application_id)
        .bind(&term_id)
        .bind(submitter_id)
        .bind(&proposed_content)
        .bind(status.as_str())
        .bind(&is_edit_for_term_id)
        .bind(linguist_id)
        .execute(&mut *tx)
        .await?;

        let application = fetch_application_tx(&mut tx, &application_id).await?;
        tx.commit().await?;

        info!(
            application_id,
            submitter_id,
            role = role.as_str(),
            status = status.as_str(),
            is_edit = is_edit_for_term_id.is_some(),
            "Application submitted"
        );
        self.events.publish(GlossaryEvent::ApplicationSubmitted {
            application_id: application.id.clone(),
            term_id: application.term_id.clone(),
            submitter_id: submitter_id.to_string(),
            status,
            timestamp: chrono::Utc::now(),
        });

        Ok(application)
    }
}
