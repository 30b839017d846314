//! Term synchronizer
//!
//! The only writer that crosses from the application store into the
//! canonical term catalog: merges approved content onto the term, discards
//! the placeholder of a rejected new-term submission, and handles the
//! user-initiated deletion of an application.

use glossary_common::db::models::{ApplicationStatus, Term, TermApplication, UserRole};
use glossary_common::events::{EventBus, GlossaryEvent};
use glossary_common::{Error, Result};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::info;

use super::{fetch_application_tx, now_rfc3339};

pub struct TermSynchronizer {
    db: SqlitePool,
    events: EventBus,
}

impl TermSynchronizer {
    pub fn new(db: SqlitePool, events: EventBus) -> Self {
        Self { db, events }
    }

    /// Merge an application's proposed content onto its term
    ///
    /// Runs inside the approving transaction. The term must already exist,
    /// either as the placeholder created at submission or as the
    /// pre-existing term being edited; nothing is created here. Fields
    /// absent from the patch keep their current value.
    pub async fn apply_approval(
        tx: &mut Transaction<'_, Sqlite>,
        application: &TermApplication,
    ) -> Result<()> {
        let status = application.status()?;
        if !status.admin_can_approve() {
            return Err(Error::InvalidInput(format!(
                "Cannot merge an application in status {}",
                status.as_str()
            )));
        }

        let term_id = application.term_id.as_deref().ok_or_else(|| {
            Error::Internal(format!(
                "Application {} has no term to merge into",
                application.id
            ))
        })?;

        let term = sqlx::query_as::<_, Term>("SELECT * FROM terms WHERE id = ?")
            .bind(term_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Term {} not found", term_id)))?;

        let patch = application.patch()?;

        sqlx::query(
            "UPDATE terms SET term = ?, definition = ?, language = ?, category = ?,
                    usage_example = ?, extra_fields = ?, status = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(patch.term.unwrap_or(term.term))
        .bind(patch.definition.or(term.definition))
        .bind(patch.language.unwrap_or(term.language))
        .bind(patch.category.or(term.category))
        .bind(patch.usage_example.or(term.usage_example))
        .bind(
            patch
                .extra_fields
                .map(|v| v.to_string())
                .or(term.extra_fields),
        )
        .bind(ApplicationStatus::AdminApproved.as_str())
        .bind(now_rfc3339())
        .bind(term_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Remove the placeholder term of a rejected new-term submission
    ///
    /// An unpublished draft that failed review leaves no trace in the
    /// catalog. Edit proposals never touch their target term.
    pub async fn discard_on_rejection(
        tx: &mut Transaction<'_, Sqlite>,
        application: &TermApplication,
    ) -> Result<()> {
        if application.is_edit() {
            return Ok(());
        }

        if let Some(term_id) = &application.term_id {
            // The rejected ticket outlives its placeholder; clear the reference
            sqlx::query("UPDATE term_applications SET term_id = NULL WHERE id = ?")
                .bind(&application.id)
                .execute(&mut **tx)
                .await?;
            sqlx::query("DELETE FROM terms WHERE id = ?")
                .bind(term_id)
                .execute(&mut **tx)
                .await?;
        }

        Ok(())
    }

    /// User-initiated deletion, distinct from rejection
    ///
    /// Available to the submitter or an administrator at any non-terminal
    /// status. Removes the application with its votes and, for a new-term
    /// submission, the placeholder term. Silent: no feedback is recorded.
    pub async fn delete_application(
        &self,
        application_id: &str,
        requester_id: &str,
        role: UserRole,
    ) -> Result<()> {
        let mut tx = self.db.begin().await?;

        let application = fetch_application_tx(&mut tx, application_id).await?;

        if application.submitter_id != requester_id && role != UserRole::Admin {
            return Err(Error::Forbidden(
                "Only the submitter or an administrator may delete an application".to_string(),
            ));
        }

        let status = application.status()?;
        if status.is_terminal() {
            return Err(Error::InvalidInput(format!(
                "Cannot delete an application in terminal status {}",
                status.as_str()
            )));
        }

        let placeholder_term_id = if application.is_edit() {
            None
        } else {
            application.term_id.clone()
        };

        sqlx::query("DELETE FROM application_votes WHERE application_id = ?")
            .bind(application_id)
            .execute(&mut *tx)
            .await?;

        let result =
            sqlx::query("DELETE FROM term_applications WHERE id = ? AND status = ?")
                .bind(application_id)
                .bind(status.as_str())
                .execute(&mut *tx)
                .await?;
        if result.rows_affected() == 0 {
            return Err(Error::Conflict(format!(
                "Application {} changed concurrently; deletion aborted",
                application_id
            )));
        }

        if let Some(term_id) = &placeholder_term_id {
            sqlx::query("DELETE FROM terms WHERE id = ?")
                .bind(term_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        info!(
            application_id,
            requester_id,
            placeholder_removed = placeholder_term_id.is_some(),
            "Application deleted"
        );
        self.events.publish(GlossaryEvent::ApplicationDeleted {
            application_id: application_id.to_string(),
            term_id: application.term_id.clone(),
            requested_by: requester_id.to_string(),
            timestamp: chrono::Utc::now(),
        });

        Ok(())
    }
}
