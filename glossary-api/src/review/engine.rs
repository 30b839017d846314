//! Review transition engine
//!
//! Role-gated state machine transitions: linguist verify/reject and admin
//! approve/reject. Each transition validates its precondition against the
//! status read inside the transaction, stamps the acting reviewer and a
//! review timestamp, and mirrors the outcome onto the placeholder term of a
//! new-term application.

use glossary_common::db::models::{ApplicationStatus, TermApplication, UserRole};
use glossary_common::events::{EventBus, GlossaryEvent};
use glossary_common::{Error, Result};
use sqlx::SqlitePool;
use tracing::info;

use super::sync::TermSynchronizer;
use super::{fetch_application_tx, mirror_placeholder_status_tx, now_rfc3339};

/// Which reviewer identity column a transition stamps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReviewerSlot {
    Linguist,
    Admin,
}

impl ReviewerSlot {
    fn column(&self) -> &'static str {
        match self {
            ReviewerSlot::Linguist => "linguist_id",
            ReviewerSlot::Admin => "admin_id",
        }
    }
}

pub struct ReviewEngine {
    db: SqlitePool,
    events: EventBus,
    review_min_length: usize,
}

impl ReviewEngine {
    pub fn new(db: SqlitePool, events: EventBus, review_min_length: usize) -> Self {
        Self {
            db,
            events,
            review_min_length,
        }
    }

    /// Linguist verification: PENDING_VERIFICATION or CROWD_VERIFIED
    /// becomes LINGUIST_VERIFIED.
    pub async fn linguist_verify(
        &self,
        application_id: &str,
        actor_id: &str,
        role: UserRole,
    ) -> Result<TermApplication> {
        require_role(role, UserRole::Linguist)?;

        let mut tx = self.db.begin().await?;

        let application = fetch_application_tx(&mut tx, application_id).await?;
        let status = application.status()?;
        check_not_finalized(status)?;
        if !status.linguist_can_verify() {
            return Err(Error::InvalidInput(format!(
                "Cannot linguist-verify an application in status {}",
                status.as_str()
            )));
        }

        let result = sqlx::query(
            "UPDATE term_applications SET status = ?, linguist_id = ?, reviewed_at = ?
             WHERE id = ? AND status = ?",
        )
        .bind(ApplicationStatus::LinguistVerified.as_str())
        .bind(actor_id)
        .bind(now_rfc3339())
        .bind(application_id)
        .bind(status.as_str())
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(concurrent_conflict(application_id));
        }

        mirror_placeholder_status_tx(&mut tx, &application, ApplicationStatus::LinguistVerified)
            .await?;

        let updated = fetch_application_tx(&mut tx, application_id).await?;
        tx.commit().await?;

        info!(
            application_id,
            linguist_id = actor_id,
            old_status = status.as_str(),
            "Application linguist-verified"
        );
        self.publish_status_change(&updated, status, ApplicationStatus::LinguistVerified, actor_id);

        Ok(updated)
    }

    /// Linguist rejection with mandatory feedback
    pub async fn linguist_reject(
        &self,
        application_id: &str,
        actor_id: &str,
        role: UserRole,
        review: &str,
    ) -> Result<TermApplication> {
        require_role(role, UserRole::Linguist)?;
        self.reject(application_id, actor_id, ReviewerSlot::Linguist, review)
            .await
    }

    /// Admin rejection with mandatory feedback, allowed from any
    /// non-terminal status.
    pub async fn admin_reject(
        &self,
        application_id: &str,
        actor_id: &str,
        role: UserRole,
        review: &str,
    ) -> Result<TermApplication> {
        require_role(role, UserRole::Admin)?;
        self.reject(application_id, actor_id, ReviewerSlot::Admin, review)
            .await
    }

    /// Admin approval: merges the proposed content into the canonical term
    /// and finalizes both records in one transaction.
    pub async fn admin_approve(
        &self,
        application_id: &str,
        actor_id: &str,
        role: UserRole,
    ) -> Result<TermApplication> {
        require_role(role, UserRole::Admin)?;

        let mut tx = self.db.begin().await?;

        let application = fetch_application_tx(&mut tx, application_id).await?;
        let status = application.status()?;
        check_not_finalized(status)?;
        if !status.admin_can_approve() {
            return Err(Error::InvalidInput(format!(
                "Cannot approve an application in status {}",
                status.as_str()
            )));
        }

        TermSynchronizer::apply_approval(&mut tx, &application).await?;

        let result = sqlx::query(
            "UPDATE term_applications SET status = ?, admin_id = ?, reviewed_at = ?
             WHERE id = ? AND status = ?",
        )
        .bind(ApplicationStatus::AdminApproved.as_str())
        .bind(actor_id)
        .bind(now_rfc3339())
        .bind(application_id)
        .bind(status.as_str())
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(concurrent_conflict(application_id));
        }

        let updated = fetch_application_tx(&mut tx, application_id).await?;
        tx.commit().await?;

        info!(
            application_id,
            admin_id = actor_id,
            old_status = status.as_str(),
            "Application approved"
        );
        self.publish_status_change(&updated, status, ApplicationStatus::AdminApproved, actor_id);
        if let Some(term_id) = &updated.term_id {
            self.events.publish(GlossaryEvent::TermPublished {
                term_id: term_id.clone(),
                application_id: updated.id.clone(),
                timestamp: chrono::Utc::now(),
            });
        }

        Ok(updated)
    }

    /// Shared rejection path
    ///
    /// Feedback is validated before any state is read; the placeholder term
    /// of a new-term application is discarded inside the same transaction.
    async fn reject(
        &self,
        application_id: &str,
        actor_id: &str,
        slot: ReviewerSlot,
        review: &str,
    ) -> Result<TermApplication> {
        self.validate_review(review)?;

        let mut tx = self.db.begin().await?;

        let application = fetch_application_tx(&mut tx, application_id).await?;
        let status = application.status()?;
        check_not_finalized(status)?;
        let allowed = match slot {
            ReviewerSlot::Linguist => status.linguist_can_verify(),
            ReviewerSlot::Admin => !status.is_terminal(),
        };
        if !allowed {
            return Err(Error::InvalidInput(format!(
                "Cannot reject an application in status {}",
                status.as_str()
            )));
        }

        let sql = format!(
            "UPDATE term_applications SET status = ?, {} = ?, review = ?, reviewed_at = ?
             WHERE id = ? AND status = ?",
            slot.column()
        );
        let result = sqlx::query(&sql)
            .bind(ApplicationStatus::Rejected.as_str())
            .bind(actor_id)
            .bind(review)
            .bind(now_rfc3339())
            .bind(application_id)
            .bind(status.as_str())
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(concurrent_conflict(application_id));
        }

        TermSynchronizer::discard_on_rejection(&mut tx, &application).await?;

        let updated = fetch_application_tx(&mut tx, application_id).await?;
        tx.commit().await?;

        info!(
            application_id,
            reviewer_id = actor_id,
            reviewer = slot.column(),
            old_status = status.as_str(),
            "Application rejected"
        );
        self.publish_status_change(&updated, status, ApplicationStatus::Rejected, actor_id);

        Ok(updated)
    }

    fn validate_review(&self, review: &str) -> Result<()> {
        if review.trim().chars().count() < self.review_min_length {
            return Err(Error::InvalidInput(format!(
                "Rejection feedback must be at least {} characters",
                self.review_min_length
            )));
        }
        Ok(())
    }

    fn publish_status_change(
        &self,
        application: &TermApplication,
        old_status: ApplicationStatus,
        new_status: ApplicationStatus,
        actor_id: &str,
    ) {
        self.events.publish(GlossaryEvent::ApplicationStatusChanged {
            application_id: application.id.clone(),
            term_id: application.term_id.clone(),
            old_status,
            new_status,
            actor_id: actor_id.to_string(),
            timestamp: chrono::Utc::now(),
        });
    }
}

fn require_role(actual: UserRole, required: UserRole) -> Result<()> {
    if actual != required {
        return Err(Error::Forbidden(format!(
            "{} role required",
            required.as_str()
        )));
    }
    Ok(())
}

fn check_not_finalized(status: ApplicationStatus) -> Result<()> {
    if status == ApplicationStatus::AdminApproved {
        return Err(Error::InvalidInput(
            "Application already finalized".to_string(),
        ));
    }
    Ok(())
}

fn concurrent_conflict(application_id: &str) -> Error {
    Error::Conflict(format!(
        "Application {} changed concurrently; transition aborted",
        application_id
    ))
}
