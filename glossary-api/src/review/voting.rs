//! Crowd voting subsystem
//!
//! Vote insertion, the threshold check, and the promotion to CROWD_VERIFIED
//! commit in one transaction, so two simultaneous votes that each cross the
//! threshold cannot both fire the promotion side effects. The UNIQUE
//! (application_id, user_id) constraint is the backstop against duplicate
//! votes under race.

use glossary_common::db::models::{ApplicationStatus, TermApplication};
use glossary_common::events::{EventBus, GlossaryEvent};
use glossary_common::{Error, Result};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use super::{
    count_votes_tx, fetch_application_tx, mirror_placeholder_status_tx, now_rfc3339,
    transition_status_tx,
};

pub struct CrowdVoting {
    db: SqlitePool,
    events: EventBus,
    threshold: i64,
}

impl CrowdVoting {
    pub fn new(db: SqlitePool, events: EventBus, threshold: i64) -> Self {
        Self {
            db,
            events,
            threshold,
        }
    }

    /// Cast one user's vote on an application
    ///
    /// Returns the application as of after the vote, together with the
    /// derived vote count.
    pub async fn cast_vote(
        &self,
        application_id: &str,
        voter_id: &str,
    ) -> Result<(TermApplication, i64)> {
        let mut tx = self.db.begin().await?;

        let application = fetch_application_tx(&mut tx, application_id).await?;

        if application.submitter_id == voter_id {
            return Err(Error::InvalidInput(
                "Submitters cannot vote on their own application".to_string(),
            ));
        }

        let status = application.status()?;
        if !status.accepts_votes() {
            return Err(Error::InvalidInput(format!(
                "Voting is closed for an application in status {}",
                status.as_str()
            )));
        }

        let insert = sqlx::query(
            "INSERT INTO application_votes (id, application_id, user_id, created_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(application_id)
        .bind(voter_id)
        .bind(now_rfc3339())
        .execute(&mut *tx)
        .await;

        match insert {
            Ok(_) => {}
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                return Err(Error::InvalidInput(
                    "Voter has already voted on this application".to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        }

        let vote_count = count_votes_tx(&mut tx, application_id).await?;

        let promoted = vote_count >= self.threshold;
        if promoted {
            transition_status_tx(
                &mut tx,
                application_id,
                ApplicationStatus::PendingVerification,
                ApplicationStatus::CrowdVerified,
            )
            .await?;
            mirror_placeholder_status_tx(&mut tx, &application, ApplicationStatus::CrowdVerified)
                .await?;
        }

        let updated = fetch_application_tx(&mut tx, application_id).await?;
        tx.commit().await?;

        info!(
            application_id,
            voter_id, vote_count, promoted, "Crowd vote recorded"
        );
        if promoted {
            self.events.publish(GlossaryEvent::ApplicationStatusChanged {
                application_id: updated.id.clone(),
                term_id: updated.term_id.clone(),
                old_status: ApplicationStatus::PendingVerification,
                new_status: ApplicationStatus::CrowdVerified,
                actor_id: voter_id.to_string(),
                timestamp: chrono::Utc::now(),
            });
        }

        Ok((updated, vote_count))
    }
}
