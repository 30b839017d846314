//! Term application review workflow
//!
//! The four workflow components share one discipline: every operation is a
//! single database transaction, and every status write is a compare-and-swap
//! against the status that was read, so a concurrent conflicting transition
//! aborts instead of committing a stale decision.

pub mod engine;
pub mod intake;
pub mod sync;
pub mod voting;

pub use engine::ReviewEngine;
pub use intake::SubmissionIntake;
pub use sync::TermSynchronizer;
pub use voting::CrowdVoting;

use glossary_common::db::models::{ApplicationStatus, TermApplication};
use glossary_common::{Error, Result};
use sqlx::{Sqlite, SqlitePool, Transaction};

pub(crate) fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

pub(crate) async fn fetch_application(
    db: &SqlitePool,
    application_id: &str,
) -> Result<TermApplication> {
    sqlx::query_as::<_, TermApplication>("SELECT * FROM term_applications WHERE id = ?")
        .bind(application_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Application {} not found", application_id)))
}

pub(crate) async fn fetch_application_tx(
    tx: &mut Transaction<'_, Sqlite>,
    application_id: &str,
) -> Result<TermApplication> {
    sqlx::query_as::<_, TermApplication>("SELECT * FROM term_applications WHERE id = ?")
        .bind(application_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Application {} not found", application_id)))
}

/// Derived at read time, never stored on the application row
pub(crate) async fn count_votes(db: &SqlitePool, application_id: &str) -> Result<i64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM application_votes WHERE application_id = ?")
            .bind(application_id)
            .fetch_one(db)
            .await?;
    Ok(count)
}

pub(crate) async fn count_votes_tx(
    tx: &mut Transaction<'_, Sqlite>,
    application_id: &str,
) -> Result<i64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM application_votes WHERE application_id = ?")
            .bind(application_id)
            .fetch_one(&mut **tx)
            .await?;
    Ok(count)
}

/// Compare-and-swap status write without reviewer stamping
///
/// Zero rows affected means the row no longer holds the status that was
/// read; the caller's transaction must abort with a conflict.
pub(crate) async fn transition_status_tx(
    tx: &mut Transaction<'_, Sqlite>,
    application_id: &str,
    from: ApplicationStatus,
    to: ApplicationStatus,
) -> Result<()> {
    let result = sqlx::query("UPDATE term_applications SET status = ? WHERE id = ? AND status = ?")
        .bind(to.as_str())
        .bind(application_id)
        .bind(from.as_str())
        .execute(&mut **tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::Conflict(format!(
            "Application {} changed concurrently; transition aborted",
            application_id
        )));
    }

    Ok(())
}

/// Mirror a new status onto the placeholder term of a new-term application
///
/// Edit proposals never touch their target term here.
pub(crate) async fn mirror_placeholder_status_tx(
    tx: &mut Transaction<'_, Sqlite>,
    application: &TermApplication,
    status: ApplicationStatus,
) -> Result<()> {
    if application.is_edit() {
        return Ok(());
    }

    if let Some(term_id) = &application.term_id {
        sqlx::query("UPDATE terms SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(now_rfc3339())
            .bind(term_id)
            .execute(&mut **tx)
            .await?;
    }

    Ok(())
}
