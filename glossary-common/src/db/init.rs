//! Database initialization
//!
//! Creates the database on first run, applies pragmas, and builds the schema
//! idempotently so every service can start against an empty root folder.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Default number of crowd votes that promote an application
pub const DEFAULT_CROWD_VOTE_THRESHOLD: i64 = 2;

/// Default minimum length of rejection feedback
pub const DEFAULT_REVIEW_MIN_LENGTH: i64 = 10;

/// Default HTTP port for the API service
pub const DEFAULT_HTTP_PORT: i64 = 5730;

/// Seeded administrator account, created on first run
pub const SEED_ADMIN_ID: &str = "00000000-0000-0000-0000-000000000001";

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // mode=rwc creates the database file if it doesn't exist
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    apply_schema(&pool).await?;

    Ok(pool)
}

/// Apply pragmas, create all tables, and seed defaults (idempotent)
///
/// Exposed separately from [`init_database`] so tests can run the same
/// schema against an in-memory pool.
pub async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(pool).await?;

    // WAL allows concurrent readers with one writer
    sqlx::query("PRAGMA journal_mode = WAL").execute(pool).await?;

    // Wait for locks instead of failing immediately under write contention
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(pool)
        .await?;

    create_users_table(pool).await?;
    create_settings_table(pool).await?;
    create_terms_table(pool).await?;
    create_term_translations_table(pool).await?;
    create_term_applications_table(pool).await?;
    create_application_votes_table(pool).await?;

    init_default_settings(pool).await?;

    Ok(())
}

async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            role TEXT NOT NULL DEFAULT 'contributor'
                CHECK (role IN ('contributor', 'linguist', 'admin')),
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create seed administrator if it doesn't exist
    sqlx::query(
        r#"
        INSERT OR IGNORE INTO users (id, username, role)
        VALUES (?, 'admin', 'admin')
        "#,
    )
    .bind(SEED_ADMIN_ID)
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the settings table
///
/// Stores application configuration key-value pairs.
pub async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the terms table
///
/// The canonical catalog. While an application is unresolved, the owning
/// placeholder row mirrors the application's status; only fully approved
/// rows carry ADMIN_APPROVED.
pub async fn create_terms_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS terms (
            id TEXT PRIMARY KEY,
            term TEXT NOT NULL,
            definition TEXT,
            language TEXT NOT NULL,
            category TEXT,
            usage_example TEXT,
            extra_fields TEXT,
            status TEXT NOT NULL
                CHECK (status IN ('DRAFT', 'PENDING_VERIFICATION', 'CROWD_VERIFIED',
                                  'LINGUIST_VERIFIED', 'ADMIN_APPROVED', 'REJECTED')),
            owner_id TEXT NOT NULL REFERENCES users(id),
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (length(term) > 0),
            CHECK (length(language) > 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Duplicate checks compare the term text case-insensitively per language
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_terms_term_language
         ON terms(term COLLATE NOCASE, language)",
    )
    .execute(pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_terms_status ON terms(status)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the term_translations linking table
///
/// Symmetric many-to-many translation links; rows are stored in both
/// directions so either side resolves with one indexed lookup.
async fn create_term_translations_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS term_translations (
            term_id TEXT NOT NULL REFERENCES terms(id) ON DELETE CASCADE,
            translated_term_id TEXT NOT NULL REFERENCES terms(id) ON DELETE CASCADE,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (term_id, translated_term_id),
            CHECK (term_id != translated_term_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the term_applications table
///
/// One row per review ticket. `is_edit_for_term_id` is set if and only if
/// the application proposes an edit to an existing term; new submissions
/// point `term_id` at their placeholder instead. When a placeholder is
/// discarded on rejection the reference is nulled rather than cascading, so
/// the rejected ticket and its feedback survive.
pub async fn create_term_applications_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS term_applications (
            id TEXT PRIMARY KEY,
            term_id TEXT REFERENCES terms(id) ON DELETE SET NULL,
            submitter_id TEXT NOT NULL REFERENCES users(id),
            proposed_content TEXT NOT NULL,
            status TEXT NOT NULL
                CHECK (status IN ('DRAFT', 'PENDING_VERIFICATION', 'CROWD_VERIFIED',
                                  'LINGUIST_VERIFIED', 'ADMIN_APPROVED', 'REJECTED')),
            is_edit_for_term_id TEXT REFERENCES terms(id) ON DELETE SET NULL,
            review TEXT,
            linguist_id TEXT REFERENCES users(id),
            admin_id TEXT REFERENCES users(id),
            submitted_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            reviewed_at TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_applications_status ON term_applications(status)",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_applications_term ON term_applications(term_id)",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_applications_submitter ON term_applications(submitter_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the application_votes table
///
/// The UNIQUE pair constraint is the authority on duplicate votes: two
/// concurrent inserts for the same (application, voter) cannot both commit.
pub async fn create_application_votes_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS application_votes (
            id TEXT PRIMARY KEY,
            application_id TEXT NOT NULL REFERENCES term_applications(id) ON DELETE CASCADE,
            user_id TEXT NOT NULL REFERENCES users(id),
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE (application_id, user_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_votes_application ON application_votes(application_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Initialize or update default settings
async fn init_default_settings(pool: &SqlitePool) -> Result<()> {
    ensure_setting(
        pool,
        "crowd_vote_threshold",
        &DEFAULT_CROWD_VOTE_THRESHOLD.to_string(),
    )
    .await?;
    ensure_setting(
        pool,
        "review_min_length",
        &DEFAULT_REVIEW_MIN_LENGTH.to_string(),
    )
    .await?;
    ensure_setting(pool, "http_port", &DEFAULT_HTTP_PORT.to_string()).await?;

    Ok(())
}

/// Ensure a setting exists with the specified default value
///
/// Uses INSERT OR IGNORE so concurrent initialization races are harmless.
pub async fn ensure_setting(pool: &SqlitePool, key: &str, default_value: &str) -> Result<()> {
    let inserted = sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)")
        .bind(key)
        .bind(default_value)
        .execute(pool)
        .await?;

    if inserted.rows_affected() > 0 {
        info!(
            "Initialized setting '{}' with default value: {}",
            key, default_value
        );
    }

    Ok(())
}

/// Read an integer setting, falling back to the given default
///
/// Missing rows, NULL values, and unparsable values all yield the default.
pub async fn read_setting_i64(pool: &SqlitePool, key: &str, default: i64) -> Result<i64> {
    let value: Option<Option<String>> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(pool)
            .await?;

    Ok(value
        .flatten()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(default))
}
