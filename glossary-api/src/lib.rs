//! glossary-api library - Term Application Review service
//!
//! HTTP surface for submitting terms, crowd voting, linguist verification,
//! and administrator approval of the collaborative glossary.

use axum::Router;
use glossary_common::events::EventBus;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod review;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Workflow event bus (observed by XP ledger / notifiers, never awaited)
    pub events: EventBus,
    /// Crowd votes required to promote an application
    pub vote_threshold: i64,
    /// Minimum length of rejection feedback
    pub review_min_length: usize,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, events: EventBus, vote_threshold: i64, review_min_length: usize) -> Self {
        Self {
            db,
            events,
            vote_threshold,
            review_min_length,
        }
    }
}

/// Build application router
///
/// All review endpoints sit behind the role-gate middleware; only the
/// health endpoint is public.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post, put};

    // Protected routes (require a resolved identity)
    let protected = Router::new()
        .route("/api/terms/submit", post(api::submit_term))
        .route("/api/terms/:id", get(api::get_term))
        .route("/api/terms/:id/reviews", get(api::term_reviews))
        .route(
            "/api/applications/pending-verification",
            get(api::pending_verification),
        )
        .route(
            "/api/applications/pending-admin-verification",
            get(api::pending_admin_verification),
        )
        .route(
            "/api/applications/:id",
            get(api::get_application).delete(api::delete_application),
        )
        .route("/api/applications/:id/vote", post(api::cast_vote))
        .route(
            "/api/linguist/applications/:id/verify",
            put(api::linguist_verify),
        )
        .route(
            "/api/linguist/applications/:id/reject",
            put(api::linguist_reject),
        )
        .route("/api/admin/applications/:id/approve", put(api::admin_approve))
        .route("/api/admin/applications/:id/reject", put(api::admin_reject))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::identity_middleware,
        ));

    // Public routes (no authentication)
    let public = api::health_routes();

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
