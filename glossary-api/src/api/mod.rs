//! HTTP API handlers for glossary-api

pub mod admin;
pub mod applications;
pub mod auth;
pub mod error;
pub mod health;
pub mod linguist;
pub mod submit;
pub mod terms;
pub mod vote;

pub use admin::{admin_approve, admin_reject};
pub use applications::{
    delete_application, get_application, pending_admin_verification, pending_verification,
};
pub use auth::{identity_middleware, AuthUser};
pub use error::{ApiError, ApiResult};
pub use health::health_routes;
pub use linguist::{linguist_reject, linguist_verify};
pub use submit::submit_term;
pub use terms::{get_term, term_reviews};
pub use vote::cast_vote;
