//! Row models, workflow enums, and the typed term patch

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

// ============================================================================
// Workflow enums
// ============================================================================

/// Review status of a term application (and, while unresolved, of the term
/// row it mirrors onto).
///
/// `Draft` is reserved; no operation currently produces or accepts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Draft,
    PendingVerification,
    CrowdVerified,
    LinguistVerified,
    AdminApproved,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Draft => "DRAFT",
            ApplicationStatus::PendingVerification => "PENDING_VERIFICATION",
            ApplicationStatus::CrowdVerified => "CROWD_VERIFIED",
            ApplicationStatus::LinguistVerified => "LINGUIST_VERIFIED",
            ApplicationStatus::AdminApproved => "ADMIN_APPROVED",
            ApplicationStatus::Rejected => "REJECTED",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "DRAFT" => Ok(ApplicationStatus::Draft),
            "PENDING_VERIFICATION" => Ok(ApplicationStatus::PendingVerification),
            "CROWD_VERIFIED" => Ok(ApplicationStatus::CrowdVerified),
            "LINGUIST_VERIFIED" => Ok(ApplicationStatus::LinguistVerified),
            "ADMIN_APPROVED" => Ok(ApplicationStatus::AdminApproved),
            "REJECTED" => Ok(ApplicationStatus::Rejected),
            other => Err(Error::Internal(format!(
                "Unknown application status: {}",
                other
            ))),
        }
    }

    /// Terminal states permit no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::AdminApproved | ApplicationStatus::Rejected
        )
    }

    /// Crowd votes are accepted only while verification is pending.
    pub fn accepts_votes(&self) -> bool {
        matches!(self, ApplicationStatus::PendingVerification)
    }

    /// A linguist may verify an application the crowd has not yet resolved.
    pub fn linguist_can_verify(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::PendingVerification | ApplicationStatus::CrowdVerified
        )
    }

    /// An admin may approve only crowd- or linguist-verified applications.
    pub fn admin_can_approve(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::CrowdVerified | ApplicationStatus::LinguistVerified
        )
    }

    /// Initial status of a fresh submission, by submitter role.
    ///
    /// Linguist submissions are self-verified; admins submit like linguists.
    pub fn initial_for(role: UserRole) -> Self {
        match role {
            UserRole::Contributor => ApplicationStatus::PendingVerification,
            UserRole::Linguist | UserRole::Admin => ApplicationStatus::LinguistVerified,
        }
    }
}

/// Resolved role of a caller, as reported by the role gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Contributor,
    Linguist,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Contributor => "contributor",
            UserRole::Linguist => "linguist",
            UserRole::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "contributor" => Ok(UserRole::Contributor),
            "linguist" => Ok(UserRole::Linguist),
            "admin" => Ok(UserRole::Admin),
            other => Err(Error::Internal(format!("Unknown user role: {}", other))),
        }
    }
}

// ============================================================================
// Term patch (proposed content)
// ============================================================================

/// Structured snapshot of the fields a submitter wants a term to have.
///
/// Every field is optional; the patch is validated once at submission time
/// and applied field-by-field when the application is approved.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TermPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_example: Option<String>,
    /// Per-language auxiliary fields, stored as free-form JSON
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_fields: Option<serde_json::Value>,
}

impl TermPatch {
    pub fn is_empty(&self) -> bool {
        self.term.is_none()
            && self.definition.is_none()
            && self.language.is_none()
            && self.category.is_none()
            && self.usage_example.is_none()
            && self.extra_fields.is_none()
    }

    /// A brand-new term needs at least a term text, definition, and language.
    pub fn validate_new(&self) -> Result<()> {
        fn required(field: &Option<String>, name: &str) -> Result<()> {
            match field {
                Some(value) if !value.trim().is_empty() => Ok(()),
                _ => Err(Error::InvalidInput(format!(
                    "Field '{}' is required for a new term submission",
                    name
                ))),
            }
        }

        required(&self.term, "term")?;
        required(&self.definition, "definition")?;
        required(&self.language, "language")?;
        Ok(())
    }

    /// An edit proposal must change at least one field.
    pub fn validate_edit(&self) -> Result<()> {
        if self.is_empty() {
            return Err(Error::InvalidInput(
                "Edit proposal contains no fields to change".to_string(),
            ));
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| Error::Internal(format!("Failed to encode proposed content: {}", e)))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map_err(|e| Error::Internal(format!("Failed to decode proposed content: {}", e)))
    }
}

// ============================================================================
// Row models
// ============================================================================

/// Registered user, the backing record for role resolution
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    pub role: String,
    pub created_at: String,
}

/// Canonical dictionary entry
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Term {
    pub id: String,
    pub term: String,
    pub definition: Option<String>,
    pub language: String,
    pub category: Option<String>,
    pub usage_example: Option<String>,
    /// JSON-encoded per-language auxiliary fields
    pub extra_fields: Option<String>,
    pub status: String,
    pub owner_id: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Term {
    pub fn status(&self) -> Result<ApplicationStatus> {
        ApplicationStatus::parse(&self.status)
    }
}

/// A review ticket: one proposed term or one proposed edit
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TermApplication {
    pub id: String,
    pub term_id: Option<String>,
    pub submitter_id: String,
    /// JSON-encoded [`TermPatch`]
    pub proposed_content: String,
    pub status: String,
    /// Set if and only if this application proposes an edit to an existing term
    pub is_edit_for_term_id: Option<String>,
    /// Mandatory feedback recorded on rejection
    pub review: Option<String>,
    pub linguist_id: Option<String>,
    pub admin_id: Option<String>,
    pub submitted_at: String,
    pub reviewed_at: Option<String>,
}

impl TermApplication {
    pub fn status(&self) -> Result<ApplicationStatus> {
        ApplicationStatus::parse(&self.status)
    }

    pub fn patch(&self) -> Result<TermPatch> {
        TermPatch::from_json(&self.proposed_content)
    }

    pub fn is_edit(&self) -> bool {
        self.is_edit_for_term_id.is_some()
    }
}

/// One user's crowd-verification vote on an application
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ApplicationVote {
    pub id: String,
    pub application_id: String,
    pub user_id: String,
    pub created_at: String,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_text() {
        for status in [
            ApplicationStatus::Draft,
            ApplicationStatus::PendingVerification,
            ApplicationStatus::CrowdVerified,
            ApplicationStatus::LinguistVerified,
            ApplicationStatus::AdminApproved,
            ApplicationStatus::Rejected,
        ] {
            assert_eq!(ApplicationStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(ApplicationStatus::parse("NOT_A_STATUS").is_err());
    }

    #[test]
    fn terminal_states_permit_nothing() {
        for status in [ApplicationStatus::AdminApproved, ApplicationStatus::Rejected] {
            assert!(status.is_terminal());
            assert!(!status.accepts_votes());
            assert!(!status.linguist_can_verify());
        }
        assert!(!ApplicationStatus::AdminApproved.admin_can_approve());
    }

    #[test]
    fn votes_only_while_pending() {
        assert!(ApplicationStatus::PendingVerification.accepts_votes());
        assert!(!ApplicationStatus::CrowdVerified.accepts_votes());
        assert!(!ApplicationStatus::LinguistVerified.accepts_votes());
    }

    #[test]
    fn linguist_verification_window() {
        assert!(ApplicationStatus::PendingVerification.linguist_can_verify());
        assert!(ApplicationStatus::CrowdVerified.linguist_can_verify());
        assert!(!ApplicationStatus::LinguistVerified.linguist_can_verify());
    }

    #[test]
    fn admin_approval_window() {
        assert!(ApplicationStatus::CrowdVerified.admin_can_approve());
        assert!(ApplicationStatus::LinguistVerified.admin_can_approve());
        assert!(!ApplicationStatus::PendingVerification.admin_can_approve());
        assert!(!ApplicationStatus::Rejected.admin_can_approve());
    }

    #[test]
    fn initial_status_follows_submitter_role() {
        assert_eq!(
            ApplicationStatus::initial_for(UserRole::Contributor),
            ApplicationStatus::PendingVerification
        );
        assert_eq!(
            ApplicationStatus::initial_for(UserRole::Linguist),
            ApplicationStatus::LinguistVerified
        );
    }

    #[test]
    fn new_term_patch_requires_core_fields() {
        let mut patch = TermPatch {
            term: Some("Variance".to_string()),
            definition: Some("A measure of dispersion".to_string()),
            language: Some("English".to_string()),
            ..Default::default()
        };
        assert!(patch.validate_new().is_ok());

        patch.definition = None;
        assert!(patch.validate_new().is_err());

        patch.definition = Some("   ".to_string());
        assert!(patch.validate_new().is_err());
    }

    #[test]
    fn edit_patch_must_not_be_empty() {
        assert!(TermPatch::default().validate_edit().is_err());

        let patch = TermPatch {
            usage_example: Some("Used in a sentence".to_string()),
            ..Default::default()
        };
        assert!(patch.validate_edit().is_ok());
    }

    #[test]
    fn patch_json_round_trip_drops_absent_fields() {
        let patch = TermPatch {
            term: Some("Regression".to_string()),
            language: Some("English".to_string()),
            ..Default::default()
        };
        let encoded = patch.to_json().unwrap();
        assert!(!encoded.contains("definition"));

        let decoded = TermPatch::from_json(&encoded).unwrap();
        assert_eq!(decoded.term.as_deref(), Some("Regression"));
        assert!(decoded.definition.is_none());
    }
}
