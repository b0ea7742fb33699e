//! Error types and user-facing error translation for Hearth.
//!
//! Every failure in the data layer is a [`HearthError`]. Before a failure is
//! shown to a person it goes through [`translate_error`], which reduces it to
//! one of a closed set of [`ErrorCategory`] values with a fixed message.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the whole client data layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HearthError {
    /// Identity or remote handle is not available yet. Not user-facing.
    #[error("Not ready: identity or remote handle unavailable")]
    NotReady,

    /// The remote method is not deployed on the backend.
    #[error("Remote method not implemented: {method}")]
    RemoteUnavailable { method: String },

    /// The backend rejected the call; carries the raw rejection text.
    #[error("{0}")]
    Rejected(String),

    /// Network or transport level failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Sending is blocked because the conversation is paused by the peer.
    #[error("Conversation is paused by the other participant")]
    ConversationBlocked,

    /// Client-side validation failed before any remote call.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HearthError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a RemoteUnavailable error for the named method
    pub fn unavailable(method: impl Into<String>) -> Self {
        Self::RemoteUnavailable {
            method: method.into(),
        }
    }

    /// Creates a Rejected error
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    /// Creates a Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotReady condition
    pub fn is_not_ready(&self) -> bool {
        matches!(self, Self::NotReady)
    }

    /// Check if the remote method is missing on the backend
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::RemoteUnavailable { .. })
    }

    /// Check if this is a remote rejection whose text contains `needle`.
    pub fn is_rejection_containing(&self, needle: &str) -> bool {
        match self {
            Self::Rejected(message) => message.contains(needle),
            _ => false,
        }
    }

    /// The user-facing category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotReady => ErrorCategory::NotReady,
            Self::RemoteUnavailable { .. } => ErrorCategory::Unavailable,
            Self::ConversationBlocked => ErrorCategory::ConversationBlocked,
            Self::Validation(_) => ErrorCategory::Validation,
            Self::Transport(_) => ErrorCategory::TransientBackend,
            Self::Rejected(message) => classify(message),
            Self::Serialization { .. } | Self::Config(_) | Self::Storage(_) | Self::Internal(_) => {
                ErrorCategory::Unknown
            }
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for HearthError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(format!("{} (kind: {:?})", err, err.kind()))
    }
}

impl From<serde_json::Error> for HearthError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for HearthError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for HearthError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, HearthError>`.
pub type Result<T> = std::result::Result<T, HearthError>;

// ============================================================================
// Translation
// ============================================================================

/// Closed set of user-facing error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCategory {
    UnauthorizedStaff,
    Unauthorized,
    HouseholdMembership,
    AgeRestriction,
    ConversationBlocked,
    Conflict,
    Validation,
    NotFound,
    Unavailable,
    TransientBackend,
    NotReady,
    Unknown,
}

impl ErrorCategory {
    /// The fixed display text for this category.
    pub fn message(self) -> &'static str {
        match self {
            Self::UnauthorizedStaff => {
                "You do not have permission to perform this action. Staff access required."
            }
            Self::Unauthorized => "You do not have permission to perform this action.",
            Self::HouseholdMembership => {
                "There was an issue with your household. Please check your membership status."
            }
            Self::AgeRestriction => "You must be 18 years or older to use this feature.",
            Self::ConversationBlocked => "This conversation is currently unavailable.",
            Self::Conflict => "This item already exists. Please try a different value.",
            Self::Validation => "The provided information is invalid. Please check and try again.",
            Self::NotFound => "The requested item could not be found.",
            Self::Unavailable => "This feature is not available yet. Please check back later.",
            Self::TransientBackend => "A temporary issue occurred. Please try again in a moment.",
            Self::NotReady => "Still connecting to the service. Please wait a moment.",
            Self::Unknown => "An unexpected error occurred. Please try again.",
        }
    }
}

/// A display-ready error message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMessage {
    pub category: ErrorCategory,
    pub text: String,
}

impl From<ErrorCategory> for UserMessage {
    fn from(category: ErrorCategory) -> Self {
        Self {
            category,
            text: category.message().to_string(),
        }
    }
}

impl std::fmt::Display for UserMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

static AGE_WORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(age|aged|adult|adults|underage|18|years old)\b")
        .expect("age pattern is a valid regex literal")
});

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// Classifies raw remote error text into exactly one [`ErrorCategory`].
///
/// Matching is case-insensitive. Specific categories are checked before
/// generic ones: "household not found" is a household problem, not a
/// missing item.
pub fn classify(raw: &str) -> ErrorCategory {
    let text = raw.to_lowercase();
    let unauthorized = contains_any(&text, &["unauthorized", "permission", "forbidden"]);

    if unauthorized && contains_any(&text, &["staff", "admin"]) {
        return ErrorCategory::UnauthorizedStaff;
    }
    if text.contains("household") {
        return ErrorCategory::HouseholdMembership;
    }
    if AGE_WORDS.is_match(&text) {
        return ErrorCategory::AgeRestriction;
    }
    if contains_any(&text, &["blocked", "paused"]) {
        return ErrorCategory::ConversationBlocked;
    }
    if unauthorized {
        return ErrorCategory::Unauthorized;
    }
    if contains_any(&text, &["already exists", "already taken", "duplicate"]) {
        return ErrorCategory::Conflict;
    }
    if text.contains("invalid") {
        return ErrorCategory::Validation;
    }
    if text.contains("not found") {
        return ErrorCategory::NotFound;
    }
    if contains_any(
        &text,
        &[
            "not implemented",
            "unimplemented",
            "has no query method",
            "has no update method",
        ],
    ) {
        return ErrorCategory::Unavailable;
    }
    if contains_any(&text, &["trap", "canister", "timeout", "timed out", "temporarily"]) {
        return ErrorCategory::TransientBackend;
    }
    ErrorCategory::Unknown
}

/// Translates raw error text into a display-ready message. Never fails.
pub fn translate(raw: &str) -> UserMessage {
    classify(raw).into()
}

/// Translates a typed error into a display-ready message. Never fails.
pub fn translate_error(err: &HearthError) -> UserMessage {
    err.category().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staff_is_more_specific_than_unauthorized() {
        let msg = translate("Unauthorized: staff access required");
        assert_eq!(msg.category, ErrorCategory::UnauthorizedStaff);
        assert!(msg.text.contains("Staff access required"));

        assert_eq!(
            classify("Unauthorized: only admins can assign roles"),
            ErrorCategory::UnauthorizedStaff
        );
        assert_eq!(
            classify("Unauthorized: not your profile"),
            ErrorCategory::Unauthorized
        );
    }

    #[test]
    fn test_household_wins_over_not_found() {
        assert_eq!(
            classify("Household not found"),
            ErrorCategory::HouseholdMembership
        );
        assert_eq!(
            classify("Unauthorized: not a member of this household"),
            ErrorCategory::HouseholdMembership
        );
    }

    #[test]
    fn test_age_matches_whole_words_only() {
        assert_eq!(
            classify("User must be 18 or older"),
            ErrorCategory::AgeRestriction
        );
        assert_eq!(classify("Minimum age not met"), ErrorCategory::AgeRestriction);
        // "message" contains "age" but is not an age restriction
        assert_eq!(classify("Message not found"), ErrorCategory::NotFound);
        assert_eq!(classify("Invalid page size"), ErrorCategory::Validation);
    }

    #[test]
    fn test_generic_categories() {
        assert_eq!(classify("Profile not found"), ErrorCategory::NotFound);
        assert_eq!(
            classify("Username already taken"),
            ErrorCategory::Conflict
        );
        assert_eq!(
            classify("Invalid date of birth"),
            ErrorCategory::Validation
        );
        assert_eq!(
            classify("Conversation is paused"),
            ErrorCategory::ConversationBlocked
        );
        assert_eq!(
            classify("Canister trapped explicitly: out of cycles"),
            ErrorCategory::TransientBackend
        );
        assert_eq!(
            classify("Canister abc has no update method 'sendGlobalMessage'"),
            ErrorCategory::Unavailable
        );
    }

    #[test]
    fn test_unknown_is_the_fallback() {
        assert_eq!(classify(""), ErrorCategory::Unknown);
        assert_eq!(classify("something odd happened"), ErrorCategory::Unknown);
        assert_eq!(
            translate("something odd happened").text,
            "An unexpected error occurred. Please try again."
        );
    }

    #[test]
    fn test_classification_is_case_insensitive_and_deterministic() {
        assert_eq!(classify("NOT FOUND"), classify("not found"));
        assert_eq!(classify("Not Found"), ErrorCategory::NotFound);
        for _ in 0..3 {
            assert_eq!(
                classify("Unauthorized: staff access required"),
                ErrorCategory::UnauthorizedStaff
            );
        }
    }

    #[test]
    fn test_typed_errors_translate_directly() {
        assert_eq!(
            translate_error(&HearthError::unavailable("getGlobalMessages")).category,
            ErrorCategory::Unavailable
        );
        assert_eq!(
            translate_error(&HearthError::NotReady).category,
            ErrorCategory::NotReady
        );
        assert_eq!(
            translate_error(&HearthError::ConversationBlocked).category,
            ErrorCategory::ConversationBlocked
        );
        assert_eq!(
            translate_error(&HearthError::transport("connection reset")).category,
            ErrorCategory::TransientBackend
        );
        assert_eq!(
            translate_error(&HearthError::rejected("Profile not found")).category,
            ErrorCategory::NotFound
        );
    }

    #[test]
    fn test_rejection_helpers() {
        let err = HearthError::rejected("Profile not found");
        assert!(err.is_rejection_containing("Profile not found"));
        assert!(!HearthError::NotReady.is_rejection_containing("Profile not found"));
        assert!(HearthError::unavailable("x").is_unavailable());
    }
}
