//! Identity domain models.

use serde::{Deserialize, Serialize};

/// Opaque unique identifier of an authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Principal {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Principal {
    fn from(text: String) -> Self {
        Self(text)
    }
}

/// The authenticated caller as handed over by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub principal: Principal,
    /// Delegation token issued by the identity provider, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delegation: Option<String>,
}

impl Identity {
    pub fn new(principal: impl Into<Principal>) -> Self {
        Self {
            principal: principal.into(),
            delegation: None,
        }
    }

    pub fn with_delegation(mut self, delegation: impl Into<String>) -> Self {
        self.delegation = Some(delegation.into());
        self
    }
}

/// Lifecycle notifications emitted by the identity binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Login completed; the remote handle is being built.
    LoggedIn(Principal),
    /// The remote handle finished initializing.
    HandleReady(Principal),
    /// Identity cleared. Every identity-scoped cache must purge.
    LoggedOut(Principal),
}
