//! The remote method surface and its availability table.

use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::error::{HearthError, Result};

/// Every backend method the client knows about, named as on the wire.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    AsRefStr,
    IntoStaticStr,
    EnumString,
    EnumIter,
)]
#[strum(serialize_all = "camelCase")]
pub enum RemoteMethod {
    // Profile
    CreateProfile,
    SaveCallerUserProfile,
    GetCallerUserProfile,
    GetCallerUserRole,
    IsCallerAdmin,
    UploadProfilePicture,
    GetPublicProfile,
    GetUserProfile,
    GetAllPublicProfiles,
    GetAllProfilesByUsername,
    AllUsernames,
    AssignCallerUserRole,
    GetPrivateProfileAsStaff,
    GetAllUsersAsStaff,
    GetAvatar,
    // Budget
    GetPersonalBudget,
    SavePersonalBudget,
    GetBudgetByUsername,
    // Household
    InviteToHousehold,
    AcceptHouseholdInvite,
    DeclineHouseholdInvite,
    GetPendingInvites,
    // Chat
    GetGlobalMessages,
    SendGlobalMessage,
    GetPrivateConversations,
    GetPrivateMessages,
    SendPrivateMessage,
    GetConversationStatus,
    PauseConversation,
    UnpauseConversation,
    GetStaffGroupMessages,
    SendStaffGroupMessage,
    GetHouseholdMessages,
    SendHouseholdMessage,
    // Moderation
    FlagMessage,
    GetFlaggedMessages,
    DeleteMessage,
    ResolveFlaggedMessage,
}

/// Whether a call reads or changes backend state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Query,
    Update,
}

impl RemoteMethod {
    /// The wire name, e.g. `getGlobalMessages`.
    pub fn name(self) -> &'static str {
        self.into()
    }

    pub fn kind(self) -> CallKind {
        let name = self.name();
        if name.starts_with("get") || name.starts_with("is") || name.starts_with("all") {
            CallKind::Query
        } else {
            CallKind::Update
        }
    }

    /// Whether the currently deployed backend implements this method.
    ///
    /// The chat and moderation surface is declared in the client but not
    /// deployed yet.
    pub fn is_deployed(self) -> bool {
        !matches!(
            self,
            Self::GetGlobalMessages
                | Self::SendGlobalMessage
                | Self::GetPrivateConversations
                | Self::GetPrivateMessages
                | Self::SendPrivateMessage
                | Self::GetConversationStatus
                | Self::PauseConversation
                | Self::UnpauseConversation
                | Self::GetStaffGroupMessages
                | Self::SendStaffGroupMessage
                | Self::GetHouseholdMessages
                | Self::SendHouseholdMessage
                | Self::FlagMessage
                | Self::GetFlaggedMessages
                | Self::DeleteMessage
                | Self::ResolveFlaggedMessage
        )
    }
}

/// Per-method enable/disable overrides, by wire name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodOverrides {
    #[serde(default)]
    pub enabled: Vec<String>,
    #[serde(default)]
    pub disabled: Vec<String>,
}

/// Capability table: which remote methods may actually be called.
///
/// Calls to a method missing from the table fail with
/// [`HearthError::RemoteUnavailable`] without touching the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodTable {
    unavailable: HashSet<RemoteMethod>,
}

impl MethodTable {
    /// The table matching the deployed backend.
    pub fn deployed() -> Self {
        Self {
            unavailable: RemoteMethod::iter().filter(|m| !m.is_deployed()).collect(),
        }
    }

    /// Every method callable.
    pub fn all_available() -> Self {
        Self {
            unavailable: HashSet::new(),
        }
    }

    pub fn is_available(&self, method: RemoteMethod) -> bool {
        !self.unavailable.contains(&method)
    }

    pub fn enable(mut self, method: RemoteMethod) -> Self {
        self.unavailable.remove(&method);
        self
    }

    pub fn disable(mut self, method: RemoteMethod) -> Self {
        self.unavailable.insert(method);
        self
    }

    /// Applies configured overrides. Disables win over enables.
    pub fn with_overrides(mut self, overrides: &MethodOverrides) -> Result<Self> {
        for name in &overrides.enabled {
            self = self.enable(parse_method(name)?);
        }
        for name in &overrides.disabled {
            self = self.disable(parse_method(name)?);
        }
        Ok(self)
    }

    /// Methods currently marked unavailable, in declaration order.
    pub fn unavailable(&self) -> Vec<RemoteMethod> {
        RemoteMethod::iter()
            .filter(|m| self.unavailable.contains(m))
            .collect()
    }
}

impl Default for MethodTable {
    fn default() -> Self {
        Self::deployed()
    }
}

fn parse_method(name: &str) -> Result<RemoteMethod> {
    RemoteMethod::from_str(name)
        .map_err(|_| HearthError::config(format!("Unknown remote method '{}'", name)))
}
