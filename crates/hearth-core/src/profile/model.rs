//! Profile domain models.
//!
//! A profile is split in two: the public half anyone signed in may read, and
//! the private half only the owner and staff may read.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::age::DateOfBirth;
use crate::blob::BlobRef;
use crate::identity::Principal;
use crate::time::Time;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<BlobRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateProfile {
    pub full_name: String,
    pub dob: DateOfBirth,
    /// Derived by the backend from `dob` when the profile was saved.
    pub is_adult: bool,
    pub created_at: Time,
    pub last_updated: Time,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<BlobRef>,
}

/// Public profile plus private details when the caller may see them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullProfile {
    pub public_profile: PublicProfile,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_details: Option<PrivateProfile>,
}

/// Access role. `Admin` is the staff role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
    Guest,
}

impl UserRole {
    pub fn is_staff(self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// One row of the staff user directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffUserRecord {
    pub principal: Principal,
    pub public_profile: PublicProfile,
    pub private_profile: Option<PrivateProfile>,
}
