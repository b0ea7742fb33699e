//! Household invite domain models.

use serde::{Deserialize, Serialize};

use crate::identity::Principal;
use crate::time::Time;

/// Invite lifecycle. `Pending` moves exactly once to a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteStatus {
    Pending,
    Accepted,
    Declined,
}

impl InviteStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdInvite {
    pub status: InviteStatus,
    pub inviter: Principal,
    pub inviter_username: String,
    pub invitee: Principal,
    pub invitee_username: String,
    pub created_at: Time,
}

/// An invite together with the id used to answer it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingInvite {
    pub id: String,
    pub invite: HouseholdInvite,
}

impl From<(String, HouseholdInvite)> for PendingInvite {
    fn from((id, invite): (String, HouseholdInvite)) -> Self {
        Self { id, invite }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!InviteStatus::Pending.is_terminal());
        assert!(InviteStatus::Accepted.is_terminal());
        assert!(InviteStatus::Declined.is_terminal());
    }

    #[test]
    fn test_pending_invite_from_wire_tuple() {
        let json = serde_json::json!([
            "inv-1",
            {
                "status": "pending",
                "inviter": "p-a",
                "inviterUsername": "alex",
                "invitee": "p-b",
                "inviteeUsername": "blair",
                "createdAt": 5
            }
        ]);
        let tuple: (String, HouseholdInvite) = serde_json::from_value(json).unwrap();
        let pending = PendingInvite::from(tuple);
        assert_eq!(pending.id, "inv-1");
        assert_eq!(pending.invite.status, InviteStatus::Pending);
        assert_eq!(pending.invite.inviter_username, "alex");
    }
}
