use hearth_core::household::{HouseholdInvite, PendingInvite};
use hearth_core::error::HearthError;
use hearth_core::remote::RemoteMethod;

use crate::cache::QueryState;
use crate::context::ClientContext;
use crate::keys;
use crate::mutation::{MutationFailure, MutationSpec};

/// Household invites.
#[derive(Clone)]
pub struct HouseholdAdapter {
    ctx: ClientContext,
}

impl HouseholdAdapter {
    pub(crate) fn new(ctx: ClientContext) -> Self {
        Self { ctx }
    }

    /// Invites addressed to the caller that are still pending.
    pub async fn pending_invites(&self) -> QueryState<Vec<PendingInvite>> {
        let options = self.ctx.read_options(true).await;
        let fetch = self
            .ctx
            .remote::<Vec<(String, HouseholdInvite)>, _>(RemoteMethod::GetPendingInvites, ());
        self.ctx
            .cache()
            .fetch(&keys::pending_invites(), &options, move || {
                let pairs = fetch();
                async move {
                    let invites = pairs
                        .await?
                        .into_iter()
                        .map(PendingInvite::from)
                        .collect::<Vec<_>>();
                    Ok::<_, HearthError>(invites)
                }
            })
            .await
    }

    /// Invites `username` into the caller's household. Returns the invite id.
    pub async fn invite(&self, username: &str) -> Result<String, MutationFailure> {
        let username = username.trim();
        let args = if username.is_empty() {
            Err(HearthError::validation("Please enter a username"))
        } else {
            Ok((username.to_string(),))
        };

        let spec = MutationSpec::new("inviteToHousehold")
            .invalidates(keys::pending_invites())
            .notice(format!("Invite sent to {}", username));
        self.ctx
            .mutate_checked(spec, RemoteMethod::InviteToHousehold, args)
            .await
    }

    /// Accepts an invite. Returns the id of the household joined.
    pub async fn accept(&self, invite_id: &str) -> Result<String, MutationFailure> {
        let spec = MutationSpec::new("acceptHouseholdInvite")
            .invalidates(keys::pending_invites())
            .notice("Household invite accepted!");
        self.ctx
            .mutate(spec, RemoteMethod::AcceptHouseholdInvite, (invite_id.to_string(),))
            .await
    }

    pub async fn decline(&self, invite_id: &str) -> Result<(), MutationFailure> {
        let spec = MutationSpec::new("declineHouseholdInvite")
            .invalidates(keys::pending_invites())
            .notice("Invite declined");
        self.ctx
            .mutate(spec, RemoteMethod::DeclineHouseholdInvite, (invite_id.to_string(),))
            .await
    }
}
