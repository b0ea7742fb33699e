use hearth_core::chat::{Flag, MessageLocation};
use hearth_core::error::HearthError;
use hearth_core::remote::RemoteMethod;
use serde::de::IgnoredAny;
use strum::IntoEnumIterator;

use crate::cache::QueryState;
use crate::context::ClientContext;
use crate::keys;
use crate::mutation::{MutationFailure, MutationSpec};

/// Message flags and staff moderation.
#[derive(Clone)]
pub struct ModerationAdapter {
    ctx: ClientContext,
}

impl ModerationAdapter {
    pub(crate) fn new(ctx: ClientContext) -> Self {
        Self { ctx }
    }

    /// Reports a message for staff review.
    pub async fn flag(
        &self,
        message_id: &str,
        reason: &str,
        location: MessageLocation,
    ) -> Result<(), MutationFailure> {
        let reason = reason.trim();
        let args = if reason.is_empty() {
            Err(HearthError::validation("Please enter a reason"))
        } else {
            Ok((message_id.to_string(), reason.to_string(), location))
        };

        let spec = MutationSpec::new("flagMessage")
            .invalidates(keys::flagged_messages())
            .notice("Message flagged for staff review");
        self.ctx
            .mutate_checked::<IgnoredAny, _>(spec, RemoteMethod::FlagMessage, args)
            .await
            .map(|_| ())
    }

    /// Staff only.
    pub async fn flagged_messages(&self) -> QueryState<Vec<Flag>> {
        self.ctx
            .query(keys::flagged_messages(), true, RemoteMethod::GetFlaggedMessages, ())
            .await
    }

    /// Staff only. Every message location goes stale, along with the flags.
    pub async fn delete(
        &self,
        message_id: &str,
        location: MessageLocation,
    ) -> Result<(), MutationFailure> {
        let spec = MessageLocation::iter()
            .fold(MutationSpec::new("deleteMessage"), |spec, room| {
                spec.invalidates(keys::messages_root(room))
            })
            .invalidates(keys::flagged_messages())
            .notice("Message deleted");
        self.ctx
            .mutate(spec, RemoteMethod::DeleteMessage, (message_id.to_string(), location))
            .await
    }

    /// Staff only.
    pub async fn resolve(&self, flag_id: &str) -> Result<(), MutationFailure> {
        let spec = MutationSpec::new("resolveFlaggedMessage")
            .invalidates(keys::flagged_messages())
            .notice("Flag resolved");
        self.ctx
            .mutate(spec, RemoteMethod::ResolveFlaggedMessage, (flag_id.to_string(),))
            .await
    }
}
