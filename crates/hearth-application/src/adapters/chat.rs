use hearth_core::blob::BlobRef;
use hearth_core::chat::{Message, MessageLocation, Page};
use hearth_core::error::{HearthError, Result};
use hearth_core::remote::RemoteMethod;
use serde::de::IgnoredAny;

use crate::cache::{QueryState, QueryWatch};
use crate::context::ClientContext;
use crate::keys;
use crate::mutation::{MutationFailure, MutationSpec};

/// A shared chat room: global, household or staff group.
#[derive(Clone)]
pub struct ChatAdapter {
    ctx: ClientContext,
    location: MessageLocation,
    read: RemoteMethod,
    send: RemoteMethod,
}

impl ChatAdapter {
    pub(crate) fn new(ctx: ClientContext, location: MessageLocation) -> Result<Self> {
        let (read, send) = match location {
            MessageLocation::Global => (
                RemoteMethod::GetGlobalMessages,
                RemoteMethod::SendGlobalMessage,
            ),
            MessageLocation::Household => (
                RemoteMethod::GetHouseholdMessages,
                RemoteMethod::SendHouseholdMessage,
            ),
            MessageLocation::StaffGroup => (
                RemoteMethod::GetStaffGroupMessages,
                RemoteMethod::SendStaffGroupMessage,
            ),
            MessageLocation::Private => {
                return Err(HearthError::internal(
                    "private messages have no shared room; use the private chat adapter",
                ));
            }
        };
        Ok(Self {
            ctx,
            location,
            read,
            send,
        })
    }

    pub fn location(&self) -> MessageLocation {
        self.location
    }

    /// One page of the room, read once.
    pub async fn messages(&self, page: Page) -> QueryState<Vec<Message>> {
        self.ctx
            .query(
                keys::room_messages(self.location, page),
                true,
                self.read,
                (page.limit, page.offset),
            )
            .await
    }

    /// One page of the room, polled at the configured chat interval until
    /// the watch is dropped. Before login the watch waits for the client to
    /// become ready.
    pub async fn watch(&self, page: Page) -> QueryWatch<Vec<Message>> {
        self.ctx
            .watch_remote(
                keys::room_messages(self.location, page),
                self.read,
                (page.limit, page.offset),
            )
            .await
    }

    /// Posts to the room. Every cached page of the room goes stale.
    pub async fn send(
        &self,
        content: &str,
        image: Option<BlobRef>,
    ) -> std::result::Result<(), MutationFailure> {
        let args = check_message(content, image.is_some()).map(|()| (content.to_string(), image));
        let spec = MutationSpec::new(self.send.name()).invalidates(keys::messages_root(self.location));
        self.ctx
            .mutate_checked::<IgnoredAny, _>(spec, self.send, args)
            .await
            .map(|_| ())
    }
}

/// A message needs text or an image.
pub(super) fn check_message(content: &str, has_image: bool) -> Result<()> {
    if content.trim().is_empty() && !has_image {
        return Err(HearthError::validation("Please enter a message"));
    }
    Ok(())
}
