use hearth_core::blob::BlobRef;
use hearth_core::chat::{ConversationStatus, ConversationSummary, Message, Page};
use hearth_core::error::HearthError;
use hearth_core::identity::Principal;
use hearth_core::remote::RemoteMethod;
use serde::de::IgnoredAny;

use super::chat::check_message;
use crate::cache::{QueryState, QueryWatch};
use crate::context::ClientContext;
use crate::keys;
use crate::mutation::{MutationFailure, MutationSpec};

/// One-to-one conversations and their pause state.
#[derive(Clone)]
pub struct PrivateChatAdapter {
    ctx: ClientContext,
}

impl PrivateChatAdapter {
    pub(crate) fn new(ctx: ClientContext) -> Self {
        Self { ctx }
    }

    pub async fn conversations(&self) -> QueryState<Vec<ConversationSummary>> {
        self.ctx
            .query(
                keys::private_conversations(),
                true,
                RemoteMethod::GetPrivateConversations,
                (),
            )
            .await
    }

    /// The conversation list, polled at the chat interval.
    pub async fn watch_conversations(&self) -> QueryWatch<Vec<ConversationSummary>> {
        self.ctx
            .watch_remote(
                keys::private_conversations(),
                RemoteMethod::GetPrivateConversations,
                (),
            )
            .await
    }

    pub async fn messages(&self, peer: &Principal, page: Page) -> QueryState<Vec<Message>> {
        self.ctx
            .query(
                keys::private_messages(peer, page),
                true,
                RemoteMethod::GetPrivateMessages,
                (peer.clone(), page.limit, page.offset),
            )
            .await
    }

    /// The thread with `peer`, polled until the watch is dropped.
    pub async fn watch_messages(&self, peer: &Principal, page: Page) -> QueryWatch<Vec<Message>> {
        self.ctx
            .watch_remote(
                keys::private_messages(peer, page),
                RemoteMethod::GetPrivateMessages,
                (peer.clone(), page.limit, page.offset),
            )
            .await
    }

    /// Pause state of the conversation with `peer`. Not polled.
    pub async fn status(&self, peer: &Principal) -> QueryState<ConversationStatus> {
        self.ctx
            .query(
                keys::conversation_status(peer),
                true,
                RemoteMethod::GetConversationStatus,
                (peer.clone(),),
            )
            .await
    }

    /// Sends a private message.
    ///
    /// When the status of the conversation says `recipient` paused it the
    /// send fails with `ConversationBlocked` and nothing is sent. A fresh
    /// cached status is used as is; otherwise it is fetched first. The check
    /// is advisory; the backend still decides.
    pub async fn send(
        &self,
        recipient: &Principal,
        content: &str,
        image: Option<BlobRef>,
    ) -> Result<(), MutationFailure> {
        let args = if self.blocked_by_peer(recipient).await {
            Err(HearthError::ConversationBlocked)
        } else {
            check_message(content, image.is_some())
                .map(|()| (recipient.clone(), content.to_string(), image))
        };

        let spec = MutationSpec::new("sendPrivateMessage")
            .invalidates(keys::private_thread(recipient))
            .invalidates(keys::private_conversations());
        self.ctx
            .mutate_checked::<IgnoredAny, _>(spec, RemoteMethod::SendPrivateMessage, args)
            .await
            .map(|_| ())
    }

    pub async fn pause(&self, peer: &Principal) -> Result<(), MutationFailure> {
        let spec = MutationSpec::new("pauseConversation")
            .invalidates(keys::conversation_status(peer))
            .notice("Conversation paused");
        self.ctx
            .mutate(spec, RemoteMethod::PauseConversation, (peer.clone(),))
            .await
    }

    pub async fn unpause(&self, peer: &Principal) -> Result<(), MutationFailure> {
        let spec = MutationSpec::new("unpauseConversation")
            .invalidates(keys::conversation_status(peer))
            .notice("Conversation resumed");
        self.ctx
            .mutate(spec, RemoteMethod::UnpauseConversation, (peer.clone(),))
            .await
    }

    async fn blocked_by_peer(&self, peer: &Principal) -> bool {
        let Ok(caller) = self.ctx.caller().await else {
            return false;
        };
        self.status(peer)
            .await
            .value()
            .is_some_and(|status| status.blocks_sender(&caller))
    }
}

/// The private-messages panel: owns the selected peer and the polling
/// watch of its thread.
pub struct PrivateConversationView {
    adapter: PrivateChatAdapter,
    page: Page,
    selected: Option<(Principal, QueryWatch<Vec<Message>>)>,
}

impl PrivateConversationView {
    pub fn new(adapter: PrivateChatAdapter) -> Self {
        Self {
            adapter,
            page: Page::default(),
            selected: None,
        }
    }

    pub fn selected_peer(&self) -> Option<&Principal> {
        self.selected.as_ref().map(|(peer, _)| peer)
    }

    /// Switches to `peer` and loads its conversation status. Polling for the
    /// previous peer stops before the new watch starts, so its late responses
    /// are never applied.
    pub async fn select(&mut self, peer: Principal) {
        if let Some((current, watch)) = &self.selected {
            if *current == peer && watch.is_active() {
                return;
            }
        }
        self.deselect();
        let status = self.adapter.status(&peer).await;
        if let Some(error) = &status.error {
            tracing::debug!("[PrivateConversationView] Status of {} unavailable: {}", peer, error);
        }
        let watch = self.adapter.watch_messages(&peer, self.page).await;
        tracing::debug!("[PrivateConversationView] Selected {}", peer);
        self.selected = Some((peer, watch));
    }

    pub fn deselect(&mut self) {
        if let Some((peer, watch)) = self.selected.take() {
            drop(watch);
            tracing::debug!("[PrivateConversationView] Released {}", peer);
        }
    }

    /// The live thread of the selected peer.
    pub fn messages(&mut self) -> Option<&mut QueryWatch<Vec<Message>>> {
        self.selected.as_mut().map(|(_, watch)| watch)
    }

    /// Status of the selected conversation; disabled when none is selected.
    pub async fn status(&self) -> QueryState<ConversationStatus> {
        match self.selected_peer() {
            Some(peer) => self.adapter.status(peer).await,
            None => QueryState::disabled(),
        }
    }

    pub async fn send(&self, content: &str, image: Option<BlobRef>) -> Result<(), MutationFailure> {
        let peer = self.require_peer()?;
        self.adapter.send(peer, content, image).await
    }

    /// Pauses an active conversation or resumes a paused one.
    pub async fn toggle_pause(&self) -> Result<(), MutationFailure> {
        let peer = self.require_peer()?;
        let paused = self
            .adapter
            .status(peer)
            .await
            .value()
            .is_some_and(|status| status.paused);
        if paused {
            self.adapter.unpause(peer).await
        } else {
            self.adapter.pause(peer).await
        }
    }

    fn require_peer(&self) -> Result<&Principal, MutationFailure> {
        self.selected_peer().ok_or_else(|| {
            MutationFailure::new(HearthError::validation("Please select a conversation"))
        })
    }
}
