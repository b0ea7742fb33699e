//! Chat and moderation domain models.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter};

use crate::blob::BlobRef;
use crate::identity::Principal;
use crate::time::Time;

/// Default number of messages fetched per page.
pub const DEFAULT_PAGE_LIMIT: u32 = 100;

/// Where a message lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, EnumIter)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum MessageLocation {
    Global,
    Private,
    Household,
    StaffGroup,
}

/// A chat message. Append-only; only moderation removes one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub sender: Principal,
    pub sender_username: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<BlobRef>,
    pub timestamp: Time,
    pub location: MessageLocation,
}

/// One entry of the caller's private conversation list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub peer: Principal,
    pub peer_username: String,
    #[serde(default)]
    pub last_message: Option<Message>,
    #[serde(default)]
    pub unread: u32,
}

/// Pause state of a private conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationStatus {
    pub paused: bool,
    #[serde(default)]
    pub paused_by: Option<Principal>,
}

impl ConversationStatus {
    /// Whether `caller` is barred from sending: paused by someone else.
    ///
    /// Advisory only. The backend decides.
    pub fn blocks_sender(&self, caller: &Principal) -> bool {
        self.paused && self.paused_by.as_ref() != Some(caller)
    }
}

/// A report against a message, awaiting staff review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flag {
    pub id: String,
    pub message_id: String,
    pub reason: String,
    pub location: MessageLocation,
    pub flagged_at: Time,
    pub resolved: bool,
}

/// Pagination window for message reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Page {
    pub fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }

    pub fn next(self) -> Self {
        Self {
            limit: self.limit,
            offset: self.offset.saturating_add(self.limit),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_LIMIT, 0)
    }
}
