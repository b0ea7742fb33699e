//! Domain adapters: one per feature area, each a thin layer of cache keys,
//! enablement rules and invalidation sets over the shared [`ClientContext`].
//!
//! - `profile`: caller profile, public/staff profile reads, profile mutations
//! - `budget`: remote personal budget and the device-local ledger
//! - `household`: invites
//! - `chat`: shared rooms (global, household, staff group)
//! - `private_chat`: one-to-one conversations, pause state and the view model
//! - `moderation`: flags and deletions
//!
//! [`ClientContext`]: crate::context::ClientContext

mod budget;
mod chat;
mod household;
mod moderation;
mod private_chat;
mod profile;

pub use budget::BudgetAdapter;
pub use chat::ChatAdapter;
pub use household::HouseholdAdapter;
pub use moderation::ModerationAdapter;
pub use private_chat::{PrivateChatAdapter, PrivateConversationView};
pub use profile::{MAX_PICTURE_BYTES, ProfileAdapter};
