//! Application layer for Hearth.
//!
//! This crate turns the remote backend into cached, identity-scoped reads
//! and coordinated mutations that a UI can bind to directly.

pub mod adapters;
pub mod cache;
pub mod context;
pub mod gateway;
pub mod keys;
pub mod mutation;
pub mod notifier;

pub use adapters::{
    BudgetAdapter, ChatAdapter, HouseholdAdapter, ModerationAdapter, PrivateChatAdapter,
    PrivateConversationView, ProfileAdapter,
};
pub use cache::{QueryCache, QueryKey, QueryOptions, QueryState, QueryWatch};
pub use context::ClientContext;
pub use gateway::RemoteGateway;
pub use mutation::{MutationCoordinator, MutationFailure, MutationSpec};
pub use notifier::{ChannelNotifier, Notice, NoticeLevel, Notifier, TracingNotifier};
