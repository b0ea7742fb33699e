//! Cache keys for every remote read.
//!
//! Paginated reads put the page last so that invalidating a location or a
//! peer covers every page.

use hearth_core::chat::{MessageLocation, Page};
use hearth_core::identity::Principal;

use crate::cache::QueryKey;

pub const CURRENT_USER_PROFILE: &str = "currentUserProfile";
pub const CURRENT_USER_ROLE: &str = "currentUserRole";
pub const IS_CALLER_ADMIN: &str = "isCallerAdmin";
pub const PUBLIC_PROFILE: &str = "publicProfile";
pub const USER_PROFILE: &str = "userProfile";
pub const PUBLIC_PROFILES: &str = "publicProfiles";
pub const PROFILES_BY_USERNAME: &str = "profilesByUsername";
pub const ALL_USERNAMES: &str = "allUsernames";
pub const AVATAR: &str = "avatar";
pub const PRIVATE_PROFILE_AS_STAFF: &str = "privateProfileAsStaff";
pub const ALL_USERS_AS_STAFF: &str = "allUsersAsStaff";
pub const PERSONAL_BUDGET: &str = "personalBudget";
pub const BUDGET_BY_USERNAME: &str = "budgetByUsername";
pub const PENDING_INVITES: &str = "pendingInvites";
pub const GLOBAL_MESSAGES: &str = "globalMessages";
pub const PRIVATE_CONVERSATIONS: &str = "privateConversations";
pub const PRIVATE_MESSAGES: &str = "privateMessages";
pub const CONVERSATION_STATUS: &str = "conversationStatus";
pub const HOUSEHOLD_MESSAGES: &str = "householdMessages";
pub const STAFF_GROUP_MESSAGES: &str = "staffGroupMessages";
pub const FLAGGED_MESSAGES: &str = "flaggedMessages";

// Profile

pub fn current_user_profile() -> QueryKey {
    QueryKey::new(CURRENT_USER_PROFILE)
}

pub fn current_user_role() -> QueryKey {
    QueryKey::new(CURRENT_USER_ROLE)
}

pub fn is_caller_admin() -> QueryKey {
    QueryKey::new(IS_CALLER_ADMIN)
}

pub fn public_profile(username: &str) -> QueryKey {
    QueryKey::new(PUBLIC_PROFILE).with(username)
}

pub fn user_profile(principal: &Principal) -> QueryKey {
    QueryKey::new(USER_PROFILE).with(principal)
}

pub fn public_profiles() -> QueryKey {
    QueryKey::new(PUBLIC_PROFILES)
}

pub fn profiles_by_username() -> QueryKey {
    QueryKey::new(PROFILES_BY_USERNAME)
}

pub fn all_usernames() -> QueryKey {
    QueryKey::new(ALL_USERNAMES)
}

pub fn avatar(username: &str) -> QueryKey {
    QueryKey::new(AVATAR).with(username)
}

pub fn private_profile_as_staff(principal: &Principal) -> QueryKey {
    QueryKey::new(PRIVATE_PROFILE_AS_STAFF).with(principal)
}

pub fn all_users_as_staff() -> QueryKey {
    QueryKey::new(ALL_USERS_AS_STAFF)
}

// Budget and household

pub fn personal_budget() -> QueryKey {
    QueryKey::new(PERSONAL_BUDGET)
}

pub fn budget_by_username(username: &str) -> QueryKey {
    QueryKey::new(BUDGET_BY_USERNAME).with(username)
}

pub fn pending_invites() -> QueryKey {
    QueryKey::new(PENDING_INVITES)
}

// Chat

/// Root key of a message location. For `Private` this covers every peer.
pub fn messages_root(location: MessageLocation) -> QueryKey {
    QueryKey::new(match location {
        MessageLocation::Global => GLOBAL_MESSAGES,
        MessageLocation::Private => PRIVATE_MESSAGES,
        MessageLocation::Household => HOUSEHOLD_MESSAGES,
        MessageLocation::StaffGroup => STAFF_GROUP_MESSAGES,
    })
}

/// A page of a shared room (global, household or staff group).
pub fn room_messages(location: MessageLocation, page: Page) -> QueryKey {
    messages_root(location).with(page.limit).with(page.offset)
}

pub fn private_conversations() -> QueryKey {
    QueryKey::new(PRIVATE_CONVERSATIONS)
}

/// Every page of the thread with `peer`.
pub fn private_thread(peer: &Principal) -> QueryKey {
    QueryKey::new(PRIVATE_MESSAGES).with(peer)
}

pub fn private_messages(peer: &Principal, page: Page) -> QueryKey {
    private_thread(peer).with(page.limit).with(page.offset)
}

pub fn conversation_status(peer: &Principal) -> QueryKey {
    QueryKey::new(CONVERSATION_STATUS).with(peer)
}

pub fn flagged_messages() -> QueryKey {
    QueryKey::new(FLAGGED_MESSAGES)
}
