//! Identity domain module.
//!
//! - `model`: principal, identity and session events
//! - `binding`: the login/logout lifecycle and remote handle ownership

mod binding;
mod model;

pub use binding::IdentityBinding;
pub use model::{Identity, Principal, SessionEvent};
