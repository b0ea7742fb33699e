//! Query cache.
//!
//! - `key`: structured keys and prefix matching
//! - `state`: read options, retry policy and the observable entry state
//! - `store`: the shared store with de-duplicated, ticketed fetches
//! - `watch`: polling subscriptions

mod key;
mod state;
mod store;
mod watch;

pub use key::QueryKey;
pub use state::{Freshness, QueryOptions, QueryState, RetryPolicy};
pub use store::{CacheEvent, QueryCache};
pub use watch::QueryWatch;
