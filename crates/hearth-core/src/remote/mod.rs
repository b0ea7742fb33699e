//! Remote actor contract.
//!
//! - `method`: the versioned method surface and the capability table
//! - `handle`: transport port, handle factory and the connected handle

mod handle;
mod method;

pub use handle::{ActorTransport, HandleFactory, RemoteHandle, SharedTransportFactory};
pub use method::{CallKind, MethodOverrides, MethodTable, RemoteMethod};
