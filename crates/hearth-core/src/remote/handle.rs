//! Connection to the remote actor.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::method::{MethodTable, RemoteMethod};
use crate::error::Result;
use crate::identity::Identity;

/// Low-level transport that delivers one call to the backend actor.
///
/// Implementations surface backend rejections as
/// [`HearthError::Rejected`](crate::error::HearthError::Rejected) with the raw
/// rejection text, missing methods as `RemoteUnavailable` and network
/// failures as `Transport`. Timeouts are the transport's business.
#[async_trait]
pub trait ActorTransport: Send + Sync {
    /// Invokes `method` with positional JSON arguments on behalf of `caller`.
    async fn invoke(&self, caller: &Identity, method: RemoteMethod, args: Value) -> Result<Value>;
}

/// Builds a [`RemoteHandle`] once an identity is known.
#[async_trait]
pub trait HandleFactory: Send + Sync {
    async fn connect(&self, identity: &Identity) -> Result<RemoteHandle>;
}

/// A ready connection to the backend, bound to one identity.
///
/// Owned by the identity binding. Other components borrow it per call and
/// never hold on to it.
#[derive(Clone)]
pub struct RemoteHandle {
    identity: Identity,
    transport: Arc<dyn ActorTransport>,
    methods: MethodTable,
}

impl RemoteHandle {
    pub fn new(identity: Identity, transport: Arc<dyn ActorTransport>, methods: MethodTable) -> Self {
        Self {
            identity,
            transport,
            methods,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn methods(&self) -> &MethodTable {
        &self.methods
    }

    /// Sends the call through the transport. Availability is not checked here.
    pub async fn invoke(&self, method: RemoteMethod, args: Value) -> Result<Value> {
        self.transport.invoke(&self.identity, method, args).await
    }
}

impl std::fmt::Debug for RemoteHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteHandle")
            .field("identity", &self.identity)
            .field("methods", &self.methods)
            .finish_non_exhaustive()
    }
}

/// A factory that wraps one shared transport with a fixed method table.
pub struct SharedTransportFactory {
    transport: Arc<dyn ActorTransport>,
    methods: MethodTable,
}

impl SharedTransportFactory {
    pub fn new(transport: Arc<dyn ActorTransport>, methods: MethodTable) -> Self {
        Self { transport, methods }
    }
}

#[async_trait]
impl HandleFactory for SharedTransportFactory {
    async fn connect(&self, identity: &Identity) -> Result<RemoteHandle> {
        Ok(RemoteHandle::new(
            identity.clone(),
            self.transport.clone(),
            self.methods.clone(),
        ))
    }
}
