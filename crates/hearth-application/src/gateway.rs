//! The single path from the client to the backend.

use std::sync::Arc;

use hearth_core::error::{HearthError, Result};
use hearth_core::identity::IdentityBinding;
use hearth_core::remote::RemoteMethod;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Checks readiness and method availability before any I/O, then forwards
/// the call to the bound remote handle. Never retries.
#[derive(Clone)]
pub struct RemoteGateway {
    binding: Arc<IdentityBinding>,
}

impl RemoteGateway {
    pub fn new(binding: Arc<IdentityBinding>) -> Self {
        Self { binding }
    }

    /// Invokes `method` with `args` and decodes the result.
    ///
    /// `args` is serialized to the positional argument array: pass a tuple,
    /// `()` for no arguments.
    ///
    /// # Errors
    ///
    /// - `NotReady` when no identity is bound or its handle is not built yet
    /// - `RemoteUnavailable` when the method table marks `method` missing
    /// - whatever the transport returns, unchanged
    pub async fn call<T, A>(&self, method: RemoteMethod, args: A) -> Result<T>
    where
        T: DeserializeOwned,
        A: Serialize,
    {
        let handle = self
            .binding
            .remote_handle()
            .await
            .ok_or(HearthError::NotReady)?;

        if !handle.methods().is_available(method) {
            tracing::debug!("[Gateway] {} is not available on this backend", method);
            return Err(HearthError::unavailable(method.name()));
        }

        let args = match serde_json::to_value(args)? {
            Value::Null => Value::Array(Vec::new()),
            array @ Value::Array(_) => array,
            single => Value::Array(vec![single]),
        };

        tracing::debug!("[Gateway] -> {}", method);
        let value = match handle.invoke(method, args).await {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("[Gateway] {} failed: {}", method, err);
                return Err(err);
            }
        };

        Ok(serde_json::from_value(value)?)
    }
}
