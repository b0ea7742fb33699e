//! HTTP transport to the backend actor gateway.
//!
//! Each call is `POST {backend_url}/call/{method}` with the positional
//! arguments as a JSON array. The caller's principal travels in
//! `X-Hearth-Principal`; the delegation, when present, as a bearer token.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hearth_core::config::ClientConfig;
use hearth_core::error::{HearthError, Result};
use hearth_core::identity::Identity;
use hearth_core::remote::{ActorTransport, RemoteMethod, SharedTransportFactory};
use reqwest::{Client, StatusCode};
use serde_json::Value;

pub const PRINCIPAL_HEADER: &str = "X-Hearth-Principal";

#[derive(Clone)]
pub struct HttpActorTransport {
    client: Client,
    backend_url: String,
}

impl HttpActorTransport {
    pub fn new(backend_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HearthError::config(format!("Failed to build HTTP client: {}", e)))?;
        let backend_url = backend_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            client,
            backend_url,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(config.backend_url.clone(), config.request_timeout())
    }

    fn auth_request(
        &self,
        request: reqwest::RequestBuilder,
        caller: &Identity,
    ) -> reqwest::RequestBuilder {
        let request = request.header(PRINCIPAL_HEADER, caller.principal.as_str());
        match &caller.delegation {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

/// A handle factory sharing one HTTP transport across logins, with the
/// method table from `config`.
pub fn http_handle_factory(config: &ClientConfig) -> Result<SharedTransportFactory> {
    let transport = HttpActorTransport::from_config(config)?;
    Ok(SharedTransportFactory::new(
        Arc::new(transport),
        config.method_table()?,
    ))
}

fn is_unknown_method(body: &str) -> bool {
    let body = body.to_lowercase();
    [
        "has no query method",
        "has no update method",
        "unknown method",
        "not implemented",
    ]
    .iter()
    .any(|needle| body.contains(needle))
}

#[async_trait]
impl ActorTransport for HttpActorTransport {
    async fn invoke(&self, caller: &Identity, method: RemoteMethod, args: Value) -> Result<Value> {
        let url = format!("{}/call/{}", self.backend_url, method.name());
        let request = self.auth_request(self.client.post(&url).json(&args), caller);

        let response = request
            .send()
            .await
            .map_err(|e| HearthError::transport(format!("{}: {}", method, e)))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| HearthError::transport(format!("{}: {}", method, e)))?;

        if status.is_success() {
            if body.trim().is_empty() {
                return Ok(Value::Null);
            }
            return Ok(serde_json::from_str(&body)?);
        }

        if matches!(status, StatusCode::NOT_FOUND | StatusCode::NOT_IMPLEMENTED)
            && is_unknown_method(&body)
        {
            return Err(HearthError::unavailable(method.name()));
        }

        tracing::debug!("[HttpActorTransport] {} rejected with {}", method, status);
        if body.trim().is_empty() {
            Err(HearthError::rejected(status.to_string()))
        } else {
            Err(HearthError::rejected(body))
        }
    }
}
