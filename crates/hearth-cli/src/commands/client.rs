use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use hearth_application::{ClientContext, TracingNotifier};
use hearth_core::config::ClientConfig;
use hearth_core::identity::Identity;
use hearth_infrastructure::{ConfigService, TomlLedgerStore, http_handle_factory};

/// Global options shared by every command.
pub struct ClientOptions {
    pub config_path: Option<PathBuf>,
    pub principal: Option<String>,
    pub delegation: Option<String>,
}

impl ClientOptions {
    pub fn config_service(&self) -> Result<ConfigService> {
        match &self.config_path {
            Some(path) => Ok(ConfigService::with_path(path.clone())),
            None => ConfigService::new().context("Failed to locate the config file"),
        }
    }

    pub fn load_config(&self) -> Result<ClientConfig> {
        let service = self.config_service()?;
        service
            .get_config()
            .with_context(|| format!("Failed to load {}", service.path().display()))
    }

    /// Builds a client and logs in as `--as`.
    pub async fn connect(&self, config: ClientConfig) -> Result<ClientContext> {
        let Some(principal) = &self.principal else {
            bail!("This command needs a principal; pass --as <principal>");
        };

        let factory = http_handle_factory(&config)?;
        let ledger = TomlLedgerStore::new(ConfigService::ledger_dir(&config)?);
        let ctx = ClientContext::new(
            config,
            Arc::new(factory),
            Arc::new(ledger),
            Arc::new(TracingNotifier),
        );

        let mut identity = Identity::new(principal.as_str());
        if let Some(delegation) = &self.delegation {
            identity = identity.with_delegation(delegation.as_str());
        }
        ctx.login(identity).await.context("Login failed")?;
        tracing::debug!("[Cli] Logged in as {}", principal);
        Ok(ctx)
    }
}
