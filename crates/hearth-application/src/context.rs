//! Wiring shared by every adapter.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use hearth_core::budget::LedgerStore;
use hearth_core::chat::MessageLocation;
use hearth_core::config::ClientConfig;
use hearth_core::error::{HearthError, Result};
use hearth_core::identity::{Identity, IdentityBinding, Principal};
use tokio::sync::broadcast::error::RecvError;
use hearth_core::remote::{HandleFactory, RemoteMethod};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::adapters::{
    BudgetAdapter, ChatAdapter, HouseholdAdapter, ModerationAdapter, PrivateChatAdapter,
    ProfileAdapter,
};
use crate::cache::{QueryCache, QueryKey, QueryOptions, QueryState, QueryWatch, RetryPolicy};
use crate::gateway::RemoteGateway;
use crate::mutation::{MutationCoordinator, MutationFailure, MutationSpec};
use crate::notifier::Notifier;

/// Identity binding, gateway, cache and mutation coordinator for one client.
///
/// Cloning is cheap and every clone shares the same state.
#[derive(Clone)]
pub struct ClientContext {
    binding: Arc<IdentityBinding>,
    gateway: RemoteGateway,
    cache: QueryCache,
    mutations: MutationCoordinator,
    ledger: Arc<dyn LedgerStore>,
    config: Arc<ClientConfig>,
}

impl ClientContext {
    /// Creates a context for an unauthenticated client.
    ///
    /// # Arguments
    ///
    /// * `config` - Client configuration
    /// * `factory` - Builds the remote handle at login
    /// * `ledger` - Device-local budget ledger, cleared per identity at logout
    /// * `notifier` - Receives mutation notices
    pub fn new(
        config: ClientConfig,
        factory: Arc<dyn HandleFactory>,
        ledger: Arc<dyn LedgerStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let binding = Arc::new(IdentityBinding::new(factory).with_ledger(ledger.clone()));
        let cache = QueryCache::new(RetryPolicy::from_config(&config));
        Self {
            gateway: RemoteGateway::new(binding.clone()),
            mutations: MutationCoordinator::new(cache.clone(), notifier),
            binding,
            cache,
            ledger,
            config: Arc::new(config),
        }
    }

    pub fn binding(&self) -> &Arc<IdentityBinding> {
        &self.binding
    }

    pub fn gateway(&self) -> &RemoteGateway {
        &self.gateway
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn mutations(&self) -> &MutationCoordinator {
        &self.mutations
    }

    pub fn ledger(&self) -> &Arc<dyn LedgerStore> {
        &self.ledger
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Logs in as `identity`. A previous identity is logged out first and
    /// nothing cached for it survives.
    pub async fn login(&self, identity: Identity) -> Result<()> {
        if self.binding.current_identity().await.is_some() {
            self.logout().await;
        }
        self.binding.login(identity).await
    }

    /// Logs out and purges the cache. Every watch ends.
    pub async fn logout(&self) {
        self.binding.logout().await;
        self.cache.clear();
    }

    pub async fn is_ready(&self) -> bool {
        self.binding.is_ready().await
    }

    /// The logged-in principal.
    pub async fn caller(&self) -> Result<Principal> {
        self.binding
            .current_identity()
            .await
            .map(|identity| identity.principal)
            .ok_or(HearthError::NotReady)
    }

    // ============================================================================
    // Adapters
    // ============================================================================

    pub fn profile(&self) -> ProfileAdapter {
        ProfileAdapter::new(self.clone())
    }

    pub fn budget(&self) -> BudgetAdapter {
        BudgetAdapter::new(self.clone())
    }

    pub fn household(&self) -> HouseholdAdapter {
        HouseholdAdapter::new(self.clone())
    }

    /// Chat for a shared room. `Private` is served by [`private_chat`](Self::private_chat).
    pub fn chat(&self, location: MessageLocation) -> Result<ChatAdapter> {
        ChatAdapter::new(self.clone(), location)
    }

    pub fn private_chat(&self) -> PrivateChatAdapter {
        PrivateChatAdapter::new(self.clone())
    }

    pub fn moderation(&self) -> ModerationAdapter {
        ModerationAdapter::new(self.clone())
    }

    // ============================================================================
    // Helpers for adapters
    // ============================================================================

    /// Read options: enabled only when the client is ready and the read's
    /// own parameters are present.
    pub(crate) async fn read_options(&self, params_present: bool) -> QueryOptions {
        QueryOptions::enabled(params_present && self.binding.is_ready().await)
    }

    /// A reusable fetch function calling `method` with `args`.
    pub(crate) fn remote<T, A>(
        &self,
        method: RemoteMethod,
        args: A,
    ) -> impl Fn() -> BoxFuture<'static, Result<T>> + Send + Sync + 'static
    where
        T: DeserializeOwned + Send + 'static,
        A: Serialize + Clone + Send + Sync + 'static,
    {
        let gateway = self.gateway.clone();
        move || {
            let gateway = gateway.clone();
            let args = args.clone();
            async move { gateway.call(method, args).await }.boxed()
        }
    }

    /// A cached read of `method`.
    pub(crate) async fn query<T, A>(
        &self,
        key: QueryKey,
        params_present: bool,
        method: RemoteMethod,
        args: A,
    ) -> QueryState<T>
    where
        T: DeserializeOwned + Send + Sync + 'static,
        A: Serialize + Clone + Send + Sync + 'static,
    {
        let options = self.read_options(params_present).await;
        self.cache
            .fetch(&key, &options, self.remote(method, args))
            .await
    }

    /// A polling watch on `method`. Created before the client is ready, the
    /// watch stays disabled and arms itself on the next handle-ready event.
    pub(crate) async fn watch_remote<T, A>(
        &self,
        key: QueryKey,
        method: RemoteMethod,
        args: A,
    ) -> QueryWatch<T>
    where
        T: DeserializeOwned + Send + Sync + 'static,
        A: Serialize + Clone + Send + Sync + 'static,
    {
        let options = QueryOptions::default().polling(self.config.chat_poll_interval());
        let fetch = self.remote(method, args);
        if self.binding.is_ready().await {
            self.cache.watch(key, options, fetch)
        } else {
            tracing::debug!("[ClientContext] Deferring watch on {} until ready", key);
            self.cache
                .watch_after(key, options, handle_ready(self.binding.clone()), fetch)
        }
    }

    /// A remote mutation run through the coordinator.
    pub(crate) async fn mutate<T, A>(
        &self,
        spec: MutationSpec,
        method: RemoteMethod,
        args: A,
    ) -> std::result::Result<T, MutationFailure>
    where
        T: DeserializeOwned,
        A: Serialize,
    {
        self.mutations
            .execute(spec, self.gateway.call(method, args))
            .await
    }

    /// Like [`mutate`](Self::mutate) for arguments that passed client-side
    /// checks. A failed check is reported through the coordinator and no
    /// remote call is made.
    pub(crate) async fn mutate_checked<T, A>(
        &self,
        spec: MutationSpec,
        method: RemoteMethod,
        args: Result<A>,
    ) -> std::result::Result<T, MutationFailure>
    where
        T: DeserializeOwned,
        A: Serialize,
    {
        let gateway = &self.gateway;
        self.mutations
            .execute(spec, async move { gateway.call(method, args?).await })
            .await
    }
}

/// Resolves `true` once `binding` is ready, `false` if its event stream ends.
async fn handle_ready(binding: Arc<IdentityBinding>) -> bool {
    let mut events = binding.subscribe();
    loop {
        if binding.is_ready().await {
            return true;
        }
        match events.recv().await {
            Ok(_) | Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => return false,
        }
    }
}
