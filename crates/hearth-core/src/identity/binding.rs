//! Binds the authenticated identity to a live remote handle.

use std::sync::Arc;

use tokio::sync::{RwLock, broadcast};

use super::model::{Identity, SessionEvent};
use crate::budget::LedgerStore;
use crate::error::{HearthError, Result};
use crate::remote::{HandleFactory, RemoteHandle};

const EVENT_CAPACITY: usize = 16;

#[derive(Default)]
struct BindingState {
    identity: Option<Identity>,
    handle: Option<Arc<RemoteHandle>>,
    initializing: bool,
    /// Bumped on every login and logout. A handle built for an older
    /// generation is thrown away.
    generation: u64,
}

/// Owns the current identity and the remote handle built for it.
///
/// `IdentityBinding` is responsible for:
/// - Holding the identity between login and logout
/// - Building the remote handle through a [`HandleFactory`]
/// - Clearing identity-scoped local storage on logout
/// - Broadcasting [`SessionEvent`]s so caches can purge
pub struct IdentityBinding {
    state: Arc<RwLock<BindingState>>,
    factory: Arc<dyn HandleFactory>,
    ledger: Option<Arc<dyn LedgerStore>>,
    events: broadcast::Sender<SessionEvent>,
}

impl IdentityBinding {
    /// Creates an unauthenticated binding.
    ///
    /// # Arguments
    ///
    /// * `factory` - Builds the remote handle once an identity is known
    pub fn new(factory: Arc<dyn HandleFactory>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Arc::new(RwLock::new(BindingState::default())),
            factory,
            ledger: None,
            events,
        }
    }

    /// Attaches the local ledger whose namespace is cleared on logout.
    pub fn with_ledger(mut self, ledger: Arc<dyn LedgerStore>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub async fn current_identity(&self) -> Option<Identity> {
        self.state.read().await.identity.clone()
    }

    /// The remote handle, once the identity is present and initialization
    /// has finished.
    pub async fn remote_handle(&self) -> Option<Arc<RemoteHandle>> {
        let state = self.state.read().await;
        if state.identity.is_none() || state.initializing {
            return None;
        }
        state.handle.clone()
    }

    pub async fn is_initializing(&self) -> bool {
        self.state.read().await.initializing
    }

    pub async fn is_ready(&self) -> bool {
        let state = self.state.read().await;
        state.identity.is_some() && state.handle.is_some() && !state.initializing
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Stores `identity` and builds its remote handle.
    ///
    /// A previous identity is logged out first. If the connection fails the
    /// identity stays present without a handle and the error is returned.
    ///
    /// # Errors
    ///
    /// Returns the factory's error, or `NotReady` when a logout or another
    /// login superseded this one while the handle was being built.
    pub async fn login(&self, identity: Identity) -> Result<()> {
        if self.current_identity().await.is_some() {
            self.logout().await;
        }

        let principal = identity.principal.clone();
        let generation = {
            let mut state = self.state.write().await;
            state.generation += 1;
            state.identity = Some(identity.clone());
            state.handle = None;
            state.initializing = true;
            state.generation
        };
        tracing::info!("[IdentityBinding] Logged in as {}", principal);
        let _ = self.events.send(SessionEvent::LoggedIn(principal.clone()));

        let connected = self.factory.connect(&identity).await;

        let mut state = self.state.write().await;
        if state.generation != generation {
            tracing::debug!(
                "[IdentityBinding] Discarding handle for {} (session changed)",
                principal
            );
            return Err(HearthError::NotReady);
        }
        state.initializing = false;

        match connected {
            Ok(handle) => {
                state.handle = Some(Arc::new(handle));
                drop(state);
                tracing::debug!("[IdentityBinding] Remote handle ready for {}", principal);
                let _ = self.events.send(SessionEvent::HandleReady(principal));
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    "[IdentityBinding] Failed to build remote handle for {}: {}",
                    principal,
                    e
                );
                Err(e)
            }
        }
    }

    /// Clears the handle and identity, wipes the identity's local ledger and
    /// broadcasts `LoggedOut`. A no-op when nobody is logged in.
    pub async fn logout(&self) {
        let previous = {
            let mut state = self.state.write().await;
            state.generation += 1;
            state.handle = None;
            state.initializing = false;
            state.identity.take()
        };

        let Some(identity) = previous else {
            return;
        };
        let principal = identity.principal;

        if let Some(ledger) = &self.ledger {
            if let Err(e) = ledger.clear(&principal).await {
                tracing::warn!(
                    "[IdentityBinding] Failed to clear local ledger for {}: {}",
                    principal,
                    e
                );
            }
        }

        tracing::info!("[IdentityBinding] Logged out {}", principal);
        let _ = self.events.send(SessionEvent::LoggedOut(principal));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::BudgetEntry;
    use crate::identity::Principal;
    use crate::remote::{ActorTransport, MethodTable, RemoteMethod};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    struct NullTransport;

    #[async_trait]
    impl ActorTransport for NullTransport {
        async fn invoke(&self, _: &Identity, _: RemoteMethod, _: Value) -> Result<Value> {
            Ok(Value::Null)
        }
    }

    #[derive(Default)]
    struct MockFactory {
        fail: bool,
        gate: Option<Arc<Notify>>,
        connects: AtomicUsize,
    }

    #[async_trait]
    impl HandleFactory for MockFactory {
        async fn connect(&self, identity: &Identity) -> Result<RemoteHandle> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.fail {
                return Err(HearthError::transport("agent unreachable"));
            }
            Ok(RemoteHandle::new(
                identity.clone(),
                Arc::new(NullTransport),
                MethodTable::deployed(),
            ))
        }
    }

    #[derive(Default)]
    struct MockLedger {
        cleared: Mutex<Vec<Principal>>,
    }

    #[async_trait]
    impl LedgerStore for MockLedger {
        async fn load(&self, _: &Principal) -> Result<Vec<BudgetEntry>> {
            Ok(Vec::new())
        }

        async fn save(&self, _: &Principal, _: &[BudgetEntry]) -> Result<()> {
            Ok(())
        }

        async fn clear(&self, principal: &Principal) -> Result<()> {
            self.cleared.lock().unwrap().push(principal.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_not_ready_before_login() {
        let binding = IdentityBinding::new(Arc::new(MockFactory::default()));
        assert!(binding.current_identity().await.is_none());
        assert!(binding.remote_handle().await.is_none());
        assert!(!binding.is_ready().await);
    }

    #[tokio::test]
    async fn test_login_builds_handle_and_emits_events() {
        let binding = IdentityBinding::new(Arc::new(MockFactory::default()));
        let mut events = binding.subscribe();

        binding.login(Identity::new("alice")).await.unwrap();

        assert!(binding.is_ready().await);
        let handle = binding.remote_handle().await.unwrap();
        assert_eq!(handle.identity().principal, Principal::new("alice"));
        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::LoggedIn(Principal::new("alice"))
        );
        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::HandleReady(Principal::new("alice"))
        );
    }

    #[tokio::test]
    async fn test_failed_connect_keeps_identity_without_handle() {
        let factory = MockFactory {
            fail: true,
            ..Default::default()
        };
        let binding = IdentityBinding::new(Arc::new(factory));

        let err = binding.login(Identity::new("alice")).await.unwrap_err();

        assert!(matches!(err, HearthError::Transport(_)));
        assert!(binding.current_identity().await.is_some());
        assert!(binding.remote_handle().await.is_none());
        assert!(!binding.is_initializing().await);
        assert!(!binding.is_ready().await);
    }

    #[tokio::test]
    async fn test_logout_clears_state_and_ledger() {
        let ledger = Arc::new(MockLedger::default());
        let binding =
            IdentityBinding::new(Arc::new(MockFactory::default())).with_ledger(ledger.clone());
        binding.login(Identity::new("alice")).await.unwrap();
        let mut events = binding.subscribe();

        binding.logout().await;

        assert!(binding.current_identity().await.is_none());
        assert!(binding.remote_handle().await.is_none());
        assert_eq!(*ledger.cleared.lock().unwrap(), vec![Principal::new("alice")]);
        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::LoggedOut(Principal::new("alice"))
        );
    }

    #[tokio::test]
    async fn test_logout_without_identity_is_silent() {
        let binding = IdentityBinding::new(Arc::new(MockFactory::default()));
        let mut events = binding.subscribe();
        binding.logout().await;
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_handle_built_after_logout_is_discarded() {
        let gate = Arc::new(Notify::new());
        let factory = Arc::new(MockFactory {
            gate: Some(gate.clone()),
            ..Default::default()
        });
        let binding = Arc::new(IdentityBinding::new(factory.clone()));

        let login = tokio::spawn({
            let binding = binding.clone();
            async move { binding.login(Identity::new("alice")).await }
        });
        while factory.connects.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        assert!(binding.is_initializing().await);
        assert!(binding.remote_handle().await.is_none());

        binding.logout().await;
        gate.notify_one();

        let result = login.await.unwrap();
        assert_eq!(result, Err(HearthError::NotReady));
        assert!(binding.current_identity().await.is_none());
        assert!(binding.remote_handle().await.is_none());
    }
}
