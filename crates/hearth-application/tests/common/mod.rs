//! Shared fixtures: a scripted transport and an in-memory ledger.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use hearth_application::{ChannelNotifier, ClientContext, Notice};
use hearth_core::budget::{BudgetEntry, LedgerStore};
use hearth_core::config::ClientConfig;
use hearth_core::error::{HearthError, Result};
use hearth_core::identity::{Identity, Principal};
use hearth_core::remote::{ActorTransport, MethodTable, RemoteMethod, SharedTransportFactory};
use serde_json::{Value, json};
use tokio::sync::mpsc;

pub struct Reply {
    pub delay: Duration,
    pub result: Result<Value>,
}

impl Reply {
    pub fn now(result: Result<Value>) -> Self {
        Self {
            delay: Duration::ZERO,
            result,
        }
    }

    pub fn after(delay: Duration, result: Result<Value>) -> Self {
        Self { delay, result }
    }
}

type Responder = Arc<dyn Fn(&Value) -> Reply + Send + Sync>;

/// Records every call; methods without a responder return `null`.
#[derive(Default)]
pub struct MockTransport {
    responders: Mutex<HashMap<RemoteMethod, Responder>>,
    calls: Mutex<Vec<(RemoteMethod, Value)>>,
}

impl MockTransport {
    pub fn respond(&self, method: RemoteMethod, f: impl Fn(&Value) -> Reply + Send + Sync + 'static) {
        self.responders.lock().unwrap().insert(method, Arc::new(f));
    }

    pub fn reply(&self, method: RemoteMethod, value: Value) {
        self.respond(method, move |_| Reply::now(Ok(value.clone())));
    }

    pub fn reject(&self, method: RemoteMethod, text: &'static str) {
        self.respond(method, move |_| Reply::now(Err(HearthError::rejected(text))));
    }

    pub fn calls(&self) -> Vec<(RemoteMethod, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, method: RemoteMethod) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(called, _)| *called == method)
            .count()
    }
}

#[async_trait]
impl ActorTransport for MockTransport {
    async fn invoke(&self, _caller: &Identity, method: RemoteMethod, args: Value) -> Result<Value> {
        self.calls.lock().unwrap().push((method, args.clone()));
        let responder = self.responders.lock().unwrap().get(&method).cloned();
        let Some(responder) = responder else {
            return Ok(Value::Null);
        };
        let reply = responder(&args);
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        reply.result
    }
}

#[derive(Default)]
pub struct MemoryLedger {
    entries: Mutex<HashMap<Principal, Vec<BudgetEntry>>>,
}

impl MemoryLedger {
    pub fn has(&self, principal: &Principal) -> bool {
        self.entries.lock().unwrap().contains_key(principal)
    }
}

#[async_trait]
impl LedgerStore for MemoryLedger {
    async fn load(&self, principal: &Principal) -> Result<Vec<BudgetEntry>> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .get(principal)
            .cloned()
            .unwrap_or_default())
    }

    async fn save(&self, principal: &Principal, entries: &[BudgetEntry]) -> Result<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(principal.clone(), entries.to_vec());
        Ok(())
    }

    async fn clear(&self, principal: &Principal) -> Result<()> {
        self.entries.lock().unwrap().remove(principal);
        Ok(())
    }
}

pub struct Harness {
    pub ctx: ClientContext,
    pub transport: Arc<MockTransport>,
    pub ledger: Arc<MemoryLedger>,
    pub notices: mpsc::UnboundedReceiver<Notice>,
}

impl Harness {
    pub fn new(methods: MethodTable) -> Self {
        let transport = Arc::new(MockTransport::default());
        let ledger = Arc::new(MemoryLedger::default());
        let (notifier, notices) = ChannelNotifier::channel();
        let ctx = ClientContext::new(
            ClientConfig::default(),
            Arc::new(SharedTransportFactory::new(transport.clone(), methods)),
            ledger.clone(),
            Arc::new(notifier),
        );
        Self {
            ctx,
            transport,
            ledger,
            notices,
        }
    }

    /// A harness logged in as `alice` against the full method surface.
    pub async fn logged_in() -> Self {
        Self::logged_in_with(MethodTable::all_available()).await
    }

    pub async fn logged_in_with(methods: MethodTable) -> Self {
        let harness = Self::new(methods);
        harness.ctx.login(Identity::new("alice")).await.unwrap();
        harness
    }

    pub fn next_notice(&mut self) -> Option<Notice> {
        self.notices.try_recv().ok()
    }
}

pub fn alice() -> Principal {
    Principal::new("alice")
}

pub fn bob() -> Principal {
    Principal::new("bob")
}

pub fn message_json(id: &str, sender: &str, content: &str, location: &str) -> Value {
    json!({
        "id": id,
        "sender": sender,
        "senderUsername": sender,
        "content": content,
        "timestamp": 1_700_000_000_000_000_000i64,
        "location": location,
    })
}
