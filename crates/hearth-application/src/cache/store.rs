//! The identity-scoped query cache.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::{BoxFuture, FutureExt, Shared};
use hearth_core::error::{HearthError, Result};
use hearth_core::identity::{IdentityBinding, SessionEvent};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::key::QueryKey;
use super::state::{Freshness, QueryOptions, QueryState, RetryPolicy};

type AnyValue = Arc<dyn Any + Send + Sync>;
type FetchOutcome = std::result::Result<AnyValue, HearthError>;

/// A reusable fetch function producing a boxed future.
pub(crate) type Fetcher<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T>> + Send + Sync>;

pub(crate) fn fetcher<T, F, Fut>(fetch_fn: F) -> Fetcher<T>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    Arc::new(move || fetch_fn().boxed())
}

const EVENT_CAPACITY: usize = 256;

/// Change notifications published by the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    /// A fetch result was stored for the key.
    Updated(QueryKey),
    /// The key was marked stale.
    Invalidated(QueryKey),
    /// Every entry was removed.
    Cleared,
}

struct InFlight {
    ticket: u64,
    future: Shared<BoxFuture<'static, FetchOutcome>>,
    /// Readers currently awaiting `future`.
    joined: usize,
}

struct Entry {
    value: Option<AnyValue>,
    freshness: Freshness,
    error: Option<HearthError>,
    fetched: bool,
    updated_at: Option<Instant>,
    in_flight: Option<InFlight>,
}

impl Default for Entry {
    fn default() -> Self {
        Self {
            value: None,
            freshness: Freshness::Stale,
            error: None,
            fetched: false,
            updated_at: None,
            in_flight: None,
        }
    }
}

impl Entry {
    fn is_fresh(&self, options: &QueryOptions) -> bool {
        if self.freshness != Freshness::Fresh || self.value.is_none() {
            return false;
        }
        match (options.stale_time, self.updated_at) {
            (None, _) => true,
            (Some(stale_time), Some(updated_at)) => updated_at.elapsed() < stale_time,
            (Some(_), None) => false,
        }
    }

    fn snapshot<T: Send + Sync + 'static>(&self, key: &QueryKey) -> QueryState<T> {
        let value = self
            .value
            .clone()
            .and_then(|value| match value.downcast::<T>() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("[QueryCache] Cached value for {} has another type", key);
                    None
                }
            });
        QueryState {
            is_loading: self.freshness == Freshness::Fetching && value.is_none(),
            value,
            freshness: self.freshness,
            error: self.error.clone(),
            is_fetched: self.fetched,
            enabled: true,
        }
    }
}

struct CacheInner {
    entries: Mutex<HashMap<QueryKey, Entry>>,
    events: broadcast::Sender<CacheEvent>,
    next_ticket: AtomicU64,
    /// Parent of every watch task's token. Replaced on clear.
    shutdown: Mutex<CancellationToken>,
    retry: RetryPolicy,
}

/// Process-wide store of query results, scoped to the current identity.
///
/// Cloning is cheap; all clones share one store. Concurrent fetches of one
/// key share a single in-flight future. Every fetch carries a ticket and its
/// result is stored only while that ticket is still the key's current one,
/// so results that arrive after a cancel, an invalidation or a clear are
/// dropped.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<CacheInner>,
}

impl QueryCache {
    pub fn new(retry: RetryPolicy) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(CacheInner {
                entries: Mutex::new(HashMap::new()),
                events,
                next_ticket: AtomicU64::new(1),
                shutdown: Mutex::new(CancellationToken::new()),
                retry,
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.inner.events.subscribe()
    }

    /// Snapshot of `key` without any I/O.
    pub fn get<T: Send + Sync + 'static>(&self, key: &QueryKey) -> QueryState<T> {
        match self.entries().get(key) {
            Some(entry) => entry.snapshot(key),
            None => QueryState::empty(),
        }
    }

    /// Freshness of `key` regardless of its value type; `None` when absent.
    pub fn freshness(&self, key: &QueryKey) -> Option<Freshness> {
        self.entries().get(key).map(|entry| entry.freshness)
    }

    /// Keys currently held, sorted.
    pub fn keys(&self) -> Vec<QueryKey> {
        let mut keys: Vec<QueryKey> = self.entries().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Reads `key`, fetching only when there is no fresh value.
    ///
    /// Disabled reads issue no fetch and return a disabled state even when a
    /// value is cached.
    pub async fn fetch<T, F, Fut>(
        &self,
        key: &QueryKey,
        options: &QueryOptions,
        fetch_fn: F,
    ) -> QueryState<T>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        if !options.enabled {
            return QueryState::disabled();
        }
        if let Some(state) = self.fresh(key, options) {
            tracing::trace!("[QueryCache] Hit for {}", key);
            return state;
        }
        self.run(key, options, fetcher(fetch_fn)).await
    }

    /// Like [`fetch`](Self::fetch) but ignores freshness.
    pub async fn refetch<T, F, Fut>(
        &self,
        key: &QueryKey,
        options: &QueryOptions,
        fetch_fn: F,
    ) -> QueryState<T>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        if !options.enabled {
            return QueryState::disabled();
        }
        self.run(key, options, fetcher(fetch_fn)).await
    }

    /// Marks every entry under `prefix` stale and returns the matched keys.
    ///
    /// In-flight fetches for those keys are cancelled; their results predate
    /// the change that caused the invalidation.
    pub fn invalidate(&self, prefix: &QueryKey) -> Vec<QueryKey> {
        let mut keys: Vec<QueryKey> = {
            let mut entries = self.entries();
            entries
                .iter_mut()
                .filter(|(key, _)| key.starts_with(prefix))
                .map(|(key, entry)| {
                    entry.in_flight = None;
                    entry.freshness = Freshness::Stale;
                    key.clone()
                })
                .collect()
        };
        keys.sort();

        tracing::debug!(
            "[QueryCache] Invalidated {} entries under {}",
            keys.len(),
            prefix
        );
        for key in &keys {
            let _ = self.inner.events.send(CacheEvent::Invalidated(key.clone()));
        }
        keys
    }

    /// Drops the in-flight fetch for `key` so its result is ignored.
    pub fn cancel(&self, key: &QueryKey) {
        let mut entries = self.entries();
        if let Some(entry) = entries.get_mut(key) {
            if entry.in_flight.take().is_some() {
                tracing::debug!("[QueryCache] Cancelled fetch for {}", key);
                entry.freshness = if entry.error.is_some() {
                    Freshness::Error
                } else {
                    Freshness::Stale
                };
            }
        }
    }

    /// Removes every entry and in-flight fetch and stops every watch.
    pub fn clear(&self) {
        let count = {
            let mut entries = self.entries();
            let count = entries.len();
            entries.clear();
            count
        };
        let previous = {
            let mut shutdown = self
                .inner
                .shutdown
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            std::mem::replace(&mut *shutdown, CancellationToken::new())
        };
        previous.cancel();

        tracing::info!("[QueryCache] Cleared {} entries", count);
        let _ = self.inner.events.send(CacheEvent::Cleared);
    }

    /// Clears the cache whenever `binding` logs out.
    pub fn bind_session(&self, binding: &IdentityBinding) -> JoinHandle<()> {
        let mut events = binding.subscribe();
        let cache = self.clone();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(SessionEvent::LoggedOut(principal)) => {
                        tracing::debug!("[QueryCache] {} logged out, clearing", principal);
                        cache.clear();
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(_)) => cache.clear(),
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    pub(crate) fn shutdown_token(&self) -> CancellationToken {
        self.inner
            .shutdown
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub(crate) fn fresh<T: Send + Sync + 'static>(
        &self,
        key: &QueryKey,
        options: &QueryOptions,
    ) -> Option<QueryState<T>> {
        let entries = self.entries();
        entries
            .get(key)
            .filter(|entry| entry.is_fresh(options))
            .map(|entry| entry.snapshot(key))
    }

    /// Fetches `key`, joining an in-flight fetch when there is one.
    pub(crate) async fn run<T: Send + Sync + 'static>(
        &self,
        key: &QueryKey,
        options: &QueryOptions,
        fetch: Fetcher<T>,
    ) -> QueryState<T> {
        let (ticket, future) = self.start(key, options, fetch);
        let mut reader = Reader {
            cache: self,
            key,
            ticket,
            done: false,
        };
        let outcome = future.await;
        reader.done = true;
        self.complete(key, ticket, outcome);
        self.get(key)
    }

    /// A reader stopped awaiting `ticket` before it finished. The fetch is
    /// dropped once nobody awaits it any more.
    fn leave(&self, key: &QueryKey, ticket: u64) {
        let mut entries = self.entries();
        let Some(entry) = entries.get_mut(key) else {
            return;
        };
        let Some(in_flight) = entry
            .in_flight
            .as_mut()
            .filter(|in_flight| in_flight.ticket == ticket)
        else {
            return;
        };
        in_flight.joined = in_flight.joined.saturating_sub(1);
        if in_flight.joined == 0 {
            tracing::debug!("[QueryCache] Abandoned fetch for {}", key);
            entry.in_flight = None;
            entry.freshness = if entry.error.is_some() {
                Freshness::Error
            } else {
                Freshness::Stale
            };
        }
    }

    fn start<T: Send + Sync + 'static>(
        &self,
        key: &QueryKey,
        options: &QueryOptions,
        fetch: Fetcher<T>,
    ) -> (u64, Shared<BoxFuture<'static, FetchOutcome>>) {
        let mut entries = self.entries();
        let entry = entries.entry(key.clone()).or_default();
        if let Some(in_flight) = &mut entry.in_flight {
            tracing::trace!("[QueryCache] Joining in-flight fetch for {}", key);
            in_flight.joined += 1;
            return (in_flight.ticket, in_flight.future.clone());
        }

        let ticket = self.inner.next_ticket.fetch_add(1, Ordering::Relaxed);
        let attempts = if options.retry {
            self.inner.retry.attempts.max(1)
        } else {
            1
        };
        let delay = self.inner.retry.delay;
        let label = key.to_string();

        let future: BoxFuture<'static, FetchOutcome> = async move {
            let mut attempt = 1;
            loop {
                match fetch().await {
                    Ok(value) => return Ok(Arc::new(value) as AnyValue),
                    Err(err) if attempt < attempts => {
                        tracing::debug!(
                            "[QueryCache] Attempt {} for {} failed, retrying: {}",
                            attempt,
                            label,
                            err
                        );
                        attempt += 1;
                        tokio::time::sleep(delay).await;
                    }
                    Err(err) => return Err(err),
                }
            }
        }
        .boxed();
        let future = future.shared();

        entry.in_flight = Some(InFlight {
            ticket,
            future: future.clone(),
            joined: 1,
        });
        entry.freshness = Freshness::Fetching;
        (ticket, future)
    }

    fn complete(&self, key: &QueryKey, ticket: u64, outcome: FetchOutcome) {
        let applied = {
            let mut entries = self.entries();
            match entries.get_mut(key) {
                Some(entry)
                    if entry
                        .in_flight
                        .as_ref()
                        .is_some_and(|in_flight| in_flight.ticket == ticket) =>
                {
                    entry.in_flight = None;
                    entry.fetched = true;
                    match outcome {
                        Ok(value) => {
                            entry.value = Some(value);
                            entry.error = None;
                            entry.freshness = Freshness::Fresh;
                            entry.updated_at = Some(Instant::now());
                        }
                        Err(err) => {
                            if err.is_unavailable() || err.is_not_ready() {
                                tracing::debug!("[QueryCache] Fetch for {} skipped: {}", key, err);
                            } else {
                                tracing::warn!("[QueryCache] Fetch for {} failed: {}", key, err);
                            }
                            entry.error = Some(err);
                            entry.freshness = Freshness::Error;
                        }
                    }
                    true
                }
                _ => false,
            }
        };

        if applied {
            let _ = self.inner.events.send(CacheEvent::Updated(key.clone()));
        } else {
            tracing::trace!("[QueryCache] Result for {} not applied (ticket {})", key, ticket);
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        self.inner
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Membership of one reader in an in-flight fetch; leaves on drop unless
/// the fetch completed.
struct Reader<'a> {
    cache: &'a QueryCache,
    key: &'a QueryKey,
    ticket: u64,
    done: bool,
}

impl Drop for Reader<'_> {
    fn drop(&mut self) {
        if !self.done {
            self.cache.leave(self.key, self.ticket);
        }
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}
