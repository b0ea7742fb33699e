//! Active query subscriptions.

use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use hearth_core::error::Result;
use tokio::sync::{broadcast, watch};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::key::QueryKey;
use super::state::{QueryOptions, QueryState};
use super::store::{CacheEvent, Fetcher, QueryCache, fetcher};

/// A live view of one query.
///
/// A background task fetches on creation, on every `refetch_interval` tick
/// and whenever the key is invalidated. Dropping the watch stops the task;
/// its in-flight fetch is abandoned once no other reader awaits it. Clearing
/// the cache ends every watch with a final disabled state.
pub struct QueryWatch<T> {
    key: QueryKey,
    receiver: watch::Receiver<QueryState<T>>,
    token: CancellationToken,
}

impl<T> QueryWatch<T> {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// The latest published state.
    pub fn current(&self) -> QueryState<T> {
        self.receiver.borrow().clone()
    }

    /// Waits for the next state. `None` once the watch has ended.
    pub async fn changed(&mut self) -> Option<QueryState<T>> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }
}

impl<T> Drop for QueryWatch<T> {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

impl QueryCache {
    /// Starts an active subscription to `key`.
    ///
    /// A disabled watch publishes a single disabled state and never fetches.
    pub fn watch<T, F, Fut>(&self, key: QueryKey, options: QueryOptions, fetch_fn: F) -> QueryWatch<T>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        self.start_watch(key, options, None, fetcher(fetch_fn))
    }

    /// Like [`watch`](Self::watch), but stays disabled until `gate` resolves
    /// to `true`. A gate resolving to `false` ends the watch unstarted.
    pub fn watch_after<T, G, F, Fut>(
        &self,
        key: QueryKey,
        options: QueryOptions,
        gate: G,
        fetch_fn: F,
    ) -> QueryWatch<T>
    where
        T: Send + Sync + 'static,
        G: Future<Output = bool> + Send + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        self.start_watch(key, options, Some(gate.boxed()), fetcher(fetch_fn))
    }

    fn start_watch<T: Send + Sync + 'static>(
        &self,
        key: QueryKey,
        options: QueryOptions,
        gate: Option<BoxFuture<'static, bool>>,
        fetch: Fetcher<T>,
    ) -> QueryWatch<T> {
        let token = self.shutdown_token().child_token();

        if !options.enabled {
            token.cancel();
            let (_, receiver) = watch::channel(QueryState::disabled());
            return QueryWatch {
                key,
                receiver,
                token,
            };
        }

        let cache = self.clone();
        let task_key = key.clone();
        let task_token = token.clone();
        let receiver = match gate {
            None => {
                let (sender, receiver) = watch::channel(self.get::<T>(&key));
                tokio::spawn(poll(cache, task_key, options, fetch, sender, task_token));
                receiver
            }
            Some(gate) => {
                let (sender, receiver) = watch::channel(QueryState::disabled());
                tokio::spawn(async move {
                    let open = tokio::select! {
                        biased;
                        _ = task_token.cancelled() => false,
                        open = gate => open,
                    };
                    if !open {
                        task_token.cancel();
                        return;
                    }
                    tracing::debug!("[QueryCache] Watch on {} armed", task_key);
                    sender.send_replace(cache.get::<T>(&task_key));
                    poll(cache, task_key, options, fetch, sender, task_token).await;
                });
                receiver
            }
        };

        QueryWatch {
            key,
            receiver,
            token,
        }
    }
}

fn same_snapshot<T>(a: &QueryState<T>, b: &QueryState<T>) -> bool {
    let same_value = match (&a.value, &b.value) {
        (Some(x), Some(y)) => Arc::ptr_eq(x, y),
        (None, None) => true,
        _ => false,
    };
    same_value
        && a.freshness == b.freshness
        && a.error == b.error
        && a.is_fetched == b.is_fetched
        && a.enabled == b.enabled
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

async fn poll<T: Send + Sync + 'static>(
    cache: QueryCache,
    key: QueryKey,
    options: QueryOptions,
    fetch: Fetcher<T>,
    sender: watch::Sender<QueryState<T>>,
    token: CancellationToken,
) {
    let mut events = cache.subscribe();
    let mut ticker = options.refetch_interval.map(|period| {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    });
    let mut first = true;

    'watch: loop {
        let cached = if first {
            cache.fresh::<T>(&key, &options)
        } else {
            None
        };
        first = false;

        let state = match cached {
            Some(state) => state,
            None => tokio::select! {
                biased;
                _ = token.cancelled() => break 'watch,
                state = cache.run(&key, &options, fetch.clone()) => state,
            },
        };
        sender.send_replace(state);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break 'watch,
                _ = next_tick(&mut ticker) => break,
                event = events.recv() => match event {
                    Ok(CacheEvent::Invalidated(changed)) if changed == key => break,
                    Ok(CacheEvent::Updated(changed)) if changed == key => {
                        let latest = cache.get::<T>(&key);
                        sender.send_if_modified(|current| {
                            if same_snapshot(current, &latest) {
                                false
                            } else {
                                *current = latest;
                                true
                            }
                        });
                    }
                    Ok(CacheEvent::Cleared) => break 'watch,
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(_)) => break,
                    Err(broadcast::error::RecvError::Closed) => break 'watch,
                },
            }
        }
    }

    tracing::debug!("[QueryCache] Watch on {} stopped", key);
    sender.send_replace(QueryState::disabled());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::state::Freshness;
    use hearth_core::error::HearthError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn counting(
        calls: &Arc<AtomicUsize>,
    ) -> impl Fn() -> futures::future::Ready<Result<usize>> + Send + Sync + 'static {
        let calls = calls.clone();
        move || futures::future::ready(Ok::<_, HearthError>(calls.fetch_add(1, Ordering::SeqCst) + 1))
    }

    fn key() -> QueryKey {
        QueryKey::new("globalMessages").with(100).with(0)
    }

    #[tokio::test(start_paused = true)]
    async fn test_watch_polls_on_interval() {
        let cache = QueryCache::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let options = QueryOptions::default().polling(Duration::from_secs(1));

        let mut watch = cache.watch(key(), options, counting(&calls));
        let first = watch.changed().await.unwrap();
        assert_eq!(first.value(), Some(&1));

        tokio::time::sleep(Duration::from_millis(3500)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(watch.current().value(), Some(&4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_watch_stops_polling() {
        let cache = QueryCache::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let options = QueryOptions::default().polling(Duration::from_secs(1));

        let mut watch = cache.watch(key(), options, counting(&calls));
        watch.changed().await.unwrap();
        drop(watch);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidation_triggers_refetch() {
        let cache = QueryCache::default();
        let calls = Arc::new(AtomicUsize::new(0));

        let mut watch = cache.watch(key(), QueryOptions::default(), counting(&calls));
        assert_eq!(watch.changed().await.unwrap().value(), Some(&1));

        cache.invalidate(&QueryKey::new("globalMessages"));

        let mut latest = watch.changed().await.unwrap();
        while latest.value() != Some(&2) {
            latest = watch.changed().await.unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_ends_watch() {
        let cache = QueryCache::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let options = QueryOptions::default().polling(Duration::from_secs(1));

        let mut watch = cache.watch(key(), options, counting(&calls));
        watch.changed().await.unwrap();

        cache.clear();

        let last = watch.changed().await.unwrap();
        assert!(!last.enabled);
        assert!(watch.changed().await.is_none());
        assert!(!watch.is_active());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    fn slow(
        calls: &Arc<AtomicUsize>,
        latency: Duration,
    ) -> impl Fn() -> futures::future::BoxFuture<'static, Result<usize>> + Send + Sync + 'static {
        let calls = calls.clone();
        move || {
            let calls = calls.clone();
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                tokio::time::sleep(latency).await;
                Ok::<_, HearthError>(n)
            }
            .boxed()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_one_watch_keeps_shared_fetch() {
        let cache = QueryCache::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let latency = Duration::from_millis(300);

        let first = cache.watch(key(), QueryOptions::default(), slow(&calls, latency));
        let second = cache.watch(key(), QueryOptions::default(), slow(&calls, latency));

        tokio::time::sleep(Duration::from_millis(100)).await;
        drop(first);

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(second.current().value(), Some(&1));
        assert_eq!(cache.get::<usize>(&key()).value(), Some(&1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_last_watch_abandons_fetch() {
        let cache = QueryCache::default();
        let calls = Arc::new(AtomicUsize::new(0));

        let watch = cache.watch(
            key(),
            QueryOptions::default(),
            slow(&calls, Duration::from_millis(300)),
        );
        tokio::time::sleep(Duration::from_millis(100)).await;
        drop(watch);

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.get::<usize>(&key()).value().is_none());
        assert_eq!(cache.freshness(&key()), Some(Freshness::Stale));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gated_watch_polls_once_open() {
        let cache = QueryCache::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let options = QueryOptions::default().polling(Duration::from_secs(1));
        let (open, gate) = tokio::sync::oneshot::channel::<bool>();

        let mut watch = cache.watch_after(
            key(),
            options,
            async move { gate.await.unwrap_or(false) },
            counting(&calls),
        );

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!watch.current().enabled);
        assert!(watch.is_active());

        open.send(true).unwrap();
        let mut latest = watch.changed().await.unwrap();
        while latest.value() != Some(&1) {
            latest = watch.changed().await.unwrap();
        }

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_gate_ends_watch() {
        let cache = QueryCache::default();
        let calls = Arc::new(AtomicUsize::new(0));

        let mut watch = cache.watch_after(
            key(),
            QueryOptions::default(),
            async { false },
            counting(&calls),
        );

        assert!(watch.changed().await.is_none());
        assert!(!watch.is_active());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_disabled_watch_never_fetches() {
        let cache = QueryCache::default();
        let calls = Arc::new(AtomicUsize::new(0));

        let mut watch = cache.watch(key(), QueryOptions::enabled(false), counting(&calls));

        assert!(!watch.current().enabled);
        assert!(watch.changed().await.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
