//! Keyed async result cache with request deduplication.
//!
//! For a fixed key at most one fetch is outstanding at any instant.
//! Callers that request a key while a fetch is pending join it and
//! observe the same eventual outcome. Entries carry a per-key
//! generation counter; a superseded fetch that completes late never
//! overwrites a newer entry.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::watch;

/// Snapshot of a cache entry's status, as seen by consumers.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState<T, E> {
    Pending,
    Success(T),
    Failure(E),
}

impl<T, E> QueryState<T, E> {
    pub fn is_pending(&self) -> bool {
        matches!(self, QueryState::Pending)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, QueryState::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, QueryState::Failure(_))
    }
}

type Outcome<T, E> = Result<T, E>;
/// Completion slot broadcast to joiners; `None` until the fetch resolves.
type Slot<T, E> = Option<Outcome<T, E>>;

struct Entry<T, E> {
    generation: u64,
    stale: bool,
    fetched_at: Option<Instant>,
    last_success: Option<T>,
    state: EntryState<T, E>,
}

enum EntryState<T, E> {
    Pending { rx: watch::Receiver<Slot<T, E>> },
    Ready(Outcome<T, E>),
}

enum Plan<T, E> {
    Hit(Outcome<T, E>),
    Join {
        generation: u64,
        rx: watch::Receiver<Slot<T, E>>,
    },
    Lead {
        generation: u64,
        tx: watch::Sender<Slot<T, E>>,
    },
}

/// Cache of asynchronous query results, keyed by `K`.
pub struct QueryCache<K, T, E> {
    entries: Mutex<HashMap<K, Entry<T, E>>>,
    stale_after: Option<Duration>,
}

impl<K, T, E> Default for QueryCache<K, T, E> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            stale_after: None,
        }
    }
}

impl<K, T, E> QueryCache<K, T, E>
where
    K: Eq + Hash + Clone,
    T: Clone,
    E: Clone,
{
    /// Cache whose entries never expire by age.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache whose successful entries are refetched once older than `ttl`.
    pub fn with_stale_after(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            stale_after: Some(ttl),
        }
    }

    /// Return the cached value for `key`, or run `fetcher` to produce it.
    ///
    /// A pending fetch for the same key is joined, not duplicated; the
    /// fetcher runs at most once per generation. Joiners of a fetch all
    /// observe that fetch's outcome, success or failure.
    pub async fn get_or_fetch<F, Fut>(&self, key: K, fetcher: F) -> Outcome<T, E>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Outcome<T, E>>,
    {
        loop {
            match self.plan(&key) {
                Plan::Hit(outcome) => return outcome,
                Plan::Join { generation, mut rx } => {
                    match rx.wait_for(|slot| slot.is_some()).await {
                        Ok(slot) => {
                            if let Some(outcome) = slot.clone() {
                                return outcome;
                            }
                        }
                        Err(_) => {
                            // The leader was dropped before completing. Evict
                            // the orphaned entry and plan again.
                            self.evict_orphan(&key, generation);
                        }
                    }
                }
                Plan::Lead { generation, tx } => {
                    let outcome = fetcher().await;
                    self.complete(&key, generation, &outcome);
                    let _ = tx.send(Some(outcome.clone()));
                    return outcome;
                }
            }
        }
    }

    /// Mark the entry for `key` stale.
    ///
    /// The next `get_or_fetch` starts a fresh fetch regardless of the
    /// entry's status. A stale pending fetch is superseded: its result
    /// is discarded when it eventually completes.
    pub fn invalidate(&self, key: &K) {
        if let Some(entry) = self.entries.lock().get_mut(key) {
            entry.stale = true;
        }
    }

    /// Invalidate-then-fetch, without duplicating a pending fetch.
    pub async fn refetch<F, Fut>(&self, key: K, fetcher: F) -> Outcome<T, E>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Outcome<T, E>>,
    {
        {
            let mut entries = self.entries.lock();
            if let Some(entry) = entries.get_mut(&key) {
                // A pending fetch is already producing fresh data; join it
                // rather than restarting.
                if !matches!(entry.state, EntryState::Pending { .. }) {
                    entry.stale = true;
                }
            }
        }
        self.get_or_fetch(key, fetcher).await
    }

    /// Status snapshot for `key`, if an entry exists.
    pub fn snapshot(&self, key: &K) -> Option<QueryState<T, E>> {
        let entries = self.entries.lock();
        entries.get(key).map(|entry| match &entry.state {
            EntryState::Pending { .. } => QueryState::Pending,
            EntryState::Ready(Ok(value)) => QueryState::Success(value.clone()),
            EntryState::Ready(Err(error)) => QueryState::Failure(error.clone()),
        })
    }

    /// Most recent successful value for `key`, surviving later failures.
    pub fn last_success(&self, key: &K) -> Option<T> {
        self.entries
            .lock()
            .get(key)
            .and_then(|entry| entry.last_success.clone())
    }

    /// When the entry for `key` last completed a fetch.
    pub fn fetched_at(&self, key: &K) -> Option<Instant> {
        self.entries.lock().get(key).and_then(|entry| entry.fetched_at)
    }

    /// Drop every entry whose key fails the predicate.
    ///
    /// Dropping a pending entry is safe: the superseded leader's late
    /// completion finds no entry and is discarded, while its joiners
    /// still receive the outcome over the entry's channel.
    pub fn retain<F>(&self, mut keep: F)
    where
        F: FnMut(&K) -> bool,
    {
        self.entries.lock().retain(|key, _| keep(key));
    }

    /// Decide under the lock how this call participates in the fetch.
    fn plan(&self, key: &K) -> Plan<T, E> {
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get_mut(key) {
            let expired = self.expired(entry);
            match &entry.state {
                EntryState::Ready(outcome) if !entry.stale && !expired => {
                    return Plan::Hit(outcome.clone());
                }
                EntryState::Pending { rx } if !entry.stale => {
                    return Plan::Join {
                        generation: entry.generation,
                        rx: rx.clone(),
                    };
                }
                // Stale or expired: fall through and start a new generation.
                _ => {}
            }
        }

        let (tx, rx) = watch::channel(None);
        let generation = match entries.get_mut(key) {
            Some(entry) => {
                entry.generation += 1;
                entry.stale = false;
                entry.state = EntryState::Pending { rx };
                entry.generation
            }
            None => {
                entries.insert(
                    key.clone(),
                    Entry {
                        generation: 1,
                        stale: false,
                        fetched_at: None,
                        last_success: None,
                        state: EntryState::Pending { rx },
                    },
                );
                1
            }
        };
        Plan::Lead { generation, tx }
    }

    /// Record a fetch outcome, unless a newer generation superseded it.
    fn complete(&self, key: &K, generation: u64, outcome: &Outcome<T, E>) {
        let mut entries = self.entries.lock();
        let Some(entry) = entries.get_mut(key) else {
            return;
        };
        if entry.generation != generation {
            tracing::debug!(generation, "discarding superseded fetch result");
            return;
        }
        entry.state = EntryState::Ready(outcome.clone());
        entry.stale = false;
        entry.fetched_at = Some(Instant::now());
        if let Ok(value) = outcome {
            entry.last_success = Some(value.clone());
        }
    }

    /// Drop a pending entry whose leader died without completing.
    fn evict_orphan(&self, key: &K, generation: u64) {
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get(key) {
            if entry.generation == generation
                && matches!(entry.state, EntryState::Pending { .. })
            {
                entries.remove(key);
            }
        }
    }

    fn expired(&self, entry: &Entry<T, E>) -> bool {
        match (self.stale_after, entry.fetched_at) {
            (Some(ttl), Some(at)) => at.elapsed() >= ttl,
            _ => false,
        }
    }
}
