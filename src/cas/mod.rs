//! Content Cache
//!
//! Resolves content hashes to text through an injected [`BlobFetcher`],
//! keeping every resolved blob for the lifetime of the cache. Concurrent
//! requests for the same hash share one fetch.
//!
//! Content is addressed by hash, so a resolved entry never goes stale and is
//! never evicted. A failed entry is kept (and reported by [`ContentCache::state`])
//! until the next [`ContentCache::get`] for that hash, which starts a fresh
//! fetch that is coalesced like any other.

pub mod fetcher;

pub use fetcher::{BlobFetcher, FnFetcher, HttpBlobFetcher};

use crate::error::FetchError;
use crate::types::ContentHash;
use futures::FutureExt;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::oneshot;
use tracing::{debug, trace, warn};

type Waiter = oneshot::Sender<Result<Arc<str>, FetchError>>;

enum Entry {
    /// Fetch in flight; every caller waiting on it
    Pending(Vec<Waiter>),
    Ready(Arc<str>),
    Failed(FetchError),
}

/// Owns a `Pending` entry for the life of its fetch task.
///
/// If the task is dropped before settling (runtime shutdown, spawn on a
/// closed runtime), the entry becomes `Failed(Aborted)` and its waiters are
/// released, so later `get` calls start a fresh fetch instead of joining a
/// list nothing will complete.
struct PendingGuard {
    hash: ContentHash,
    entries: Arc<Mutex<HashMap<ContentHash, Entry>>>,
    settled: bool,
}

impl PendingGuard {
    /// Store the fetch outcome and hand back the waiters to notify
    fn settle(mut self, result: &Result<Arc<str>, FetchError>) -> Vec<Waiter> {
        self.settled = true;
        let entry = match result {
            Ok(text) => Entry::Ready(Arc::clone(text)),
            Err(e) => Entry::Failed(e.clone()),
        };
        match self.entries.lock().insert(self.hash.clone(), entry) {
            Some(Entry::Pending(waiters)) => waiters,
            _ => Vec::new(),
        }
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let error = FetchError::Aborted(format!("fetch task for {} dropped", self.hash));
        let waiters = {
            let mut entries = self.entries.lock();
            if !matches!(entries.get(&self.hash), Some(Entry::Pending(_))) {
                return;
            }
            match entries.insert(self.hash.clone(), Entry::Failed(error.clone())) {
                Some(Entry::Pending(waiters)) => waiters,
                _ => Vec::new(),
            }
        };
        warn!(hash = %self.hash, waiters = waiters.len(), "Blob fetch task dropped before completion");
        for waiter in waiters {
            let _ = waiter.send(Err(error.clone()));
        }
    }
}

/// Observable state of a single hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentState {
    /// Never requested
    Missing,
    Pending,
    Ready(Arc<str>),
    Failed(FetchError),
}

/// Hash-keyed content cache with request coalescing
///
/// Fetches run on spawned tokio tasks, so a caller that stops waiting does
/// not cancel a fetch other callers may share. `get` must be called from
/// within a tokio runtime.
pub struct ContentCache {
    fetcher: Arc<dyn BlobFetcher>,
    entries: Arc<Mutex<HashMap<ContentHash, Entry>>>,
    fetches: Arc<AtomicU64>,
}

impl ContentCache {
    pub fn new(fetcher: Arc<dyn BlobFetcher>) -> Self {
        Self {
            fetcher,
            entries: Arc::new(Mutex::new(HashMap::new())),
            fetches: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Build a cache around an async closure
    pub fn from_fn<F, Fut>(f: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<String, FetchError>> + Send + 'static,
    {
        Self::new(Arc::new(FnFetcher::new(f)))
    }

    /// Resolve `hash` to its content.
    ///
    /// Returns a cached value immediately, joins an in-flight fetch, or
    /// starts a new one. All callers for a hash observe the same outcome.
    pub async fn get(&self, hash: &str) -> Result<Arc<str>, FetchError> {
        let (tx, rx) = oneshot::channel();
        let start_fetch = {
            let mut entries = self.entries.lock();
            match entries.get_mut(hash) {
                Some(Entry::Ready(text)) => {
                    trace!(hash, "Content cache hit");
                    return Ok(Arc::clone(text));
                }
                Some(Entry::Pending(waiters)) => {
                    trace!(hash, waiters = waiters.len(), "Joining in-flight fetch");
                    waiters.push(tx);
                    false
                }
                Some(Entry::Failed(_)) | None => {
                    entries.insert(hash.to_string(), Entry::Pending(vec![tx]));
                    true
                }
            }
        };

        if start_fetch {
            self.spawn_fetch(hash.to_string());
        }

        rx.await
            .map_err(|_| FetchError::Aborted(format!("fetch for {} dropped", hash)))?
    }

    fn spawn_fetch(&self, hash: ContentHash) {
        let fetcher = Arc::clone(&self.fetcher);
        let guard = PendingGuard {
            hash,
            entries: Arc::clone(&self.entries),
            settled: false,
        };
        self.fetches.fetch_add(1, Ordering::Relaxed);
        debug!(hash = %guard.hash, "Starting blob fetch");

        tokio::spawn(async move {
            let started = Instant::now();
            let hash = guard.hash.clone();
            let result = match AssertUnwindSafe(fetcher.fetch(&hash)).catch_unwind().await {
                Ok(result) => result.map(Arc::<str>::from),
                Err(_) => Err(FetchError::Aborted(format!("fetcher panicked for {}", hash))),
            };

            let waiters = guard.settle(&result);

            let duration_ms = started.elapsed().as_millis() as u64;
            match &result {
                Ok(text) => debug!(
                    hash = %hash,
                    bytes = text.len(),
                    waiters = waiters.len(),
                    duration_ms,
                    "Blob fetch resolved"
                ),
                Err(e) => warn!(
                    hash = %hash,
                    error = %e,
                    waiters = waiters.len(),
                    duration_ms,
                    "Blob fetch failed"
                ),
            }

            for waiter in waiters {
                let _ = waiter.send(result.clone());
            }
        });
    }

    /// Current state of `hash` without triggering a fetch
    pub fn state(&self, hash: &str) -> ContentState {
        match self.entries.lock().get(hash) {
            None => ContentState::Missing,
            Some(Entry::Pending(_)) => ContentState::Pending,
            Some(Entry::Ready(text)) => ContentState::Ready(Arc::clone(text)),
            Some(Entry::Failed(e)) => ContentState::Failed(e.clone()),
        }
    }

    /// Resolved content, if already cached
    pub fn peek(&self, hash: &str) -> Option<Arc<str>> {
        match self.state(hash) {
            ContentState::Ready(text) => Some(text),
            _ => None,
        }
    }

    /// Number of fetches issued over the cache's lifetime
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }

    /// Number of hashes with an entry in any state
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
