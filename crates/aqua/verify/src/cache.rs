use bytes::Bytes;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::OnceCell;
use tracing::debug;

use aqua_types::ContentHash;

use crate::error::FetchError;

/// Fetched content keyed by content hash.
///
/// Concurrent requests for the same hash share one fetch. A successful fetch is
/// kept; a failed one drops its slot so the next caller fetches again.
#[derive(Default)]
pub struct ContentCache {
    slots: Mutex<Slots>,
}

type Slots = HashMap<ContentHash, Arc<OnceCell<Bytes>>>;

impl ContentCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> MutexGuard<'_, Slots> {
        self.slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn slot(&self, hash: &ContentHash) -> Arc<OnceCell<Bytes>> {
        self.slots().entry(*hash).or_default().clone()
    }

    pub fn get(&self, hash: &ContentHash) -> Option<Bytes> {
        self.slots().get(hash).and_then(|cell| cell.get().cloned())
    }

    /// Number of slots held, including ones with a fetch in flight.
    pub fn slot_count(&self) -> usize {
        self.slots().len()
    }

    pub fn insert(&self, hash: ContentHash, bytes: Bytes) {
        // Already populated slots keep their first value.
        let _ = self.slot(&hash).set(bytes);
    }

    pub fn len(&self) -> usize {
        self.slots().values().filter(|cell| cell.initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cached bytes for `hash`, running `fetch` only if nothing is cached and no
    /// other caller is already fetching.
    pub async fn get_or_fetch<F, Fut>(&self, hash: &ContentHash, fetch: F) -> Result<Bytes, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Bytes, FetchError>>,
    {
        let slot = self.slot(hash);
        let fetched = slot
            .get_or_try_init(move || async move {
                debug!(hash = %hash.short(), "cache miss, fetching");
                fetch().await
            })
            .await
            .cloned();
        if fetched.is_err() {
            self.prune(hash, &slot);
        }
        fetched
    }

    /// Drop the slot for `hash` if it is still empty and nobody else holds it.
    fn prune(&self, hash: &ContentHash, slot: &Arc<OnceCell<Bytes>>) {
        let mut slots = self.slots();
        // One reference in the map, one held by the caller.
        let idle = slots.get(hash).is_some_and(|cell| {
            Arc::ptr_eq(cell, slot) && !cell.initialized() && Arc::strong_count(cell) <= 2
        });
        if idle {
            slots.remove(hash);
        }
    }
}
