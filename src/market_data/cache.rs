// =============================================================================
// SeriesCache — time-bounded memo of fetched data per selection
// =============================================================================
//
// One slot per `(ticker, period, interval)`. Each slot is an async mutex so
// that concurrent requests for the same key while a fetch is in flight wait
// for that fetch and then read its result, instead of calling upstream again.
// Requests for different keys never contend beyond the brief map lookup.
//
// Freshness is checked explicitly on every read. A failed fetch leaves the
// slot empty, so the next request retries. Only slots holding data count as
// entries for `invalidate`, `clear` and `fresh_len`.
// =============================================================================

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use parking_lot::Mutex;
use tokio::sync::OwnedMutexGuard;
use tokio::time::Instant;
use tracing::debug;

use super::{FundMetadata, PriceSeries};
use crate::types::Selection;

/// Value stored per selection.
#[derive(Debug, Clone)]
pub struct CachedFetch {
    pub fetched_at: Instant,
    pub fetched_at_utc: chrono::DateTime<chrono::Utc>,
    pub series: Arc<PriceSeries>,
    pub metadata: Arc<FundMetadata>,
}

impl CachedFetch {
    pub fn new(series: PriceSeries, metadata: FundMetadata) -> Self {
        Self {
            fetched_at: Instant::now(),
            fetched_at_utc: chrono::Utc::now(),
            series: Arc::new(series),
            metadata: Arc::new(metadata),
        }
    }

    pub fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.fetched_at) < ttl
    }
}

type Slot = Arc<tokio::sync::Mutex<Option<CachedFetch>>>;

pub struct SeriesCache {
    ttl: Duration,
    slots: Mutex<HashMap<Selection, Slot>>,
}

impl SeriesCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn slot(&self, key: Selection) -> Slot {
        self.slots.lock().entry(key).or_default().clone()
    }

    fn is_current(&self, key: Selection, slot: &Slot) -> bool {
        self.slots
            .lock()
            .get(&key)
            .is_some_and(|current| Arc::ptr_eq(current, slot))
    }

    /// Lock the slot mapped to `key`. If the slot was removed from the map
    /// while waiting, start over on the replacement so every waiter ends up
    /// behind the same in-flight fetch.
    async fn lock_current(&self, key: Selection) -> OwnedMutexGuard<Option<CachedFetch>> {
        loop {
            let slot = self.slot(key);
            let guard = slot.clone().lock_owned().await;
            if self.is_current(key, &slot) {
                return guard;
            }
            debug!(key = %key, "cache slot replaced while waiting, retrying");
        }
    }

    /// Return the fresh entry for `key`, or run `fetch` and store its result.
    ///
    /// Returns the entry together with `true` when it came from the cache.
    pub async fn get_or_fetch<F, Fut>(&self, key: Selection, fetch: F) -> Result<(CachedFetch, bool)>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<CachedFetch>>,
    {
        let mut guard = self.lock_current(key).await;

        if let Some(entry) = guard.as_ref() {
            if entry.is_fresh(self.ttl, Instant::now()) {
                debug!(key = %key, "cache hit");
                return Ok((entry.clone(), true));
            }
            debug!(key = %key, "cache entry stale");
        } else {
            debug!(key = %key, "cache miss");
        }

        // Drop a stale value before refetching so a failure cannot serve it.
        *guard = None;
        let entry = fetch().await?;
        *guard = Some(entry.clone());
        drop(guard);

        self.purge_expired();
        Ok((entry, false))
    }

    /// Fresh entry for `key` without fetching.
    #[cfg(test)]
    pub fn peek(&self, key: Selection) -> Option<CachedFetch> {
        let slot = self.slots.lock().get(&key)?.clone();
        let guard = slot.try_lock().ok()?;
        guard
            .as_ref()
            .filter(|e| e.is_fresh(self.ttl, Instant::now()))
            .cloned()
    }

    /// Drop the entry for `key`. Returns whether it held data.
    pub fn invalidate(&self, key: Selection) -> bool {
        self.slots
            .lock()
            .remove(&key)
            .is_some_and(|slot| holds_entry(&slot))
    }

    /// Drop every entry. Returns the number of slots that held data.
    pub fn clear(&self) -> usize {
        self.slots
            .lock()
            .drain()
            .filter(|(_, slot)| holds_entry(slot))
            .count()
    }

    /// Number of slots currently holding a fresh entry.
    pub fn fresh_len(&self) -> usize {
        let now = Instant::now();
        self.slots
            .lock()
            .values()
            .filter(|slot| {
                slot.try_lock()
                    .map(|g| g.as_ref().is_some_and(|e| e.is_fresh(self.ttl, now)))
                    .unwrap_or(false)
            })
            .count()
    }

    /// Remove slots whose entry has expired. Slots still fresh, locked, or
    /// referenced by a request waiting on them are kept.
    fn purge_expired(&self) {
        let now = Instant::now();
        let mut slots = self.slots.lock();
        let before = slots.len();
        slots.retain(|_, slot| {
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            match slot.try_lock() {
                Ok(g) => g.as_ref().is_some_and(|e| e.is_fresh(self.ttl, now)),
                Err(_) => true,
            }
        });
        let removed = before - slots.len();
        if removed > 0 {
            debug!(removed, "purged expired cache slots");
        }
    }
}

/// A slot locked by an in-flight fetch holds no data yet.
fn holds_entry(slot: &Slot) -> bool {
    slot.try_lock().is_ok_and(|g| g.is_some())
}
