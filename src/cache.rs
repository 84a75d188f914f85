//! Time-boxed read-through cache for the public menu list.
//! Best-effort only: it is owned by the read path, never consulted on the
//! admin write path, and write handlers call `invalidate` after a mutation.

use std::time::{Duration, Instant};

use parking_lot::RwLock;

use crate::menu::MenuItem;

const DEFAULT_TTL: Duration = Duration::from_secs(60);

pub struct ListCache {
    ttl: Duration,
    slot: RwLock<Option<(Instant, Vec<MenuItem>)>>,
}

impl Default for ListCache {
    fn default() -> Self { Self::with_ttl(DEFAULT_TTL) }
}

impl ListCache {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self { ttl, slot: RwLock::new(None) }
    }

    /// Return the cached list if it is still within the freshness window.
    pub fn get(&self) -> Option<Vec<MenuItem>> {
        let guard = self.slot.read();
        match guard.as_ref() {
            Some((at, items)) if at.elapsed() < self.ttl => Some(items.clone()),
            _ => None,
        }
    }

    pub fn put(&self, items: Vec<MenuItem>) {
        *self.slot.write() = Some((Instant::now(), items));
    }

    pub fn invalidate(&self) {
        *self.slot.write() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serves_within_ttl_and_expires_after() {
        let cache = ListCache::with_ttl(Duration::from_millis(30));
        assert!(cache.get().is_none());
        cache.put(Vec::new());
        assert!(cache.get().is_some());
        std::thread::sleep(Duration::from_millis(40));
        assert!(cache.get().is_none());
    }

    #[test]
    fn invalidate_clears_the_slot() {
        let cache = ListCache::default();
        cache.put(Vec::new());
        cache.invalidate();
        assert!(cache.get().is_none());
    }
}
