use dashmap::DashMap;
use std::collections::HashSet;

use crate::error::{KelipsError, Result};
use crate::membership::types::HostId;

/// Content key -> set of hosts serving it.
///
/// Backed by a sharded `DashMap`, so mutations on unrelated keys rarely
/// contend. A key whose host set becomes empty is pruned.
#[derive(Debug, Default)]
pub struct TupleDirectory {
    tuples: DashMap<Vec<u8>, HashSet<HostId>>,
}

impl TupleDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `host` to the set for `key`. Returns `false` if it was already there.
    pub fn insert(&self, key: &[u8], host: HostId) -> bool {
        let added = self.tuples.entry(key.to_vec()).or_default().insert(host);
        if added {
            tracing::debug!("Tuple inserted key={}", String::from_utf8_lossy(key));
        }
        added
    }

    /// Remove `host` from the set for `key`. Returns `false` if it wasn't there.
    pub fn delete(&self, key: &[u8], host: &HostId) -> bool {
        let mut removed = false;
        // Removal and pruning share one shard lock, so an emptied key is
        // never visible to readers.
        self.tuples.remove_if_mut(key, |_, hosts| {
            removed = hosts.remove(host);
            hosts.is_empty()
        });

        if removed {
            tracing::debug!(
                "Tuple deleted key={} host={}",
                String::from_utf8_lossy(key),
                host
            );
        }
        removed
    }

    pub fn get(&self, key: &[u8]) -> Result<Vec<HostId>> {
        match self.tuples.get(key) {
            Some(hosts) if !hosts.is_empty() => Ok(hosts.iter().cloned().collect()),
            _ => Err(KelipsError::key_not_found(key)),
        }
    }

    pub fn contains(&self, key: &[u8], host: &HostId) -> bool {
        self.tuples
            .get(key)
            .is_some_and(|hosts| hosts.contains(host))
    }

    /// Number of keys with at least one host.
    pub fn count(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    /// Lazy single pass over `(key, hosts)` pairs in no particular order.
    ///
    /// The key set is captured up front. Each entry is then read under its
    /// own short-lived shard lock, so nothing stays locked while the caller
    /// holds an item. Keys removed mid-walk are skipped and keys added
    /// mid-walk are not visited.
    pub fn iter(&self) -> impl Iterator<Item = (Vec<u8>, Vec<HostId>)> + '_ {
        let keys: Vec<Vec<u8>> = self.tuples.iter().map(|entry| entry.key().clone()).collect();
        keys.into_iter().filter_map(move |key| {
            let hosts: Vec<HostId> = self.tuples.get(&key)?.iter().cloned().collect();
            if hosts.is_empty() {
                None
            } else {
                Some((key, hosts))
            }
        })
    }

    /// Visitor form of [`iter`](Self::iter). Stops once `visit` returns `false`.
    pub fn iterate<F>(&self, mut visit: F)
    where
        F: FnMut(&[u8], &[HostId]) -> bool,
    {
        for (key, hosts) in self.iter() {
            if !visit(&key, &hosts) {
                return;
            }
        }
    }

    /// Remove `host` from every key. Returns `true` if any key held it.
    ///
    /// Each shard is swept under its own write lock, so every key is
    /// updated atomically. The sweep as a whole is not atomic and may
    /// interleave with concurrent inserts on shards it has already passed.
    pub fn expire_host(&self, host: &HostId) -> bool {
        let mut touched = 0usize;
        self.tuples.retain(|_, hosts| {
            if hosts.remove(host) {
                touched += 1;
            }
            !hosts.is_empty()
        });

        if touched > 0 {
            tracing::warn!("Expired host={} from {} key(s)", host, touched);
        }
        touched > 0
    }

    /// Every distinct host referenced by at least one key.
    pub fn hosts(&self) -> HashSet<HostId> {
        self.tuples
            .iter()
            .flat_map(|entry| entry.value().iter().cloned().collect::<Vec<_>>())
            .collect()
    }
}
