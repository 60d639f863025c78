use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::Duration;

use super::types::{Coordinate, HostId, NodeRecord, now_nanos};
use crate::error::{KelipsError, Result};

/// One partition of the keyspace and the nodes currently hashing into it.
///
/// The group owns `[lower_boundary, next group's lower_boundary)`. Each group
/// guards its members with its own lock, so groups never block each other.
#[derive(Debug)]
pub struct AffinityGroup {
    lower_boundary: Vec<u8>,
    index: usize,
    members: RwLock<HashMap<HostId, NodeRecord>>,
}

impl AffinityGroup {
    pub fn new(lower_boundary: Vec<u8>, index: usize) -> Self {
        Self {
            lower_boundary,
            index,
            members: RwLock::new(HashMap::new()),
        }
    }

    pub fn lower_boundary(&self) -> &[u8] {
        &self.lower_boundary
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn add_node(&self, mut node: NodeRecord, force: bool) -> Result<()> {
        let host = node.host.clone();
        let count = {
            let mut members = self.members.write();
            if !force && members.contains_key(&host) {
                return Err(KelipsError::AlreadyMember(host));
            }
            node.last_seen = now_nanos();
            members.insert(host.clone(), node);
            members.len()
        };

        tracing::info!(
            "Node added group={} count={} host={}",
            self.index,
            count,
            host
        );

        Ok(())
    }

    pub fn remove_node(&self, host: &HostId) -> Result<NodeRecord> {
        let (removed, count) = {
            let mut members = self.members.write();
            let removed = members
                .remove(host)
                .ok_or_else(|| KelipsError::NodeNotFound(host.clone()))?;
            (removed, members.len())
        };

        tracing::info!(
            "Node removed group={} count={} host={}",
            self.index,
            count,
            host
        );

        Ok(removed)
    }

    /// Record a heartbeat from `host`: bump the counter, refresh last seen and
    /// store a copy of its latest coordinate.
    ///
    /// `rtt` is logged only. It does not feed into the record yet.
    pub fn ping_node(&self, host: &HostId, coordinate: &Coordinate, rtt: Duration) -> Result<()> {
        let heartbeats = {
            let mut members = self.members.write();
            let node = members
                .get_mut(host)
                .ok_or_else(|| KelipsError::NodeNotFound(host.clone()))?;
            node.heartbeats += 1;
            node.touch();
            node.coordinate = Some(coordinate.clone());
            node.heartbeats
        };

        tracing::debug!(
            "Pinged group={} host={} heartbeats={} rtt={:?}",
            self.index,
            host,
            heartbeats,
            rtt
        );

        Ok(())
    }

    /// Fold in a record learned from a peer. Unknown hosts are inserted and
    /// known ones replaced only when the incoming heartbeat count is higher.
    pub fn merge_node(&self, incoming: NodeRecord) -> bool {
        let mut members = self.members.write();
        match members.get_mut(&incoming.host) {
            Some(existing) => {
                if incoming.heartbeats > existing.heartbeats {
                    tracing::debug!(
                        "Updating {} in group={}: heartbeats {} -> {}",
                        incoming.host,
                        self.index,
                        existing.heartbeats,
                        incoming.heartbeats
                    );
                    let last_seen = existing.last_seen.max(incoming.last_seen);
                    *existing = incoming;
                    existing.last_seen = last_seen;
                    true
                } else {
                    false
                }
            }
            None => {
                tracing::info!(
                    "Discovered node group={} host={}",
                    self.index,
                    incoming.host
                );
                members.insert(incoming.host.clone(), incoming);
                true
            }
        }
    }

    pub fn nodes(&self) -> Vec<NodeRecord> {
        self.members.read().values().cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.members.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.read().is_empty()
    }

    pub fn contains(&self, host: &HostId) -> bool {
        self.members.read().contains_key(host)
    }

    pub fn lookup_by_host(&self, host: &HostId) -> Option<NodeRecord> {
        self.members.read().get(host).cloned()
    }
}
