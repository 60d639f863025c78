use std::sync::Arc;
use std::time::Duration;

use super::snapshot::{Snapshot, Tuple};
use crate::config::Config;
use crate::error::Result;
use crate::hash::KeyHasher;
use crate::membership::{AffinityGroup, AffinityGroups, Coordinate, HostId, NodeRecord};
use crate::tuples::TupleDirectory;

/// The node-local entry point to the affinity groups and the tuple directory.
///
/// Holds shared handles to both and no lock of its own. Each call goes to
/// one subsystem at a time, so composite answers (`lookup`, `snapshot`) are
/// not atomic across them and may or may not include concurrent changes.
#[derive(Clone)]
pub struct LocalGroup {
    index: usize,
    hostname: HostId,
    groups: Arc<AffinityGroups>,
    tuples: Arc<TupleDirectory>,
    hasher: Arc<dyn KeyHasher>,
}

impl LocalGroup {
    pub fn new(
        hostname: HostId,
        hasher: Arc<dyn KeyHasher>,
        groups: Arc<AffinityGroups>,
        tuples: Arc<TupleDirectory>,
    ) -> Self {
        let index = groups.locate(&hasher.digest(hostname.as_bytes())).index();
        Self {
            index,
            hostname,
            groups,
            tuples,
            hasher,
        }
    }

    pub fn from_config(conf: &Config) -> anyhow::Result<Self> {
        conf.validate()?;
        let groups = AffinityGroups::build(conf.num_affinity_groups, conf.hash.output_len())?;

        let local = Self::new(
            HostId::from(conf.hostname.as_str()),
            conf.hash.clone(),
            Arc::new(groups),
            Arc::new(TupleDirectory::new()),
        );

        tracing::info!(
            "Local group ready host={} group={} groups={}",
            local.hostname,
            local.index,
            local.groups.len()
        );

        Ok(local)
    }

    /// Index of the affinity group the local host hashes into.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn hostname(&self) -> &HostId {
        &self.hostname
    }

    pub fn groups(&self) -> &Arc<AffinityGroups> {
        &self.groups
    }

    pub fn tuples(&self) -> &Arc<TupleDirectory> {
        &self.tuples
    }

    fn group_for(&self, data: &[u8]) -> &AffinityGroup {
        self.groups.locate(&self.hasher.digest(data))
    }

    // ── Tuples ───────────────────────────────────────────────

    pub fn insert(&self, key: &[u8], host: HostId) -> bool {
        self.tuples.insert(key, host)
    }

    pub fn delete(&self, key: &[u8], host: &HostId) -> bool {
        self.tuples.delete(key, host)
    }

    /// Members of the group responsible for `key`, whether or not any tuple
    /// for it exists.
    pub fn lookup_group_nodes(&self, key: &[u8]) -> Vec<NodeRecord> {
        self.group_for(key).nodes()
    }

    /// Like [`lookup_group_nodes`](Self::lookup_group_nodes), but when the
    /// responsible group has no members the nearest populated group below it
    /// answers instead.
    pub fn lookup_closest_group_nodes(&self, key: &[u8]) -> Vec<NodeRecord> {
        let start = self.group_for(key).index();
        self.groups
            .next_non_empty(start)
            .map(AffinityGroup::nodes)
            .unwrap_or_default()
    }

    /// Resolve every host holding `key` to its live node record.
    ///
    /// Hosts no longer listed in their group are dropped from the result.
    /// Fails only when the key has no tuples at all.
    pub fn lookup(&self, key: &[u8]) -> Result<Vec<NodeRecord>> {
        let hosts = self.tuples.get(key)?;

        let nodes: Vec<NodeRecord> = hosts
            .iter()
            .filter_map(|host| self.group_for(host.as_bytes()).lookup_by_host(host))
            .collect();

        if nodes.len() < hosts.len() {
            tracing::debug!(
                "Skipped {} stale tuple(s) for key={}",
                hosts.len() - nodes.len(),
                String::from_utf8_lossy(key)
            );
        }

        Ok(nodes)
    }

    // ── Nodes ────────────────────────────────────────────────

    pub fn add_node(&self, node: NodeRecord, force: bool) -> Result<()> {
        self.group_for(node.host.as_bytes()).add_node(node, force)
    }

    pub fn remove_node(&self, host: &HostId) -> Result<NodeRecord> {
        self.group_for(host.as_bytes()).remove_node(host)
    }

    pub fn ping_node(&self, host: &HostId, coordinate: &Coordinate, rtt: Duration) -> Result<()> {
        self.group_for(host.as_bytes())
            .ping_node(host, coordinate, rtt)
    }

    pub fn lookup_node(&self, host: &HostId) -> Option<NodeRecord> {
        self.group_for(host.as_bytes()).lookup_by_host(host)
    }

    /// Forget a failed host: drop it from its group and sweep it out of the
    /// tuple directory. Returns `true` if either held it. A host that is no
    /// longer a member is not an error.
    pub fn expire_host(&self, host: &HostId) -> Result<bool> {
        let was_member = match self.remove_node(host) {
            Ok(_) => true,
            Err(e) if e.is_not_found() => false,
            Err(e) => return Err(e),
        };
        let had_tuples = self.tuples.expire_host(host);
        Ok(was_member || had_tuples)
    }

    // ── State exchange ───────────────────────────────────────

    pub fn snapshot(&self) -> Snapshot {
        let mut snapshot = Snapshot {
            tuples: Vec::with_capacity(self.tuples.count()),
            nodes: Vec::with_capacity(self.groups.node_count()),
        };

        self.tuples.iterate(|key, hosts| {
            snapshot.tuples.push(Tuple {
                key: key.to_vec(),
                hosts: hosts.to_vec(),
            });
            true
        });

        self.groups.iter_nodes(|node| {
            snapshot.nodes.push(node);
            true
        });

        snapshot
    }

    /// Fold a peer's snapshot into local state. Tuple hosts are added, nodes
    /// are merged into the group they hash to here. Returns how many entries
    /// changed.
    pub fn apply_snapshot(&self, snapshot: &Snapshot) -> usize {
        let mut changed = 0;

        for tuple in &snapshot.tuples {
            for host in &tuple.hosts {
                if self.tuples.insert(&tuple.key, host.clone()) {
                    changed += 1;
                }
            }
        }

        for node in &snapshot.nodes {
            if self.group_for(node.host.as_bytes()).merge_node(node.clone()) {
                changed += 1;
            }
        }

        tracing::info!(
            "Applied snapshot tuples={} nodes={} changed={}",
            snapshot.tuple_count(),
            snapshot.node_count(),
            changed
        );

        changed
    }
}

impl std::fmt::Debug for LocalGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalGroup")
            .field("index", &self.index)
            .field("hostname", &self.hostname)
            .field("groups", &self.groups.len())
            .field("tuples", &self.tuples.count())
            .finish()
    }
}
