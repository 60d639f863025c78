use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::membership::types::{HostId, NodeRecord};

/// A directory entry as carried in a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tuple {
    pub key: Vec<u8>,
    pub hosts: Vec<HostId>,
}

/// Point-in-time copy of every tuple and every known node.
///
/// A plain value: later changes to the live directory or groups never show
/// up in a snapshot already taken. Ordering inside both lists is unspecified.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub tuples: Vec<Tuple>,
    pub nodes: Vec<NodeRecord>,
}

impl Snapshot {
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }

    pub fn tuple_count(&self) -> usize {
        self.tuples.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty() && self.nodes.is_empty()
    }
}
