//! Affinity Group Membership Module
//!
//! Splits the hash keyspace into a fixed number of affinity groups and tracks
//! which nodes currently belong to each one.
//!
//! ## Core Mechanisms
//! - **Partitioning**: `AffinityGroups::build` divides `2^(8 * hash_len)` evenly; `locate`
//!   binary-searches the sorted boundaries to find the owner of any hash value.
//! - **Membership**: each `AffinityGroup` keeps its own `RwLock`-guarded member table with
//!   heartbeat counters, last-seen timestamps and network coordinates.
//! - **Fallback**: `next_non_empty` walks down from a group to the nearest one that has members.

pub mod group;
pub mod partitioner;
pub mod types;

pub use group::AffinityGroup;
pub use partitioner::AffinityGroups;
pub use types::{Coordinate, HostId, NodeRecord};
