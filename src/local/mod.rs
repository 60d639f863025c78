//! Local Group Module
//!
//! Ties the affinity groups and the tuple directory together for one node.
//!
//! ## Core Concepts
//! - **Placement**: keys and hosts are hashed and located among the affinity groups.
//! - **Lookup**: a key's tuples are resolved to live node records. Stale hosts are skipped.
//! - **Snapshot**: a value copy of all tuples and nodes, exchanged with peers for bulk
//!   reconciliation and folded back in with `apply_snapshot`.

pub mod group;
pub mod snapshot;

pub use group::LocalGroup;
pub use snapshot::{Snapshot, Tuple};
