//! Kelips Affinity-Group Core
//!
//! Node membership and key lookup for a Kelips-style DHT. Nodes are split into a
//! fixed number of affinity groups by hashing, and content keys are found by hashing
//! to a group and consulting the tuple directory for the hosts that hold them.
//!
//! ## Architecture Modules
//! - **`membership`**: Partitions the hash keyspace into affinity groups and tracks each
//!   group's members (heartbeats, last-seen, network coordinates) under per-group locks.
//! - **`tuples`**: The concurrent key -> host-set directory, including host expiry sweeps.
//! - **`local`**: The node-local facade tying both together for insert/delete/lookup, and
//!   the `Snapshot` value used for bulk state exchange with peers.
//! - **`config`** / **`hash`** / **`error`**: Startup configuration, the pluggable key hash,
//!   and the error taxonomy.
//!
//! Network transport, gossip scheduling and coordinate computation live outside this crate
//! and drive it through the `LocalGroup` API.

pub mod config;
pub mod error;
pub mod hash;
pub mod local;
pub mod membership;
pub mod tuples;

pub use config::Config;
pub use error::{KelipsError, Result};
pub use hash::{DigestHasher, KeyHasher, Sha256Hasher};
pub use local::{LocalGroup, Snapshot, Tuple};
pub use membership::{AffinityGroup, AffinityGroups, Coordinate, HostId, NodeRecord};
pub use tuples::TupleDirectory;
