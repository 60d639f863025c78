//! Tuple Directory Module
//!
//! Maps content keys to the set of hosts serving them. Inserts are idempotent,
//! deletes of absent hosts are no-ops, and `expire_host` sweeps a failed host
//! out of every key shard by shard.

pub mod directory;

pub use directory::TupleDirectory;

#[cfg(test)]
mod tests;
