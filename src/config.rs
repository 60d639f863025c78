//! Node configuration.
//!
//! Read once at startup and shared immutably afterwards. Where the values come
//! from (flags, files, env) is up to the embedding process.

use anyhow::{Result, ensure};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::hash::{KeyHasher, Sha256Hasher};

const DEFAULT_HOSTNAME: &str = "127.0.0.1:32100";
const DEFAULT_AFFINITY_GROUPS: usize = 2;
const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct Config {
    /// Identifier of the local host, usually `addr:port`.
    pub hostname: String,

    /// Number of affinity groups. Optimally about sqrt(n) for n nodes.
    pub num_affinity_groups: usize,

    /// How often the gossip layer refreshes heartbeats and RTTs.
    pub heartbeat_interval: Duration,

    /// Hash used for key and host placement.
    pub hash: Arc<dyn KeyHasher>,
}

impl Config {
    pub fn with_hostname(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            ..Self::default()
        }
    }

    /// Group count that balances group size against group count for a
    /// cluster of `expected_nodes`.
    pub fn recommended_groups(expected_nodes: usize) -> usize {
        let k = expected_nodes.isqrt();
        let k = if k * k < expected_nodes { k + 1 } else { k };
        k.max(1)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(!self.hostname.is_empty(), "hostname must not be empty");
        ensure!(
            self.num_affinity_groups > 0,
            "num_affinity_groups must be at least 1"
        );
        ensure!(
            !self.heartbeat_interval.is_zero(),
            "heartbeat_interval must be non-zero"
        );
        ensure!(
            self.hash.output_len() > 0,
            "hash function must produce a non-empty digest"
        );
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hostname: DEFAULT_HOSTNAME.to_string(),
            num_affinity_groups: DEFAULT_AFFINITY_GROUPS,
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            hash: Arc::new(Sha256Hasher::new()),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("hostname", &self.hostname)
            .field("num_affinity_groups", &self.num_affinity_groups)
            .field("heartbeat_interval", &self.heartbeat_interval)
            .field("hash_len", &self.hash.output_len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let conf = Config::default();
        assert!(conf.validate().is_ok());
        assert_eq!(conf.num_affinity_groups, 2);
        assert_eq!(conf.heartbeat_interval, Duration::from_secs(30));
        assert_eq!(conf.hash.output_len(), 32);
    }

    #[test]
    fn rejects_bad_values() {
        let mut conf = Config::with_hostname("");
        assert!(conf.validate().is_err());

        conf.hostname = "10.0.0.1:4000".into();
        conf.num_affinity_groups = 0;
        assert!(conf.validate().is_err());

        conf.num_affinity_groups = 3;
        conf.heartbeat_interval = Duration::ZERO;
        assert!(conf.validate().is_err());
    }

    #[test]
    fn recommended_groups_is_ceil_sqrt() {
        assert_eq!(Config::recommended_groups(0), 1);
        assert_eq!(Config::recommended_groups(1), 1);
        assert_eq!(Config::recommended_groups(2), 2);
        assert_eq!(Config::recommended_groups(100), 10);
        assert_eq!(Config::recommended_groups(101), 11);
        assert_eq!(Config::recommended_groups(usize::MAX), 1usize << (usize::BITS / 2));
    }
}
