use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Identity of a host, typically `addr:port`. Hashing its bytes decides
/// which affinity group the host belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HostId(pub String);

impl HostId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HostId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for HostId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Synthetic network coordinate, computed by the coordinate subsystem.
///
/// Opaque here: it is stored, cloned, compared and printed, never interpreted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Coordinate {
    pub vec: Vec<f64>,
    pub error: f64,
    pub adjustment: f64,
    pub height: f64,
}

impl Coordinate {
    pub fn origin(dimensionality: usize) -> Self {
        Self {
            vec: vec![0.0; dimensionality],
            error: 1.5,
            adjustment: 0.0,
            height: 1.0e-5,
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} err={} adj={} h={}",
            self.vec, self.error, self.adjustment, self.height
        )
    }
}

/// A member of an affinity group.
///
/// `heartbeats` only ever grows. `last_seen` is nanoseconds since the Unix
/// epoch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeRecord {
    pub host: HostId,
    pub heartbeats: u64,
    pub last_seen: u64,
    pub coordinate: Option<Coordinate>,
}

impl NodeRecord {
    pub fn new(host: impl Into<HostId>) -> Self {
        Self {
            host: host.into(),
            heartbeats: 0,
            last_seen: 0,
            coordinate: None,
        }
    }

    pub fn with_coordinate(mut self, coordinate: Coordinate) -> Self {
        self.coordinate = Some(coordinate);
        self
    }

    /// Move `last_seen` to now, never backwards.
    pub(crate) fn touch(&mut self) {
        self.last_seen = self.last_seen.max(now_nanos());
    }
}

pub fn now_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
