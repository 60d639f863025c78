//! Key hashing.
//!
//! Every placement decision in the core (which group a content key belongs
//! to, which group a host belongs to) runs through a single `KeyHasher`.
//! All nodes in a cluster must agree on it.

use std::fmt;
use std::marker::PhantomData;

use sha2::Digest;

/// Hash function used to map keys and host identifiers onto the keyspace.
pub trait KeyHasher: Send + Sync {
    /// Digest `data`. The result is always `output_len()` bytes long.
    fn digest(&self, data: &[u8]) -> Vec<u8>;

    /// Size of the digest in bytes, which is also the keyspace width.
    fn output_len(&self) -> usize;
}

/// Adapter turning any RustCrypto digest into a `KeyHasher`.
pub struct DigestHasher<D> {
    _digest: PhantomData<fn() -> D>,
}

impl<D> DigestHasher<D> {
    pub fn new() -> Self {
        Self {
            _digest: PhantomData,
        }
    }
}

impl<D> Default for DigestHasher<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> fmt::Debug for DigestHasher<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigestHasher")
            .field("digest", &std::any::type_name::<D>())
            .finish()
    }
}

impl<D: Digest> KeyHasher for DigestHasher<D> {
    fn digest(&self, data: &[u8]) -> Vec<u8> {
        D::digest(data).to_vec()
    }

    fn output_len(&self) -> usize {
        <D as Digest>::output_size()
    }
}

/// The default 256-bit hash.
pub type Sha256Hasher = DigestHasher<sha2::Sha256>;
