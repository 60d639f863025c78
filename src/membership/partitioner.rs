use std::ops::Index;

use super::group::AffinityGroup;
use super::types::NodeRecord;
use crate::error::{KelipsError, Result};

/// All affinity groups of the keyspace, sorted by lower boundary.
///
/// Group `i` starts at `i * (2^(8 * hash_len) / num_groups)`. Boundaries are
/// big-endian and always exactly `hash_len` bytes wide, so byte-wise
/// comparison matches numeric order.
#[derive(Debug)]
pub struct AffinityGroups {
    groups: Vec<AffinityGroup>,
    hash_len: usize,
}

impl AffinityGroups {
    pub fn build(num_groups: usize, hash_len: usize) -> Result<Self> {
        let invalid = || KelipsError::InvalidGroupCount {
            groups: num_groups,
            hash_len,
        };
        if num_groups == 0 || hash_len == 0 {
            return Err(invalid());
        }

        let span = keyspace_span(num_groups, hash_len);
        if span.iter().all(|b| *b == 0) {
            return Err(invalid());
        }

        let groups = (0..num_groups)
            .map(|i| {
                let boundary = mul_small(&span, i as u64);
                // i * span < 2^(8 * hash_len), so the extra leading byte is zero.
                AffinityGroup::new(boundary[1..].to_vec(), i)
            })
            .collect();

        Ok(Self { groups, hash_len })
    }

    /// The group whose range contains `hash`: the one with the greatest lower
    /// boundary that is `<= hash`.
    pub fn locate(&self, hash: &[u8]) -> &AffinityGroup {
        &self.groups[self.locate_index(hash)]
    }

    fn locate_index(&self, hash: &[u8]) -> usize {
        match self
            .groups
            .binary_search_by(|group| group.lower_boundary().cmp(hash))
        {
            Ok(i) => i,
            // `i` is the first boundary above `hash`. Group 0 starts at zero,
            // so only a malformed (short) hash can land before it.
            Err(i) => i.saturating_sub(1),
        }
    }

    /// Starting at `start` and walking down through lower indices (wrapping
    /// from 0 to the last group), find the first group with any members.
    pub fn next_non_empty(&self, start: usize) -> Option<&AffinityGroup> {
        let n = self.groups.len();
        if n == 0 {
            return None;
        }
        let start = start % n;
        (0..n)
            .map(|step| &self.groups[(start + n - step) % n])
            .find(|group| !group.is_empty())
    }

    pub fn get(&self, index: usize) -> Option<&AffinityGroup> {
        self.groups.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AffinityGroup> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn hash_len(&self) -> usize {
        self.hash_len
    }

    pub fn node_count(&self) -> usize {
        self.groups.iter().map(AffinityGroup::count).sum()
    }

    /// Visit a copy of every node in every group, stopping early when `visit`
    /// returns `false`. Each group is read under its own lock in turn.
    pub fn iter_nodes<F>(&self, mut visit: F)
    where
        F: FnMut(NodeRecord) -> bool,
    {
        for group in &self.groups {
            for node in group.nodes() {
                if !visit(node) {
                    return;
                }
            }
        }
    }
}

impl Index<usize> for AffinityGroups {
    type Output = AffinityGroup;

    fn index(&self, index: usize) -> &AffinityGroup {
        &self.groups[index]
    }
}

impl<'a> IntoIterator for &'a AffinityGroups {
    type Item = &'a AffinityGroup;
    type IntoIter = std::slice::Iter<'a, AffinityGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

/// `2^(8 * hash_len) / divisor` as a big-endian number `hash_len + 1` bytes wide.
fn keyspace_span(divisor: usize, hash_len: usize) -> Vec<u8> {
    let divisor = divisor as u128;
    let mut quotient = Vec::with_capacity(hash_len + 1);
    let mut rem: u128 = 0;
    for digit in std::iter::once(1u8).chain(std::iter::repeat_n(0u8, hash_len)) {
        let cur = (rem << 8) | digit as u128;
        quotient.push((cur / divisor) as u8);
        rem = cur % divisor;
    }
    quotient
}

/// Big-endian `value * factor`, truncated to the width of `value`.
fn mul_small(value: &[u8], factor: u64) -> Vec<u8> {
    let mut out = vec![0u8; value.len()];
    let mut carry: u128 = 0;
    for (dst, src) in out.iter_mut().zip(value).rev() {
        let cur = *src as u128 * factor as u128 + carry;
        *dst = cur as u8;
        carry = cur >> 8;
    }
    out
}
