//! Concurrent Canonical-Matrix Sets
//!
//! The frontier being written during a level (`next`) takes insertions
//! from every worker thread. A hash-sharded set keeps the write locks
//! fine-grained: whichever thread inserts first wins, and losers simply
//! move on; no ordering between concurrent insertions is promised or
//! needed.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use parking_lot::RwLock;
use so6_core::So6;

const SHARD_COUNT: usize = 64;

/// Hash-sharded set of canonical matrices.
pub struct CanonicalSet {
    shards: Vec<RwLock<HashSet<So6>>>,
}

impl Default for CanonicalSet {
    fn default() -> Self {
        Self::new()
    }
}

impl CanonicalSet {
    pub fn new() -> Self {
        CanonicalSet {
            shards: (0..SHARD_COUNT).map(|_| RwLock::new(HashSet::new())).collect(),
        }
    }

    fn shard(&self, matrix: &So6) -> &RwLock<HashSet<So6>> {
        let mut hasher = DefaultHasher::new();
        matrix.hash(&mut hasher);
        &self.shards[(hasher.finish() as usize) % SHARD_COUNT]
    }

    /// Insert, returning true when the matrix was new to the set.
    pub fn insert(&self, matrix: So6) -> bool {
        self.shard(&matrix).write().insert(matrix)
    }

    pub fn contains(&self, matrix: &So6) -> bool {
        self.shard(matrix).read().contains(matrix)
    }

    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.read().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drain into a plain vector for the next level's read-only frontier.
    pub fn into_vec(self) -> Vec<So6> {
        let mut out = Vec::with_capacity(self.len());
        for shard in self.shards {
            out.extend(shard.into_inner());
        }
        out
    }
}
