//! Per-type counts with chunk-visit bookkeeping.

use std::collections::HashMap;

use serde::Serialize;

use super::key::TypeKey;

/// Mapping from type to count, plus how many chunks fed it.
///
/// Counts only ever grow until [`TypeCounter::clear`] is called.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TypeCounter {
    counts: HashMap<TypeKey, u64>,
    total: u64,
    chunks_visited: u64,
    chunks_with_zero_contribution: u64,
}

impl TypeCounter {
    /// Create an empty counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` occurrences of `key`.
    pub fn add(&mut self, key: &TypeKey, amount: u64) {
        if amount == 0 {
            return;
        }
        match self.counts.get_mut(key) {
            Some(count) => *count += amount,
            None => {
                self.counts.insert(key.clone(), amount);
            }
        }
        self.total += amount;
    }

    /// Record a visited chunk and whether it contributed anything.
    pub fn record_chunk(&mut self, contributed: u64) {
        self.chunks_visited += 1;
        if contributed == 0 {
            self.chunks_with_zero_contribution += 1;
        }
    }

    /// Count for one type (0 when never seen).
    pub fn get(&self, key: &TypeKey) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct counted types.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterate over `(type, count)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&TypeKey, u64)> {
        self.counts.iter().map(|(k, v)| (k, *v))
    }

    pub fn chunks_visited(&self) -> u64 {
        self.chunks_visited
    }

    pub fn chunks_with_zero_contribution(&self) -> u64 {
        self.chunks_with_zero_contribution
    }

    /// Chunks that contributed at least one counted entity.
    pub fn chunks_counted(&self) -> u64 {
        self.chunks_visited - self.chunks_with_zero_contribution
    }

    /// Forget all counts and chunk bookkeeping.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_accumulates() {
        let stone = TypeKey::new("minecraft:stone");
        let dirt = TypeKey::new("minecraft:dirt");
        let mut counter = TypeCounter::new();
        counter.add(&stone, 3);
        counter.add(&stone, 2);
        counter.add(&dirt, 1);
        counter.add(&dirt, 0);

        assert_eq!(counter.get(&stone), 5);
        assert_eq!(counter.get(&dirt), 1);
        assert_eq!(counter.get(&TypeKey::new("minecraft:air")), 0);
        assert_eq!(counter.total(), 6);
        assert_eq!(counter.len(), 2);
    }

    #[test]
    fn test_zero_amount_does_not_create_entry() {
        let mut counter = TypeCounter::new();
        counter.add(&TypeKey::new("minecraft:stone"), 0);
        assert!(counter.is_empty());
    }

    #[test]
    fn test_chunk_bookkeeping() {
        let mut counter = TypeCounter::new();
        counter.record_chunk(10);
        counter.record_chunk(0);
        counter.record_chunk(0);
        assert_eq!(counter.chunks_visited(), 3);
        assert_eq!(counter.chunks_with_zero_contribution(), 2);
        assert_eq!(counter.chunks_counted(), 1);

        counter.clear();
        assert_eq!(counter.chunks_visited(), 0);
        assert_eq!(counter.total(), 0);
    }
}
