//! Deterministic list and group partitioning.
//!
//! A corpus is ordered by a multiplicative (Fibonacci-style) hash of each item id and then
//! cut into fixed-size lists, and each list into fixed-size groups. Nothing about the order
//! is stored: the same ids always produce the same lists. Adding ids to a corpus may move
//! existing ids into a different list, since their rank relative to the newcomers decides
//! where they land.

use crate::types::ItemId;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Knuth's multiplicative hashing constant (close to 2^32 / phi).
pub const KNUTH_MULTIPLIER: u64 = 2_654_435_761;

/// Ranks live in `[0, 2^32)`.
pub const RANK_MODULUS: u64 = 1 << 32;

/// First identifier handed out to words of learner-uploaded modules. Corpus ids stay below it.
pub const CUSTOM_ITEM_ID_BASE: ItemId = 100_000_000;

/// Pseudo-random but stable rank of an item id.
pub fn partition_rank(id: ItemId) -> u64 {
    (id as u64).wrapping_mul(KNUTH_MULTIPLIER) & (RANK_MODULUS - 1)
}

/// Order ids by rank ascending, ties broken by id. Repeated ids are kept once.
pub fn rank_order<I>(ids: I) -> Vec<ItemId>
where
    I: IntoIterator<Item = ItemId>,
{
    let mut ordered: Vec<ItemId> = ids.into_iter().collect();
    ordered.sort_unstable_by_key(|&id| (partition_rank(id), id));
    ordered.dedup();
    ordered
}

/// Number of lists a corpus of `total` items splits into.
pub fn list_count(total: usize, list_size: usize) -> usize {
    if list_size == 0 {
        return 0;
    }
    total.div_ceil(list_size)
}

/// Number of groups in a list holding `list_len` items.
pub fn group_count(list_len: usize, group_size: usize) -> usize {
    list_count(list_len, group_size)
}

/// Ordered ids of list `list_index`.
pub fn slice_list(all_ids: &[ItemId], list_size: usize, list_index: usize) -> Vec<ItemId> {
    let ordered = rank_order(all_ids.iter().copied());
    list_window(&ordered, list_size, list_index).to_vec()
}

/// Ordered ids of group `group_index` of list `list_index`.
///
/// Group `j` of list `i` is `ordered[i * L + j * G .. i * L + (j + 1) * G]`, bounded only by the
/// corpus. When `G` does not divide `L` the last group of a list runs into the next list.
pub fn slice_group(
    all_ids: &[ItemId],
    list_size: usize,
    group_size: usize,
    list_index: usize,
    group_index: usize,
) -> Vec<ItemId> {
    let ordered = rank_order(all_ids.iter().copied());
    group_window(&ordered, list_size, group_size, list_index, group_index).to_vec()
}

fn window(ordered: &[ItemId], start: Option<usize>, end: Option<usize>) -> &[ItemId] {
    let len = ordered.len();
    let start = start.unwrap_or(len).min(len);
    let end = end.unwrap_or(len).min(len);
    if start >= end {
        return &[];
    }
    &ordered[start..end]
}

fn list_window(ordered: &[ItemId], list_size: usize, list_index: usize) -> &[ItemId] {
    let start = list_index.checked_mul(list_size);
    let end = start.and_then(|s| s.checked_add(list_size));
    window(ordered, start, end)
}

fn group_window(
    ordered: &[ItemId],
    list_size: usize,
    group_size: usize,
    list_index: usize,
    group_index: usize,
) -> &[ItemId] {
    let start = list_index
        .checked_mul(list_size)
        .zip(group_index.checked_mul(group_size))
        .and_then(|(list_start, offset)| list_start.checked_add(offset));
    let end = start.and_then(|s| s.checked_add(group_size));
    window(ordered, start, end)
}

/// A corpus ordered once by rank, sliced many times.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankedCorpus {
    order: Vec<ItemId>,
}

impl RankedCorpus {
    pub fn new<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = ItemId>,
    {
        Self {
            order: rank_order(ids),
        }
    }

    /// Keep an order ranked elsewhere, e.g. module words ranked by their position in the upload.
    pub fn from_ordered(order: Vec<ItemId>) -> Self {
        Self { order }
    }

    /// Rank `(position, id)` pairs by the hash of the position rather than of the id.
    pub fn ranked_by_position<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (i64, ItemId)>,
    {
        let mut pairs: Vec<(i64, ItemId)> = pairs.into_iter().collect();
        pairs.sort_unstable_by_key(|&(position, id)| (partition_rank(position), position, id));
        Self {
            order: pairs.into_iter().map(|(_, id)| id).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn ids(&self) -> &[ItemId] {
        &self.order
    }

    pub fn list(&self, list_size: usize, list_index: usize) -> &[ItemId] {
        list_window(&self.order, list_size, list_index)
    }

    pub fn group(
        &self,
        list_size: usize,
        group_size: usize,
        list_index: usize,
        group_index: usize,
    ) -> &[ItemId] {
        group_window(&self.order, list_size, group_size, list_index, group_index)
    }

    pub fn list_count(&self, list_size: usize) -> usize {
        list_count(self.order.len(), list_size)
    }

    pub fn group_count(&self, list_size: usize, group_size: usize, list_index: usize) -> usize {
        group_count(self.list(list_size, list_index).len(), group_size)
    }

    /// Iterate over every list in index order.
    pub fn lists(&self, list_size: usize) -> impl Iterator<Item = &[ItemId]> + '_ {
        (0..self.list_count(list_size)).map(move |i| self.list(list_size, i))
    }
}

/// Process-wide, read-through cache of ranked corpora keyed by category or module.
///
/// Entries live until [`PartitionCache::invalidate`] is called for their key.
#[derive(Debug, Default)]
pub struct PartitionCache {
    entries: RwLock<HashMap<String, Arc<RankedCorpus>>>,
}

impl PartitionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Arc<RankedCorpus>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Return the cached corpus for `key`, building it with `load` on a miss.
    ///
    /// `load` runs outside the lock, so two concurrent misses may both load; the first
    /// insert wins.
    pub fn get_or_load<F, E>(&self, key: &str, load: F) -> Result<Arc<RankedCorpus>, E>
    where
        F: FnOnce() -> Result<RankedCorpus, E>,
    {
        if let Some(hit) = self.get(key) {
            return Ok(hit);
        }

        let built = Arc::new(load()?);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.entry(key.to_string()).or_insert(built);
        Ok(Arc::clone(entry))
    }

    /// Drop the cached corpus for `key`. Returns whether anything was cached.
    pub fn invalidate(&self, key: &str) -> bool {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
