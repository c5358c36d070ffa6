//! Storage and corpus collaborators, plus in-memory implementations.

use crate::due::CardStateLookup;
use crate::types::{CardState, DailyStats, ItemId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::convert::Infallible;

/// Durable mapping from item id to scheduling state.
///
/// A read followed by `put` for the same item must not lose concurrent updates.
pub trait CardStateStore {
    type Error;

    fn get(&self, item_id: ItemId) -> Result<Option<CardState>, Self::Error>;
    fn put(&mut self, state: CardState) -> Result<(), Self::Error>;
    fn get_all(&self) -> Result<Vec<CardState>, Self::Error>;
}

/// Per-day counters keyed by study date.
pub trait DailyStatsStore {
    type Error;

    fn get(&self, date: NaiveDate) -> Result<Option<DailyStats>, Self::Error>;
    fn put(&mut self, stats: DailyStats) -> Result<(), Self::Error>;
    fn get_all(&self) -> Result<Vec<DailyStats>, Self::Error>;
}

/// Display fields of a corpus item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: ItemId,
    pub word: String,
    pub phonetic: Option<String>,
    pub translation: Option<String>,
}

/// Source of item ids per category or module, and of their display records.
pub trait CorpusProvider {
    type Error;

    /// Ids in `scope`, in no particular order.
    fn list_item_ids(&self, scope: &str) -> Result<Vec<ItemId>, Self::Error>;

    /// Records for the given ids, in the order given. Unknown ids are skipped.
    fn items_by_ids(&self, ids: &[ItemId]) -> Result<Vec<ItemRecord>, Self::Error>;
}

/// Card states and daily stats held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    cards: HashMap<ItemId, CardState>,
    days: BTreeMap<NaiveDate, DailyStats>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn card_count(&self) -> usize {
        self.cards.len()
    }
}

impl CardStateLookup for MemoryStore {
    fn card_state(&self, item_id: ItemId) -> Option<&CardState> {
        self.cards.get(&item_id)
    }
}

impl CardStateStore for MemoryStore {
    type Error = Infallible;

    fn get(&self, item_id: ItemId) -> Result<Option<CardState>, Self::Error> {
        Ok(self.cards.get(&item_id).cloned())
    }

    fn put(&mut self, state: CardState) -> Result<(), Self::Error> {
        self.cards.insert(state.item_id, state);
        Ok(())
    }

    fn get_all(&self) -> Result<Vec<CardState>, Self::Error> {
        let mut all: Vec<CardState> = self.cards.values().cloned().collect();
        all.sort_by_key(|state| state.item_id);
        Ok(all)
    }
}

impl DailyStatsStore for MemoryStore {
    type Error = Infallible;

    fn get(&self, date: NaiveDate) -> Result<Option<DailyStats>, Self::Error> {
        Ok(self.days.get(&date).cloned())
    }

    fn put(&mut self, stats: DailyStats) -> Result<(), Self::Error> {
        self.days.insert(stats.date, stats);
        Ok(())
    }

    fn get_all(&self) -> Result<Vec<DailyStats>, Self::Error> {
        Ok(self.days.values().cloned().collect())
    }
}

/// A fixed corpus held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryCorpus {
    scopes: HashMap<String, Vec<ItemId>>,
    items: HashMap<ItemId, ItemRecord>,
}

impl MemoryCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record and tag it with `scope`.
    pub fn insert(&mut self, scope: &str, record: ItemRecord) {
        self.scopes
            .entry(scope.to_string())
            .or_default()
            .push(record.id);
        self.items.insert(record.id, record);
    }

    /// Add a bare word with only an id and spelling.
    pub fn insert_word(&mut self, scope: &str, id: ItemId, word: &str) {
        self.insert(
            scope,
            ItemRecord {
                id,
                word: word.to_string(),
                phonetic: None,
                translation: None,
            },
        );
    }
}

impl CorpusProvider for MemoryCorpus {
    type Error = Infallible;

    fn list_item_ids(&self, scope: &str) -> Result<Vec<ItemId>, Self::Error> {
        Ok(self.scopes.get(scope).cloned().unwrap_or_default())
    }

    fn items_by_ids(&self, ids: &[ItemId]) -> Result<Vec<ItemRecord>, Self::Error> {
        Ok(ids
            .iter()
            .filter_map(|id| self.items.get(id).cloned())
            .collect())
    }
}
