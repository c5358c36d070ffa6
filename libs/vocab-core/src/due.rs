//! Due-set selection and progress counts.

use crate::types::{CardState, ItemId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::BuildHasher;

/// Read access to card states by item id.
pub trait CardStateLookup {
    fn card_state(&self, item_id: ItemId) -> Option<&CardState>;
}

impl<S: BuildHasher> CardStateLookup for HashMap<ItemId, CardState, S> {
    fn card_state(&self, item_id: ItemId) -> Option<&CardState> {
        self.get(&item_id)
    }
}

fn due_keys<L: CardStateLookup + ?Sized>(
    candidates: &[ItemId],
    lookup: &L,
    now: DateTime<Utc>,
) -> Vec<(DateTime<Utc>, ItemId)> {
    let mut keys: Vec<_> = candidates
        .iter()
        .filter_map(|&id| lookup.card_state(id))
        .filter(|state| state.is_due(now))
        .map(|state| (state.next_review, state.item_id))
        .collect();
    keys.sort_unstable();
    keys.dedup();
    keys
}

/// Candidates that are due at `now`, most overdue first.
///
/// Items without a card state were never reviewed and are skipped.
pub fn select_due<L: CardStateLookup + ?Sized>(
    candidates: &[ItemId],
    lookup: &L,
    now: DateTime<Utc>,
) -> Vec<ItemId> {
    due_keys(candidates, lookup, now)
        .into_iter()
        .map(|(_, id)| id)
        .collect()
}

/// The first `limit` items of [`select_due`].
pub fn select_due_limited<L: CardStateLookup + ?Sized>(
    candidates: &[ItemId],
    lookup: &L,
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<ItemId> {
    due_keys(candidates, lookup, now)
        .into_iter()
        .take(limit)
        .map(|(_, id)| id)
        .collect()
}

/// Candidates with at least one successful review since their last lapse.
pub fn learned_count<L: CardStateLookup + ?Sized>(candidates: &[ItemId], lookup: &L) -> usize {
    candidates
        .iter()
        .filter_map(|&id| lookup.card_state(id))
        .filter(|state| state.is_learned())
        .count()
}

pub fn due_count<L: CardStateLookup + ?Sized>(
    candidates: &[ItemId],
    lookup: &L,
    now: DateTime<Utc>,
) -> usize {
    candidates
        .iter()
        .filter_map(|&id| lookup.card_state(id))
        .filter(|state| state.is_due(now))
        .count()
}

/// Progress of a list, group or module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub total: usize,
    pub learned: usize,
    pub due: usize,
}

/// Learned and due counts in one pass.
pub fn progress<L: CardStateLookup + ?Sized>(
    candidates: &[ItemId],
    lookup: &L,
    now: DateTime<Utc>,
) -> Progress {
    let mut progress = Progress {
        total: candidates.len(),
        ..Progress::default()
    };
    for state in candidates.iter().filter_map(|&id| lookup.card_state(id)) {
        if state.is_learned() {
            progress.learned += 1;
            if state.next_review <= now {
                progress.due += 1;
            }
        }
    }
    progress
}
