//! Review session operations over the storage traits.

use crate::algorithm::{SchedulingResult, SpacedRepetitionAlgorithm};
use crate::algorithm::sm2::Sm2;
use crate::due::{select_due_limited, CardStateLookup};
use crate::stats::{classify_event, current_streak, study_day};
use crate::store::{CardStateStore, DailyStatsStore};
use crate::types::{CardState, DailyStats, ItemId, Quality, StatKind};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// What a recorded review changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewOutcome {
    pub state: CardState,
    pub kind: StatKind,
    pub study_day: NaiveDate,
}

impl ReviewOutcome {
    pub fn was_first_review(&self) -> bool {
        self.kind == StatKind::Learned
    }
}

/// Schedule one review, persist the new state and bump the day's counter.
pub fn record_review<S, E>(
    store: &mut S,
    item_id: ItemId,
    quality: Quality,
    now: DateTime<Utc>,
    reset_hour: u32,
) -> Result<ReviewOutcome, E>
where
    S: CardStateStore<Error = E> + DailyStatsStore<Error = E>,
{
    record_review_with(&Sm2::default(), store, item_id, quality, now, reset_hour)
}

/// [`record_review`] with an explicit algorithm.
pub fn record_review_with<A, S, E>(
    algorithm: &A,
    store: &mut S,
    item_id: ItemId,
    quality: Quality,
    now: DateTime<Utc>,
    reset_hour: u32,
) -> Result<ReviewOutcome, E>
where
    A: SpacedRepetitionAlgorithm + ?Sized,
    S: CardStateStore<Error = E> + DailyStatsStore<Error = E>,
{
    let prior = CardStateStore::get(store, item_id)?;
    let SchedulingResult {
        new_state,
        was_first_review,
        ..
    } = algorithm.schedule(prior.as_ref(), item_id, quality, now);

    CardStateStore::put(store, new_state.clone())?;

    let kind = classify_event(was_first_review);
    let day = increment_today(store, kind, now, reset_hour)?;

    Ok(ReviewOutcome {
        state: new_state,
        kind,
        study_day: day.date,
    })
}

/// Increment one of today's counters, creating the day if needed.
pub fn increment_today<S: DailyStatsStore + ?Sized>(
    store: &mut S,
    kind: StatKind,
    now: DateTime<Utc>,
    reset_hour: u32,
) -> Result<DailyStats, S::Error> {
    let today = study_day(now, reset_hour);
    let mut stats = store.get(today)?.unwrap_or_else(|| DailyStats::new(today));
    stats.record(kind);
    store.put(stats.clone())?;
    Ok(stats)
}

/// Current streak in days.
pub fn streak<S: DailyStatsStore + ?Sized>(
    store: &S,
    now: DateTime<Utc>,
    reset_hour: u32,
) -> Result<u32, S::Error> {
    let records = store.get_all()?;
    Ok(current_streak(&records, study_day(now, reset_hour)))
}

/// Due items among `candidates`, most overdue first, at most `limit`.
pub fn due_queue<L: CardStateLookup + ?Sized>(
    lookup: &L,
    candidates: &[ItemId],
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<ItemId> {
    select_due_limited(candidates, lookup, now, limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::{Duration, TimeZone};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 2, 10, 0, 0).unwrap()
    }

    #[test]
    fn first_review_counts_as_learned() {
        let mut store = MemoryStore::new();
        let outcome = record_review(&mut store, 11, Quality::Easy, start(), 0).unwrap();
        assert!(outcome.was_first_review());
        assert_eq!(outcome.state.repetitions, 1);

        let day = DailyStatsStore::get(&store, start().date_naive())
            .unwrap()
            .unwrap();
        assert_eq!((day.learned, day.reviewed), (1, 0));
    }

    #[test]
    fn later_reviews_count_as_reviewed_even_after_forgetting() {
        let mut store = MemoryStore::new();
        record_review(&mut store, 11, Quality::Forgot, start(), 0).unwrap();
        let second =
            record_review(&mut store, 11, Quality::Hard, start() + Duration::minutes(2), 0).unwrap();
        assert_eq!(second.kind, StatKind::Reviewed);
        assert_eq!(second.state.repetitions, 1);

        let day = DailyStatsStore::get(&store, start().date_naive())
            .unwrap()
            .unwrap();
        assert_eq!((day.learned, day.reviewed), (1, 1));
    }

    #[test]
    fn persisted_state_matches_outcome() {
        let mut store = MemoryStore::new();
        let outcome = record_review(&mut store, 4, Quality::Easy, start(), 0).unwrap();
        assert_eq!(CardStateStore::get(&store, 4).unwrap(), Some(outcome.state));
    }

    #[test]
    fn reviews_before_reset_hour_count_for_previous_day() {
        let mut store = MemoryStore::new();
        let late_night = Utc.with_ymd_and_hms(2024, 9, 3, 2, 0, 0).unwrap();
        let outcome = record_review(&mut store, 1, Quality::Easy, late_night, 4).unwrap();
        assert_eq!(outcome.study_day, NaiveDate::from_ymd_opt(2024, 9, 2).unwrap());
    }

    #[test]
    fn streak_over_consecutive_days() {
        let mut store = MemoryStore::new();
        for (offset, item) in [(0, 1), (1, 2), (2, 3)] {
            let at = start() + Duration::days(offset);
            record_review(&mut store, item, Quality::Easy, at, 0).unwrap();
        }
        let day_after = start() + Duration::days(3);
        assert_eq!(streak(&store, day_after, 0).unwrap(), 3);
        assert_eq!(streak(&store, day_after + Duration::days(1), 0).unwrap(), 0);
    }

    #[test]
    fn due_queue_follows_schedule() {
        let mut store = MemoryStore::new();
        for item in 1..=3 {
            record_review(&mut store, item, Quality::Easy, start() + Duration::minutes(item), 0)
                .unwrap();
        }
        record_review(&mut store, 4, Quality::Forgot, start(), 0).unwrap();

        let candidates = [1, 2, 3, 4, 5];
        assert!(due_queue(&store, &candidates, start() + Duration::hours(1), 50).is_empty());

        let tomorrow = start() + Duration::days(2);
        assert_eq!(due_queue(&store, &candidates, tomorrow, 50), vec![1, 2, 3]);
        assert_eq!(due_queue(&store, &candidates, tomorrow, 2), vec![1, 2]);
    }
}
