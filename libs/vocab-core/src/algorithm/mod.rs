//! Spaced repetition scheduling.

pub mod sm2;

use crate::types::{CardState, ItemId, Quality};
use chrono::{DateTime, Duration, Utc};

/// Result of scheduling an item after a review.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulingResult {
    pub new_state: CardState,
    pub next_due: DateTime<Utc>,
    /// True when no prior state existed, i.e. this was the item's first-ever review.
    pub was_first_review: bool,
}

/// Trait for spaced repetition algorithms.
pub trait SpacedRepetitionAlgorithm: Send + Sync {
    /// Algorithm identifier.
    fn name(&self) -> &'static str;

    /// State an item starts from before its first review.
    fn initial_state(&self, item_id: ItemId, now: DateTime<Utc>) -> CardState;

    /// Calculate the next state after a review. `prior` is `None` on the first review.
    ///
    /// Never mutates its input; callers persist `new_state`.
    fn schedule(
        &self,
        prior: Option<&CardState>,
        item_id: ItemId,
        quality: Quality,
        now: DateTime<Utc>,
    ) -> SchedulingResult;
}

/// Default state for an item that is about to be reviewed for the first time.
pub fn compute_initial_state(item_id: ItemId, now: DateTime<Utc>) -> CardState {
    sm2::Sm2::default().initial_state(item_id, now)
}

/// Apply one review with the default SM-2 parameters.
pub fn apply_review(
    prior: Option<&CardState>,
    item_id: ItemId,
    quality: Quality,
    now: DateTime<Utc>,
) -> SchedulingResult {
    sm2::Sm2::default().schedule(prior, item_id, quality, now)
}

/// Convert a fractional day count into a duration with millisecond precision.
pub fn days_to_duration(days: f64) -> Duration {
    Duration::milliseconds((days * 86_400_000.0).round() as i64)
}

/// Fractional days elapsed between two instants (negative if `to` is earlier).
pub fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    to.signed_duration_since(from).num_milliseconds() as f64 / 86_400_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn duration_conversions_agree() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = start + days_to_duration(1.5);
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap());
        assert_eq!(days_between(start, end), 1.5);
        assert_eq!(days_between(end, start), -1.5);
    }

    #[test]
    fn one_minute_interval_is_sixty_seconds() {
        assert_eq!(days_to_duration(1.0 / 1440.0), Duration::seconds(60));
    }
}
