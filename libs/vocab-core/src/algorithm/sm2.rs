//! SM-2 spaced repetition algorithm, three-grade variant.
//!
//! Ratings are forgot (0), hard (3) and easy (5). The ease factor update keeps the
//! classic SuperMemo 2 formula, evaluated with the numeric rating:
//!
//! ```text
//! EF' = max(EF + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02)), 1.3)
//! ```

use super::{days_to_duration, SchedulingResult, SpacedRepetitionAlgorithm};
use crate::types::{CardState, ItemId, Quality, INITIAL_EASE_FACTOR, MIN_EASE_FACTOR};
use chrono::{DateTime, Utc};

/// Intervals below this many days are stored unrounded.
const ROUNDING_THRESHOLD_DAYS: f64 = 0.01;

/// SM-2 algorithm with configurable parameters.
#[derive(Debug, Clone)]
pub struct Sm2 {
    pub initial_ease: f64,
    pub minimum_ease: f64,
    /// Interval after a lapse (one minute).
    pub relearn_interval: f64,
    /// Interval after a first "hard", and the floor for later "hard" answers.
    pub hard_interval: f64,
    pub hard_multiplier: f64,
    /// Interval after a first "easy".
    pub graduating_interval: f64,
    /// Interval after a second consecutive success answered "easy".
    pub second_interval: f64,
}

impl Default for Sm2 {
    fn default() -> Self {
        Self {
            initial_ease: INITIAL_EASE_FACTOR,
            minimum_ease: MIN_EASE_FACTOR,
            relearn_interval: 1.0 / 1440.0,
            hard_interval: 0.5,
            hard_multiplier: 1.2,
            graduating_interval: 1.0,
            second_interval: 3.0,
        }
    }
}

impl SpacedRepetitionAlgorithm for Sm2 {
    fn name(&self) -> &'static str {
        "sm2"
    }

    fn initial_state(&self, item_id: ItemId, now: DateTime<Utc>) -> CardState {
        CardState {
            item_id,
            ease_factor: self.initial_ease,
            interval_days: 0.0,
            repetitions: 0,
            next_review: now,
            last_review: now,
        }
    }

    fn schedule(
        &self,
        prior: Option<&CardState>,
        item_id: ItemId,
        quality: Quality,
        now: DateTime<Utc>,
    ) -> SchedulingResult {
        let was_first_review = prior.is_none();
        let start = match prior {
            Some(state) => state.clone(),
            None => self.initial_state(item_id, now),
        };

        let (interval, repetitions) = self.next_interval(&start, quality);
        let ease_factor = round2(self.next_ease(start.ease_factor, quality));
        let interval_days = round_interval(interval);

        let next_due = now + days_to_duration(interval_days);

        SchedulingResult {
            new_state: CardState {
                item_id: start.item_id,
                ease_factor,
                interval_days,
                repetitions,
                next_review: next_due,
                last_review: now,
            },
            next_due,
            was_first_review,
        }
    }
}

impl Sm2 {
    fn next_interval(&self, state: &CardState, quality: Quality) -> (f64, u32) {
        match quality {
            Quality::Forgot => (self.relearn_interval, 0),
            Quality::Hard => {
                let interval = if state.repetitions == 0 {
                    self.hard_interval
                } else {
                    (state.interval_days * self.hard_multiplier).max(self.hard_interval)
                };
                (interval, state.repetitions + 1)
            }
            Quality::Easy => {
                let interval = match state.repetitions {
                    0 => self.graduating_interval,
                    1 => self.second_interval,
                    _ => state.interval_days * state.ease_factor,
                };
                (interval, state.repetitions + 1)
            }
        }
    }

    fn next_ease(&self, ease_factor: f64, quality: Quality) -> f64 {
        let miss = 5.0 - f64::from(quality.value());
        let ease = ease_factor + (0.1 - miss * (0.08 + miss * 0.02));
        ease.max(self.minimum_ease)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// The one-minute relearning step would round to zero at two decimals.
fn round_interval(days: f64) -> f64 {
    if days < ROUNDING_THRESHOLD_DAYS {
        days
    } else {
        round2(days)
    }
}
