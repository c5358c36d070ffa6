//! Memory stages and retention estimates for dashboards.
//!
//! None of this feeds back into scheduling.

use crate::algorithm::days_between;
use crate::stats::study_day;
use crate::types::{CardState, MemoryStage};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound (exclusive) of the "new" stage, in days.
pub const SHORT_TERM_DAYS: f64 = 1.0;
/// Upper bound (exclusive) of the short-term stage.
pub const LONG_TERM_DAYS: f64 = 7.0;
/// Intervals of this many days or more are mature.
pub const MATURE_DAYS: f64 = 30.0;

/// Decay constant of the reference forgetting curve, in days.
const REFERENCE_STABILITY_DAYS: f64 = 7.0;

pub fn classify_stage(state: &CardState) -> MemoryStage {
    if !state.is_learned() {
        return MemoryStage::Unlearned;
    }
    let interval = state.interval_days;
    if interval < SHORT_TERM_DAYS {
        MemoryStage::New
    } else if interval < LONG_TERM_DAYS {
        MemoryStage::ShortTerm
    } else if interval < MATURE_DAYS {
        MemoryStage::LongTerm
    } else {
        MemoryStage::Mature
    }
}

/// Estimated recall probability in percent, treating the interval as stability.
///
/// `exp(-elapsed / (interval * 1.5)) * 100`, and 0 for a non-positive interval.
pub fn estimate_retention(state: &CardState, now: DateTime<Utc>) -> f64 {
    if state.interval_days <= 0.0 {
        return 0.0;
    }
    let elapsed = days_between(state.last_review, now).max(0.0);
    (-elapsed / (state.interval_days * 1.5)).exp() * 100.0
}

/// Per-stage counts and aggregates over a set of card states.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageSummary {
    pub new: usize,
    pub short_term: usize,
    pub long_term: usize,
    pub mature: usize,
    pub total_learned: usize,
    pub due: usize,
    /// Mean retention of learned cards, rounded to a whole percent. 0 with no learned cards.
    pub average_retention: u32,
}

impl StageSummary {
    pub fn from_states<'a, I>(states: I, now: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = &'a CardState>,
    {
        let mut summary = Self::default();
        let mut retention_sum = 0.0;

        for state in states {
            match classify_stage(state) {
                MemoryStage::Unlearned => continue,
                MemoryStage::New => summary.new += 1,
                MemoryStage::ShortTerm => summary.short_term += 1,
                MemoryStage::LongTerm => summary.long_term += 1,
                MemoryStage::Mature => summary.mature += 1,
            }
            summary.total_learned += 1;
            if state.next_review <= now {
                summary.due += 1;
            }
            retention_sum += estimate_retention(state, now);
        }

        if summary.total_learned > 0 {
            summary.average_retention =
                (retention_sum / summary.total_learned as f64).round() as u32;
        }
        summary
    }

    pub fn count(&self, stage: MemoryStage) -> usize {
        match stage {
            MemoryStage::New => self.new,
            MemoryStage::ShortTerm => self.short_term,
            MemoryStage::LongTerm => self.long_term,
            MemoryStage::Mature => self.mature,
            MemoryStage::Unlearned => 0,
        }
    }
}

/// Learned cards of one stage, most recently reviewed first.
pub fn cards_in_stage<'a, I>(states: I, stage: MemoryStage) -> Vec<&'a CardState>
where
    I: IntoIterator<Item = &'a CardState>,
{
    let mut cards: Vec<&CardState> = states
        .into_iter()
        .filter(|s| s.is_learned() && classify_stage(s) == stage)
        .collect();
    sort_recent_first(&mut cards);
    cards
}

/// Every learned card, most recently reviewed first.
pub fn learned_cards<'a, I>(states: I) -> Vec<&'a CardState>
where
    I: IntoIterator<Item = &'a CardState>,
{
    let mut cards: Vec<&CardState> = states.into_iter().filter(|s| s.is_learned()).collect();
    sort_recent_first(&mut cards);
    cards
}

/// Cards first learned on study day `day`: reviewed that day and on their first success.
pub fn learned_on<'a, I>(states: I, day: NaiveDate, reset_hour: u32) -> Vec<&'a CardState>
where
    I: IntoIterator<Item = &'a CardState>,
{
    let mut cards: Vec<&CardState> = states
        .into_iter()
        .filter(|s| study_day(s.last_review, reset_hour) == day && s.repetitions == 1)
        .collect();
    sort_recent_first(&mut cards);
    cards
}

/// Cards reviewed on study day `day` past their first success.
pub fn reviewed_on<'a, I>(states: I, day: NaiveDate, reset_hour: u32) -> Vec<&'a CardState>
where
    I: IntoIterator<Item = &'a CardState>,
{
    let mut cards: Vec<&CardState> = states
        .into_iter()
        .filter(|s| study_day(s.last_review, reset_hour) == day && s.repetitions > 1)
        .collect();
    sort_recent_first(&mut cards);
    cards
}

fn sort_recent_first(cards: &mut [&CardState]) {
    cards.sort_by(|a, b| {
        b.last_review
            .cmp(&a.last_review)
            .then(a.item_id.cmp(&b.item_id))
    });
}

/// A point on the reference forgetting curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub day: u32,
    pub retention: u32,
}

/// Reference curve `round(exp(-d / 7) * 100)` for `d` in `0..=days`.
pub fn forgetting_curve(days: u32) -> Vec<CurvePoint> {
    (0..=days)
        .map(|day| CurvePoint {
            day,
            retention: ((-f64::from(day) / REFERENCE_STABILITY_DAYS).exp() * 100.0).round()
                as u32,
        })
        .collect()
}
