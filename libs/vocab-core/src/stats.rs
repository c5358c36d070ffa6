//! Daily activity counters and streaks.

use crate::types::{DailyStats, StatKind};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The study day `now` falls in. Before `reset_hour` (UTC) it is still the previous day.
pub fn study_day(now: DateTime<Utc>, reset_hour: u32) -> NaiveDate {
    (now - Duration::hours(i64::from(reset_hour.min(23)))).date_naive()
}

/// A first-ever review counts as learned, anything else as reviewed.
pub fn classify_event(was_first_review: bool) -> StatKind {
    if was_first_review {
        StatKind::Learned
    } else {
        StatKind::Reviewed
    }
}

/// Consecutive active days ending today, or ending yesterday when today has no activity yet.
pub fn current_streak<'a, I>(records: I, today: NaiveDate) -> u32
where
    I: IntoIterator<Item = &'a DailyStats>,
{
    let totals: HashMap<NaiveDate, u32> = records
        .into_iter()
        .map(|record| (record.date, record.total()))
        .collect();
    let active = |day: NaiveDate| totals.get(&day).is_some_and(|&total| total > 0);

    let mut day = if active(today) {
        today
    } else {
        match today.pred_opt() {
            Some(yesterday) => yesterday,
            None => return 0,
        }
    };

    let mut streak = 0;
    while active(day) {
        streak += 1;
        match day.pred_opt() {
            Some(previous) => day = previous,
            None => break,
        }
    }
    streak
}

/// One day of a trailing window. `stats` is `None` when nothing was ever recorded that day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRecord {
    pub date: NaiveDate,
    pub stats: Option<DailyStats>,
}

impl DayRecord {
    /// Counters with missing days filled with zeros.
    pub fn counts(&self) -> DailyStats {
        self.stats
            .clone()
            .unwrap_or_else(|| DailyStats::new(self.date))
    }
}

/// `days` consecutive days ending at `today`, oldest first.
pub fn recent_window<'a, I>(records: I, today: NaiveDate, days: u32) -> Vec<DayRecord>
where
    I: IntoIterator<Item = &'a DailyStats>,
{
    let by_date: HashMap<NaiveDate, &DailyStats> =
        records.into_iter().map(|r| (r.date, r)).collect();

    (0..days)
        .rev()
        .filter_map(|back| today.checked_sub_signed(Duration::days(i64::from(back))))
        .map(|date| DayRecord {
            date,
            stats: by_date.get(&date).map(|&s| s.clone()),
        })
        .collect()
}
