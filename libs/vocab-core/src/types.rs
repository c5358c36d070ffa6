//! Core types for the vocabulary trainer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Stable external identifier of a learned unit (a word).
pub type ItemId = i64;

/// Ease factor given to an item on its first review.
pub const INITIAL_EASE_FACTOR: f64 = 2.5;

/// Hard floor for the ease factor.
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Rating for a review.
///
/// Mirrors the classic SM-2 0-5 scale but only the three values the
/// "forgot / hard / easy" buttons produce exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    Forgot,
    Hard,
    Easy,
}

impl Quality {
    /// Numeric value on the SM-2 scale (0, 3 or 5).
    pub fn value(self) -> u8 {
        match self {
            Self::Forgot => 0,
            Self::Hard => 3,
            Self::Easy => 5,
        }
    }

    /// Create from a numeric SM-2 value. Anything outside {0, 3, 5} is rejected.
    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Forgot),
            3 => Some(Self::Hard),
            5 => Some(Self::Easy),
            _ => None,
        }
    }
}

/// Scheduling state of one learned item.
///
/// Created lazily on the first review of an item; never exists before that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardState {
    pub item_id: ItemId,
    pub ease_factor: f64,
    /// Days until the next review. Fractions represent sub-day intervals.
    pub interval_days: f64,
    pub repetitions: u32,
    pub next_review: DateTime<Utc>,
    pub last_review: DateTime<Utc>,
}

impl CardState {
    /// Whether the item has been successfully learned at least once since its last lapse.
    pub fn is_learned(&self) -> bool {
        self.repetitions > 0
    }

    /// Whether the item is due at `now`. Unlearned items are never due.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.is_learned() && self.next_review <= now
    }
}

/// Which daily counter a review event increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    Learned,
    Reviewed,
}

impl StatKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Learned => "learned",
            Self::Reviewed => "reviewed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "learned" => Some(Self::Learned),
            "reviewed" => Some(Self::Reviewed),
            _ => None,
        }
    }
}

/// Per-day activity counters, keyed by study date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStats {
    pub date: NaiveDate,
    pub learned: u32,
    pub reviewed: u32,
}

impl DailyStats {
    /// Empty record for a date.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            learned: 0,
            reviewed: 0,
        }
    }

    pub fn total(&self) -> u32 {
        self.learned + self.reviewed
    }

    /// Increment one counter.
    pub fn record(&mut self, kind: StatKind) {
        match kind {
            StatKind::Learned => self.learned += 1,
            StatKind::Reviewed => self.reviewed += 1,
        }
    }

    /// `YYYY-MM-DD` key used by stores.
    pub fn date_key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

/// Coarse memory stage derived from a card's interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryStage {
    New,
    ShortTerm,
    LongTerm,
    Mature,
    /// Never reviewed, or forgotten on the most recent review.
    Unlearned,
}

impl MemoryStage {
    /// The four stages a learned card can be in, shortest interval first.
    pub const LEARNED: [MemoryStage; 4] = [
        MemoryStage::New,
        MemoryStage::ShortTerm,
        MemoryStage::LongTerm,
        MemoryStage::Mature,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::ShortTerm => "short",
            Self::LongTerm => "long",
            Self::Mature => "mature",
            Self::Unlearned => "unlearned",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(Self::New),
            "short" => Some(Self::ShortTerm),
            "long" => Some(Self::LongTerm),
            "mature" => Some(Self::Mature),
            "unlearned" => Some(Self::Unlearned),
            _ => None,
        }
    }
}

/// Pronunciation accent preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Accent {
    #[serde(rename = "en-US")]
    American,
    #[serde(rename = "en-GB")]
    British,
}

impl Default for Accent {
    fn default() -> Self {
        Self::American
    }
}

impl Accent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::American => "en-US",
            Self::British => "en-GB",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "en-US" => Some(Self::American),
            "en-GB" => Some(Self::British),
            _ => None,
        }
    }
}

/// Learner preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    pub accent: Accent,
    pub daily_goal: u32,
    pub auto_play_audio: bool,
    /// Words per list.
    pub list_size: usize,
    /// Words per learning group inside a list.
    pub group_size: usize,
    /// Hour (0-23, UTC) at which a new study day begins.
    pub daily_reset_hour: u32,
    /// Maximum number of due words fetched for one review session.
    pub review_session_limit: usize,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            accent: Accent::default(),
            daily_goal: 20,
            auto_play_audio: false,
            list_size: 80,
            group_size: 20,
            daily_reset_hour: 0,
            review_session_limit: 50,
        }
    }
}
