//! Database models and API types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub use crate::corpus::{CategoryInfo, Word};
pub use vocab_core::{
    Accent, CardState, CurvePoint, DailyStats, ItemId, MemoryStage, ModuleLayout, Progress,
    ReviewOutcome, StageSummary, StatKind, UserSettings,
};

// === Database Entity Types ===

/// Device registration info
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Device {
    pub id: Uuid,
    pub token: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

/// Card state in PostgreSQL
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbCardState {
    pub device_id: Uuid,
    pub item_id: i64,
    pub ease_factor: f64,
    pub interval_days: f64,
    pub repetitions: i32,
    pub next_review: DateTime<Utc>,
    pub last_review: DateTime<Utc>,
}

impl DbCardState {
    /// Convert to vocab-core CardState
    pub fn to_core_state(&self) -> CardState {
        CardState {
            item_id: self.item_id,
            ease_factor: self.ease_factor,
            interval_days: self.interval_days,
            repetitions: self.repetitions.max(0) as u32,
            next_review: self.next_review,
            last_review: self.last_review,
        }
    }
}

/// Daily counters in PostgreSQL
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbDailyStats {
    pub study_date: NaiveDate,
    pub learned: i32,
    pub reviewed: i32,
}

impl DbDailyStats {
    pub fn to_core_stats(&self) -> DailyStats {
        DailyStats {
            date: self.study_date,
            learned: self.learned.max(0) as u32,
            reviewed: self.reviewed.max(0) as u32,
        }
    }
}

/// Learner settings in PostgreSQL
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbUserSettings {
    pub device_id: Uuid,
    pub accent: String,
    pub daily_goal: i32,
    pub auto_play_audio: bool,
    pub list_size: i32,
    pub group_size: i32,
    pub daily_reset_hour: i32,
    pub review_session_limit: i32,
    pub updated_at: DateTime<Utc>,
}

impl DbUserSettings {
    /// Convert to API UserSettings
    pub fn to_api_settings(&self) -> UserSettings {
        UserSettings {
            accent: Accent::parse(&self.accent).unwrap_or_default(),
            daily_goal: self.daily_goal.max(0) as u32,
            auto_play_audio: self.auto_play_audio,
            list_size: self.list_size.max(1) as usize,
            group_size: self.group_size.max(1) as usize,
            daily_reset_hour: self.daily_reset_hour.clamp(0, 23) as u32,
            review_session_limit: self.review_session_limit.max(1) as usize,
        }
    }
}

/// Learner-made module
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbCustomModule {
    pub id: Uuid,
    pub device_id: Uuid,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub list_size: i32,
    pub group_size: i32,
    pub word_count: i32,
    pub content_hash: String,
    pub created_at: DateTime<Utc>,
}

impl DbCustomModule {
    pub fn layout(&self) -> ModuleLayout {
        ModuleLayout::new(self.list_size.max(0) as usize, self.group_size.max(0) as usize)
    }

    /// Key of this module in the partition cache
    pub fn cache_key(&self) -> String {
        module_cache_key(self.id)
    }

    pub fn to_api_module(&self) -> CustomModule {
        let layout = self.layout();
        CustomModule {
            id: self.id,
            name: self.name.clone(),
            icon: self.icon.clone(),
            color: self.color.clone(),
            list_size: layout.list_size,
            group_size: layout.group_size,
            word_count: self.word_count.max(0) as usize,
            list_count: vocab_core::list_count(self.word_count.max(0) as usize, layout.list_size),
            created_at: self.created_at,
        }
    }
}

pub fn module_cache_key(module_id: Uuid) -> String {
    format!("module:{module_id}")
}

/// Word of a learner-made module
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbCustomWord {
    pub item_id: i64,
    pub module_id: Uuid,
    pub word_index: i32,
    pub word: String,
    pub phonetic: Option<String>,
    pub translation: String,
}

impl DbCustomWord {
    pub fn to_word(&self) -> Word {
        Word {
            id: self.item_id,
            word: self.word.clone(),
            phonetic: self.phonetic.clone(),
            translation: Some(self.translation.clone()).filter(|t| !t.is_empty()),
            definition: None,
            pos: None,
            collins: None,
            oxford: None,
            bnc: None,
            frq: None,
            exchange: None,
            tags: None,
        }
    }
}

/// A review applied inside one transaction
#[derive(Debug, Clone)]
pub struct RecordedReview {
    pub outcome: ReviewOutcome,
    pub today: DailyStats,
}

// === API Request/Response Types ===

#[derive(Debug, Serialize, Deserialize)]
pub struct DeviceRegisterRequest {
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeviceRegisterResponse {
    pub device_id: Uuid,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeviceStatusResponse {
    pub device_id: Uuid,
    pub name: Option<String>,
    pub last_seen_at: DateTime<Utc>,
}

/// Word together with the learner's scheduling state, if any
#[derive(Debug, Clone, Serialize)]
pub struct StudyWord {
    #[serde(flatten)]
    pub word: Word,
    pub state: Option<CardState>,
    pub stage: Option<MemoryStage>,
}

// Categories

#[derive(Debug, Serialize)]
pub struct CategorySummary {
    #[serde(flatten)]
    pub info: CategoryInfo,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct CategoryListResponse {
    pub categories: Vec<CategorySummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListSummary {
    pub index: usize,
    pub group_count: usize,
    #[serde(flatten)]
    pub progress: Progress,
}

/// Lists of a category or module
#[derive(Debug, Serialize)]
pub struct ListsResponse {
    pub scope: String,
    pub total_words: usize,
    pub list_size: usize,
    pub group_size: usize,
    pub list_count: usize,
    pub lists: Vec<ListSummary>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub scope: String,
    pub list_index: usize,
    pub group_count: usize,
    pub progress: Progress,
    pub words: Vec<StudyWord>,
}

#[derive(Debug, Serialize)]
pub struct GroupResponse {
    pub scope: String,
    pub list_index: usize,
    pub group_index: usize,
    pub words: Vec<StudyWord>,
}

// Words

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub words: Vec<StudyWord>,
}

// Study

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitReviewRequest {
    pub item_id: i64,
    /// 0 = forgot, 3 = hard, 5 = easy
    pub quality: u8,
}

#[derive(Debug, Serialize)]
pub struct SubmitReviewResponse {
    pub state: CardState,
    pub stage: MemoryStage,
    pub kind: StatKind,
    pub was_first_review: bool,
    pub next_review_in: String,
    pub today: DailyStats,
}

#[derive(Debug, Deserialize)]
pub struct DueQuery {
    pub category: Option<String>,
    pub module: Option<Uuid>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct DueResponse {
    pub total_due: usize,
    pub words: Vec<StudyWord>,
}

// Dashboard and stats

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub today: DailyStats,
    pub daily_goal: u32,
    pub streak: u32,
    pub summary: StageSummary,
    pub recent: Vec<DayEntry>,
    pub forgetting_curve: Vec<CurvePoint>,
}

#[derive(Debug, Serialize)]
pub struct StageWordsResponse {
    pub stage: MemoryStage,
    pub words: Vec<StudyWord>,
}

#[derive(Debug, Serialize)]
pub struct TodayWordsResponse {
    pub kind: StatKind,
    pub date: NaiveDate,
    pub words: Vec<StudyWord>,
}

#[derive(Debug, Serialize)]
pub struct LearnedWordsResponse {
    pub total: usize,
    pub words: Vec<StudyWord>,
}

/// One day of the trailing window, zero-filled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayEntry {
    pub date: NaiveDate,
    pub learned: u32,
    pub reviewed: u32,
    /// False when nothing was ever recorded for this day
    pub recorded: bool,
}

impl From<&vocab_core::DayRecord> for DayEntry {
    fn from(record: &vocab_core::DayRecord) -> Self {
        let counts = record.counts();
        Self {
            date: record.date,
            learned: counts.learned,
            reviewed: counts.reviewed,
            recorded: record.stats.is_some(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RecentStatsQuery {
    pub days: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct RecentStatsResponse {
    pub days: Vec<DayEntry>,
    pub streak: u32,
}

// Settings

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateSettingsRequest {
    pub accent: Option<Accent>,
    pub daily_goal: Option<u32>,
    pub auto_play_audio: Option<bool>,
    pub list_size: Option<usize>,
    pub group_size: Option<usize>,
    pub daily_reset_hour: Option<u32>,
    pub review_session_limit: Option<usize>,
}

// Custom modules

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateCustomModuleRequest {
    pub name: String,
    /// Plain-text word list, one word per line
    pub text: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub list_size: Option<usize>,
    pub group_size: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomModule {
    pub id: Uuid,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub list_size: usize,
    pub group_size: usize,
    pub word_count: usize,
    pub list_count: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct CustomModuleListResponse {
    pub modules: Vec<CustomModule>,
}

#[derive(Debug, Serialize)]
pub struct CustomModuleResponse {
    #[serde(flatten)]
    pub module: CustomModule,
    pub lists: Vec<ListSummary>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}
