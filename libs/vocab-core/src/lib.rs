//! Core vocabulary trainer library shared by the backend and its tests.
//!
//! Provides:
//! - SM-2 scheduler with a forgot / hard / easy rating scale
//! - Deterministic hash-ordered partitioning of word corpora into lists and groups
//! - Due-set selection, memory stages and retention estimates
//! - Daily counters and streaks
//! - Storage traits with in-memory implementations
//! - Plain-text word list import
//!
//! Every function that depends on the current time takes it as an argument.

pub mod algorithm;
pub mod due;
pub mod error;
pub mod format;
pub mod partition;
pub mod review;
pub mod stage;
pub mod stats;
pub mod store;
pub mod types;
pub mod wordlist;

pub use algorithm::sm2::Sm2;
pub use algorithm::{apply_review, compute_initial_state, SchedulingResult, SpacedRepetitionAlgorithm};
pub use due::{
    due_count, learned_count, progress, select_due, select_due_limited, CardStateLookup, Progress,
};
pub use error::{Result, WordListError};
pub use format::format_interval;
pub use partition::{
    group_count, list_count, partition_rank, rank_order, slice_group, slice_list, PartitionCache,
    RankedCorpus, CUSTOM_ITEM_ID_BASE,
};
pub use review::{due_queue, increment_today, record_review, streak, ReviewOutcome};
pub use stage::{
    cards_in_stage, classify_stage, estimate_retention, forgetting_curve, learned_cards,
    learned_on, reviewed_on, CurvePoint, StageSummary,
};
pub use stats::{classify_event, current_streak, recent_window, study_day, DayRecord};
pub use store::{
    CardStateStore, CorpusProvider, DailyStatsStore, ItemRecord, MemoryCorpus, MemoryStore,
};
pub use types::{
    Accent, CardState, DailyStats, ItemId, MemoryStage, Quality, StatKind, UserSettings,
    INITIAL_EASE_FACTOR, MIN_EASE_FACTOR,
};
pub use wordlist::{parse_word_list, ModuleLayout, WordEntry};
