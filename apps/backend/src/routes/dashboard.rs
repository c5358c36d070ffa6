//! Learner dashboard endpoints

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;
use vocab_core::{
    cards_in_stage, current_streak, forgetting_curve, learned_cards, learned_on, recent_window,
    reviewed_on, study_day,
};

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedDevice;
use crate::services::catalog;
use crate::AppState;

const RECENT_DAYS: u32 = 14;
const CURVE_DAYS: u32 = 30;

/// GET /api/dashboard
pub async fn overview(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedDevice>,
) -> Result<Json<DashboardResponse>> {
    let settings = state.db.get_settings(auth.device_id).await?;
    let states = state.db.get_all_card_states(auth.device_id).await?;
    let days = state.db.get_all_daily_stats(auth.device_id).await?;

    let now = Utc::now();
    let today = study_day(now, settings.daily_reset_hour);
    let today_stats = days
        .iter()
        .find(|d| d.date == today)
        .cloned()
        .unwrap_or_else(|| DailyStats::new(today));

    Ok(Json(DashboardResponse {
        today: today_stats,
        daily_goal: settings.daily_goal,
        streak: current_streak(&days, today),
        summary: StageSummary::from_states(&states, now),
        recent: recent_window(&days, today, RECENT_DAYS)
            .iter()
            .map(DayEntry::from)
            .collect(),
        forgetting_curve: forgetting_curve(CURVE_DAYS),
    }))
}

/// GET /api/dashboard/stage/:stage
pub async fn stage_words(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedDevice>,
    Path(stage): Path<String>,
) -> Result<Json<StageWordsResponse>> {
    let stage = MemoryStage::parse(&stage)
        .filter(|s| *s != MemoryStage::Unlearned)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown stage {stage}")))?;

    let states = state.db.get_all_card_states(auth.device_id).await?;
    let cards = cards_in_stage(&states, stage);

    Ok(Json(StageWordsResponse {
        stage,
        words: words_for(&state, auth.device_id, &cards).await?,
    }))
}

/// GET /api/dashboard/today/:kind
pub async fn today_words(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedDevice>,
    Path(kind): Path<String>,
) -> Result<Json<TodayWordsResponse>> {
    let kind = StatKind::parse(&kind)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown kind {kind}")))?;

    let settings = state.db.get_settings(auth.device_id).await?;
    let states = state.db.get_all_card_states(auth.device_id).await?;
    let today = study_day(Utc::now(), settings.daily_reset_hour);

    let cards = match kind {
        StatKind::Learned => learned_on(&states, today, settings.daily_reset_hour),
        StatKind::Reviewed => reviewed_on(&states, today, settings.daily_reset_hour),
    };

    Ok(Json(TodayWordsResponse {
        kind,
        date: today,
        words: words_for(&state, auth.device_id, &cards).await?,
    }))
}

/// GET /api/dashboard/learned
pub async fn learned_words(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedDevice>,
) -> Result<Json<LearnedWordsResponse>> {
    let states = state.db.get_all_card_states(auth.device_id).await?;
    let cards = learned_cards(&states);

    Ok(Json(LearnedWordsResponse {
        total: cards.len(),
        words: words_for(&state, auth.device_id, &cards).await?,
    }))
}

/// Words of `cards`, keeping their order
async fn words_for(state: &AppState, device_id: Uuid, cards: &[&CardState]) -> Result<Vec<StudyWord>> {
    let ids: Vec<ItemId> = cards.iter().map(|c| c.item_id).collect();
    let by_id: HashMap<ItemId, CardState> =
        cards.iter().map(|&c| (c.item_id, c.clone())).collect();

    let words = catalog::resolve_words(state, device_id, &ids).await?;
    Ok(catalog::attach_states(words, &by_id))
}
