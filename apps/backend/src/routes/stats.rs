//! Daily statistics endpoints

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Utc;
use vocab_core::{current_streak, recent_window, study_day};

use crate::error::Result;
use crate::models::*;
use crate::routes::auth::AuthenticatedDevice;
use crate::AppState;

const DEFAULT_DAYS: u32 = 7;
const MAX_DAYS: u32 = 365;

/// GET /api/stats/recent?days=
/// Zero-filled window ending today, oldest first
pub async fn recent(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedDevice>,
    Query(query): Query<RecentStatsQuery>,
) -> Result<Json<RecentStatsResponse>> {
    let window = query.days.unwrap_or(DEFAULT_DAYS).clamp(1, MAX_DAYS);

    let settings = state.db.get_settings(auth.device_id).await?;
    let days = state.db.get_all_daily_stats(auth.device_id).await?;
    let today = study_day(Utc::now(), settings.daily_reset_hour);

    Ok(Json(RecentStatsResponse {
        days: recent_window(&days, today, window)
            .iter()
            .map(DayEntry::from)
            .collect(),
        streak: current_streak(&days, today),
    }))
}
