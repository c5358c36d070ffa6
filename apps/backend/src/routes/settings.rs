//! Settings endpoints

use axum::{extract::State, Extension, Json};

use crate::db::to_int_column;
use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedDevice;
use crate::AppState;

/// GET /api/settings
pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedDevice>,
) -> Result<Json<UserSettings>> {
    Ok(Json(state.db.get_settings(auth.device_id).await?))
}

/// PUT /api/settings
/// Omitted fields keep their current value
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedDevice>,
    Json(request): Json<UpdateSettingsRequest>,
) -> Result<Json<UserSettings>> {
    let current = state.db.get_settings(auth.device_id).await?;
    let updated = apply_update(current, request)?;

    let saved = state.db.update_settings(auth.device_id, &updated).await?;
    Ok(Json(saved))
}

fn apply_update(mut current: UserSettings, request: UpdateSettingsRequest) -> Result<UserSettings> {
    if let Some(accent) = request.accent {
        current.accent = accent;
    }
    if let Some(daily_goal) = request.daily_goal {
        to_int_column(daily_goal, "daily_goal")?;
        current.daily_goal = daily_goal;
    }
    if let Some(auto_play_audio) = request.auto_play_audio {
        current.auto_play_audio = auto_play_audio;
    }
    if let Some(list_size) = request.list_size {
        if list_size == 0 {
            return Err(ApiError::BadRequest("list_size must be at least 1".to_string()));
        }
        to_int_column(list_size, "list_size")?;
        current.list_size = list_size;
    }
    if let Some(group_size) = request.group_size {
        if group_size == 0 {
            return Err(ApiError::BadRequest("group_size must be at least 1".to_string()));
        }
        to_int_column(group_size, "group_size")?;
        current.group_size = group_size;
    }
    if let Some(hour) = request.daily_reset_hour {
        if hour > 23 {
            return Err(ApiError::BadRequest("daily_reset_hour must be 0-23".to_string()));
        }
        current.daily_reset_hour = hour;
    }
    if let Some(limit) = request.review_session_limit {
        if limit == 0 {
            return Err(ApiError::BadRequest(
                "review_session_limit must be at least 1".to_string(),
            ));
        }
        to_int_column(limit, "review_session_limit")?;
        current.review_session_limit = limit;
    }
    Ok(current)
}
