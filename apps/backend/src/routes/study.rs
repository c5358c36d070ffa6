//! Review submission and due queue endpoints

use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Utc;
use vocab_core::{classify_stage, due_count, format_interval, select_due_limited, Quality};

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedDevice;
use crate::services::catalog;
use crate::AppState;

/// POST /api/study/review
pub async fn review(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedDevice>,
    Json(request): Json<SubmitReviewRequest>,
) -> Result<Json<SubmitReviewResponse>> {
    let quality = Quality::from_value(request.quality).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "quality must be 0, 3 or 5, got {}",
            request.quality
        ))
    })?;
    if request.item_id <= 0 {
        return Err(ApiError::BadRequest(format!("Invalid item id {}", request.item_id)));
    }

    if catalog::resolve_words(&state, auth.device_id, &[request.item_id])
        .await?
        .is_empty()
    {
        return Err(ApiError::NotFound(format!("Word {}", request.item_id)));
    }

    let settings = state.db.get_settings(auth.device_id).await?;
    let recorded = state
        .db
        .record_review(
            auth.device_id,
            request.item_id,
            quality,
            Utc::now(),
            settings.daily_reset_hour,
        )
        .await?;

    let outcome = recorded.outcome;
    Ok(Json(SubmitReviewResponse {
        stage: classify_stage(&outcome.state),
        kind: outcome.kind,
        was_first_review: outcome.was_first_review(),
        next_review_in: format_interval(outcome.state.interval_days),
        state: outcome.state,
        today: recorded.today,
    }))
}

/// GET /api/study/due?category=&module=&limit=
///
/// Without a scope, every reviewed word of the device is a candidate.
pub async fn due(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedDevice>,
    Query(query): Query<DueQuery>,
) -> Result<Json<DueResponse>> {
    let settings = state.db.get_settings(auth.device_id).await?;
    let limit = query.limit.unwrap_or(settings.review_session_limit);

    let (candidates, states) = match (query.category.as_deref(), query.module) {
        (Some(_), Some(_)) => {
            return Err(ApiError::BadRequest(
                "Pass either category or module, not both".to_string(),
            ))
        }
        (Some(tag), None) => {
            let corpus = catalog::category_corpus(&state, tag).await?;
            let states = state.db.get_card_states(auth.device_id, corpus.ids()).await?;
            (corpus.ids().to_vec(), states)
        }
        (None, Some(module_id)) => {
            let module = catalog::owned_module(&state, auth.device_id, module_id).await?;
            let corpus = catalog::module_corpus(&state, &module).await?;
            let states = state.db.get_card_states(auth.device_id, corpus.ids()).await?;
            (corpus.ids().to_vec(), states)
        }
        (None, None) => {
            let states: HashMap<ItemId, CardState> = state
                .db
                .get_all_card_states(auth.device_id)
                .await?
                .into_iter()
                .map(|s| (s.item_id, s))
                .collect();
            (states.keys().copied().collect(), states)
        }
    };

    let now = Utc::now();
    let due_ids = select_due_limited(&candidates, &states, now, limit);
    let words = catalog::resolve_words(&state, auth.device_id, &due_ids).await?;

    Ok(Json(DueResponse {
        total_due: due_count(&candidates, &states, now),
        words: catalog::attach_states(words, &states),
    }))
}
