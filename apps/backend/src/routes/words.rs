//! Word search endpoint

use axum::{
    extract::{Query, State},
    Extension, Json,
};

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedDevice;
use crate::services::catalog;
use crate::AppState;

const DEFAULT_SEARCH_LIMIT: usize = 20;
const MAX_SEARCH_LIMIT: usize = 100;

/// GET /api/words/search?q=&limit=
pub async fn search(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedDevice>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>> {
    let prefix = query.q.trim();
    if prefix.is_empty() {
        return Err(ApiError::BadRequest("Search query must not be empty".to_string()));
    }
    let limit = query
        .limit
        .unwrap_or(DEFAULT_SEARCH_LIMIT)
        .clamp(1, MAX_SEARCH_LIMIT);

    let prefix = prefix.to_string();
    let words = catalog::query_corpus(&state, move |corpus| corpus.search(&prefix, limit)).await?;
    let ids: Vec<ItemId> = words.iter().map(|w| w.id).collect();
    let states = state.db.get_card_states(auth.device_id, &ids).await?;

    Ok(Json(SearchResponse {
        words: catalog::attach_states(words, &states),
    }))
}
