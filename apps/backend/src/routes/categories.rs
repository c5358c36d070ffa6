//! Built-in category endpoints

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::corpus::CATEGORIES;
use crate::error::Result;
use crate::models::*;
use crate::routes::auth::AuthenticatedDevice;
use crate::services::catalog;
use crate::AppState;

/// GET /api/categories
pub async fn list(State(state): State<AppState>) -> Result<Json<CategoryListResponse>> {
    let mut categories = Vec::with_capacity(CATEGORIES.len());
    for info in CATEGORIES {
        let count = match state.partitions.get(info.tag) {
            Some(corpus) => corpus.len(),
            None => {
                catalog::query_corpus(&state, move |corpus| corpus.category_count(info.tag)).await?
            }
        };
        categories.push(CategorySummary { info: *info, count });
    }

    Ok(Json(CategoryListResponse { categories }))
}

/// GET /api/categories/:tag/lists
pub async fn lists(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedDevice>,
    Path(tag): Path<String>,
) -> Result<Json<ListsResponse>> {
    let corpus = catalog::category_corpus(&state, &tag).await?;
    let settings = state.db.get_settings(auth.device_id).await?;

    let response = catalog::lists_overview(
        &state,
        auth.device_id,
        tag,
        &corpus,
        settings.list_size,
        settings.group_size,
    )
    .await?;
    Ok(Json(response))
}

/// GET /api/categories/:tag/lists/:list
pub async fn list_words(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedDevice>,
    Path((tag, list_index)): Path<(String, usize)>,
) -> Result<Json<ListResponse>> {
    let corpus = catalog::category_corpus(&state, &tag).await?;
    let settings = state.db.get_settings(auth.device_id).await?;

    let response = catalog::list_detail(
        &state,
        auth.device_id,
        tag,
        &corpus,
        settings.list_size,
        settings.group_size,
        list_index,
    )
    .await?;
    Ok(Json(response))
}

/// GET /api/categories/:tag/lists/:list/groups/:group
pub async fn group_words(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedDevice>,
    Path((tag, list_index, group_index)): Path<(String, usize, usize)>,
) -> Result<Json<GroupResponse>> {
    let corpus = catalog::category_corpus(&state, &tag).await?;
    let settings = state.db.get_settings(auth.device_id).await?;

    let response = catalog::group_detail(
        &state,
        auth.device_id,
        tag,
        &corpus,
        settings.list_size,
        settings.group_size,
        list_index,
        group_index,
    )
    .await?;
    Ok(Json(response))
}
