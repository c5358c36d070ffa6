//! Learner-made module endpoints

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use sha2::{Digest, Sha256};
use uuid::Uuid;
use vocab_core::parse_word_list;

use crate::db::NewCustomModule;
use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedDevice;
use crate::services::catalog;
use crate::AppState;

const DEFAULT_ICON: &str = "📝";
const DEFAULT_COLOR: &str = "from-blue-500 to-cyan-600";
const MAX_NAME_LEN: usize = 100;

/// POST /api/custom-modules
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedDevice>,
    Json(request): Json<CreateCustomModuleRequest>,
) -> Result<Json<CustomModuleResponse>> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Module name must not be empty".to_string()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ApiError::BadRequest(format!(
            "Module name is longer than {MAX_NAME_LEN} characters"
        )));
    }

    let entries = parse_word_list(&request.text)?;
    let defaults = ModuleLayout::default();
    let layout = ModuleLayout::new(
        request.list_size.unwrap_or(defaults.list_size),
        request.group_size.unwrap_or(defaults.group_size),
    );
    let content_hash = hash_content(&request.text);
    if let Some(existing) = state
        .db
        .find_custom_module_by_hash(auth.device_id, &content_hash)
        .await?
    {
        return Err(ApiError::BadRequest(format!(
            "Module \"{}\" already has the same word list",
            existing.name
        )));
    }

    let module = state
        .db
        .create_custom_module(
            auth.device_id,
            NewCustomModule {
                name,
                icon: non_blank(request.icon.as_deref()).unwrap_or(DEFAULT_ICON),
                color: non_blank(request.color.as_deref()).unwrap_or(DEFAULT_COLOR),
                layout,
                entries: &entries,
                content_hash: &content_hash,
            },
        )
        .await?;

    tracing::info!(
        "Device {} created module {} with {} words",
        auth.device_id,
        module.id,
        entries.len()
    );

    module_response(&state, auth.device_id, &module).await.map(Json)
}

/// GET /api/custom-modules
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedDevice>,
) -> Result<Json<CustomModuleListResponse>> {
    let modules = state.db.list_custom_modules(auth.device_id).await?;

    Ok(Json(CustomModuleListResponse {
        modules: modules.iter().map(DbCustomModule::to_api_module).collect(),
    }))
}

/// GET /api/custom-modules/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedDevice>,
    Path(module_id): Path<Uuid>,
) -> Result<Json<CustomModuleResponse>> {
    let module = catalog::owned_module(&state, auth.device_id, module_id).await?;
    module_response(&state, auth.device_id, &module).await.map(Json)
}

/// DELETE /api/custom-modules/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedDevice>,
    Path(module_id): Path<Uuid>,
) -> Result<Json<DeleteResponse>> {
    let deleted = state.db.delete_custom_module(auth.device_id, module_id).await?;
    if !deleted {
        return Err(ApiError::NotFound(format!("Module {module_id}")));
    }

    state.partitions.invalidate(&module_cache_key(module_id));
    tracing::info!("Device {} deleted module {}", auth.device_id, module_id);

    Ok(Json(DeleteResponse { deleted }))
}

/// GET /api/custom-modules/:id/lists/:list
pub async fn list_words(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedDevice>,
    Path((module_id, list_index)): Path<(Uuid, usize)>,
) -> Result<Json<ListResponse>> {
    let module = catalog::owned_module(&state, auth.device_id, module_id).await?;
    let corpus = catalog::module_corpus(&state, &module).await?;
    let layout = module.layout();

    let response = catalog::list_detail(
        &state,
        auth.device_id,
        module.cache_key(),
        &corpus,
        layout.list_size,
        layout.group_size,
        list_index,
    )
    .await?;
    Ok(Json(response))
}

/// GET /api/custom-modules/:id/lists/:list/groups/:group
pub async fn group_words(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedDevice>,
    Path((module_id, list_index, group_index)): Path<(Uuid, usize, usize)>,
) -> Result<Json<GroupResponse>> {
    let module = catalog::owned_module(&state, auth.device_id, module_id).await?;
    let corpus = catalog::module_corpus(&state, &module).await?;
    let layout = module.layout();

    let response = catalog::group_detail(
        &state,
        auth.device_id,
        module.cache_key(),
        &corpus,
        layout.list_size,
        layout.group_size,
        list_index,
        group_index,
    )
    .await?;
    Ok(Json(response))
}

async fn module_response(
    state: &AppState,
    device_id: Uuid,
    module: &DbCustomModule,
) -> Result<CustomModuleResponse> {
    let corpus = catalog::module_corpus(state, module).await?;
    let layout = module.layout();
    let overview = catalog::lists_overview(
        state,
        device_id,
        module.cache_key(),
        &corpus,
        layout.list_size,
        layout.group_size,
    )
    .await?;

    Ok(CustomModuleResponse {
        module: module.to_api_module(),
        lists: overview.lists,
    })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// SHA256 of the uploaded word list, hex encoded
fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_content_is_stable() {
        let hash = hash_content("apple\t苹果\nbanana\t香蕉");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_content("apple\t苹果\nbanana\t香蕉"));
        assert_ne!(hash, hash_content("apple\t苹果"));
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  🍎 ")), Some("🍎"));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }
}
