//! Lists, groups and word lookup over the corpus and learner-made modules

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;
use vocab_core::{classify_stage, progress, RankedCorpus, CUSTOM_ITEM_ID_BASE};

use crate::corpus::{find_category, SqliteCorpus};
use crate::error::{ApiError, Result};
use crate::models::*;
use crate::AppState;

/// Run a query against the SQLite corpus on the blocking thread pool
pub async fn query_corpus<T, F>(state: &AppState, query: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&SqliteCorpus) -> rusqlite::Result<T> + Send + 'static,
{
    let corpus = Arc::clone(&state.corpus);
    let result = tokio::task::spawn_blocking(move || query(&corpus))
        .await
        .map_err(|e| ApiError::Internal(format!("Corpus query task failed: {e}")))?;
    Ok(result?)
}

/// Ranked corpus of a category, loaded on first use
pub async fn category_corpus(state: &AppState, tag: &str) -> Result<Arc<RankedCorpus>> {
    let category =
        find_category(tag).ok_or_else(|| ApiError::NotFound(format!("Category {tag}")))?;
    if let Some(hit) = state.partitions.get(category.tag) {
        return Ok(hit);
    }

    let ids = query_corpus(state, move |corpus| corpus.category_item_ids(category.tag)).await?;
    state.partitions.get_or_load(category.tag, || -> Result<RankedCorpus> {
        tracing::info!("Ranked {} words for category {}", ids.len(), category.tag);
        Ok(RankedCorpus::new(ids))
    })
}

/// Ranked words of a module, loaded on first use
pub async fn module_corpus(state: &AppState, module: &DbCustomModule) -> Result<Arc<RankedCorpus>> {
    let key = module.cache_key();
    if let Some(hit) = state.partitions.get(&key) {
        return Ok(hit);
    }

    let positions = state.db.get_custom_word_positions(module.id).await?;
    state
        .partitions
        .get_or_load(&key, || -> Result<RankedCorpus> {
            Ok(RankedCorpus::ranked_by_position(positions))
        })
}

/// Fetch a module owned by the device or fail with not found
pub async fn owned_module(state: &AppState, device_id: Uuid, module_id: Uuid) -> Result<DbCustomModule> {
    state
        .db
        .get_custom_module(device_id, module_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Module {module_id}")))
}

/// Words for `ids` in the order given, from the corpus or the device's modules
pub async fn resolve_words(state: &AppState, device_id: Uuid, ids: &[ItemId]) -> Result<Vec<Word>> {
    let (custom_ids, corpus_ids): (Vec<ItemId>, Vec<ItemId>) = ids
        .iter()
        .copied()
        .partition(|&id| id >= CUSTOM_ITEM_ID_BASE);

    let mut found: HashMap<ItemId, Word> = HashMap::with_capacity(ids.len());
    let corpus_words = query_corpus(state, move |corpus| corpus.words_by_ids(&corpus_ids)).await?;
    for word in corpus_words {
        found.insert(word.id, word);
    }
    for word in state.db.get_custom_words(device_id, &custom_ids).await? {
        found.insert(word.id, word);
    }

    Ok(ids.iter().filter_map(|id| found.remove(id)).collect())
}

/// Attach scheduling state and stage to each word
pub fn attach_states(words: Vec<Word>, states: &HashMap<ItemId, CardState>) -> Vec<StudyWord> {
    words
        .into_iter()
        .map(|word| {
            let state = states.get(&word.id).cloned();
            let stage = state.as_ref().map(classify_stage);
            StudyWord { word, state, stage }
        })
        .collect()
}

/// Words with their states, in the order of `ids`
pub async fn study_words(state: &AppState, device_id: Uuid, ids: &[ItemId]) -> Result<Vec<StudyWord>> {
    let words = resolve_words(state, device_id, ids).await?;
    let states = state.db.get_card_states(device_id, ids).await?;
    Ok(attach_states(words, &states))
}

/// Progress of every list of a ranked corpus
pub fn list_summaries(
    corpus: &RankedCorpus,
    list_size: usize,
    group_size: usize,
    states: &HashMap<ItemId, CardState>,
    now: DateTime<Utc>,
) -> Vec<ListSummary> {
    corpus
        .lists(list_size)
        .enumerate()
        .map(|(index, ids)| ListSummary {
            index,
            group_count: vocab_core::group_count(ids.len(), group_size),
            progress: progress(ids, states, now),
        })
        .collect()
}

/// Build the lists overview of a category or module
pub async fn lists_overview(
    state: &AppState,
    device_id: Uuid,
    scope: String,
    corpus: &RankedCorpus,
    list_size: usize,
    group_size: usize,
) -> Result<ListsResponse> {
    let states = state.db.get_card_states(device_id, corpus.ids()).await?;
    let lists = list_summaries(corpus, list_size, group_size, &states, Utc::now());

    Ok(ListsResponse {
        scope,
        total_words: corpus.len(),
        list_size,
        group_size,
        list_count: corpus.list_count(list_size),
        lists,
    })
}

/// Build one list of a category or module
pub async fn list_detail(
    state: &AppState,
    device_id: Uuid,
    scope: String,
    corpus: &RankedCorpus,
    list_size: usize,
    group_size: usize,
    list_index: usize,
) -> Result<ListResponse> {
    let ids = corpus.list(list_size, list_index);
    if ids.is_empty() {
        return Err(ApiError::NotFound(format!("List {list_index} of {scope}")));
    }

    let states = state.db.get_card_states(device_id, ids).await?;
    let words = resolve_words(state, device_id, ids).await?;

    Ok(ListResponse {
        list_index,
        group_count: corpus.group_count(list_size, group_size, list_index),
        progress: progress(ids, &states, Utc::now()),
        words: attach_states(words, &states),
        scope,
    })
}

/// Build one group of a category or module
#[allow(clippy::too_many_arguments)]
pub async fn group_detail(
    state: &AppState,
    device_id: Uuid,
    scope: String,
    corpus: &RankedCorpus,
    list_size: usize,
    group_size: usize,
    list_index: usize,
    group_index: usize,
) -> Result<GroupResponse> {
    let ids = corpus.group(list_size, group_size, list_index, group_index);
    if ids.is_empty() {
        return Err(ApiError::NotFound(format!(
            "Group {group_index} of list {list_index} of {scope}"
        )));
    }

    Ok(GroupResponse {
        list_index,
        group_index,
        words: study_words(state, device_id, ids).await?,
        scope,
    })
}
