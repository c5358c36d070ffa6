//! Test fixtures and factory functions for creating test data.

use rusqlite::{params, Connection};
use serde_json::json;

use openwords_backend::corpus::{SqliteCorpus, CORPUS_SCHEMA};

/// Number of words tagged `cet4` in [`sample_corpus`].
pub const CET4_WORDS: usize = 30;

/// Number of words tagged `gre` in [`sample_corpus`].
pub const GRE_WORDS: usize = 12;

/// In-memory corpus: ids 1..=30 tagged `cet4`, ids 101..=112 tagged `gre`.
pub fn sample_corpus() -> SqliteCorpus {
    let conn = Connection::open_in_memory().expect("Failed to open in-memory corpus");
    conn.execute_batch(CORPUS_SCHEMA)
        .expect("Failed to create corpus schema");

    for i in 1..=CET4_WORDS as i64 {
        insert_word(&conn, i, &format!("word{i:02}"), "cet4");
    }
    for i in 1..=GRE_WORDS as i64 {
        insert_word(&conn, 100 + i, &format!("lexeme{i:02}"), "gre");
    }

    SqliteCorpus::from_connection(conn)
}

fn insert_word(conn: &Connection, id: i64, word: &str, tags: &str) {
    conn.execute(
        "INSERT INTO words (id, word, phonetic, translation, tags) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id, word, format!("/{word}/"), format!("translation of {word}"), tags],
    )
    .expect("Failed to insert corpus word");
}

/// Word list text with `count` tab-separated entries.
pub fn word_list_text(count: usize) -> String {
    (0..count)
        .map(|i| format!("custom{i:03}\tmeaning {i}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn review_request(item_id: i64, quality: u8) -> serde_json::Value {
    json!({ "item_id": item_id, "quality": quality })
}

pub fn create_module_request(name: &str, text: &str) -> serde_json::Value {
    json!({ "name": name, "text": text })
}

pub fn create_module_request_with_layout(
    name: &str,
    text: &str,
    list_size: usize,
    group_size: usize,
) -> serde_json::Value {
    json!({
        "name": name,
        "text": text,
        "list_size": list_size,
        "group_size": group_size,
    })
}

pub fn update_settings_request(
    daily_goal: Option<u32>,
    list_size: Option<usize>,
) -> serde_json::Value {
    let mut obj = serde_json::Map::new();
    if let Some(goal) = daily_goal {
        obj.insert("daily_goal".to_string(), json!(goal));
    }
    if let Some(size) = list_size {
        obj.insert("list_size".to_string(), json!(size));
    }
    serde_json::Value::Object(obj)
}

pub fn device_register_request(name: Option<&str>) -> serde_json::Value {
    match name {
        Some(n) => json!({ "name": n }),
        None => json!({}),
    }
}
