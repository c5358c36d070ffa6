//! Read-only SQLite word corpus

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::{params, params_from_iter, Connection, OpenFlags, Row};
use serde::{Deserialize, Serialize};
use vocab_core::{CorpusProvider, ItemId, ItemRecord};

/// Maximum number of ids bound into one `IN (...)` query
const ID_CHUNK: usize = 500;

const WORD_COLUMNS: &str = "id, word, phonetic, translation, definition, pos, \
                            collins, oxford, bnc, frq, exchange, tags";

/// Static metadata of a corpus category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryInfo {
    pub tag: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
}

/// Categories offered to learners, matched against the `tags` column
pub const CATEGORIES: &[CategoryInfo] = &[
    CategoryInfo {
        tag: "gaokao",
        label: "Gaokao",
        description: "College entrance exam syllabus",
        icon: "📚",
        color: "from-green-500 to-emerald-600",
    },
    CategoryInfo {
        tag: "cet4",
        label: "CET-4",
        description: "College English Test band 4",
        icon: "🎓",
        color: "from-blue-500 to-cyan-600",
    },
    CategoryInfo {
        tag: "cet6",
        label: "CET-6",
        description: "College English Test band 6",
        icon: "🏅",
        color: "from-indigo-500 to-purple-600",
    },
    CategoryInfo {
        tag: "kaoyan",
        label: "Kaoyan",
        description: "Graduate entrance exam",
        icon: "🎯",
        color: "from-purple-500 to-pink-600",
    },
    CategoryInfo {
        tag: "toefl",
        label: "TOEFL",
        description: "TOEFL core vocabulary",
        icon: "🌍",
        color: "from-orange-500 to-red-600",
    },
    CategoryInfo {
        tag: "ielts",
        label: "IELTS",
        description: "IELTS core vocabulary",
        icon: "✈️",
        color: "from-teal-500 to-cyan-600",
    },
    CategoryInfo {
        tag: "gre",
        label: "GRE",
        description: "GRE advanced vocabulary",
        icon: "🔬",
        color: "from-rose-500 to-pink-600",
    },
    CategoryInfo {
        tag: "medical",
        label: "Medical",
        description: "Medical English",
        icon: "🏥",
        color: "from-red-500 to-rose-600",
    },
];

/// Look up a category by tag
pub fn find_category(tag: &str) -> Option<&'static CategoryInfo> {
    CATEGORIES.iter().find(|c| c.tag == tag)
}

/// A word with its dictionary fields
///
/// Words of learner-made modules only carry `word`, `phonetic` and `translation`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub id: ItemId,
    pub word: String,
    pub phonetic: Option<String>,
    pub translation: Option<String>,
    pub definition: Option<String>,
    pub pos: Option<String>,
    pub collins: Option<i64>,
    pub oxford: Option<i64>,
    pub bnc: Option<i64>,
    pub frq: Option<i64>,
    pub exchange: Option<String>,
    pub tags: Option<String>,
}

impl Word {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            word: row.get(1)?,
            phonetic: row.get(2)?,
            translation: row.get(3)?,
            definition: row.get(4)?,
            pos: row.get(5)?,
            collins: row.get(6)?,
            oxford: row.get(7)?,
            bnc: row.get(8)?,
            frq: row.get(9)?,
            exchange: row.get(10)?,
            tags: row.get(11)?,
        })
    }
}

impl From<Word> for ItemRecord {
    fn from(word: Word) -> Self {
        ItemRecord {
            id: word.id,
            word: word.word,
            phonetic: word.phonetic,
            translation: word.translation,
        }
    }
}

/// Word corpus backed by a SQLite `words` table
pub struct SqliteCorpus {
    conn: Mutex<Connection>,
}

impl SqliteCorpus {
    /// Open an existing corpus file read-only
    pub fn open<P: AsRef<Path>>(path: P) -> rusqlite::Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self::from_connection(conn))
    }

    /// Wrap an already open connection (used by tests with in-memory corpora)
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // The connection is read-only; a panic elsewhere cannot leave it half-written.
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Ids of every word tagged with `tag`, unordered
    pub fn category_item_ids(&self, tag: &str) -> rusqlite::Result<Vec<ItemId>> {
        let conn = self.conn();
        let mut stmt = conn.prepare_cached("SELECT id FROM words WHERE tags LIKE ?1")?;
        let ids = stmt
            .query_map(params![format!("%{tag}%")], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<ItemId>>>()?;
        Ok(ids)
    }

    pub fn category_count(&self, tag: &str) -> rusqlite::Result<usize> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM words WHERE tags LIKE ?1",
            params![format!("%{tag}%")],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    pub fn word(&self, id: ItemId) -> rusqlite::Result<Option<Word>> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare_cached(&format!("SELECT {WORD_COLUMNS} FROM words WHERE id = ?1"))?;
        let mut rows = stmt.query_map(params![id], Word::from_row)?;
        rows.next().transpose()
    }

    /// Words for `ids` in the order given; unknown ids are skipped
    pub fn words_by_ids(&self, ids: &[ItemId]) -> rusqlite::Result<Vec<Word>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.conn();
        let mut found: HashMap<ItemId, Word> = HashMap::with_capacity(ids.len());
        for chunk in ids.chunks(ID_CHUNK) {
            let placeholders = vec!["?"; chunk.len()].join(",");
            let sql = format!("SELECT {WORD_COLUMNS} FROM words WHERE id IN ({placeholders})");
            let mut stmt = conn.prepare(&sql)?;
            for word in stmt.query_map(params_from_iter(chunk.iter()), Word::from_row)? {
                let word = word?;
                found.insert(word.id, word);
            }
        }

        Ok(ids.iter().filter_map(|id| found.get(id).cloned()).collect())
    }

    /// Words starting with `prefix`, alphabetically
    pub fn search(&self, prefix: &str, limit: usize) -> rusqlite::Result<Vec<Word>> {
        let pattern = format!("{}%", escape_like(prefix));
        let conn = self.conn();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {WORD_COLUMNS} FROM words WHERE word LIKE ?1 ESCAPE '\\' ORDER BY word LIMIT ?2"
        ))?;
        let words = stmt
            .query_map(params![pattern, limit as i64], Word::from_row)?
            .collect::<rusqlite::Result<Vec<Word>>>()?;
        Ok(words)
    }
}

fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl CorpusProvider for SqliteCorpus {
    type Error = rusqlite::Error;

    fn list_item_ids(&self, scope: &str) -> Result<Vec<ItemId>, Self::Error> {
        self.category_item_ids(scope)
    }

    fn items_by_ids(&self, ids: &[ItemId]) -> Result<Vec<ItemRecord>, Self::Error> {
        Ok(self
            .words_by_ids(ids)?
            .into_iter()
            .map(ItemRecord::from)
            .collect())
    }
}

/// Schema of the corpus table, for building test corpora
pub const CORPUS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS words (
    id INTEGER PRIMARY KEY,
    word TEXT NOT NULL,
    phonetic TEXT,
    translation TEXT,
    definition TEXT,
    pos TEXT,
    collins INTEGER,
    oxford INTEGER,
    bnc INTEGER,
    frq INTEGER,
    exchange TEXT,
    tags TEXT
);
CREATE INDEX IF NOT EXISTS idx_words_word ON words(word);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn corpus() -> SqliteCorpus {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(CORPUS_SCHEMA).unwrap();
        let rows: [(i64, &str, &str); 6] = [
            (1, "abandon", "cet4 cet6 ky"),
            (2, "ability", "gaokao cet4"),
            (3, "abate", "gre"),
            (4, "abbey", "ielts"),
            (5, "abandoned", "cet6"),
            (6, "ab_normal", "medical"),
        ];
        for (id, word, tags) in rows {
            conn.execute(
                "INSERT INTO words (id, word, translation, tags) VALUES (?1, ?2, ?3, ?4)",
                params![id, word, format!("t-{word}"), tags],
            )
            .unwrap();
        }
        SqliteCorpus::from_connection(conn)
    }

    #[test]
    fn test_category_ids_and_count() {
        let corpus = corpus();
        let mut ids = corpus.category_item_ids("cet4").unwrap();
        ids.sort();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(corpus.category_count("cet6").unwrap(), 2);
        assert_eq!(corpus.category_count("toefl").unwrap(), 0);
    }

    #[test]
    fn test_words_by_ids_keeps_order() {
        let corpus = corpus();
        let words: Vec<String> = corpus
            .words_by_ids(&[5, 42, 1, 3])
            .unwrap()
            .into_iter()
            .map(|w| w.word)
            .collect();
        assert_eq!(words, vec!["abandoned", "abandon", "abate"]);
        assert!(corpus.words_by_ids(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_single_word() {
        let corpus = corpus();
        let word = corpus.word(3).unwrap().unwrap();
        assert_eq!(word.translation.as_deref(), Some("t-abate"));
        assert_eq!(word.phonetic, None);
        assert!(corpus.word(99).unwrap().is_none());
    }

    #[test]
    fn test_search_by_prefix() {
        let corpus = corpus();
        let words: Vec<String> = corpus
            .search("aban", 10)
            .unwrap()
            .into_iter()
            .map(|w| w.word)
            .collect();
        assert_eq!(words, vec!["abandon", "abandoned"]);
        assert_eq!(corpus.search("ab", 2).unwrap().len(), 2);
    }

    #[test]
    fn test_search_escapes_wildcards() {
        let corpus = corpus();
        let words: Vec<String> = corpus
            .search("ab_", 10)
            .unwrap()
            .into_iter()
            .map(|w| w.word)
            .collect();
        assert_eq!(words, vec!["ab_normal"]);
    }

    #[test]
    fn test_corpus_provider() {
        let corpus = corpus();
        let records = corpus.items_by_ids(&[2]).unwrap();
        assert_eq!(records[0].word, "ability");
        assert_eq!(corpus.list_item_ids("gre").unwrap(), vec![3]);
    }

    #[test]
    fn test_category_lookup() {
        assert_eq!(CATEGORIES.len(), 8);
        assert_eq!(find_category("gre").map(|c| c.label), Some("GRE"));
        assert!(find_category("sat").is_none());
    }
}
