//! Plain-text word list import for learner-made modules.
//!
//! # Format
//! One word per line, blank lines ignored:
//! ```text
//! abandon	放弃
//! ability, 能力
//! able  能够的
//! absent
//! ```
//! The first tab or comma separates word and translation. Without one, a run of two or
//! more spaces after the first token does. Otherwise the whole line is the word.

use crate::error::{Result, WordListError};
use serde::{Deserialize, Serialize};

/// Smallest list size a module may use.
pub const MIN_LIST_SIZE: usize = 10;
/// Smallest group size a module may use.
pub const MIN_GROUP_SIZE: usize = 5;

/// One imported word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordEntry {
    pub word: String,
    pub translation: String,
}

/// Parse a word list. Fails if no line yields a word.
pub fn parse_word_list(text: &str) -> Result<Vec<WordEntry>> {
    let entries: Vec<WordEntry> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(parse_line)
        .collect();

    if entries.is_empty() {
        return Err(WordListError::EmptyWordList);
    }
    Ok(entries)
}

fn parse_line(line: &str) -> Option<WordEntry> {
    let (word, translation) = split_on_separator(line)
        .or_else(|| split_on_wide_space(line))
        .unwrap_or((line, ""));

    let word = word.trim();
    if word.is_empty() {
        return None;
    }
    Some(WordEntry {
        word: word.to_string(),
        translation: translation.trim().to_string(),
    })
}

// `word<TAB or ,>translation`; the word is everything before the first separator.
fn split_on_separator(line: &str) -> Option<(&str, &str)> {
    let at = line.find(['\t', ','])?;
    if at == 0 {
        return None;
    }
    let rest = line[at + 1..].trim_start();
    if rest.is_empty() {
        return None;
    }
    Some((&line[..at], rest))
}

// `word<2+ whitespace>translation`; the word is the first whitespace-free token.
fn split_on_wide_space(line: &str) -> Option<(&str, &str)> {
    let at = line.find(char::is_whitespace)?;
    if at == 0 {
        return None;
    }
    let after = &line[at..];
    let rest = after.trim_start();
    let gap = after[..after.len() - rest.len()].chars().count();
    if gap < 2 || rest.is_empty() {
        return None;
    }
    Some((&line[..at], rest))
}

/// List and group sizes of a learner-made module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleLayout {
    pub list_size: usize,
    pub group_size: usize,
}

impl ModuleLayout {
    /// Sizes below the minimums are raised to them.
    pub fn new(list_size: usize, group_size: usize) -> Self {
        Self {
            list_size: list_size.max(MIN_LIST_SIZE),
            group_size: group_size.max(MIN_GROUP_SIZE),
        }
    }
}

impl Default for ModuleLayout {
    fn default() -> Self {
        Self::new(80, 20)
    }
}
