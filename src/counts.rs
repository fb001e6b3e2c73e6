//! Word frequency counting: normalized word -> number of occurrences.

use std::collections::hash_map;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::tokenize;

/// Occurrence count per normalized word. Every stored count is at least 1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WordCounts {
    counts: HashMap<String, u32>,
}

/// Count the words of `text`. Total over all strings: empty or
/// punctuation-only text yields an empty mapping. A single word stops at
/// `u32::MAX` occurrences.
pub fn count(text: &str) -> WordCounts {
    let mut counts: HashMap<String, u32> = HashMap::new();
    for word in tokenize::tokenize(text) {
        let n = counts.entry(word).or_insert(0);
        *n = n.saturating_add(1);
    }
    WordCounts { counts }
}

/// Count a dynamically typed value. Only JSON strings are text; every other
/// kind is rejected without a partial result.
pub fn count_value(value: &Value) -> Result<WordCounts> {
    match value {
        Value::String(text) => Ok(count(text)),
        other => Err(Error::InvalidArgument(kind_name(other))),
    }
}

pub(crate) fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl WordCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Occurrences of `word`, which is expected in normalized (lowercase) form.
    pub fn get(&self, word: &str) -> Option<u32> {
        self.counts.get(word).copied()
    }

    /// Number of distinct words.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts, i.e. the number of tokens that were counted.
    pub fn total(&self) -> u64 {
        self.counts.values().map(|&n| u64::from(n)).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(w, &n)| (w.as_str(), n))
    }

    /// Entries by count descending, ties broken by word ascending.
    pub fn sorted(&self) -> Vec<(&str, u32)> {
        let mut v: Vec<(&str, u32)> = self.iter().collect();
        v.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        v
    }

    /// The `n` most frequent entries in `sorted` order.
    pub fn top(&self, n: usize) -> Vec<(&str, u32)> {
        let mut v = self.sorted();
        v.truncate(n);
        v
    }

    /// Add the counts of `other` into `self`. Stops at the first word whose sum
    /// does not fit in a `u32`, leaving that word's count unchanged.
    pub fn merge(&mut self, other: WordCounts) -> Result<()> {
        for (word, n) in other.counts {
            self.add(word, n)?;
        }
        Ok(())
    }

    fn add(&mut self, word: String, n: u32) -> Result<()> {
        let current = self.counts.get(&word).copied().unwrap_or(0);
        let sum = current
            .checked_add(n)
            .ok_or_else(|| Error::CountOverflow { word: word.clone() })?;
        self.counts.insert(word, sum);
        Ok(())
    }

    /// Save as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| Error::io(path, e))?;
        Ok(())
    }

    /// Load a mapping written by [`WordCounts::save`].
    ///
    /// Keys are normalized again: `"Apple"` adds to `apple`, `"a-b"` adds its
    /// count to both `a` and `b`, as if the key had been counted `n` times.
    /// Keys without any word characters and zero counts are dropped.
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let raw: HashMap<String, u32> = serde_json::from_str(&json)?;
        let mut counts = WordCounts::new();
        for (key, n) in raw.into_iter().filter(|&(_, n)| n > 0) {
            for word in tokenize::tokenize(&key) {
                counts.add(word, n)?;
            }
        }
        Ok(counts)
    }
}

impl IntoIterator for WordCounts {
    type Item = (String, u32);
    type IntoIter = hash_map::IntoIter<String, u32>;

    fn into_iter(self) -> Self::IntoIter {
        self.counts.into_iter()
    }
}

impl<'a> FromIterator<(&'a str, u32)> for WordCounts {
    /// Build from already normalized entries; zero counts are skipped and
    /// repeated words saturate at `u32::MAX`.
    fn from_iter<I: IntoIterator<Item = (&'a str, u32)>>(iter: I) -> Self {
        let mut counts: HashMap<String, u32> = HashMap::new();
        for (word, n) in iter.into_iter().filter(|&(_, n)| n > 0) {
            let total = counts.entry(word.to_string()).or_insert(0);
            *total = total.saturating_add(n);
        }
        WordCounts { counts }
    }
}
