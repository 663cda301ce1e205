use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use crate::normalize::normalize_bytes;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopLine {
    pub line: String,
    pub count: u64,
}

/// Occurrence counts keyed by the raw bytes of the normalized line.
#[derive(Clone, Debug, Default)]
pub struct FrequencyTable {
    counts: HashMap<Vec<u8>, u64>,
}

impl FrequencyTable {
    pub fn new() -> Self { Self::default() }

    /// Normalizes `raw_line` and counts it.
    pub fn record(&mut self, raw_line: impl AsRef<[u8]>) {
        *self.counts.entry(normalize_bytes(raw_line.as_ref())).or_insert(0) += 1;
    }

    pub fn distinct(&self) -> usize { self.counts.len() }

    pub fn count_of(&self, normalized: &str) -> u64 { self.counts.get(normalized.as_bytes()).copied().unwrap_or(0) }

    /// The `n` most frequent lines, count descending, ties by line bytes
    /// ascending. Keys are decoded to text only here.
    pub fn top(&self, n: usize) -> Vec<TopLine> {
        if n == 0 { return Vec::new(); }
        let mut entries: Vec<(&Vec<u8>, u64)> = self.counts.iter().map(|(k, v)| (k, *v)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries.truncate(n);
        entries.into_iter().map(|(line, count)| TopLine { line: String::from_utf8_lossy(line).into_owned(), count }).collect()
    }
}
