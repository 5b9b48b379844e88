//! Resolution cache
//!
//! Remembers the outcome of every candidate string resolved during a run so
//! repeated candidates cost no further gazetteer queries. Entries are
//! written once and never updated or evicted within a run. An answered
//! query with zero rows is a real outcome, distinct from a candidate that
//! was never attempted.

use std::collections::HashMap;

use super::ResolvedMatch;

/// Outcome of resolving one candidate string
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The gazetteer matched these rows
    Matched(Vec<ResolvedMatch>),
    /// The gazetteer answered with zero rows
    NoMatch,
}

/// Write-once cache from candidate string to resolution outcome
#[derive(Debug, Default)]
pub struct ResolutionCache {
    entries: HashMap<String, Outcome>,
    /// Cache hit count for statistics
    hits: u64,
    /// Cache miss count for statistics
    misses: u64,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a previously resolved candidate, if present
    pub fn get(&mut self, candidate: &str) -> Option<&Outcome> {
        if self.entries.contains_key(candidate) {
            self.hits += 1;
            self.entries.get(candidate)
        } else {
            self.misses += 1;
            None
        }
    }

    /// Look up without touching the hit statistics
    pub fn peek(&self, candidate: &str) -> Option<&Outcome> {
        self.entries.get(candidate)
    }

    /// Record the outcome for a candidate; the first write wins
    pub fn insert(&mut self, candidate: String, outcome: Outcome) {
        self.entries.entry(candidate).or_insert(outcome);
    }

    /// Number of resolved candidates
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cache hit count
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Cache miss count
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Cache hit rate (0.0 to 1.0)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
