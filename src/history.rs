//! Search history records for committed queries.
//!
//! Only complete trees are recorded. The persisted form is the serialized
//! tree, not the query text, so two entries that differ only in quoting or
//! spacing are the same entry.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::query::FilterQuery;
use crate::term::FilterTerm;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("invalid history entry: {0}")]
    Json(#[from] serde_json::Error),
}

/// One committed search.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub query: FilterQuery<FilterTerm>,
}

impl HistoryEntry {
    /// Stores the normalized form of `query`.
    pub fn new(query: &FilterQuery<FilterTerm>) -> Self {
        Self {
            query: query.flattened(),
        }
    }

    /// Canonical query text for display.
    pub fn text(&self) -> String {
        self.query.to_query_string()
    }

    pub fn to_json(&self) -> Result<String, HistoryError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, HistoryError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Breaks a committed query into one usage event per leaf, with field
/// aliases resolved so `c:red` and `color:red` count as the same filter.
pub fn usage_terms(query: &FilterQuery<FilterTerm>) -> Vec<FilterTerm> {
    query
        .leaves()
        .into_iter()
        .map(FilterTerm::canonicalized)
        .collect()
}

/// In-memory history, most recent first, without duplicates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records `query`, moving an equal earlier entry to the front.
    pub fn record(&mut self, query: &FilterQuery<FilterTerm>) -> &HistoryEntry {
        let entry = HistoryEntry::new(query);
        self.entries.retain(|existing| *existing != entry);
        self.entries.insert(0, entry);
        &self.entries[0]
    }

    /// How often each filter was used across all entries.
    pub fn usage_counts(&self) -> HashMap<FilterTerm, usize> {
        let mut counts = HashMap::new();
        for entry in &self.entries {
            for term in usage_terms(&entry.query) {
                *counts.entry(term).or_insert(0) += 1;
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_complete_query;
    use crate::query::Polarity;
    use crate::term::Comparison;

    fn complete(input: &str) -> FilterQuery<FilterTerm> {
        parse_complete_query(input).unwrap()
    }

    #[test]
    fn test_usage_terms_decompose_or_trees() {
        let query = complete("c:red (t:elf or -t:goblin) bolt");
        assert_eq!(
            usage_terms(&query),
            vec![
                FilterTerm::basic("color", Comparison::Contains, "red"),
                FilterTerm::basic("type", Comparison::Contains, "elf"),
                FilterTerm::basic("type", Comparison::Contains, "goblin")
                    .with_polarity(Polarity::Negative),
                FilterTerm::name("bolt"),
            ]
        );
    }

    #[test]
    fn test_entries_ignore_quote_style() {
        let a = HistoryEntry::new(&complete(r#"name:"sol ring"  t:artifact"#));
        let b = HistoryEntry::new(&complete("name:'sol ring' t:artifact"));
        assert_eq!(a, b);
        assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());
        assert_eq!(a.text(), r#"name:"sol ring" t:artifact"#);
    }

    #[test]
    fn test_json_round_trip() {
        let entry = HistoryEntry::new(&complete("-(r:rare or r:mythic) o:/draw/ !Opt"));
        let json = entry.to_json().unwrap();
        assert_eq!(HistoryEntry::from_json(&json).unwrap(), entry);
        assert!(HistoryEntry::from_json("{\"query\":").is_err());
    }

    #[test]
    fn test_record_moves_duplicates_to_front() {
        let mut history = History::default();
        history.record(&complete("c:red"));
        history.record(&complete("t:elf"));
        history.record(&complete("(c:red)"));
        assert_eq!(history.len(), 2);
        assert_eq!(history.entries()[0].text(), "c:red");
        assert_eq!(history.entries()[1].text(), "t:elf");

        let counts = history.usage_counts();
        assert_eq!(
            counts.get(&FilterTerm::basic("color", Comparison::Contains, "red")),
            Some(&1)
        );
    }
}
