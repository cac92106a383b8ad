//! Discovered-set: one record per pattern, in discovery order.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::schema::RewardDescriptor;

/// Emitted once, the first time a pattern crosses its threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryRecord {
    pub pattern_id: String,
    /// Confidence at the moment of discovery.
    pub confidence: f32,
    /// Timestamp of the event that completed the pattern.
    pub timestamp: f64,
    /// Reward forwarded verbatim from the pattern definition.
    pub reward: RewardDescriptor,
}

/// Archive of discovered patterns.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryArchive {
    records: Vec<DiscoveryRecord>,
    index: HashMap<String, usize>,
}

impl DiscoveryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record. Returns false (and keeps the original) if the pattern
    /// was already discovered.
    pub fn add(&mut self, record: DiscoveryRecord) -> bool {
        if self.index.contains_key(&record.pattern_id) {
            return false;
        }
        self.index
            .insert(record.pattern_id.clone(), self.records.len());
        self.records.push(record);
        true
    }

    pub fn contains(&self, pattern_id: &str) -> bool {
        self.index.contains_key(pattern_id)
    }

    pub fn get(&self, pattern_id: &str) -> Option<&DiscoveryRecord> {
        self.index.get(pattern_id).map(|&i| &self.records[i])
    }

    /// Records in discovery order.
    pub fn all(&self) -> &[DiscoveryRecord] {
        &self.records
    }

    /// Discovered pattern ids in discovery order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.pattern_id.as_str())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, confidence: f32) -> DiscoveryRecord {
        DiscoveryRecord {
            pattern_id: id.into(),
            confidence,
            timestamp: 0.0,
            reward: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_archive_add_once() {
        let mut archive = DiscoveryArchive::new();
        assert!(archive.add(record("konami", 1.0)));
        assert!(!archive.add(record("konami", 0.95)));
        assert_eq!(archive.len(), 1);
        assert_eq!(archive.get("konami").unwrap().confidence, 1.0);
    }

    #[test]
    fn test_archive_order() {
        let mut archive = DiscoveryArchive::new();
        archive.add(record("b", 0.9));
        archive.add(record("a", 0.9));
        let ids: Vec<_> = archive.ids().collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert!(archive.contains("a"));
        assert!(!archive.contains("c"));
    }
}
