//! Loading pattern definitions.
//!
//! Entries are parsed and validated one at a time: a malformed entry is
//! reported and skipped, the rest still load.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Serialize;

use super::{PatternError, PatternSpec};

/// Validated, immutable set of patterns.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PatternLibrary {
    patterns: Vec<PatternSpec>,
}

/// Why a single entry was not registered.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RejectReason {
    #[error("malformed entry: {0}")]
    Malformed(String),
    #[error(transparent)]
    Invalid(#[from] PatternError),
}

/// A rejected entry with its position in the input.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    /// Index of the entry in the input list.
    pub index: usize,
    /// Entry id, if one could be read.
    pub id: Option<String>,
    pub reason: RejectReason,
}

/// Outcome of loading a pattern list.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub library: PatternLibrary,
    pub rejected: Vec<Rejection>,
}

/// Errors that prevent reading the pattern list at all.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read pattern file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Pattern file is not a JSON array of patterns: {0}")]
    Json(#[from] serde_json::Error),
}

impl PatternLibrary {
    /// Register already-typed specs, rejecting invalid ones and duplicate ids.
    pub fn from_specs(specs: Vec<PatternSpec>) -> LoadReport {
        let mut builder = Builder::default();
        for (index, spec) in specs.into_iter().enumerate() {
            builder.offer(index, spec);
        }
        builder.finish()
    }

    /// Parse each JSON value independently.
    pub fn from_values(values: Vec<serde_json::Value>) -> LoadReport {
        let mut builder = Builder::default();
        for (index, value) in values.into_iter().enumerate() {
            let id = value
                .get("id")
                .and_then(|v| v.as_str())
                .map(str::to_string);
            match serde_json::from_value::<PatternSpec>(value) {
                Ok(spec) => builder.offer(index, spec),
                Err(e) => builder.reject(index, id, RejectReason::Malformed(e.to_string())),
            }
        }
        builder.finish()
    }

    /// Parse a JSON array of pattern objects.
    pub fn from_json_str(json: &str) -> Result<LoadReport, LoadError> {
        let values: Vec<serde_json::Value> = serde_json::from_str(json)?;
        Ok(Self::from_values(values))
    }

    /// Load a JSON array of pattern objects from disk.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<LoadReport, LoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Look up a pattern by id.
    pub fn get(&self, id: &str) -> Option<&PatternSpec> {
        self.patterns.iter().find(|p| p.id == id)
    }

    /// All patterns in load order.
    pub fn iter(&self) -> impl Iterator<Item = &PatternSpec> {
        self.patterns.iter()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl IntoIterator for PatternLibrary {
    type Item = PatternSpec;
    type IntoIter = std::vec::IntoIter<PatternSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.patterns.into_iter()
    }
}

#[derive(Default)]
struct Builder {
    seen: HashSet<String>,
    patterns: Vec<PatternSpec>,
    rejected: Vec<Rejection>,
}

impl Builder {
    fn offer(&mut self, index: usize, spec: PatternSpec) {
        if let Err(e) = spec.validate() {
            self.reject(index, Some(spec.id), e.into());
            return;
        }
        if !self.seen.insert(spec.id.clone()) {
            let id = spec.id.clone();
            self.reject(index, Some(spec.id), PatternError::DuplicateId(id).into());
            return;
        }
        self.patterns.push(spec);
    }

    fn reject(&mut self, index: usize, id: Option<String>, reason: RejectReason) {
        log::warn!(
            "Rejected pattern #{index} ({}): {reason}",
            id.as_deref().unwrap_or("<no id>")
        );
        self.rejected.push(Rejection { index, id, reason });
    }

    fn finish(self) -> LoadReport {
        log::debug!(
            "Loaded {} patterns ({} rejected)",
            self.patterns.len(),
            self.rejected.len()
        );
        LoadReport {
            library: PatternLibrary {
                patterns: self.patterns,
            },
            rejected: self.rejected,
        }
    }
}
