use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

pub const HISTORY_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationKind {
    Insert,
    Delete,
    Update,
    Sort,
    Filter,
    Import,
    Export,
    TypeChange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: OperationKind,
    pub description: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

impl Operation {
    pub fn new(kind: OperationKind, description: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            kind,
            description: description.into(),
            parameters: BTreeMap::new(),
        }
    }

    pub fn with_parameter(mut self, key: &str, value: impl ToString) -> Self {
        self.parameters.insert(key.to_string(), value.to_string());
        self
    }
}

/// Append-only, capped at [`HISTORY_LIMIT`]; appending beyond the cap drops the
/// oldest entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    entries: VecDeque<Operation>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, operation: Operation) {
        self.entries.push_back(operation);
        while self.entries.len() > HISTORY_LIMIT {
            if let Some(evicted) = self.entries.pop_front() {
                debug!("History full; evicting '{}'", evicted.description);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Operation> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&Operation> {
        self.entries.back()
    }

    pub fn first(&self) -> Option<&Operation> {
        self.entries.front()
    }
}
