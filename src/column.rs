use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::ScalarType;

/// Stable synthetic identity of a column. Names can repeat across columns, so
/// equality and hashing go through this id instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnId(Uuid);

impl ColumnId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ColumnId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColumnMetadata {
    pub description: Option<String>,
    pub unit: Option<String>,
    pub format: Option<String>,
    pub nullable: bool,
    pub unique: bool,
    pub primary_key: bool,
    pub foreign_key: Option<String>,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    #[serde(default)]
    id: ColumnId,
    pub name: String,
    pub data_type: ScalarType,
    pub values: Vec<String>,
    #[serde(default)]
    pub metadata: ColumnMetadata,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: ScalarType, values: Vec<String>) -> Self {
        Self {
            id: ColumnId::new(),
            name: name.into(),
            data_type,
            values,
            metadata: ColumnMetadata {
                nullable: true,
                ..ColumnMetadata::default()
            },
        }
    }

    pub fn from_strs<S: AsRef<str>>(name: &str, data_type: ScalarType, values: &[S]) -> Self {
        Self::new(
            name,
            data_type,
            values.iter().map(|v| v.as_ref().to_string()).collect(),
        )
    }

    pub fn id(&self) -> ColumnId {
        self.id
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, row: usize) -> Option<&str> {
        self.values.get(row).map(String::as_str)
    }

    pub fn take(&self, rows: &[usize]) -> Self {
        let values = rows
            .iter()
            .map(|&row| self.values.get(row).cloned().unwrap_or_default())
            .collect();
        Self {
            id: self.id,
            name: self.name.clone(),
            data_type: self.data_type,
            values,
            metadata: self.metadata.clone(),
        }
    }

    pub fn resize_to(&mut self, len: usize) {
        if self.values.len() > len {
            self.values.truncate(len);
        }
        while self.values.len() < len {
            self.values.push(self.data_type.default_value());
        }
    }

    pub(crate) fn memory_usage(&self) -> usize {
        self.name.len() + self.values.iter().map(String::len).sum::<usize>()
    }
}

impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Column {}

impl Hash for Column {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
