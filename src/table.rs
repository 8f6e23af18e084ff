use chrono::{DateTime, Utc};
use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    column::Column,
    history::{History, Operation, OperationKind},
    infer,
    stats::ColumnStatistics,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableMetadata {
    pub created: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    #[serde(default)]
    pub source: Option<String>,
    pub encoding: String,
    pub delimiter: String,
    pub has_headers: bool,
    pub row_count: usize,
    pub column_count: usize,
    pub memory_usage: usize,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Default for TableMetadata {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            created: now,
            last_modified: now,
            source: None,
            encoding: "utf-8".to_string(),
            delimiter: ",".to_string(),
            has_headers: true,
            row_count: 0,
            column_count: 0,
            memory_usage: 0,
            tags: Vec::new(),
            notes: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub(crate) columns: Vec<Column>,
    pub metadata: TableMetadata,
    #[serde(default)]
    pub(crate) history: History,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            metadata: TableMetadata::default(),
            history: History::new(),
        }
    }

    pub fn from_columns(name: impl Into<String>, columns: Vec<Column>) -> Self {
        let mut table = Self::new(name);
        table.columns = columns;
        table.restore_invariant();
        table
    }

    /// Builds a table from importer output: one column per header, each typed
    /// by [`infer::infer`]. Short rows are padded with empty cells and extra
    /// cells beyond the header count are dropped.
    pub fn from_records(
        name: impl Into<String>,
        headers: &[String],
        rows: &[Vec<String>],
        source: Option<&str>,
    ) -> Self {
        let columns = headers
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                let values = rows
                    .iter()
                    .map(|row| row.get(idx).cloned().unwrap_or_default())
                    .collect_vec();
                let data_type = infer::infer(&values);
                Column::new(header.clone(), data_type, values)
            })
            .collect_vec();
        let mut table = Self::from_columns(name, columns);
        table.metadata.source = source.map(str::to_string);
        let description = match source {
            Some(src) => format!(
                "Imported {} row(s) and {} column(s) from {src}",
                table.row_count(),
                table.column_count()
            ),
            None => format!(
                "Imported {} row(s) and {} column(s)",
                table.row_count(),
                table.column_count()
            ),
        };
        table.commit(
            Operation::new(OperationKind::Import, description)
                .with_parameter("rows", table.row_count())
                .with_parameter("columns", table.column_count()),
        );
        table
    }

    pub(crate) fn empty_like(&self, suffix: &str) -> Self {
        Self::new(format!("{}_{suffix}", self.name))
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_at(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    pub fn value(&self, row: usize, column: usize) -> Option<&str> {
        self.columns.get(column).and_then(|c| c.get(row))
    }

    pub fn row(&self, index: usize) -> Option<Vec<&str>> {
        if index >= self.row_count() {
            return None;
        }
        Some(
            self.columns
                .iter()
                .map(|c| c.get(index).unwrap_or_default())
                .collect(),
        )
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<&str>> + '_ {
        (0..self.row_count()).filter_map(|idx| self.row(idx))
    }

    pub fn statistics(&self, column: &str) -> Option<ColumnStatistics> {
        self.column(column).map(ColumnStatistics::compute)
    }

    pub(crate) fn take_rows(&self, name: impl Into<String>, rows: &[usize]) -> Self {
        let columns = self.columns.iter().map(|c| c.take(rows)).collect();
        let mut table = Self::from_columns(name, columns);
        table.metadata.source = self.metadata.source.clone();
        table.metadata.encoding = self.metadata.encoding.clone();
        table.metadata.delimiter = self.metadata.delimiter.clone();
        table.metadata.has_headers = self.metadata.has_headers;
        table
    }

    /// Pads every column to the longest one and refreshes derived metadata.
    pub(crate) fn restore_invariant(&mut self) {
        let target = self.columns.iter().map(Column::len).max().unwrap_or(0);
        for column in &mut self.columns {
            if column.len() != target {
                debug!(
                    "Padding column '{}' from {} to {} cell(s)",
                    column.name,
                    column.len(),
                    target
                );
                column.resize_to(target);
            }
        }
        self.metadata.row_count = self.row_count();
        self.metadata.column_count = self.column_count();
        self.metadata.memory_usage = self.columns.iter().map(Column::memory_usage).sum();
    }

    pub(crate) fn commit(&mut self, operation: Operation) {
        self.restore_invariant();
        self.metadata.last_modified = Utc::now();
        self.history.record(operation);
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.metadata == other.metadata
            && self.history == other.history
            && self.columns.len() == other.columns.len()
            && self.columns.iter().zip(&other.columns).all(|(a, b)| {
                a.id() == b.id()
                    && a.name == b.name
                    && a.data_type == b.data_type
                    && a.values == b.values
                    && a.metadata == b.metadata
            })
    }
}
