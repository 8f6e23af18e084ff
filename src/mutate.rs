//! In-place table mutators.
//!
//! Invalid positions are silent no-ops: nothing changes and nothing is
//! recorded. Each successful call appends exactly one [`Operation`].

use log::debug;

use crate::{
    column::Column,
    convert::convert,
    history::{Operation, OperationKind},
    table::Table,
    types::ScalarType,
};

impl Table {
    pub fn add_column(&mut self, column: Column) {
        let at = self.column_count();
        self.insert_column(column, at);
    }

    /// Inserts `column` at `at`, clamped to the column count. When the table
    /// already has columns the new one is padded with its type default (or
    /// truncated) to the current row count.
    pub fn insert_column(&mut self, mut column: Column, at: usize) {
        let at = at.min(self.column_count());
        if !self.columns.is_empty() {
            column.resize_to(self.row_count());
        }
        let description = format!("Inserted column '{}' at {at}", column.name);
        let operation = Operation::new(OperationKind::Insert, description)
            .with_parameter("column", &column.name)
            .with_parameter("index", at);
        self.columns.insert(at, column);
        self.commit(operation);
    }

    pub fn remove_column(&mut self, at: usize) {
        if at >= self.column_count() {
            debug!("remove_column: index {at} out of range");
            return;
        }
        let removed = self.columns.remove(at);
        self.commit(
            Operation::new(
                OperationKind::Delete,
                format!("Removed column '{}'", removed.name),
            )
            .with_parameter("column", &removed.name)
            .with_parameter("index", at),
        );
    }

    pub fn add_row(&mut self, values: Option<&[String]>) {
        let at = self.row_count();
        self.insert_row(at, values);
    }

    /// Inserts a row at `at`, clamped to `[0, row_count]`. Missing cells (or
    /// the whole row when `values` is `None`) take each column's default;
    /// surplus cells are ignored. Tables without columns are left untouched.
    pub fn insert_row(&mut self, at: usize, values: Option<&[String]>) {
        if self.columns.is_empty() {
            debug!("insert_row: table '{}' has no columns", self.name);
            return;
        }
        let at = at.min(self.row_count());
        for (idx, column) in self.columns.iter_mut().enumerate() {
            let cell = values
                .and_then(|row| row.get(idx))
                .cloned()
                .unwrap_or_else(|| column.data_type.default_value());
            column.values.insert(at, cell);
        }
        self.commit(
            Operation::new(OperationKind::Insert, format!("Inserted row at {at}"))
                .with_parameter("row", at),
        );
    }

    pub fn remove_row(&mut self, at: usize) {
        if at >= self.row_count() {
            debug!("remove_row: index {at} out of range");
            return;
        }
        for column in &mut self.columns {
            column.values.remove(at);
        }
        self.commit(
            Operation::new(OperationKind::Delete, format!("Removed row {at}"))
                .with_parameter("row", at),
        );
    }

    pub fn set_value(&mut self, value: impl Into<String>, row: usize, column: usize) {
        if row >= self.row_count() || column >= self.column_count() {
            debug!("set_value: cell ({row}, {column}) out of range");
            return;
        }
        let value = value.into();
        let target = &mut self.columns[column];
        let old = std::mem::replace(&mut target.values[row], value.clone());
        let description = format!(
            "Changed '{}' row {row} from '{old}' to '{value}'",
            target.name
        );
        self.commit(
            Operation::new(OperationKind::Update, description)
                .with_parameter("row", row)
                .with_parameter("column", column)
                .with_parameter("old", old)
                .with_parameter("new", value),
        );
    }

    pub fn rename_column(&mut self, at: usize, name: impl Into<String>) {
        let Some(column) = self.columns.get_mut(at) else {
            debug!("rename_column: index {at} out of range");
            return;
        };
        let name = name.into();
        let old = std::mem::replace(&mut column.name, name.clone());
        self.commit(
            Operation::new(
                OperationKind::Update,
                format!("Renamed column '{old}' to '{name}'"),
            )
            .with_parameter("old", old)
            .with_parameter("new", name),
        );
    }

    pub fn change_column_type(&mut self, at: usize, to: ScalarType) {
        let Some(column) = self.columns.get_mut(at) else {
            debug!("change_column_type: index {at} out of range");
            return;
        };
        let from = column.data_type;
        if from == to {
            return;
        }
        for cell in &mut column.values {
            *cell = convert(cell, from, to);
        }
        column.data_type = to;
        let description = format!("Changed type of '{}' from {from} to {to}", column.name);
        self.commit(
            Operation::new(OperationKind::TypeChange, description)
                .with_parameter("column", at)
                .with_parameter("from", from)
                .with_parameter("to", to),
        );
    }
}
