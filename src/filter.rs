use std::cmp::Ordering;

use anyhow::{Result, anyhow};
use log::info;

use crate::{
    cli::FilterArgs, expr, import, io_utils, sort::compare_cells, table::Table,
    types::ScalarType,
};

impl Table {
    pub fn filter<F>(&self, predicate: F) -> Table
    where
        F: Fn(usize) -> bool,
    {
        let keep = (0..self.row_count())
            .filter(|&row| predicate(row))
            .collect::<Vec<_>>();
        self.take_rows(format!("{}_filtered", self.name), &keep)
    }

    /// Filters on the raw text of one column. A missing column yields an empty
    /// table.
    pub fn filter_where<F>(&self, column: &str, predicate: F) -> Table
    where
        F: Fn(&str) -> bool,
    {
        let Some(index) = self.column_index(column) else {
            return self.empty_like("filtered");
        };
        let target = &self.columns[index];
        self.filter(|row| predicate(target.get(row).unwrap_or_default()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Eq,
    NotEq,
    Gt,
    Ge,
    Lt,
    Le,
    Contains,
    StartsWith,
    EndsWith,
}

#[derive(Debug, Clone)]
pub struct FilterCondition {
    pub column: String,
    pub operator: ComparisonOperator,
    pub raw_value: String,
}

pub fn parse_filters(filters: &[String]) -> Result<Vec<FilterCondition>> {
    filters.iter().map(|f| parse_filter(f)).collect()
}

fn parse_filter(filter: &str) -> Result<FilterCondition> {
    let trimmed = filter.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("Empty filter expression"));
    }

    let lowered = trimmed.to_ascii_lowercase();
    for (needle, op) in [
        (" contains ", ComparisonOperator::Contains),
        (" startswith ", ComparisonOperator::StartsWith),
        (" endswith ", ComparisonOperator::EndsWith),
    ] {
        if let Some(idx) = lowered.find(needle) {
            return Ok(FilterCondition {
                column: trimmed[..idx].trim().to_string(),
                operator: op,
                raw_value: unquote(trimmed[idx + needle.len()..].trim()).to_string(),
            });
        }
    }

    for (needle, op) in [
        ("!=", ComparisonOperator::NotEq),
        (">=", ComparisonOperator::Ge),
        ("<=", ComparisonOperator::Le),
        ("=", ComparisonOperator::Eq),
        (">", ComparisonOperator::Gt),
        ("<", ComparisonOperator::Lt),
    ] {
        if let Some(idx) = trimmed.find(needle) {
            return Ok(FilterCondition {
                column: trimmed[..idx].trim().to_string(),
                operator: op,
                raw_value: unquote(trimmed[idx + needle.len()..].trim()).to_string(),
            });
        }
    }

    Err(anyhow!("Failed to parse filter expression '{trimmed}'"))
}

fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if value.len() >= 2
        && ((bytes[0] == b'"' && bytes[value.len() - 1] == b'"')
            || (bytes[0] == b'\'' && bytes[value.len() - 1] == b'\''))
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

impl FilterCondition {
    /// Ordering comparisons follow the column type, the same way sorting does.
    pub fn matches(&self, cell: &str, data_type: ScalarType) -> bool {
        let ordering = || compare_cells(cell, &self.raw_value, data_type);
        match self.operator {
            ComparisonOperator::Eq => ordering() == Ordering::Equal,
            ComparisonOperator::NotEq => ordering() != Ordering::Equal,
            ComparisonOperator::Gt => ordering() == Ordering::Greater,
            ComparisonOperator::Ge => ordering() != Ordering::Less,
            ComparisonOperator::Lt => ordering() == Ordering::Less,
            ComparisonOperator::Le => ordering() != Ordering::Greater,
            ComparisonOperator::Contains => cell.contains(&self.raw_value),
            ComparisonOperator::StartsWith => cell.starts_with(&self.raw_value),
            ComparisonOperator::EndsWith => cell.ends_with(&self.raw_value),
        }
    }
}

pub fn evaluate_conditions(
    table: &Table,
    conditions: &[FilterCondition],
    row: usize,
) -> Result<bool> {
    for condition in conditions {
        let column = table
            .column(&condition.column)
            .ok_or_else(|| anyhow!("Column '{}' not found for filter", condition.column))?;
        let cell = column.get(row).unwrap_or_default();
        if !condition.matches(cell, column.data_type) {
            return Ok(false);
        }
    }
    Ok(true)
}

pub fn execute(args: &FilterArgs) -> Result<()> {
    let table = import::load_table(&args.input)?;
    let conditions = parse_filters(&args.filters)?;
    for condition in &conditions {
        if table.column(&condition.column).is_none() {
            return Err(anyhow!("Column '{}' not found for filter", condition.column));
        }
    }

    // Evaluate up front so expression errors surface instead of dropping rows.
    let mut keep = vec![true; table.row_count()];
    for (row, flag) in keep.iter_mut().enumerate() {
        *flag = evaluate_conditions(&table, &conditions, row)?
            && expr::evaluate_row(&table, &args.filter_exprs, row)?;
    }
    let filtered = table.filter(|row| keep[row]);
    info!(
        "Kept {} of {} row(s)",
        filtered.row_count(),
        table.row_count()
    );
    io_utils::write_table(&filtered, &args.output)
}
