use std::cmp::Ordering;

use anyhow::{Result, anyhow};
use chrono::NaiveDateTime;
use log::{debug, info};

use crate::{
    cli::SortArgs,
    data::{parse_date, parse_double},
    import, io_utils,
    history::{Operation, OperationKind},
    table::Table,
    types::ScalarType,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn from_ascending(ascending: bool) -> Self {
        if ascending {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        }
    }
}

/// Compares two raw cells under the ordering implied by `data_type`.
/// Unparseable numbers sort as `0`, unparseable dates as the distant past.
/// `NaN` sorts after every number.
pub fn compare_cells(left: &str, right: &str, data_type: ScalarType) -> Ordering {
    match data_type {
        ScalarType::Integer | ScalarType::Double => {
            let l = parse_double(left).unwrap_or(0.0);
            let r = parse_double(right).unwrap_or(0.0);
            l.total_cmp(&r)
        }
        ScalarType::Date => {
            let l = parse_date(left).unwrap_or(NaiveDateTime::MIN);
            let r = parse_date(right).unwrap_or(NaiveDateTime::MIN);
            l.cmp(&r)
        }
        _ => left.cmp(right),
    }
}

pub fn sort_permutation(values: &[String], data_type: ScalarType, direction: SortDirection) -> Vec<usize> {
    let mut permutation = (0..values.len()).collect::<Vec<_>>();
    permutation.sort_by(|&a, &b| {
        let ordering = compare_cells(&values[a], &values[b], data_type);
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
    permutation
}

impl Table {
    /// Sorts rows by the named column. The same permutation is applied to every
    /// column so rows stay aligned; ties keep their original order. Unknown
    /// column names leave the table untouched.
    pub fn sort(&mut self, by_column: &str, ascending: bool) {
        let Some(index) = self.column_index(by_column) else {
            debug!("sort: column '{by_column}' not found in '{}'", self.name);
            return;
        };
        let key = &self.columns[index];
        let direction = SortDirection::from_ascending(ascending);
        let permutation = sort_permutation(&key.values, key.data_type, direction);
        for column in &mut self.columns {
            let mut reordered = Vec::with_capacity(column.values.len());
            for &row in &permutation {
                reordered.push(std::mem::take(&mut column.values[row]));
            }
            column.values = reordered;
        }
        let order = if ascending { "ascending" } else { "descending" };
        self.commit(
            Operation::new(
                OperationKind::Sort,
                format!("Sorted by '{by_column}' {order}"),
            )
            .with_parameter("column", by_column)
            .with_parameter("ascending", ascending),
        );
    }
}

pub fn execute(args: &SortArgs) -> Result<()> {
    let mut table = import::load_table(&args.input)?;
    if table.column(&args.by).is_none() {
        return Err(anyhow!("Column '{}' not found in {:?}", args.by, args.input.input));
    }
    table.sort(&args.by, !args.descending);
    info!(
        "Sorted {} row(s) by '{}' ({})",
        table.row_count(),
        args.by,
        if args.descending { "desc" } else { "asc" }
    );
    io_utils::write_table(&table, &args.output)
}
