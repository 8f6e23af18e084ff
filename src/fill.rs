//! Null (empty cell) replacement.
//!
//! `Mean` and `Median` only touch `Integer`/`Double` columns; other columns
//! pass through unchanged. The remaining strategies apply to every column.

use anyhow::Result;
use log::{debug, info};

use crate::{
    cli::FillArgs,
    column::Column,
    data::{format_double, parse_double},
    import, io_utils,
    stats::{AggregateFunction, most_frequent},
    table::Table,
    types::ScalarType,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FillStrategy {
    Mean,
    Median,
    Mode,
    /// Carry the last non-empty value down; leading nulls take the type default.
    Forward,
    /// Carry the next non-empty value up; trailing nulls stay empty.
    Backward,
    Constant(String),
}

impl Table {
    pub fn fill_null_values(&self, strategy: &FillStrategy) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|column| fill_column(column, strategy))
            .collect::<Vec<_>>();
        let mut table = Table::from_columns(format!("{}_filled", self.name), columns);
        table.metadata.source = self.metadata.source.clone();
        table
    }
}

fn fill_column(column: &Column, strategy: &FillStrategy) -> Column {
    let mut filled = column.clone();
    if !column.values.iter().any(String::is_empty) {
        return filled;
    }
    match strategy {
        FillStrategy::Mean => fill_numeric(&mut filled, AggregateFunction::Mean),
        FillStrategy::Median => fill_numeric(&mut filled, AggregateFunction::Median),
        FillStrategy::Mode => {
            let non_empty = column
                .values
                .iter()
                .map(String::as_str)
                .filter(|v| !v.is_empty())
                .collect::<Vec<_>>();
            if let Some(mode) = most_frequent(&non_empty) {
                replace_empty(&mut filled.values, mode);
            }
        }
        FillStrategy::Forward => {
            let mut last = column.data_type.default_value();
            for cell in &mut filled.values {
                if cell.is_empty() {
                    cell.clone_from(&last);
                } else {
                    last.clone_from(cell);
                }
            }
        }
        FillStrategy::Backward => {
            let mut next: Option<String> = None;
            for cell in filled.values.iter_mut().rev() {
                if cell.is_empty() {
                    if let Some(value) = &next {
                        cell.clone_from(value);
                    }
                } else {
                    next = Some(cell.clone());
                }
            }
        }
        FillStrategy::Constant(value) => replace_empty(&mut filled.values, value),
    }
    filled
}

fn fill_numeric(column: &mut Column, function: AggregateFunction) {
    if !column.data_type.is_numeric() {
        debug!(
            "fill: skipping {} column '{}' for numeric strategy",
            column.data_type, column.name
        );
        return;
    }
    let numbers = column
        .values
        .iter()
        .filter_map(|v| parse_double(v))
        .collect::<Vec<_>>();
    let Some(statistic) = function.apply(&numbers) else {
        return;
    };
    let replacement = match column.data_type {
        ScalarType::Integer if fits_i64(statistic) => format!("{}", statistic.round() as i64),
        _ => format_double(statistic),
    };
    replace_empty(&mut column.values, &replacement);
}

fn fits_i64(value: f64) -> bool {
    value.is_finite() && value.round() >= i64::MIN as f64 && value.round() < i64::MAX as f64
}

fn replace_empty(values: &mut [String], replacement: &str) {
    for cell in values.iter_mut().filter(|cell| cell.is_empty()) {
        *cell = replacement.to_string();
    }
}

pub fn execute(args: &FillArgs) -> Result<()> {
    let table = import::load_table(&args.input)?;
    let strategy = args.fill_strategy();
    let filled = table.fill_null_values(&strategy);
    let before = count_nulls(&table);
    let after = count_nulls(&filled);
    info!(
        "Filled {} of {} empty cell(s) using {:?}",
        before - after,
        before,
        args.strategy
    );
    io_utils::write_table(&filled, &args.output)
}

fn count_nulls(table: &Table) -> usize {
    table
        .columns()
        .iter()
        .map(|c| c.values.iter().filter(|v| v.is_empty()).count())
        .sum()
}
