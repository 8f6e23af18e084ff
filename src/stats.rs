use std::collections::{HashMap, HashSet};

use anyhow::{Result, anyhow};
use clap::ValueEnum;
use log::{debug, info};

use crate::{
    cli::StatsArgs, column::Column, data::parse_double, import, render, table::Table,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnStatistics {
    pub null_count: usize,
    pub unique_count: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub mode: Option<String>,
    pub standard_deviation: Option<f64>,
    pub min: Option<String>,
    pub max: Option<String>,
    pub quartiles: Option<(f64, f64, f64)>,
}

impl ColumnStatistics {
    pub fn compute(column: &Column) -> Self {
        let non_empty = column
            .values
            .iter()
            .map(String::as_str)
            .filter(|v| !v.is_empty())
            .collect::<Vec<_>>();
        let unique = non_empty.iter().copied().collect::<HashSet<_>>();

        let mut stats = ColumnStatistics {
            null_count: column.values.len() - non_empty.len(),
            unique_count: unique.len(),
            mode: most_frequent(&non_empty).map(str::to_string),
            min: non_empty.iter().min().map(|v| v.to_string()),
            max: non_empty.iter().max().map(|v| v.to_string()),
            ..ColumnStatistics::default()
        };

        if column.data_type.is_numeric() {
            let mut numbers = non_empty
                .iter()
                .filter_map(|v| parse_double(v))
                .collect::<Vec<_>>();
            if !numbers.is_empty() {
                numbers.sort_by(f64::total_cmp);
                let mean = mean(&numbers);
                let median = median_of_sorted(&numbers);
                stats.mean = Some(mean);
                stats.median = Some(median);
                stats.standard_deviation = Some(population_std_dev(&numbers, mean));
                let count = numbers.len();
                if count > 3 {
                    stats.quartiles = Some((numbers[count / 4], median, numbers[3 * count / 4]));
                }
            }
        }
        stats
    }
}

/// Most frequent value; ties go to the value seen first.
pub fn most_frequent<'a>(values: &[&'a str]) -> Option<&'a str> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for &value in values {
        *counts.entry(value).or_insert(0) += 1;
    }
    let mut best: Option<(&'a str, usize)> = None;
    for &value in values {
        let count = counts[value];
        if best.is_none_or(|(_, top)| count > top) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len().is_multiple_of(2) {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn population_std_dev(values: &[f64], mean: f64) -> f64 {
    let variance =
        values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum AggregateFunction {
    Sum,
    Mean,
    Median,
    Min,
    Max,
    #[value(alias = "std-dev")]
    StandardDeviation,
}

impl AggregateFunction {
    pub fn apply(&self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        let result = match self {
            AggregateFunction::Sum => values.iter().sum(),
            AggregateFunction::Mean => mean(values),
            AggregateFunction::Median => {
                let mut sorted = values.to_vec();
                sorted.sort_by(f64::total_cmp);
                median_of_sorted(&sorted)
            }
            AggregateFunction::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            AggregateFunction::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            AggregateFunction::StandardDeviation => population_std_dev(values, mean(values)),
        };
        Some(result)
    }
}

impl Table {
    pub fn aggregate(&self, column: &str, function: AggregateFunction) -> Option<f64> {
        let Some(target) = self.column(column) else {
            debug!("aggregate: column '{column}' not found in '{}'", self.name);
            return None;
        };
        if !target.data_type.is_numeric() {
            debug!(
                "aggregate: column '{column}' is {} and cannot be aggregated",
                target.data_type
            );
            return None;
        }
        let values = target
            .values
            .iter()
            .filter_map(|v| parse_double(v))
            .collect::<Vec<_>>();
        function.apply(&values)
    }
}

pub fn execute(args: &StatsArgs) -> Result<()> {
    let table = import::load_table(&args.input)?;
    let columns = if args.columns.is_empty() {
        table.columns().iter().collect::<Vec<_>>()
    } else {
        args.columns
            .iter()
            .map(|name| {
                table
                    .column(name)
                    .ok_or_else(|| anyhow!("Column '{name}' not found in {:?}", args.input.input))
            })
            .collect::<Result<Vec<_>>>()?
    };

    let rows = columns
        .iter()
        .map(|column| render_row(column, &ColumnStatistics::compute(column)))
        .collect::<Vec<_>>();
    let headers = [
        "column", "type", "nulls", "unique", "min", "max", "mean", "median", "std_dev", "mode",
    ]
    .map(String::from)
    .to_vec();
    render::print_rows(&headers, &rows);
    info!("Computed summary statistics for {} column(s)", rows.len());
    Ok(())
}

fn render_row(column: &Column, stats: &ColumnStatistics) -> Vec<String> {
    vec![
        column.name.clone(),
        column.data_type.to_string(),
        stats.null_count.to_string(),
        stats.unique_count.to_string(),
        stats.min.clone().unwrap_or_default(),
        stats.max.clone().unwrap_or_default(),
        format_metric(stats.mean),
        format_metric(stats.median),
        format_metric(stats.standard_deviation),
        stats.mode.clone().unwrap_or_default(),
    ]
}

pub(crate) fn format_metric(metric: Option<f64>) -> String {
    match metric {
        Some(value) if value.fract() == 0.0 => format!("{value:.0}"),
        Some(value) => format!("{value:.4}"),
        None => String::new(),
    }
}
