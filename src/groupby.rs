use std::collections::BTreeMap;

use anyhow::{Result, anyhow};
use log::{debug, info};

use crate::{cli::GroupArgs, import, render, stats::format_metric, table::Table};

impl Table {
    pub fn group_by(&self, column: &str) -> BTreeMap<String, Table> {
        let Some(index) = self.column_index(column) else {
            debug!("group_by: column '{column}' not found in '{}'", self.name);
            return BTreeMap::new();
        };
        let mut partitions: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (row, value) in self.columns[index].values.iter().enumerate() {
            partitions.entry(value.clone()).or_default().push(row);
        }
        partitions
            .into_iter()
            .map(|(key, rows)| {
                let table = self.take_rows(format!("{}_{column}_{key}", self.name), &rows);
                (key, table)
            })
            .collect()
    }
}

pub fn execute(args: &GroupArgs) -> Result<()> {
    let table = import::load_table(&args.input)?;
    if table.column(&args.by).is_none() {
        return Err(anyhow!("Column '{}' not found in {:?}", args.by, args.input.input));
    }
    if let Some(column) = &args.column
        && table.column(column).is_none()
    {
        return Err(anyhow!("Column '{column}' not found in {:?}", args.input.input));
    }

    let groups = table.group_by(&args.by);
    let mut headers = vec![args.by.clone(), "rows".to_string()];
    if let (Some(function), Some(column)) = (args.aggregate, &args.column) {
        headers.push(format!("{function:?}({column})").to_ascii_lowercase());
    }
    let rows = groups
        .iter()
        .map(|(key, group)| {
            let mut row = vec![key.clone(), group.row_count().to_string()];
            if let (Some(function), Some(column)) = (args.aggregate, &args.column) {
                row.push(format_metric(group.aggregate(column, function)));
            }
            row
        })
        .collect::<Vec<_>>();
    render::print_rows(&headers, &rows);
    info!("Grouped {} row(s) into {} group(s)", table.row_count(), groups.len());
    Ok(())
}
