use std::collections::{BTreeSet, HashMap};

use anyhow::{Result, anyhow};
use log::{debug, info};

use crate::{cli::PivotArgs, column::Column, import, io_utils, table::Table};

impl Table {
    /// One output row per distinct `index` value and one output column per
    /// distinct `columns` value, both in sorted order. The first output column
    /// repeats the index values under the index column's name. Each cell takes
    /// the `values` entry of the first matching row, or `""` when no row
    /// matches. Any missing input column yields an empty table.
    pub fn pivot(&self, index: &str, columns: &str, values: &str) -> Table {
        let (Some(index_col), Some(columns_col), Some(values_col)) =
            (self.column(index), self.column(columns), self.column(values))
        else {
            debug!("pivot: '{index}', '{columns}' or '{values}' not found in '{}'", self.name);
            return self.empty_like("pivot");
        };

        let row_keys = index_col.values.iter().collect::<BTreeSet<_>>();
        let column_keys = columns_col.values.iter().collect::<BTreeSet<_>>();

        // First match wins, so later duplicates never overwrite.
        let mut cells: HashMap<(&str, &str), &str> = HashMap::new();
        for row in 0..self.row_count() {
            let key = (
                index_col.get(row).unwrap_or_default(),
                columns_col.get(row).unwrap_or_default(),
            );
            cells
                .entry(key)
                .or_insert_with(|| values_col.get(row).unwrap_or_default());
        }

        let mut output = Vec::with_capacity(column_keys.len() + 1);
        output.push(Column::new(
            index_col.name.clone(),
            index_col.data_type,
            row_keys.iter().map(|k| k.to_string()).collect(),
        ));
        for column_key in &column_keys {
            let column_values = row_keys
                .iter()
                .map(|row_key| {
                    cells
                        .get(&(row_key.as_str(), column_key.as_str()))
                        .map(|v| v.to_string())
                        .unwrap_or_default()
                })
                .collect();
            output.push(Column::new(
                column_key.to_string(),
                values_col.data_type,
                column_values,
            ));
        }
        Table::from_columns(format!("{}_pivot", self.name), output)
    }
}

pub fn execute(args: &PivotArgs) -> Result<()> {
    let table = import::load_table(&args.input)?;
    for name in [&args.index, &args.columns, &args.values] {
        if table.column(name).is_none() {
            return Err(anyhow!("Column '{name}' not found in {:?}", args.input.input));
        }
    }
    let pivoted = table.pivot(&args.index, &args.columns, &args.values);
    info!(
        "Pivoted {} row(s) into {} row(s) x {} column(s)",
        table.row_count(),
        pivoted.row_count(),
        pivoted.column_count()
    );
    io_utils::write_table(&pivoted, &args.output)
}
