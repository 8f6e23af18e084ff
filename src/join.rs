use std::collections::HashMap;

use anyhow::{Result, anyhow};
use clap::ValueEnum;
use log::{debug, info};

use crate::{
    cli::{InputArgs, JoinArgs},
    column::Column,
    import, io_utils,
    table::Table,
};

pub const RIGHT_PREFIX: &str = "right_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    #[value(alias = "full")]
    Outer,
}

/// One output row: a left row index and a right row index, either of which
/// may be absent (filled with empty cells).
type RowPair = (Option<usize>, Option<usize>);

impl Table {
    /// Output columns are all of this table's columns followed by every
    /// column of `other` except the key, each prefixed with `right_`.
    ///
    /// For right-only rows the left key column carries the right row's key;
    /// all other left cells are empty. A key column missing on either side
    /// yields an empty table.
    pub fn merge(&self, other: &Table, on: &str, how: JoinKind) -> Table {
        let (Some(left_key), Some(right_key)) = (self.column_index(on), other.column_index(on))
        else {
            debug!(
                "merge: key '{on}' missing in '{}' or '{}'",
                self.name, other.name
            );
            return self.empty_like("merged");
        };

        let left_values = &self.columns[left_key].values;
        let right_values = &other.columns[right_key].values;

        let mut right_lookup: HashMap<&str, Vec<usize>> = HashMap::new();
        for (row, key) in right_values.iter().enumerate() {
            right_lookup.entry(key.as_str()).or_default().push(row);
        }

        let mut pairs: Vec<RowPair> = Vec::new();
        match how {
            JoinKind::Inner | JoinKind::Left | JoinKind::Outer => {
                let mut matched_right = vec![false; right_values.len()];
                for (left_row, key) in left_values.iter().enumerate() {
                    match right_lookup.get(key.as_str()) {
                        Some(bucket) => {
                            for &right_row in bucket {
                                matched_right[right_row] = true;
                                pairs.push((Some(left_row), Some(right_row)));
                            }
                        }
                        None if how != JoinKind::Inner => pairs.push((Some(left_row), None)),
                        None => {}
                    }
                }
                if how == JoinKind::Outer {
                    pairs.extend(
                        matched_right
                            .iter()
                            .enumerate()
                            .filter(|(_, matched)| !**matched)
                            .map(|(right_row, _)| (None, Some(right_row))),
                    );
                }
            }
            JoinKind::Right => {
                let mut left_lookup: HashMap<&str, Vec<usize>> = HashMap::new();
                for (row, key) in left_values.iter().enumerate() {
                    left_lookup.entry(key.as_str()).or_default().push(row);
                }
                for (right_row, key) in right_values.iter().enumerate() {
                    match left_lookup.get(key.as_str()) {
                        Some(bucket) => pairs.extend(
                            bucket
                                .iter()
                                .map(|&left_row| (Some(left_row), Some(right_row))),
                        ),
                        None => pairs.push((None, Some(right_row))),
                    }
                }
            }
        }

        let mut columns = Vec::with_capacity(self.column_count() + other.column_count());
        for (idx, column) in self.columns.iter().enumerate() {
            let values = pairs
                .iter()
                .map(|(left_row, right_row)| match (left_row, right_row) {
                    (Some(row), _) => column.values[*row].clone(),
                    (None, Some(row)) if idx == left_key => right_values[*row].clone(),
                    _ => String::new(),
                })
                .collect();
            columns.push(Column::new(column.name.clone(), column.data_type, values));
        }
        for (idx, column) in other.columns.iter().enumerate() {
            if idx == right_key {
                continue;
            }
            let values = pairs
                .iter()
                .map(|(_, right_row)| {
                    right_row
                        .map(|row| column.values[row].clone())
                        .unwrap_or_default()
                })
                .collect();
            columns.push(Column::new(
                format!("{RIGHT_PREFIX}{}", column.name),
                column.data_type,
                values,
            ));
        }

        debug!(
            "merge: {:?} join of '{}' and '{}' on '{on}' produced {} row(s)",
            how,
            self.name,
            other.name,
            pairs.len()
        );
        Table::from_columns(format!("{}_{}_merged", self.name, other.name), columns)
    }
}

pub fn execute(args: &JoinArgs) -> Result<()> {
    let left = load_side(&args.left, args.delimiter)?;
    let right = load_side(&args.right, args.delimiter)?;
    for (side, table) in [("left", &left), ("right", &right)] {
        if table.column(&args.on).is_none() {
            return Err(anyhow!("Join key '{}' not found in {side} input", args.on));
        }
    }
    let merged = left.merge(&right, &args.on, args.how);
    info!(
        "Join complete: {} output row(s) from {} left and {} right row(s)",
        merged.row_count(),
        left.row_count(),
        right.row_count()
    );
    io_utils::write_table(&merged, &args.output)
}

fn load_side(path: &std::path::Path, delimiter: Option<u8>) -> Result<Table> {
    import::load_table(&InputArgs {
        input: path.to_path_buf(),
        delimiter,
        input_encoding: None,
        no_headers: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScalarType;

    fn left() -> Table {
        Table::from_columns(
            "l",
            vec![
                Column::from_strs("key", ScalarType::Integer, &["1", "2", "2"]),
                Column::from_strs("lv", ScalarType::String, &["a", "b", "c"]),
            ],
        )
    }

    fn right() -> Table {
        Table::from_columns(
            "r",
            vec![
                Column::from_strs("key", ScalarType::Integer, &["2", "2", "3"]),
                Column::from_strs("rv", ScalarType::String, &["x", "y", "z"]),
            ],
        )
    }

    #[test]
    fn inner_join_multiplies_duplicate_keys() {
        let merged = left().merge(&right(), "key", JoinKind::Inner);
        assert_eq!(merged.headers(), vec!["key", "lv", "right_rv"]);
        assert_eq!(merged.row_count(), 4);
        let rows = merged.rows().collect::<Vec<_>>();
        assert_eq!(
            rows,
            vec![
                vec!["2", "b", "x"],
                vec!["2", "b", "y"],
                vec!["2", "c", "x"],
                vec!["2", "c", "y"],
            ]
        );
    }

    #[test]
    fn left_join_keeps_unmatched_left_rows() {
        let merged = left().merge(&right(), "key", JoinKind::Left);
        assert_eq!(merged.row_count(), 5);
        assert_eq!(merged.row(0), Some(vec!["1", "a", ""]));
    }

    #[test]
    fn right_join_follows_right_order() {
        let merged = left().merge(&right(), "key", JoinKind::Right);
        let rows = merged.rows().collect::<Vec<_>>();
        assert_eq!(
            rows,
            vec![
                vec!["2", "b", "x"],
                vec!["2", "c", "x"],
                vec!["2", "b", "y"],
                vec!["2", "c", "y"],
                vec!["3", "", "z"],
            ]
        );
    }

    #[test]
    fn outer_join_appends_right_only_rows() {
        let merged = left().merge(&right(), "key", JoinKind::Outer);
        assert_eq!(merged.row_count(), 6);
        assert_eq!(merged.row(0), Some(vec!["1", "a", ""]));
        assert_eq!(merged.row(5), Some(vec!["3", "", "z"]));
    }

    #[test]
    fn keys_match_on_exact_text() {
        let mut other = right();
        other.set_value("2.0", 0, 0);
        let merged = left().merge(&other, "key", JoinKind::Inner);
        assert_eq!(merged.row_count(), 2);
    }

    #[test]
    fn missing_key_yields_empty_table_and_leaves_inputs() {
        let l = left();
        let merged = l.merge(&right(), "nope", JoinKind::Inner);
        assert_eq!(merged.column_count(), 0);
        assert_eq!(l.row_count(), 3);
    }
}
