use std::collections::HashSet;

use anyhow::Result;
use log::info;

use crate::{cli::DedupArgs, import, io_utils, table::Table};

impl Table {
    /// Indices of rows whose full tuple of cells already appeared at an
    /// earlier index. First occurrences are never reported.
    pub fn detect_duplicates(&self) -> Vec<usize> {
        let mut seen: HashSet<Vec<&str>> = HashSet::with_capacity(self.row_count());
        self.rows()
            .enumerate()
            .filter_map(|(idx, row)| (!seen.insert(row)).then_some(idx))
            .collect()
    }

    pub fn remove_duplicates(&self) -> Table {
        let duplicates = self.detect_duplicates().into_iter().collect::<HashSet<_>>();
        let mut table = self.filter(|row| !duplicates.contains(&row));
        table.name = format!("{}_deduplicated", self.name);
        table
    }
}

pub fn execute(args: &DedupArgs) -> Result<()> {
    let table = import::load_table(&args.input)?;
    if args.report {
        let duplicates = table.detect_duplicates();
        println!("duplicate_rows: {}", duplicates.len());
        for idx in &duplicates {
            println!("{idx}");
        }
        info!(
            "Found {} duplicate row(s) in {} row(s)",
            duplicates.len(),
            table.row_count()
        );
        return Ok(());
    }
    let deduplicated = table.remove_duplicates();
    info!(
        "Removed {} duplicate row(s)",
        table.row_count() - deduplicated.row_count()
    );
    io_utils::write_table(&deduplicated, &args.output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{column::Column, types::ScalarType};

    fn letters() -> Table {
        Table::from_columns(
            "letters",
            vec![
                Column::from_strs("letter", ScalarType::String, &["A", "B", "A", "C", "B"]),
                Column::from_strs("flag", ScalarType::Boolean, &["true", "false", "true", "true", "false"]),
            ],
        )
    }

    #[test]
    fn flags_later_occurrences_only() {
        assert_eq!(letters().detect_duplicates(), vec![2, 4]);
    }

    #[test]
    fn removal_preserves_order() {
        let table = letters();
        let deduplicated = table.remove_duplicates();
        assert_eq!(deduplicated.column("letter").unwrap().values, vec!["A", "B", "C"]);
        assert_eq!(table.row_count(), 5);
        assert!(deduplicated.history().is_empty());
    }

    #[test]
    fn rows_differing_in_any_column_are_distinct() {
        let mut table = letters();
        table.set_value("false", 2, 1);
        assert_eq!(table.detect_duplicates(), vec![4]);
    }

    #[test]
    fn comparison_uses_raw_text() {
        let table = Table::from_columns(
            "n",
            vec![Column::from_strs("v", ScalarType::Double, &["1", "1.0", "1"])],
        );
        assert_eq!(table.detect_duplicates(), vec![2]);
    }
}
