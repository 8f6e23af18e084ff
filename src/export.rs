use std::{fs, path::Path};

use anyhow::{Context, Result};
use itertools::Itertools;
use serde_json::Value;

use crate::table::Table;

impl Table {
    /// Header line followed by one line per row, each terminated by `\n`.
    pub fn to_csv(&self, delimiter: &str) -> String {
        let mut out = String::with_capacity(self.metadata.memory_usage + self.row_count() * 2);
        out.push_str(&self.columns.iter().map(|c| c.name.as_str()).join(delimiter));
        out.push('\n');
        for row in self.rows() {
            out.push_str(&row.join(delimiter));
            out.push('\n');
        }
        out
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("Serializing table to JSON")
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Serializing table to JSON")
    }

    pub fn from_json(text: &str) -> Result<Table> {
        let value: Value = serde_json::from_str(text).context("Parsing table JSON")?;
        Self::from_json_value(value)
    }

    /// Stored counts are recomputed from the columns, and ragged columns are
    /// padded.
    pub fn from_json_value(value: Value) -> Result<Table> {
        let mut table: Table =
            serde_json::from_value(value).context("Decoding table from JSON")?;
        table.restore_invariant();
        Ok(table)
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = self.to_json_pretty()?;
        fs::write(path, json).with_context(|| format!("Writing table to {path:?}"))
    }

    pub fn load_json(path: &Path) -> Result<Table> {
        let text =
            fs::read_to_string(path).with_context(|| format!("Reading table from {path:?}"))?;
        Self::from_json(&text).with_context(|| format!("Loading table from {path:?}"))
    }
}
