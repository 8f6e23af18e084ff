#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tablekit::{Column, ScalarType, Table};
use tempfile::{TempDir, tempdir};

pub const ORDERS_CSV: &str = "\
id,customer,region,amount,shipped
1,ann,east,120.5,true
2,bob,west,80,false
3,cy,east,99,true
4,dee,,15.25,false
2,bob,west,80,false
";

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.temp_dir.path().join(name)).expect("read output file")
    }
}

pub fn tablekit() -> Command {
    Command::cargo_bin("tablekit").expect("binary exists")
}

pub fn column(name: &str, data_type: ScalarType, values: &[&str]) -> Column {
    Column::from_strs(name, data_type, values)
}

pub fn table(name: &str, columns: Vec<Column>) -> Table {
    Table::from_columns(name, columns)
}

/// Rows as owned strings, for comparisons that outlive the table borrow.
pub fn rows(table: &Table) -> Vec<Vec<String>> {
    table
        .rows()
        .map(|row| row.into_iter().map(str::to_string).collect())
        .collect()
}
