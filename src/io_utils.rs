use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use encoding_rs::{Encoding, UTF_8};
use log::info;

use crate::{cli::OutputArgs, table::Table};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn resolve_output_delimiter(path: Option<&Path>, provided: Option<u8>, fallback: u8) -> u8 {
    if let Some(delim) = provided {
        return delim;
    }
    if let Some(path) = path {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => return DEFAULT_TSV_DELIMITER,
            Some(ext) if ext.eq_ignore_ascii_case("csv") => return DEFAULT_CSV_DELIMITER,
            _ => {}
        }
    }
    fallback
}

pub fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}

fn is_json_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

pub fn write_table(table: &Table, output: &OutputArgs) -> Result<()> {
    let path = output.output.as_deref().filter(|p| !is_dash(p));
    let body = match path {
        Some(p) if is_json_path(p) => {
            let mut json = table.to_json_pretty()?;
            json.push('\n');
            json
        }
        _ => {
            let delimiter =
                resolve_output_delimiter(path, output.output_delimiter, DEFAULT_CSV_DELIMITER);
            table.to_csv(&(delimiter as char).to_string())
        }
    };

    let mut writer: Box<dyn Write> = match path {
        Some(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
        )),
        None => Box::new(io::stdout().lock()),
    };
    writer
        .write_all(body.as_bytes())
        .context("Writing table output")?;
    writer.flush().context("Flushing table output")?;

    if let Some(p) = path {
        info!(
            "Wrote {} row(s) and {} column(s) to {p:?}",
            table.row_count(),
            table.column_count()
        );
    }
    Ok(())
}
