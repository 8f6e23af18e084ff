use std::{
    fs::{self, File},
    io::{self, BufReader, Read},
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use anyhow::Context;
use encoding_rs::{Encoding, UTF_8};
use log::{debug, info};
use serde_json::Value;
use thiserror::Error;

use crate::{cli::InputArgs, io_utils, table::Table};

pub const DEFAULT_MAX_BYTES: u64 = 100 * 1024 * 1024;
pub const DEFAULT_PROGRESS_INTERVAL: usize = 1_000;

/// Formats the file picker recognises but this importer cannot decode.
const RECOGNIZED_UNSUPPORTED: &[&str] = &["las", "ply", "obj", "stl", "usdz"];

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("access denied")]
    AccessDenied,
    #[error("file not found")]
    FileNotFound,
    #[error("invalid file format")]
    InvalidFormat,
    #[error("file is empty")]
    EmptyFile,
    #[error("corrupted data: {0}")]
    CorruptedData(String),
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("file exceeds the import size limit")]
    MemoryLimit,
    #[error("import cancelled")]
    Cancelled,
    #[error("unknown import error: {0}")]
    Unknown(String),
}

impl From<io::Error> for ImportError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => ImportError::FileNotFound,
            io::ErrorKind::PermissionDenied => ImportError::AccessDenied,
            _ => ImportError::Unknown(err.to_string()),
        }
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CorruptedData(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Csv,
    Tsv,
    Json,
}

impl ImportFormat {
    pub fn from_extension(extension: &str) -> Result<Self, ImportError> {
        match extension.to_ascii_lowercase().as_str() {
            "csv" | "txt" => Ok(ImportFormat::Csv),
            "tsv" => Ok(ImportFormat::Tsv),
            "json" => Ok(ImportFormat::Json),
            other => {
                if RECOGNIZED_UNSUPPORTED.contains(&other) {
                    debug!("'{other}' files are recognised but cannot be imported as tables");
                }
                Err(ImportError::UnsupportedFormat(other.to_string()))
            }
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ImportError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        Self::from_extension(extension)
    }

    pub fn default_delimiter(&self) -> u8 {
        match self {
            ImportFormat::Tsv => io_utils::DEFAULT_TSV_DELIMITER,
            _ => io_utils::DEFAULT_CSV_DELIMITER,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub delimiter: Option<u8>,
    pub encoding: &'static Encoding,
    pub has_headers: bool,
    pub max_bytes: u64,
    pub progress_interval: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            encoding: UTF_8,
            has_headers: true,
            max_bytes: DEFAULT_MAX_BYTES,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

type ProgressCallback<'a> = Box<dyn FnMut(f64) + 'a>;

pub struct Importer<'a> {
    options: ImportOptions,
    progress: Option<ProgressCallback<'a>>,
    cancel: Option<Arc<AtomicBool>>,
}

struct Records {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl<'a> Importer<'a> {
    pub fn new(options: ImportOptions) -> Self {
        Self {
            options,
            progress: None,
            cancel: None,
        }
    }

    /// Receives the completed fraction in `[0, 1]` at every checkpoint and
    /// `1.0` once the import finishes.
    pub fn with_progress(mut self, callback: impl FnMut(f64) + 'a) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    pub fn import_path(&mut self, path: &Path) -> Result<Table, ImportError> {
        let format = ImportFormat::from_path(path)?;
        let size = fs::metadata(path)?.len();
        if size > self.options.max_bytes {
            return Err(ImportError::MemoryLimit);
        }
        if size == 0 {
            return Err(ImportError::EmptyFile);
        }
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("table")
            .to_string();
        let reader = BufReader::new(File::open(path)?);
        let source = path.display().to_string();
        self.import_source(&name, reader, format, Some(&source))
    }

    pub fn import_reader<R: Read>(
        &mut self,
        name: &str,
        reader: R,
        format: ImportFormat,
    ) -> Result<Table, ImportError> {
        self.import_source(name, reader, format, None)
    }

    fn import_source<R: Read>(
        &mut self,
        name: &str,
        reader: R,
        format: ImportFormat,
        source: Option<&str>,
    ) -> Result<Table, ImportError> {
        self.ensure_not_cancelled()?;
        let mut bytes = Vec::new();
        reader
            .take(self.options.max_bytes.saturating_add(1))
            .read_to_end(&mut bytes)?;
        if bytes.len() as u64 > self.options.max_bytes {
            return Err(ImportError::MemoryLimit);
        }
        let (text, _, had_errors) = self.options.encoding.decode(&bytes);
        if had_errors {
            return Err(ImportError::CorruptedData(format!(
                "input is not valid {}",
                self.options.encoding.name()
            )));
        }
        if text.trim().is_empty() {
            return Err(ImportError::EmptyFile);
        }

        let delimiter = self
            .options
            .delimiter
            .unwrap_or_else(|| format.default_delimiter());
        let table = match format {
            ImportFormat::Csv | ImportFormat::Tsv => {
                let records = self.read_delimited(&text, delimiter)?;
                let mut table = self.build(name, records, source);
                table.metadata.delimiter = (delimiter as char).to_string();
                table
            }
            ImportFormat::Json => self.read_json(name, &text, source)?,
        };
        self.report(1.0);
        info!(
            "Imported {} row(s) and {} column(s) into '{}'",
            table.row_count(),
            table.column_count(),
            table.name
        );
        Ok(table)
    }

    /// Serialized tables keep their stored metadata; everything else is
    /// stamped with the options used to read it.
    fn build(&self, name: &str, records: Records, source: Option<&str>) -> Table {
        let mut table = Table::from_records(name, &records.headers, &records.rows, source);
        table.metadata.encoding = self.options.encoding.name().to_ascii_lowercase();
        table.metadata.has_headers = self.options.has_headers;
        table
    }

    fn read_delimited(&mut self, text: &str, delimiter: u8) -> Result<Records, ImportError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(text.as_bytes());
        let total = text.len().max(1) as f64;

        let mut headers = None;
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let cells = record.iter().map(str::to_string).collect::<Vec<_>>();
            if self.options.has_headers && headers.is_none() {
                headers = Some(cells);
                continue;
            }
            rows.push(cells);
            let position = record.position().map(|p| p.byte()).unwrap_or(0);
            self.checkpoint(rows.len(), position as f64 / total)?;
        }

        let headers = match headers {
            Some(headers) => headers,
            None => synthetic_headers(rows.iter().map(Vec::len).max().unwrap_or(0)),
        };
        if headers.is_empty() {
            return Err(ImportError::EmptyFile);
        }
        debug!(
            "Parsed {} header(s) and {} row(s) with delimiter '{}'",
            headers.len(),
            rows.len(),
            io_utils::printable_delimiter(delimiter)
        );
        Ok(Records { headers, rows })
    }

    fn read_json(
        &mut self,
        name: &str,
        text: &str,
        source: Option<&str>,
    ) -> Result<Table, ImportError> {
        let value: Value = serde_json::from_str(text).map_err(|err| {
            debug!("Rejecting JSON input: {err}");
            ImportError::InvalidFormat
        })?;
        if value.is_object() && value.get("columns").is_some() {
            let mut table = Table::from_json_value(value).map_err(|err| {
                debug!("Rejecting serialized table: {err}");
                ImportError::InvalidFormat
            })?;
            if let Some(src) = source {
                table.metadata.source = Some(src.to_string());
            }
            return Ok(table);
        }
        match value {
            Value::Array(items) => {
                let records = self.json_records(&items)?;
                Ok(self.build(name, records, source))
            }
            _ => Err(ImportError::InvalidFormat),
        }
    }

    fn json_records(&mut self, items: &[Value]) -> Result<Records, ImportError> {
        if items.is_empty() {
            return Err(ImportError::EmptyFile);
        }
        let total = items.len() as f64;

        if items.iter().all(Value::is_object) {
            let mut headers: Vec<String> = Vec::new();
            for item in items {
                if let Value::Object(map) = item {
                    for key in map.keys() {
                        if !headers.contains(key) {
                            headers.push(key.clone());
                        }
                    }
                }
            }
            let mut rows = Vec::with_capacity(items.len());
            for item in items {
                let row = headers
                    .iter()
                    .map(|header| item.get(header).map(json_cell).unwrap_or_default())
                    .collect();
                rows.push(row);
                self.checkpoint(rows.len(), rows.len() as f64 / total)?;
            }
            return Ok(Records { headers, rows });
        }

        if items.iter().all(Value::is_array) {
            let mut arrays = items.iter().filter_map(Value::as_array);
            let first = arrays.next().map(|a| a.iter().map(json_cell).collect::<Vec<_>>());
            let mut rows = Vec::new();
            let headers = if self.options.has_headers {
                first.unwrap_or_default()
            } else {
                rows.extend(first);
                Vec::new()
            };
            for array in arrays {
                rows.push(array.iter().map(json_cell).collect::<Vec<_>>());
                self.checkpoint(rows.len(), rows.len() as f64 / total)?;
            }
            let headers = if self.options.has_headers {
                headers
            } else {
                synthetic_headers(rows.iter().map(Vec::len).max().unwrap_or(0))
            };
            return Ok(Records { headers, rows });
        }

        Err(ImportError::InvalidFormat)
    }

    fn checkpoint(&mut self, rows: usize, fraction: f64) -> Result<(), ImportError> {
        let interval = self.options.progress_interval;
        if interval == 0 || !rows.is_multiple_of(interval) {
            return Ok(());
        }
        self.ensure_not_cancelled()?;
        self.report(fraction.clamp(0.0, 1.0));
        Ok(())
    }

    fn ensure_not_cancelled(&self) -> Result<(), ImportError> {
        match &self.cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(ImportError::Cancelled),
            _ => Ok(()),
        }
    }

    fn report(&mut self, fraction: f64) {
        if let Some(callback) = self.progress.as_mut() {
            callback(fraction);
        }
    }
}

fn synthetic_headers(count: usize) -> Vec<String> {
    (1..=count).map(|idx| format!("column_{idx}")).collect()
}

fn json_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Imports the table described by shared CLI input flags. `-` reads CSV from
/// stdin.
pub fn load_table(args: &InputArgs) -> anyhow::Result<Table> {
    let options = ImportOptions {
        delimiter: args.delimiter,
        encoding: io_utils::resolve_encoding(args.input_encoding.as_deref())?,
        has_headers: !args.no_headers,
        ..ImportOptions::default()
    };
    let mut importer = Importer::new(options)
        .with_progress(|fraction| debug!("Import progress: {:.0}%", fraction * 100.0));
    let table = if io_utils::is_dash(&args.input) {
        importer.import_reader("stdin", io::stdin().lock(), ImportFormat::Csv)
    } else {
        importer.import_path(&args.input)
    };
    table.with_context(|| format!("Importing {:?}", args.input))
}
