use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::{fill::FillStrategy, join::JoinKind, stats::AggregateFunction};

#[derive(Debug, Parser)]
#[command(author, version, about = "Inspect and reshape tabular data in memory", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Infer column types and print a schema summary
    Probe(ProbeArgs),
    /// Preview the first few rows in a formatted table
    Preview(PreviewArgs),
    /// Produce per-column summary statistics
    Stats(StatsArgs),
    /// Sort rows by one column
    Sort(SortArgs),
    /// Keep rows matching filter conditions or expressions
    Filter(FilterArgs),
    /// Partition rows by a column and summarise each group
    Group(GroupArgs),
    /// Reshape long data into a wide table
    Pivot(PivotArgs),
    /// Join two tables on a shared key column
    Join(JoinArgs),
    /// Remove (or report) duplicate rows
    Dedup(DedupArgs),
    /// Replace empty cells using a fill strategy
    Fill(FillArgs),
    /// Re-export a table as CSV or JSON
    Convert(ConvertArgs),
}

/// Input options shared by every command that reads a table.
#[derive(Debug, Args, Clone)]
pub struct InputArgs {
    /// Input file (.csv, .tsv, .json)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Field delimiter for delimited input (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Treat the first row as data and synthesize column names
    #[arg(long = "no-headers")]
    pub no_headers: bool,
}

/// Output options shared by every command that writes a table.
#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    /// Output file (stdout if omitted); a .json extension writes the serialized table
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Delimiter for CSV output (defaults to the output extension, then ',')
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
}

#[derive(Debug, Args)]
pub struct ProbeArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Write the inferred column list as YAML to this path
    #[arg(long)]
    pub schema: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Number of rows to display
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Restrict statistics to these columns
    #[arg(short = 'C', long = "columns", value_delimiter = ',')]
    pub columns: Vec<String>,
}

#[derive(Debug, Args)]
pub struct SortArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub output: OutputArgs,
    /// Column to sort by
    #[arg(long)]
    pub by: String,
    /// Sort in descending order
    #[arg(long)]
    pub descending: bool,
}

#[derive(Debug, Args)]
pub struct FilterArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub output: OutputArgs,
    /// Row-level filters such as `amount>=100` or `status = shipped`
    #[arg(long = "filter", action = clap::ArgAction::Append)]
    pub filters: Vec<String>,
    /// Boolean expressions evaluated per row, e.g. `qty * price > 100`
    #[arg(long = "filter-expr", action = clap::ArgAction::Append)]
    pub filter_exprs: Vec<String>,
}

#[derive(Debug, Args)]
pub struct GroupArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Column whose values define the groups
    #[arg(long)]
    pub by: String,
    /// Aggregate to compute per group
    #[arg(long, requires = "column")]
    pub aggregate: Option<AggregateFunction>,
    /// Numeric column the aggregate is computed over
    #[arg(long)]
    pub column: Option<String>,
}

#[derive(Debug, Args)]
pub struct PivotArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub output: OutputArgs,
    /// Column providing the output rows
    #[arg(long)]
    pub index: String,
    /// Column providing the output column names
    #[arg(long)]
    pub columns: String,
    /// Column providing the cell values
    #[arg(long)]
    pub values: String,
}

#[derive(Debug, Args)]
pub struct JoinArgs {
    /// Left input file
    #[arg(long)]
    pub left: PathBuf,
    /// Right input file
    #[arg(long)]
    pub right: PathBuf,
    /// Key column present in both inputs
    #[arg(long)]
    pub on: String,
    /// Join strategy
    #[arg(long, default_value = "inner")]
    pub how: JoinKind,
    /// Field delimiter for delimited inputs
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args)]
pub struct DedupArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub output: OutputArgs,
    /// Print the indices of duplicate rows instead of writing a table
    #[arg(long)]
    pub report: bool,
}

#[derive(Debug, Args)]
pub struct FillArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub output: OutputArgs,
    /// How empty cells are replaced
    #[arg(long, value_enum)]
    pub strategy: FillMethod,
    /// Replacement text for the `constant` strategy
    #[arg(long, required_if_eq("strategy", "constant"))]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum FillMethod {
    Mean,
    Median,
    Mode,
    Forward,
    Backward,
    Constant,
}

impl FillArgs {
    pub fn fill_strategy(&self) -> FillStrategy {
        match self.strategy {
            FillMethod::Mean => FillStrategy::Mean,
            FillMethod::Median => FillStrategy::Median,
            FillMethod::Mode => FillStrategy::Mode,
            FillMethod::Forward => FillStrategy::Forward,
            FillMethod::Backward => FillStrategy::Backward,
            FillMethod::Constant => FillStrategy::Constant(self.value.clone().unwrap_or_default()),
        }
    }
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub output: OutputArgs,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        "comma" => Ok(b','),
        "semicolon" => Ok(b';'),
        "pipe" => Ok(b'|'),
        other if other.len() == 1 && other.is_ascii() => Ok(other.as_bytes()[0]),
        other => Err(format!(
            "Unsupported delimiter '{other}'. Use a single ASCII character or one of: tab, comma, semicolon, pipe"
        )),
    }
}
