pub mod cli;
pub mod column;
pub mod convert;
pub mod data;
pub mod dedup;
pub mod export;
pub mod expr;
pub mod fill;
pub mod filter;
pub mod groupby;
pub mod history;
pub mod import;
pub mod infer;
pub mod io_utils;
pub mod join;
pub mod mutate;
pub mod pivot;
pub mod render;
pub mod sort;
pub mod stats;
pub mod table;
pub mod types;

pub use column::{Column, ColumnId, ColumnMetadata};
pub use history::{History, Operation, OperationKind};
pub use import::{ImportError, ImportFormat, ImportOptions, Importer};
pub use join::JoinKind;
pub use fill::FillStrategy;
pub use stats::{AggregateFunction, ColumnStatistics};
pub use table::{Table, TableMetadata};
pub use types::ScalarType;

use std::{env, fs, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};
use serde::Serialize;

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("tablekit", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Probe(args) => handle_probe(&args),
        Commands::Preview(args) => handle_preview(&args),
        Commands::Stats(args) => stats::execute(&args),
        Commands::Sort(args) => sort::execute(&args),
        Commands::Filter(args) => filter::execute(&args),
        Commands::Group(args) => groupby::execute(&args),
        Commands::Pivot(args) => pivot::execute(&args),
        Commands::Join(args) => join::execute(&args),
        Commands::Dedup(args) => dedup::execute(&args),
        Commands::Fill(args) => fill::execute(&args),
        Commands::Convert(args) => handle_convert(&args),
    }
}

#[derive(Debug, Serialize)]
struct SchemaColumn {
    name: String,
    data_type: ScalarType,
    nullable: bool,
}

fn handle_probe(args: &cli::ProbeArgs) -> Result<()> {
    let table = import::load_table(&args.input)?;
    let rows = table
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            let stats = ColumnStatistics::compute(column);
            vec![
                (idx + 1).to_string(),
                column.name.clone(),
                column.data_type.to_string(),
                stats.null_count.to_string(),
                stats.unique_count.to_string(),
            ]
        })
        .collect::<Vec<_>>();
    let headers = ["#", "name", "type", "nulls", "unique"].map(String::from).to_vec();
    render::print_rows(&headers, &rows);

    if let Some(path) = &args.schema {
        let schema = table
            .columns()
            .iter()
            .map(|column| SchemaColumn {
                name: column.name.clone(),
                data_type: column.data_type,
                nullable: column.values.iter().any(String::is_empty),
            })
            .collect::<Vec<_>>();
        let yaml = serde_yaml::to_string(&schema).context("Serializing schema to YAML")?;
        fs::write(path, yaml).with_context(|| format!("Writing schema to {path:?}"))?;
        info!("Schema for {} column(s) written to {path:?}", schema.len());
    }
    info!(
        "Probed {} row(s) across {} column(s)",
        table.row_count(),
        table.column_count()
    );
    Ok(())
}

fn handle_preview(args: &cli::PreviewArgs) -> Result<()> {
    let table = import::load_table(&args.input)?;
    print!("{}", render::render_table(&table, Some(args.rows)));
    info!(
        "Displayed {} of {} row(s)",
        args.rows.min(table.row_count()),
        table.row_count()
    );
    Ok(())
}

fn handle_convert(args: &cli::ConvertArgs) -> Result<()> {
    let table = import::load_table(&args.input)?;
    io_utils::write_table(&table, &args.output)
}
