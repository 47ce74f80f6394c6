//! ansq cli interface

use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Formatter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Change the work directory
    ///
    /// Can be specified multiple times. Note that all
    /// paths on the way to the final path must exist.
    ///
    /// This is equivalent to running { cd <directory>; ansq ... }
    #[clap(short = 'C', long = "directory", global(true))]
    pub directory: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the rows of a table
    #[command(alias = "q")]
    Query(QueryCommand),
}

#[derive(Parser, Debug)]
pub struct QueryCommand {
    /// Table to read
    pub table: TableArg,

    #[clap(flatten)]
    pub input: InputArgs,

    #[clap(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser, Debug)]
pub struct InputArgs {
    /// Connection config file (HCL)
    #[clap(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Name of the connection block to use
    ///
    /// Defaults to the first `connection` block of the config file.
    #[clap(long = "connection", requires("config"))]
    pub connection: Option<String>,

    /// Add an inventory glob pattern
    #[clap(short = 'i', long = "inventory")]
    pub inventory: Vec<String>,

    /// Add a playbook glob pattern
    #[clap(short = 'p', long = "playbook")]
    pub playbook: Vec<String>,

    /// Read only this file, ignoring all patterns
    #[clap(long = "path")]
    pub path: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct OutputArgs {
    #[arg(short = 'F', long = "output-format", default_value_t)]
    pub format: OutputFormat,

    /// Stop after this many rows
    #[arg(short = 'n', long = "limit")]
    pub limit: Option<usize>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum TableArg {
    Group,
    Host,
    Playbook,
    Task,
}

impl From<TableArg> for ansq::Table {
    fn from(value: TableArg) -> Self {
        match value {
            TableArg::Group => ansq::Table::Group,
            TableArg::Host => ansq::Table::Host,
            TableArg::Playbook => ansq::Table::Playbook,
            TableArg::Task => ansq::Table::Task,
        }
    }
}

#[derive(ValueEnum, Clone, Default, Debug)]
pub enum OutputFormat {
    Json,
    Jsonl,
    #[default]
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Jsonl => f.write_str("jsonl"),
            OutputFormat::Yaml => f.write_str("yaml"),
        }
    }
}
