use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "evalcat",
    version,
    about = "Compare ranked search results across systems and queries"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Summary(SummaryArgs),
    Frame(FrameArgs),
    Rbo(RboArgs),
}

#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// JSON document shaped `{"system": {"query": [item, ...]}}`.
    #[arg(long)]
    pub results: PathBuf,

    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Canonical query order; defaults to the first system's order.
    #[arg(long, value_delimiter = ',')]
    pub queries: Vec<String>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[arg(long)]
    pub depth: Option<usize>,
}

#[derive(Args, Debug, Clone)]
#[command(group(ArgGroup::new("slice").required(true).args(["system", "by_query", "metric"])))]
pub struct FrameArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[arg(long)]
    pub depth: Option<usize>,

    #[arg(long)]
    pub field: String,

    /// Queries against metrics for one system.
    #[arg(long)]
    pub system: Option<String>,

    /// Systems against metrics for one query.
    #[arg(long = "query")]
    pub by_query: Option<String>,

    /// Systems against queries for one metric.
    #[arg(long)]
    pub metric: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct RboArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[arg(long)]
    pub identifier: Option<String>,

    #[arg(long = "system")]
    pub systems: Vec<String>,

    #[arg(long)]
    pub p: Option<f64>,
}
