mod cmd;
mod logging;

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "mbk",
    version,
    about = "Index and search markdown memory banks by frontmatter metadata"
)]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate configuration and print resolved paths
    Doctor,

    /// Rebuild the metadata index from scratch
    Reindex,

    /// Search the index by metadata and free text
    Search(SearchArgs),

    /// Print the index entry of one file as JSON
    Show(PathArgs),

    /// Re-index a single file
    Update(PathArgs),

    /// Drop a single file from the index
    Remove(PathArgs),

    /// Aggregate statistics over the index
    Stats(FormatArgs),

    /// Tag usage counts
    Tags(FormatArgs),

    /// File type counts
    Types(FormatArgs),
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    /// Paths only
    Quiet,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortArg {
    Created,
    Updated,
    Title,
    Size,
    Lines,
    Relevance,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OrderArg {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusArg {
    Valid,
    Invalid,
    Unchecked,
    SchemaNotFound,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Free-text query matched against title, description, path, type and tags
    pub query: Option<String>,

    /// Exact document type (e.g. "progress")
    #[arg(long = "type")]
    pub r#type: Option<String>,

    /// Match entries carrying any of these tags (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    #[arg(long, value_enum)]
    pub status: Option<StatusArg>,

    /// Lower bound on `created` (e.g. 2024-01-31 or RFC 3339)
    #[arg(long, value_parser = cmd::search::parse_date_arg)]
    pub created_after: Option<chrono::DateTime<chrono::Utc>>,

    #[arg(long, value_parser = cmd::search::parse_date_arg)]
    pub created_before: Option<chrono::DateTime<chrono::Utc>>,

    #[arg(long, value_parser = cmd::search::parse_date_arg)]
    pub updated_after: Option<chrono::DateTime<chrono::Utc>>,

    #[arg(long, value_parser = cmd::search::parse_date_arg)]
    pub updated_before: Option<chrono::DateTime<chrono::Utc>>,

    #[arg(long)]
    pub min_size: Option<u64>,

    #[arg(long)]
    pub max_size: Option<u64>,

    #[arg(long)]
    pub min_lines: Option<usize>,

    #[arg(long)]
    pub max_lines: Option<usize>,

    /// Sort field; defaults to relevance when a query is given
    #[arg(long, value_enum)]
    pub sort: Option<SortArg>,

    #[arg(long, value_enum, default_value_t = OrderArg::Desc)]
    pub order: OrderArg,

    #[arg(long, default_value_t = membank_core::search::DEFAULT_LIMIT)]
    pub limit: usize,

    #[arg(long, default_value_t = 0)]
    pub offset: usize,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Shorthand for `--output json`
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct PathArgs {
    /// File path, relative to the bank root
    pub path: String,
}

#[derive(Debug, Args)]
pub struct FormatArgs {
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = cli.config.as_deref();
    let profile = cli.profile.as_deref();

    match cli.command {
        Commands::Doctor => cmd::doctor::run(config, profile),
        Commands::Reindex => cmd::reindex::run(config, profile).await,
        Commands::Search(args) => cmd::search::run(config, profile, args).await,
        Commands::Show(args) => cmd::entry::show(config, profile, &args.path).await,
        Commands::Update(args) => cmd::entry::update(config, profile, &args.path).await,
        Commands::Remove(args) => cmd::entry::remove(config, profile, &args.path).await,
        Commands::Stats(args) => cmd::stats::stats(config, profile, args.json).await,
        Commands::Tags(args) => cmd::stats::tags(config, profile, args.json).await,
        Commands::Types(args) => cmd::stats::types(config, profile, args.json).await,
    }
}
