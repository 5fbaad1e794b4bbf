use clap::{Args, Parser, Subcommand, ValueEnum};
use domain::lag_alert::entity::LagRuleId;
use infrastructure::config::{LogFormat, LogLevel};
use infrastructure::constants::DEFAULT_CONFIG_PATH;

#[derive(Parser, Debug)]
#[command(
    name = "lagwatch",
    about = "Manage Kafka consumer lag alert rules",
    version = env!("CARGO_PKG_VERSION"),
)]
pub struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, env = "LAGWATCH_CONFIG")]
    pub config: String,

    /// Log level override (takes precedence over config file)
    #[arg(short, long, global = true)]
    pub log_level: Option<LogLevel>,

    /// Log format override: json or text
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,

    /// Output format
    #[arg(short, long, default_value = "table", global = true)]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table (default)
    Table,
    /// JSON document
    Json,
}

/// Cluster every rule operation is scoped to.
#[derive(Args, Debug, Clone)]
pub struct ClusterArgs {
    /// Kafka cluster name
    #[arg(long, env = "LAGWATCH_CLUSTER")]
    pub cluster: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Display version information
    Version,

    /// Register a lag alert rule
    Create {
        #[command(flatten)]
        target: ClusterArgs,
        /// Consumer group
        #[arg(long)]
        group: String,
        /// Topic consumed by the group
        #[arg(long)]
        topic: String,
        /// Lag (in messages) above which the alert fires
        #[arg(long)]
        threshold: String,
        /// Contact notified when the alert fires
        #[arg(long)]
        owner: String,
    },

    /// List lag alert rules of a cluster
    List {
        #[command(flatten)]
        target: ClusterArgs,
        /// Case-insensitive match on group, topic or owner
        #[arg(long)]
        search: Option<String>,
        /// Rows to skip
        #[arg(long, default_value_t = 0)]
        offset: usize,
        /// Page size (defaults to `listing.default_page_size`)
        #[arg(long)]
        limit: Option<usize>,
        /// Request counter echoed back in JSON output
        #[arg(long, default_value_t = 0)]
        echo: u64,
    },

    /// Show a single rule
    Show {
        #[command(flatten)]
        target: ClusterArgs,
        /// Rule ID
        id: LagRuleId,
    },

    /// Change the threshold and owner of a rule
    Update {
        #[command(flatten)]
        target: ClusterArgs,
        /// Rule ID
        id: LagRuleId,
        /// New lag threshold
        #[arg(long)]
        threshold: String,
        /// New owner contact
        #[arg(long)]
        owner: String,
    },

    /// Delete a rule
    Delete {
        #[command(flatten)]
        target: ClusterArgs,
        /// Rule ID
        id: LagRuleId,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}
