//! Command-line arguments.

use clap::{Parser, Subcommand};
use pipelinehub_core::RecordId;

/// PipelineHub CRM records from the command line
#[derive(Parser, Debug)]
#[command(name = "pipelinehub", author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Subcommand
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Inspect or create the configuration file
    Config {
        /// Config action
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// List records of one entity type
    List(ListArgs),

    /// Show the pipeline board and summary
    Pipeline {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show the activity feed and weekly statistics
    Activities {
        /// Activity type to show
        #[arg(long = "type", default_value = "all")]
        activity_type: String,

        /// Time window: all, today, week or month
        #[arg(long, default_value = "all")]
        window: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Move a deal to another pipeline stage
    MoveDeal {
        /// Deal id
        id: RecordId,

        /// Target stage name
        stage: String,
    },
}

/// Config subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    /// Print the resolved config file path
    Path,

    /// Print a value by dotted key, e.g. `api.base_url`
    Get {
        /// Dotted key
        key: String,
    },

    /// Set a value by dotted key in the config file
    Set {
        /// Dotted key
        key: String,
        /// New value
        value: String,
    },

    /// Write a default config file
    Init {
        /// Target file instead of the default location
        #[arg(long)]
        file: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Arguments of `list`.
#[derive(clap::Args, Debug, Clone, Default, PartialEq)]
pub struct ListArgs {
    /// Entity type, e.g. contacts, deals, sales-orders
    pub entity: String,

    /// Case-insensitive search text
    #[arg(short, long)]
    pub search: Option<String>,

    /// Facet filter as `facet=value`; repeatable
    #[arg(short, long = "filter", value_name = "FACET=VALUE")]
    pub filters: Vec<String>,

    /// Sort key (a field name such as `name` or `updatedAt`)
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}
