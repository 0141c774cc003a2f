use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};

use crate::output::OutputFormat;

/// Top-level CLI parser for the `gateway` binary.
#[derive(Debug, Parser)]
#[command(name = "gateway", version, about = "Gateway command-line client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalFlags,
}

/// Flags accepted before or after any subcommand.
#[derive(Debug, Clone, Args)]
pub struct GlobalFlags {
    /// Gateway host name or IP
    #[arg(long, global = true)]
    pub address: Option<String>,

    /// Gateway port
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// Use plain HTTP instead of HTTPS
    #[arg(long, global = true)]
    pub insecure: bool,

    /// Directory holding credentials and stored options (default ~/.gateway)
    #[arg(long, global = true)]
    pub base_path: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "json")]
    pub output: OutputFormat,

    /// Debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Organization to act on (falls back to the stored option)
    #[arg(long, global = true)]
    pub organization_id: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage stored credentials
    Session {
        #[command(subcommand)]
        action: SessionCommands,
    },
    /// Resource overview of the organization
    Resources {
        #[command(subcommand)]
        action: ResourcesCommands,
    },
    /// Organization related operations
    #[command(name = "organization", visible_alias = "org")]
    Organization {
        #[command(subcommand)]
        action: OrganizationCommands,
    },
    /// Users of the organization
    User {
        #[command(subcommand)]
        action: UserCommands,
    },
    /// Clusters of the organization
    Cluster {
        #[command(subcommand)]
        action: ClusterCommands,
    },
    /// Nodes of a cluster
    Node {
        #[command(subcommand)]
        action: NodeCommands,
    },
    /// Unified logging
    Log {
        #[command(subcommand)]
        action: LogCommands,
    },
    /// Manage default values for command parameters
    #[command(name = "option", visible_alias = "options")]
    Options {
        #[command(subcommand)]
        action: OptionCommands,
    },
}

#[derive(Debug, Subcommand)]
pub enum SessionCommands {
    /// Store the tokens returned by a login
    Store {
        #[arg(long)]
        token: String,
        #[arg(long)]
        refresh_token: String,
    },
    /// Show whether credentials are stored
    Show,
}

#[derive(Debug, Subcommand)]
pub enum ResourcesCommands {
    /// Count clusters and nodes
    Summary,
}

#[derive(Debug, Subcommand)]
pub enum OrganizationCommands {
    /// Retrieve organization information
    #[command(visible_alias = "get")]
    Info,
}

#[derive(Debug, Subcommand)]
pub enum UserCommands {
    Info {
        #[arg(long)]
        email: String,
    },
    List,
}

#[derive(Debug, Subcommand)]
pub enum ClusterCommands {
    List,
    Info { cluster_id: String },
    /// Manage cluster labels
    #[command(visible_aliases = ["labels", "l"])]
    Label {
        #[command(subcommand)]
        action: LabelCommands,
    },
}

#[derive(Debug, Subcommand)]
pub enum LabelCommands {
    /// Add a set of labels to a cluster
    Add {
        cluster_id: String,
        /// Labels separated by `;` as in `key1:value;key2:value`
        #[arg(value_parser = parse_labels)]
        labels: BTreeMap<String, String>,
    },
    /// Remove a set of labels from a cluster
    #[command(visible_aliases = ["remove", "del"])]
    Delete {
        cluster_id: String,
        #[arg(value_parser = parse_labels)]
        labels: BTreeMap<String, String>,
    },
}

/// Parse `key1:value;key2:value`; a key without `:` gets an empty value.
pub fn parse_labels(raw: &str) -> Result<BTreeMap<String, String>, String> {
    let mut labels = BTreeMap::new();
    for pair in raw.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once(':').unwrap_or((pair, ""));
        let key = key.trim();
        if key.is_empty() {
            return Err(format!("label `{pair}` has no key"));
        }
        labels.insert(key.to_string(), value.trim().to_string());
    }
    if labels.is_empty() {
        return Err("at least one label is required".to_string());
    }
    Ok(labels)
}

#[derive(Debug, Subcommand)]
pub enum NodeCommands {
    List { cluster_id: String },
}

#[derive(Debug, Subcommand)]
pub enum LogCommands {
    /// Search log entries (timestamps in RFC 3339)
    Search {
        #[arg(long)]
        app_instance_id: Option<String>,
        /// Only entries whose message contains this text
        #[arg(long)]
        filter: Option<String>,
        #[arg(long)]
        from: Option<DateTime<Utc>>,
        #[arg(long)]
        to: Option<DateTime<Utc>>,
    },
}

#[derive(Debug, Subcommand)]
pub enum OptionCommands {
    Set {
        #[arg(long)]
        key: String,
        #[arg(long)]
        value: String,
    },
    #[command(visible_alias = "info")]
    Get {
        #[arg(long)]
        key: String,
    },
    #[command(visible_aliases = ["remove", "rm"])]
    Delete {
        #[arg(long)]
        key: String,
    },
    #[command(visible_alias = "ls")]
    List,
}
