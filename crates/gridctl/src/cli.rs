//! CLI structure and command definitions

use clap::{Args, Parser, Subcommand};

/// Operator CLI for the Grid hosted big-data cluster platform
#[derive(Parser, Debug)]
#[command(name = "gridctl")]
#[command(version, about = "Cluster lifecycle CLI for the Grid data platform")]
#[command(long_about = "
Cluster lifecycle CLI for the Grid data platform

Cluster creates and deletes are asynchronous on the provider side; gridctl
submits the request and then watches the cluster until it reaches a terminal
state or the timeout elapses. Every timing knob is overridable per
invocation.

EXAMPLES:
    # Set up a profile (TOML) and create a cluster
    gridctl create etl-prod --location westus --size 16

    # Create and clean up automatically if provisioning fails
    gridctl create etl-prod --cleanup-on-error

    # Resume watching a create you lost track of
    gridctl monitor-create etl-prod

    # Delete every cluster stuck in an error state
    gridctl delete-errored --yes

    # JSON output for scripting
    gridctl list -o json

For more help on a specific command, run:
    gridctl <command> --help
")]
pub struct Cli {
    /// Profile to use for this command
    #[arg(long, short, global = true, env = "GRIDCTL_PROFILE")]
    pub profile: Option<String>,

    /// Path to alternate configuration file
    #[arg(long, global = true, env = "GRIDCTL_CONFIG_FILE")]
    pub config_file: Option<String>,

    /// Resource group the cluster lives in (profile value when omitted)
    #[arg(long, short = 'g', global = true, env = "GRIDCTL_RESOURCE_GROUP")]
    pub resource_group: Option<String>,

    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value = "table")]
    pub output: OutputFormat,

    /// Enable verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables
    Table,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
}

/// Polling knobs shared by every command that watches an operation
#[derive(Args, Debug, Clone, Copy)]
pub struct WatchArgs {
    /// Seconds between poll ticks
    #[arg(long, value_name = "SECS")]
    pub poll_interval: Option<u64>,

    /// Minutes before the watch times out (0 = submit and check once only)
    #[arg(long, value_name = "MINS")]
    pub timeout: Option<u64>,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List all clusters in the subscription
    #[command(visible_alias = "l")]
    List,

    /// Show one cluster's details
    #[command(name = "list-one", visible_alias = "ls")]
    ListOne {
        /// Cluster name
        name: String,
    },

    /// Create a cluster and watch it until it is running
    #[command(visible_alias = "c")]
    #[command(after_help = "EXAMPLES:
    gridctl create etl-prod --location westus --size 16
    gridctl create etl-prod --cleanup-on-error --timeout 45
    gridctl create scratch --timeout 0      # submit without monitoring
")]
    Create {
        /// Cluster name
        name: String,

        /// Region to create the cluster in
        #[arg(long)]
        location: Option<String>,

        /// Platform version
        #[arg(long)]
        version: Option<String>,

        /// Workload kind (hadoop, hbase, storm, ...)
        #[arg(long)]
        kind: Option<String>,

        /// Node operating system (linux or windows)
        #[arg(long)]
        os_type: Option<String>,

        /// Number of worker nodes
        #[arg(long)]
        size: Option<u32>,

        /// Gateway username
        #[arg(long)]
        username: Option<String>,

        /// Gateway password
        #[arg(long)]
        password: Option<String>,

        /// SSH username (linux clusters)
        #[arg(long)]
        ssh_username: Option<String>,

        /// Path to an SSH public key file (linux clusters)
        #[arg(long)]
        ssh_public_key: Option<String>,

        /// Storage account to attach, NAME=KEY[:CONTAINER]; first one is the
        /// default account. Repeatable.
        #[arg(long = "storage-account", value_name = "NAME=KEY[:CONTAINER]")]
        storage_accounts: Vec<String>,

        /// Delete the cluster automatically if the create fails
        #[arg(long)]
        cleanup_on_error: bool,

        #[command(flatten)]
        watch: WatchArgs,
    },

    /// Delete a cluster and watch until it is gone
    #[command(visible_alias = "d")]
    Delete {
        /// Cluster name
        name: String,

        #[command(flatten)]
        watch: WatchArgs,
    },

    /// Resize a cluster (synchronous on the provider side)
    #[command(visible_alias = "rs")]
    Resize {
        /// Cluster name
        name: String,

        /// New worker node count
        size: u32,
    },

    /// Resume watching a cluster create already in flight
    #[command(name = "monitor-create", visible_alias = "mc")]
    MonitorCreate {
        /// Cluster name
        name: String,

        #[command(flatten)]
        watch: WatchArgs,
    },

    /// Resume watching a cluster delete already in flight
    #[command(name = "monitor-delete", visible_alias = "md")]
    MonitorDelete {
        /// Cluster name
        name: String,

        #[command(flatten)]
        watch: WatchArgs,
    },

    /// Enable remote access to the cluster gateway
    #[command(name = "enable-access")]
    EnableAccess {
        /// Cluster name
        name: String,

        /// Remote access username
        #[arg(long)]
        access_username: String,

        /// Remote access password
        #[arg(long)]
        access_password: String,

        /// Days until access expires
        #[arg(long, default_value = "90")]
        expires_in_days: i64,
    },

    /// Disable remote access to the cluster gateway
    #[command(name = "disable-access")]
    DisableAccess {
        /// Cluster name
        name: String,
    },

    /// Delete every cluster stuck in an error or unknown state
    #[command(name = "delete-errored", visible_alias = "derr")]
    DeleteErrored {
        #[command(flatten)]
        watch: WatchArgs,
    },

    /// Delete every cluster older than the cutoff. Asks for confirmation
    /// unless --yes is passed.
    #[command(name = "delete-stale", visible_alias = "dstale")]
    DeleteStale {
        /// Age in hours past which a cluster is considered stale
        #[arg(long, value_name = "HOURS")]
        cutoff_hours: Option<i64>,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,

        #[command(flatten)]
        watch: WatchArgs,
    },

    /// Generate shell completions
    #[command(visible_alias = "comp")]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
