//! Clap derive structures for the `rulesync` CLI.
//!
//! Defines the command tree, global flags, and shared enums.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// rulesync -- declarative firewall rules for UniFi controllers
#[derive(Debug, Parser)]
#[command(
    name = "rulesync",
    version,
    about = "Converge a controller's firewall rules to a declared rule set",
    long_about = "Reconciles the firewall rules on a UniFi-style controller against a\n\
        YAML rules file. Rules carrying the MANAGED- name prefix are owned by\n\
        rulesync: each run purges the managed set and recreates it from the\n\
        declared configuration, in priority order. Unprefixed rules are never\n\
        touched.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Controller profile to use
    #[arg(long, short = 'p', env = "RULESYNC_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Controller URL (overrides profile)
    #[arg(long, short = 'c', env = "RULESYNC_CONTROLLER", global = true)]
    pub controller: Option<String>,

    /// Site name
    #[arg(long, short = 's', env = "RULESYNC_SITE", global = true)]
    pub site: Option<String>,

    /// API key
    #[arg(long, env = "RULESYNC_API_KEY", global = true, hide_env = true)]
    pub api_key: Option<String>,

    /// Username for session auth
    #[arg(long, short = 'u', env = "RULESYNC_USERNAME", global = true)]
    pub username: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "RULESYNC_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "RULESYNC_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "RULESYNC_TIMEOUT", default_value = "30", global = true)]
    pub timeout: u64,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary with a failure table
    Table,
    /// Pretty-printed JSON report
    Json,
    /// Compact single-line JSON report
    JsonCompact,
    /// YAML report
    Yaml,
    /// Status word only (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Reconcile the controller to the declared rule set
    #[command(alias = "sync")]
    Apply(ApplyArgs),

    /// Preview what apply would change, without mutating anything
    #[command(alias = "diff")]
    Plan(PlanArgs),

    /// Remove every managed rule from the controller
    Purge(PurgeArgs),

    /// Manage rulesync configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Rules file (YAML)
    #[arg(long, short = 'f', value_name = "FILE")]
    pub rules: PathBuf,

    /// Compute and report without calling delete/create
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Rules file (YAML)
    #[arg(long, short = 'f', value_name = "FILE")]
    pub rules: PathBuf,
}

#[derive(Debug, Args)]
pub struct PurgeArgs {
    /// Report what would be purged without deleting anything
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the resolved configuration
    Show,
    /// Print the config file path
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
