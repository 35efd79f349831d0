use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use taxonomy_core::OutputFormat;

#[derive(Parser)]
#[command(name = "taxonomy")]
#[command(about = "Validate and inspect bracketed taxonomy notation")]
#[command(version)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet output (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Base directory (default: ~/.taxonomy)
    #[arg(long, global = true)]
    pub base_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

/// Output of `taxonomy parse`
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum ParseFormat {
    /// Canonical bracket notation
    #[default]
    Notation,
    /// Forest as JSON (`[{"name": ..., "children": [...]}]`)
    Json,
}

/// Where the taxonomy comes from
#[derive(Args, Debug)]
pub struct InputArgs {
    /// Taxonomy file (.json files are read via taxonomy.json_key), or the notation itself with --text
    pub input: String,

    /// Treat INPUT as notation instead of a file path
    #[arg(short, long)]
    pub text: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check that a taxonomy is well-formed
    Check {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Parse a taxonomy and print the resulting forest
    Parse {
        #[command(flatten)]
        input: InputArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t)]
        format: ParseFormat,
    },

    /// Assemble a taxonomy into a rooted tree
    Tree {
        #[command(flatten)]
        input: InputArgs,

        /// Root label (default: taxonomy.root_label)
        #[arg(short, long)]
        root: Option<String>,

        /// Output format: tree, json, notation (default: output.format)
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Write the tree as JSON to this file instead of printing
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Report whether ANCESTOR is an ancestor of DESCENDANT
    Relation {
        #[command(flatten)]
        input: InputArgs,

        /// Candidate ancestor name
        ancestor: String,

        /// Candidate descendant name
        descendant: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g., taxonomy.root_label)
        key: String,
    },

    /// Set a config value
    Set {
        /// Config key (e.g., output.format)
        key: String,

        /// Value to set (e.g., "json")
        value: String,
    },

    /// List all config values
    List,

    /// Show config file path
    Path,

    /// Initialize config file with defaults
    Init,
}
