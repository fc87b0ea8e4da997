//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint};

/// Merge a clothing skeleton into an avatar skeleton by bone name
#[derive(Parser, Debug)]
#[command(name = "rigmerge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Project directory holding .rigmerge.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Request document plus suffix override, shared by the merge commands.
#[derive(Args, Debug)]
pub struct RequestArgs {
    /// Analysis request document (JSON)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub input: PathBuf,

    /// Suffix for moved bones and meshes (overrides the request)
    #[arg(short, long)]
    pub suffix: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Dry run: estimate the merge and write the analysis response
    Analyze {
        #[command(flatten)]
        request: RequestArgs,

        /// Response document (default: stdout)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Import the request, execute the merge and show the result
    Merge {
        #[command(flatten)]
        request: RequestArgs,

        /// Write the realized report as a response document
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Check both hierarchies for duplicate bone names
    Duplicates {
        /// Analysis request document (JSON)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        input: PathBuf,
    },

    /// Show both hierarchies as trees
    Tree {
        /// Analysis request document (JSON)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        input: PathBuf,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Show version and author
    Info,

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}
