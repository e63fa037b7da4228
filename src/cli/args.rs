//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Resolve a multi-file Lua project from its entry file into one self-contained script
#[derive(Parser, Debug)]
#[command(name = "luabundle")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Project directory holding .luabundle.toml (default: entry file's directory)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Bundle entry file and its local requires
    Bundle {
        /// Entry file
        #[arg(value_hint = ValueHint::FilePath)]
        entry: PathBuf,
        /// Write bundle to file instead of stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
        /// Do not print the file preview
        #[arg(short, long)]
        quiet: bool,
    },

    /// Show files that would be bundled as tree
    Tree {
        /// Entry file
        #[arg(value_hint = ValueHint::FilePath)]
        entry: PathBuf,
        /// Paths relative to project root
        #[arg(long)]
        relative: bool,
        /// ASCII connectors
        #[arg(long)]
        ascii: bool,
    },

    /// List files that would be bundled, dependencies first
    Files {
        /// Entry file
        #[arg(value_hint = ValueHint::FilePath)]
        entry: PathBuf,
    },

    /// Bundle from a `.load <file>` directive
    Load {
        /// Directive, e.g. ".load process/main.lua"
        line: String,
    },

    /// Bundle every spec file of a directory
    Specs {
        /// Spec directory
        #[arg(default_value = "spec", value_hint = ValueHint::DirPath)]
        dir: PathBuf,
        /// Output directory (default: build_dir setting)
        #[arg(short, long, value_hint = ValueHint::DirPath)]
        output: Option<PathBuf>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

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
        /// Create global config instead of project config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}
