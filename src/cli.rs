//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - chat: interactive conversation with the assistant (the default)
//! - tools: list the tools offered to the model
//! - init-db: create the database and schema

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Hearth - a recipe assistant with family nutrition tracking
#[derive(Parser, Debug)]
#[command(name = "hearth")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Chat with the assistant (default when no subcommand is given)
    Chat,

    /// List the tools offered to the model
    Tools,

    /// Create the database file and schema
    InitDb,
}
