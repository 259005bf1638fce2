//! The clap derive tree for `confman`.
//!
//! Global flags are accepted before or after the subcommand. `build.rs`
//! keeps a hand-written copy of this tree for the man page.

use crate::commands::{
    CheckCommand, CompletionsCommand, DumpCommand, ListCommand, RemoveCommand, RenameCommand,
    ResolveCommand, ShowCommand,
};
use clap::{Parser, Subcommand};

/// Command-line tool for inspecting layered component configuration.
#[derive(Parser)]
#[command(name = "confman")]
#[command(version, about = "Inspect and rewrite layered component configuration", long_about = None)]
pub struct Cli {
    /// Log debug messages to stderr
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Print only the requested output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Configuration locations, comma separated; later locations win
    #[arg(
        short = 'c',
        long,
        value_name = "LOCATIONS",
        global = true,
        env = "CONFMAN_CONFIG"
    )]
    pub config_file: Option<String>,

    /// Override a global property (KEY=VALUE) or a component property (NAME.PROPERTY=VALUE)
    #[arg(long = "set", value_name = "KEY=VALUE", global = true)]
    pub overrides: Vec<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    /// List components and global properties
    List(ListCommand),

    /// Show the properties of a component with globals substituted
    Show(ShowCommand),

    /// Substitute global properties in an expression
    Resolve(ResolveCommand),

    /// Check that every property value substitutes
    Check(CheckCommand),

    /// Write the merged configuration document
    Dump(DumpCommand),

    /// Rename a component and dump the result
    Rename(RenameCommand),

    /// Remove a component and dump the result
    Remove(RemoveCommand),

    /// Print a shell completion script
    Completions(CompletionsCommand),
}
