//! CLI command implementations.
//!
//! This module contains the implementations of all CLI commands:
//! - `list`: List components and global properties
//! - `show`: Show the substituted properties of one component
//! - `resolve`: Substitute globals in an expression
//! - `check`: Substitute every raw value and report the first failure
//! - `dump`: Write the merged configuration document
//! - `rename`: Rename a component, then dump
//! - `remove`: Remove a component, then dump
//! - `completions`: Print a shell completion script

pub mod check;
pub mod completions;
pub mod dump;
pub mod list;
pub mod remove;
pub mod rename;
pub mod resolve;
pub mod show;

pub use check::CheckCommand;
pub use completions::CompletionsCommand;
pub use dump::DumpCommand;
pub use list::ListCommand;
pub use remove::RemoveCommand;
pub use rename::RenameCommand;
pub use resolve::ResolveCommand;
pub use show::ShowCommand;
