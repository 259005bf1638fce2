//! Renders the `confman(1)` man page into `OUT_DIR/man` with clap_mangen.
//!
//! A build script cannot link the crate it builds, so the command tree is
//! declared again here by hand.

use clap::{Arg, Command};
use clap_mangen::Man;
use std::fs;
use std::path::PathBuf;

/// The command tree as seen by the man page.
///
/// Mirrors `src/cli.rs` and `src/commands/`; a new subcommand or global flag
/// has to be added in both places.
fn build_cli() -> Command {
    Command::new("confman")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Inspect and rewrite layered component configuration")
        .long_about(
            "Command-line tool for loading component configuration documents, \
             substituting global properties and writing the merged result",
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .help("Log debug messages to stderr")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .help("Print only the requested output")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config-file")
                .short('c')
                .long("config-file")
                .help("Configuration locations, comma separated; later locations win")
                .value_name("LOCATIONS")
                .global(true)
                .env("CONFMAN_CONFIG"),
        )
        .arg(
            Arg::new("set")
                .long("set")
                .help("Override a global property or a component property")
                .value_name("KEY=VALUE")
                .global(true)
                .action(clap::ArgAction::Append),
        )
        .subcommands(vec![
            Command::new("list")
                .about("List components and global properties")
                .long_about("Display every component with its type, then the explicit global properties"),
            Command::new("show")
                .about("Show the properties of a component")
                .long_about("Display the raw properties of a component with globals substituted"),
            Command::new("resolve")
                .about("Substitute global properties in an expression")
                .long_about("Replace every ${name} reference in an expression with its value"),
            Command::new("check")
                .about("Check that every property value substitutes")
                .long_about("Substitute every raw value of every component and report the first failure"),
            Command::new("dump")
                .about("Write the merged configuration document")
                .long_about("Write the merged, overridden configuration as YAML"),
            Command::new("rename")
                .about("Rename a component and dump the result")
                .long_about("Rename a component, rewrite references to it and dump the document"),
            Command::new("remove")
                .about("Remove a component and dump the result")
                .long_about("Remove a component from the registry and dump the document"),
            Command::new("completions")
                .about("Print a shell completion script")
                .long_about("Print a completion script for the given shell to stdout"),
        ])
}

fn main() -> std::io::Result<()> {
    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-changed=src/commands/");

    let Some(out_dir) = std::env::var_os("OUT_DIR").map(PathBuf::from) else {
        return Ok(());
    };
    let pages = out_dir.join("man");
    fs::create_dir_all(&pages)?;

    let mut page = Vec::new();
    Man::new(build_cli()).render(&mut page)?;
    fs::write(pages.join("confman.1"), page)
}
