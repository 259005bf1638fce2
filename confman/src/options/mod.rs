//! Command-line binding of options trees.
//!
//! An options tree is any type implementing [`Options`]: it registers its
//! leaf fields with long names, optional short characters and descriptions,
//! and may nest further [`Options`] values as named groups. The
//! [`OptionsBinder`] parses an argument vector against the tree.
//!
//! # Examples
//!
//! ```
//! use confman::options::{OptionDef, OptionRegistrar, Options, OptionsBinder};
//! use confman::ConfigurationManager;
//!
//! #[derive(Default)]
//! struct Cli {
//!     all: bool,
//!     batch: i32,
//!     gamma: i64,
//! }
//!
//! impl Options for Cli {
//!     fn register<'a>(&'a mut self, options: &mut OptionRegistrar<'a>) {
//!         options
//!             .option(OptionDef::new("all").short('a'), &mut self.all)
//!             .option(OptionDef::new("batch").short('b'), &mut self.batch)
//!             .option(OptionDef::new("gamma"), &mut self.gamma);
//!     }
//! }
//!
//! let manager = ConfigurationManager::new();
//! let mut cli = Cli::default();
//! let rest = OptionsBinder::new(&manager)
//!     .bind(&mut cli, &["-ab", "7", "--gamma", "9"])
//!     .unwrap();
//!
//! assert!(cli.all);
//! assert_eq!((cli.batch, cli.gamma), (7, 9));
//! assert!(rest.is_empty());
//! ```

mod binder;
mod field;
mod tokenizer;
mod usage;

#[cfg(all(test, feature = "property-tests"))]
mod proptests;

pub use binder::{OptionsBinder, CONFIG_FILE_OPTION, CONFIG_FILE_SHORT, HELP_OPTION, USAGE_OPTION};
pub use field::{EnumOption, EnumSetOption, OptionField};
pub use tokenizer::{Tokenizer, DEFAULT_ESCAPE};
pub use usage::render_usage;

/// A tree of command-line options.
pub trait Options {
    /// Registers this node's leaves and nested groups.
    fn register<'a>(&'a mut self, options: &mut OptionRegistrar<'a>);
}

/// Declaration of one leaf option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDef {
    long: String,
    short: Option<char>,
    description: Option<String>,
}

impl OptionDef {
    /// An option spelled `--long`.
    pub fn new(long: impl Into<String>) -> Self {
        Self {
            long: long.into(),
            short: None,
            description: None,
        }
    }

    /// Also accept `-c`.
    #[must_use]
    pub const fn short(mut self, c: char) -> Self {
        self.short = Some(c);
        self
    }

    /// Help text shown in usage output.
    #[must_use]
    pub fn describe(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// The long name.
    #[must_use]
    pub fn long_name(&self) -> &str {
        &self.long
    }

    /// The short character, if any.
    #[must_use]
    pub const fn short_name(&self) -> Option<char> {
        self.short
    }

    /// The help text, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// A registered leaf and the group path it was found under.
pub(crate) struct OptionEntry<'a> {
    pub(crate) def: OptionDef,
    pub(crate) group: Vec<String>,
    pub(crate) field: &'a mut dyn OptionField,
}

/// Collects the leaves of an options tree.
pub struct OptionRegistrar<'a> {
    path: Vec<String>,
    entries: Vec<OptionEntry<'a>>,
}

impl<'a> OptionRegistrar<'a> {
    pub(crate) fn new() -> Self {
        Self {
            path: Vec::new(),
            entries: Vec::new(),
        }
    }

    /// Registers a leaf option.
    pub fn option(&mut self, def: OptionDef, field: &'a mut dyn OptionField) -> &mut Self {
        self.entries.push(OptionEntry {
            def,
            group: self.path.clone(),
            field,
        });
        self
    }

    /// Registers every leaf of `options` under the group `name`.
    pub fn group<O: Options>(&mut self, name: &str, options: &'a mut O) -> &mut Self {
        self.path.push(name.to_string());
        options.register(self);
        self.path.pop();
        self
    }

    pub(crate) fn into_entries(self) -> Vec<OptionEntry<'a>> {
        self.entries
    }
}

pub(crate) fn collect<O: Options>(options: &mut O) -> Vec<OptionEntry<'_>> {
    let mut registrar = OptionRegistrar::new();
    options.register(&mut registrar);
    registrar.into_entries()
}
