//! Parsing an argument vector into an options tree.

use std::collections::HashMap;

use crate::coerce::ValueCoercer;
use crate::error::{Error, Result};
use crate::globals::GlobalPropertyTable;
use crate::loader::{ConfigLoader, YamlLoader};
use crate::manager::ConfigurationManager;

use super::usage::render_entries;
use super::{collect, OptionEntry, Options, Tokenizer};

/// Long name of the built-in help option.
pub const HELP_OPTION: &str = "help";
/// Long name of the built-in usage option, a synonym of `--help`.
pub const USAGE_OPTION: &str = "usage";
/// Long name of the built-in configuration file option.
pub const CONFIG_FILE_OPTION: &str = "config-file";
/// Short name of the built-in configuration file option.
pub const CONFIG_FILE_SHORT: char = 'c';

const OVERRIDE_PREFIX: &str = "--@";
const END_OF_OPTIONS: &str = "--";
const DEFAULT_PROGRAM: &str = "app";

/// Leaves of one options tree, indexed by long and short name.
struct OptionTable<'a> {
    entries: Vec<OptionEntry<'a>>,
    long: HashMap<String, usize>,
    short: HashMap<char, usize>,
}

impl<'a> OptionTable<'a> {
    fn build(entries: Vec<OptionEntry<'a>>) -> Result<Self> {
        let mut long = HashMap::with_capacity(entries.len());
        let mut short = HashMap::new();

        for (index, entry) in entries.iter().enumerate() {
            let name = entry.def.long_name();
            let reserved = [HELP_OPTION, USAGE_OPTION, CONFIG_FILE_OPTION].contains(&name);
            if reserved || long.insert(name.to_string(), index).is_some() {
                return Err(Error::DuplicateOptionName {
                    option: format!("--{name}"),
                });
            }
            if let Some(c) = entry.def.short_name() {
                if c == CONFIG_FILE_SHORT || short.insert(c, index).is_some() {
                    return Err(Error::DuplicateOptionName {
                        option: format!("-{c}"),
                    });
                }
            }
        }

        Ok(Self { entries, long, short })
    }
}

/// Binds command-line arguments to an options tree.
///
/// Arguments are processed in passes, so that explicit options win over
/// overrides, which win over configuration files:
///
/// 1. `--help` / `--usage` anywhere before `--` fail with
///    [`Error::UsageRequested`] carrying the usage text,
/// 2. `-c` / `--config-file` occurrences, including a `c` that ends a run
///    of flags such as `-vc`, are removed and the last one is loaded into
///    the manager,
/// 3. `--@target value` overrides are removed and applied through
///    [`ConfigurationManager::apply_override`],
/// 4. the remaining `--long value`, `--long=value` and `-xyz` tokens are
///    bound to the tree.
///
/// Everything else, and everything after `--`, is returned as positional
/// arguments in order.
pub struct OptionsBinder<'m> {
    manager: &'m ConfigurationManager,
    loader: Option<&'m dyn ConfigLoader>,
    program: String,
    tokenizer: Tokenizer,
}

impl<'m> OptionsBinder<'m> {
    /// A binder that loads and resolves through `manager`.
    #[must_use]
    pub fn new(manager: &'m ConfigurationManager) -> Self {
        Self {
            manager,
            loader: None,
            program: DEFAULT_PROGRAM.to_string(),
            tokenizer: Tokenizer::default(),
        }
    }

    /// Uses `loader` for `--config-file` instead of a [`YamlLoader`].
    #[must_use]
    pub fn with_loader(mut self, loader: &'m dyn ConfigLoader) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Sets the program name shown in usage text.
    #[must_use]
    pub fn program(mut self, name: impl Into<String>) -> Self {
        self.program = name.into();
        self
    }

    /// Sets the tokenizer for comma-separated values.
    #[must_use]
    pub const fn with_tokenizer(mut self, tokenizer: Tokenizer) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    /// Usage text for `options`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateOptionName`] if the tree is invalid.
    pub fn usage<O: Options>(&self, options: &mut O) -> Result<String> {
        let table = OptionTable::build(collect(options))?;
        Ok(render_entries(&self.program, &table.entries))
    }

    /// Binds `args` to `options` and returns the positional arguments.
    ///
    /// # Errors
    ///
    /// - [`Error::DuplicateOptionName`] before anything is parsed if two
    ///   leaves share a name or use a built-in one,
    /// - [`Error::UsageRequested`] for `--help` / `--usage`,
    /// - [`Error::UnknownOption`] and [`Error::MissingOptionValue`] for bad
    ///   tokens,
    /// - loader, override and coercion errors as raised.
    pub fn bind<O, S>(&self, options: &mut O, args: &[S]) -> Result<Vec<String>>
    where
        O: Options,
        S: AsRef<str>,
    {
        let mut table = OptionTable::build(collect(options))?;

        let mut named: Vec<String> = Vec::with_capacity(args.len());
        let mut trailing: Vec<String> = Vec::new();
        let mut iter = args.iter().map(|a| a.as_ref().to_string());
        for arg in iter.by_ref() {
            if arg == END_OF_OPTIONS {
                break;
            }
            named.push(arg);
        }
        trailing.extend(iter);

        let help = [format!("--{HELP_OPTION}"), format!("--{USAGE_OPTION}")];
        if named.iter().any(|a| help.contains(a)) {
            return Err(Error::UsageRequested {
                usage: render_entries(&self.program, &table.entries),
            });
        }

        let named = self.load_config_files(&table, named)?;
        let named = self.apply_overrides(named)?;
        let mut positional = self.bind_named(&mut table, named)?;
        positional.extend(trailing);
        Ok(positional)
    }

    fn load_config_files(&self, table: &OptionTable<'_>, args: Vec<String>) -> Result<Vec<String>> {
        let short = format!("-{CONFIG_FILE_SHORT}");
        let long = format!("--{CONFIG_FILE_OPTION}");
        let inline = format!("{long}=");

        let mut rest = Vec::with_capacity(args.len());
        let mut locations = None;
        let mut iter = args.into_iter();
        while let Some(arg) = iter.next() {
            if arg == short || arg == long {
                let value = iter.next().ok_or_else(|| Error::MissingOptionValue { option: arg.clone() })?;
                locations = Some(value);
            } else if let Some(value) = arg.strip_prefix(&inline) {
                locations = Some(value.to_string());
            } else if let Some((flags, attached)) = split_config_cluster(&arg, table) {
                let value = if attached.is_empty() {
                    iter.next().ok_or_else(|| Error::MissingOptionValue { option: short.clone() })?
                } else {
                    attached
                };
                locations = Some(value);
                if !flags.is_empty() {
                    rest.push(format!("-{flags}"));
                }
            } else {
                rest.push(arg);
            }
        }

        if let Some(locations) = locations {
            let list: Vec<String> = self
                .tokenizer
                .split(&locations)
                .into_iter()
                .filter(|l| !l.trim().is_empty())
                .collect();
            log::debug!("loading configuration from {}", list.join(", "));
            match self.loader {
                Some(loader) => self.manager.load(loader, &list)?,
                None => self.manager.load(&YamlLoader::from_env(), &list)?,
            }
        }
        Ok(rest)
    }

    fn apply_overrides(&self, args: Vec<String>) -> Result<Vec<String>> {
        let mut rest = Vec::with_capacity(args.len());
        let mut iter = args.into_iter();
        while let Some(arg) = iter.next() {
            let Some(target) = arg.strip_prefix(OVERRIDE_PREFIX) else {
                rest.push(arg);
                continue;
            };
            let (key, value) = match target.split_once('=') {
                Some((key, value)) => (key.to_string(), value.to_string()),
                None => {
                    let value = iter.next().ok_or_else(|| Error::MissingOptionValue { option: arg.clone() })?;
                    (target.to_string(), value)
                }
            };
            if key.is_empty() {
                return Err(Error::UnknownOverrideTarget { target: key });
            }
            log::debug!("override {key} = {value}");
            self.manager.apply_override(&key, &value)?;
        }
        Ok(rest)
    }

    fn bind_named(&self, table: &mut OptionTable<'_>, args: Vec<String>) -> Result<Vec<String>> {
        let globals = self.manager.global_properties();
        let mut positional = Vec::new();
        let mut iter = args.into_iter();

        while let Some(arg) = iter.next() {
            if let Some(body) = arg.strip_prefix("--") {
                let (name, inline) = match body.split_once('=') {
                    Some((name, value)) => (name, Some(value.to_string())),
                    None => (body, None),
                };
                let option = format!("--{name}");
                let index = *table
                    .long
                    .get(name)
                    .ok_or_else(|| Error::UnknownOption { option: option.clone() })?;
                let value = match inline {
                    Some(value) => value,
                    None if table.entries[index].field.is_flag() => "true".to_string(),
                    None => iter.next().ok_or_else(|| Error::MissingOptionValue { option: option.clone() })?,
                };
                self.bind_value(&mut table.entries[index], &option, &value, &globals)?;
            } else if is_short_cluster(&arg, &table.short) {
                let cluster: Vec<char> = arg.chars().skip(1).collect();
                for (pos, c) in cluster.iter().enumerate() {
                    let option = format!("-{c}");
                    let index = *table
                        .short
                        .get(c)
                        .ok_or_else(|| Error::UnknownOption { option: option.clone() })?;
                    if table.entries[index].field.is_flag() {
                        self.bind_value(&mut table.entries[index], &option, "true", &globals)?;
                        continue;
                    }
                    let attached: String = cluster[pos + 1..].iter().collect();
                    let value = if attached.is_empty() {
                        iter.next().ok_or_else(|| Error::MissingOptionValue { option: option.clone() })?
                    } else {
                        attached
                    };
                    self.bind_value(&mut table.entries[index], &option, &value, &globals)?;
                    break;
                }
            } else {
                positional.push(arg);
            }
        }
        Ok(positional)
    }

    fn bind_value(
        &self,
        entry: &mut OptionEntry<'_>,
        option: &str,
        text: &str,
        globals: &GlobalPropertyTable,
    ) -> Result<()> {
        let kind = entry.field.kind();
        let raw = ConfigurationManager::raw_from_text(&self.tokenizer, &self.program, option, Some(&kind), text)?;
        let coercer = ValueCoercer::new(self.manager, globals, &self.program);
        let value = coercer
            .coerce(option, &kind, &raw)?
            .ok_or_else(|| Error::MissingOptionValue {
                option: option.to_string(),
            })?;
        if !entry.field.assign(value) {
            return Err(Error::TypeMismatch {
                component: self.program.clone(),
                property: option.to_string(),
                details: format!("option does not accept a {kind} value"),
            });
        }
        log::debug!("bound {option} ({kind}) = {text}");
        Ok(())
    }
}

/// `-x...` but not `-` or `--...`. A number such as `-5` or `-inf` is a
/// cluster only when its first character is a registered short option.
fn is_short_cluster(arg: &str, shorts: &HashMap<char, usize>) -> bool {
    let Some(body) = arg.strip_prefix('-') else {
        return false;
    };
    match body.chars().next() {
        None | Some('-') => false,
        Some(first) => shorts.contains_key(&first) || arg.parse::<f64>().is_err(),
    }
}

/// Splits a cluster such as `-avc` or `-avcfile.yaml` at the built-in
/// config-file short into the flags before it and the attached value.
///
/// Returns `None` when a value-taking or unknown short precedes `c`, in
/// which case the token is left to the named-option pass.
fn split_config_cluster(arg: &str, table: &OptionTable<'_>) -> Option<(String, String)> {
    if !is_short_cluster(arg, &table.short) {
        return None;
    }
    let body = &arg[1..];
    for (pos, c) in body.char_indices() {
        if c == CONFIG_FILE_SHORT {
            return Some((body[..pos].to_string(), body[pos + c.len_utf8()..].to_string()));
        }
        let index = *table.short.get(&c)?;
        if !table.entries[index].field.is_flag() {
            return None;
        }
    }
    None
}
