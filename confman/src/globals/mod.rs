//! Global properties and `${name}` substitution.
//!
//! A [`GlobalPropertyTable`] holds named string variables that raw values
//! reference with `${name}`. A few distinguished names (host name, user
//! home, user name, working directory) are always available: they are
//! computed lazily on first use unless the table sets them explicitly.
//!
//! Substitution is recursive: a global whose value itself contains
//! `${...}` is expanded before being spliced in. Reference cycles are
//! detected and reported instead of looping.
//!
//! # Examples
//!
//! ```
//! use confman::GlobalPropertyTable;
//!
//! let mut globals = GlobalPropertyTable::new();
//! globals.set("root", "/data");
//! globals.set("models", "${root}/models");
//!
//! let resolved = globals.resolve("decoder", "path", "${models}/en").unwrap();
//! assert_eq!(resolved, "/data/models/en");
//!
//! // Plain strings are returned unchanged.
//! assert_eq!(globals.resolve("decoder", "path", "cost: $5").unwrap(), "cost: $5");
//! ```

use std::borrow::Cow;
use std::env;
use std::fs;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};

#[cfg(all(test, feature = "property-tests"))]
mod proptests;

/// Matches one `${name}` reference.
static REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([\w.\-]+)\}").expect("reference pattern is valid"));

/// Process-wide values of the distinguished globals, computed once.
static DISTINGUISHED: Lazy<IndexMap<&'static str, String>> = Lazy::new(|| {
    DistinguishedProperty::ALL
        .iter()
        .filter_map(|p| p.compute().map(|v| (p.name(), v)))
        .collect()
});

/// Globals whose value comes from the environment unless set explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistinguishedProperty {
    /// `hostName`: the machine's host name.
    HostName,
    /// `user.home`: the user's home directory.
    UserHome,
    /// `user.name`: the login name.
    UserName,
    /// `user.dir`: the current working directory.
    WorkingDir,
}

impl DistinguishedProperty {
    /// Every distinguished property.
    pub const ALL: [Self; 4] = [Self::HostName, Self::UserHome, Self::UserName, Self::WorkingDir];

    /// The global name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::HostName => "hostName",
            Self::UserHome => "user.home",
            Self::UserName => "user.name",
            Self::WorkingDir => "user.dir",
        }
    }

    /// Finds a distinguished property by global name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    fn compute(self) -> Option<String> {
        match self {
            Self::HostName => env::var("HOSTNAME")
                .or_else(|_| env::var("COMPUTERNAME"))
                .ok()
                .or_else(|| {
                    fs::read_to_string("/etc/hostname")
                        .ok()
                        .map(|s| s.trim().to_string())
                })
                .filter(|s| !s.is_empty())
                .or_else(|| Some("localhost".to_string())),
            Self::UserHome => home::home_dir().map(|p| p.display().to_string()),
            Self::UserName => env::var("USER").or_else(|_| env::var("USERNAME")).ok(),
            Self::WorkingDir => env::current_dir().ok().map(|p| p.display().to_string()),
        }
    }
}

/// Named string variables used by `${name}` substitution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalPropertyTable {
    values: IndexMap<String, String>,
}

impl GlobalPropertyTable {
    /// Creates a table with no explicit entries.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The value of `name`, falling back to distinguished properties.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .map(String::as_str)
            .or_else(|| DISTINGUISHED.get(name).map(String::as_str))
    }

    /// Sets `name`, returning the previous explicit value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(name.into(), value.into())
    }

    /// Removes the explicit value of `name`.
    ///
    /// A removed distinguished property falls back to its computed value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.values.shift_remove(name)
    }

    /// Whether `name` resolves to a value.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Whether `name` was set explicitly.
    #[must_use]
    pub fn is_explicit(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Explicit entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The explicit entries.
    #[must_use]
    pub fn as_map(&self) -> &IndexMap<String, String> {
        &self.values
    }

    /// Number of explicit entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no explicit entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Copies every explicit entry of `other`, overwriting on collision.
    pub fn merge_from(&mut self, other: &Self) {
        for (name, value) in &other.values {
            self.values.insert(name.clone(), value.clone());
        }
    }

    /// Substitutes every `${name}` in `raw`.
    ///
    /// `owner` and `property` only label errors.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownGlobalProperty`] if a name is undefined and
    /// [`Error::CyclicGlobalProperty`] if expansion revisits a name.
    pub fn resolve(&self, owner: &str, property: &str, raw: &str) -> Result<String> {
        if !raw.contains("${") {
            return Ok(raw.to_string());
        }
        let mut stack = Vec::new();
        let resolved = self.expand(owner, property, raw, &mut stack)?;
        log::trace!("{owner}.{property}: '{raw}' -> '{resolved}'");
        Ok(resolved.into_owned())
    }

    fn expand<'s>(
        &'s self,
        owner: &str,
        property: &str,
        text: &'s str,
        stack: &mut Vec<&'s str>,
    ) -> Result<Cow<'s, str>> {
        if !REFERENCE.is_match(text) {
            return Ok(Cow::Borrowed(text));
        }

        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for caps in REFERENCE.captures_iter(text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let name = name.as_str();
            out.push_str(&text[last..whole.start()]);

            if let Some(pos) = stack.iter().position(|n| *n == name) {
                let mut cycle: Vec<String> = stack[pos..].iter().map(|n| (*n).to_string()).collect();
                cycle.push(name.to_string());
                return Err(Error::CyclicGlobalProperty {
                    component: owner.to_string(),
                    property: property.to_string(),
                    cycle,
                });
            }

            let value = self.get(name).ok_or_else(|| Error::UnknownGlobalProperty {
                component: owner.to_string(),
                property: property.to_string(),
                name: name.to_string(),
            })?;

            stack.push(name);
            let expanded = self.expand(owner, property, value, stack)?;
            stack.pop();

            out.push_str(&expanded);
            last = whole.end();
        }
        out.push_str(&text[last..]);
        Ok(Cow::Owned(out))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for GlobalPropertyTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
