//! Resolution of configuration source locations.
//!
//! A location is tried, in order, as:
//! 1. a named resource (registered in memory, or a file under one of the
//!    resource roots),
//! 2. a plain filesystem path,
//! 3. a URI. Only `file:` URIs can be read.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use url::Url;

use crate::error::{Error, Result};

/// Environment variable listing resource roots, separated like `PATH`.
pub const RESOURCE_PATH_ENV: &str = "CONFMAN_RESOURCE_PATH";

/// Prefix marking a location as a resource name only.
pub const RESOURCE_PREFIX: &str = "resource:";

/// Finds and reads configuration sources.
#[derive(Debug, Clone, Default)]
pub struct LocationResolver {
    resources: IndexMap<String, String>,
    roots: Vec<PathBuf>,
}

/// A location that was read successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    /// Where the contents came from, for diagnostics.
    pub origin: String,
    /// The source text.
    pub contents: String,
}

impl LocationResolver {
    /// A resolver with no resources and no roots.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A resolver whose roots come from `CONFMAN_RESOURCE_PATH`.
    #[must_use]
    pub fn from_env() -> Self {
        let roots = env::var_os(RESOURCE_PATH_ENV)
            .map(|paths| env::split_paths(&paths).collect())
            .unwrap_or_default();
        Self {
            resources: IndexMap::new(),
            roots,
        }
    }

    /// Registers an in-memory resource.
    #[must_use]
    pub fn with_resource(mut self, name: impl Into<String>, contents: impl Into<String>) -> Self {
        self.resources.insert(name.into(), contents.into());
        self
    }

    /// Adds a resource root directory.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.roots.push(root.into());
        self
    }

    /// The resource roots in search order.
    #[must_use]
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Reads `location`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigLoadError`] if no strategy finds the location
    /// or it cannot be read.
    pub fn read(&self, location: &str) -> Result<ResolvedSource> {
        let resource_only = location.strip_prefix(RESOURCE_PREFIX);
        let name = resource_only.unwrap_or(location);

        if let Some(source) = self.read_resource(name)? {
            return Ok(source);
        }
        if resource_only.is_some() {
            return Err(load_error(location, "no such resource"));
        }

        let path = Path::new(location);
        if path.is_file() {
            return read_file(location, path);
        }

        match Url::parse(location) {
            Ok(url) if url.scheme() == "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|()| load_error(location, "not a local file URI"))?;
                read_file(location, &path)
            }
            // Single letters are Windows drive prefixes, not schemes.
            Ok(url) if url.scheme().len() > 1 => Err(load_error(
                location,
                format!("unsupported URI scheme '{}'", url.scheme()),
            )),
            _ => Err(load_error(location, "not found as resource, file or URI")),
        }
    }

    fn read_resource(&self, name: &str) -> Result<Option<ResolvedSource>> {
        if let Some(contents) = self.resources.get(name) {
            return Ok(Some(ResolvedSource {
                origin: format!("{RESOURCE_PREFIX}{name}"),
                contents: contents.clone(),
            }));
        }
        for root in &self.roots {
            let candidate = root.join(name);
            if candidate.is_file() {
                return read_file(name, &candidate).map(Some);
            }
        }
        Ok(None)
    }
}

fn read_file(location: &str, path: &Path) -> Result<ResolvedSource> {
    let contents = fs::read_to_string(path)
        .map_err(|e| load_error(location, format!("failed to read {}: {e}", path.display())))?;
    Ok(ResolvedSource {
        origin: path.display().to_string(),
        contents,
    })
}

fn load_error(location: &str, reason: impl Into<String>) -> Error {
    Error::ConfigLoadError {
        location: location.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_in_memory_resource_wins() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("app.yaml");
        fs::write(&file, "from file").unwrap();

        let location = file.display().to_string();
        let resolver = LocationResolver::new().with_resource(location.clone(), "from memory");
        assert_eq!(resolver.read(&location).unwrap().contents, "from memory");
    }

    #[test]
    fn test_resource_root_before_filesystem() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("app.yaml"), "from root").unwrap();

        let resolver = LocationResolver::new().with_root(root.path());
        let source = resolver.read("app.yaml").unwrap();
        assert_eq!(source.contents, "from root");
        assert!(source.origin.ends_with("app.yaml"));
    }

    #[test]
    fn test_filesystem_and_file_uri() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("app.yaml");
        fs::write(&file, "plain").unwrap();

        let resolver = LocationResolver::new();
        assert_eq!(resolver.read(&file.display().to_string()).unwrap().contents, "plain");

        let uri = Url::from_file_path(&file).unwrap();
        assert_eq!(resolver.read(uri.as_str()).unwrap().contents, "plain");
    }

    #[test]
    fn test_missing_and_unsupported_locations() {
        let resolver = LocationResolver::new();
        let err = resolver.read("/nonexistent/app.yaml").unwrap_err();
        assert!(matches!(err, Error::ConfigLoadError { .. }));

        let err = resolver.read("https://example.com/app.yaml").unwrap_err();
        assert!(err.to_string().contains("unsupported URI scheme"));

        let err = resolver.read("resource:missing.yaml").unwrap_err();
        assert!(err.to_string().contains("no such resource"));
    }

    #[test]
    #[serial]
    fn test_roots_from_env() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        let joined = env::join_paths([a.path(), b.path()]).unwrap();

        let saved = env::var_os(RESOURCE_PATH_ENV);
        env::set_var(RESOURCE_PATH_ENV, &joined);
        let resolver = LocationResolver::from_env();
        match saved {
            Some(v) => env::set_var(RESOURCE_PATH_ENV, v),
            None => env::remove_var(RESOURCE_PATH_ENV),
        }

        assert_eq!(resolver.roots(), &[a.path().to_path_buf(), b.path().to_path_buf()]);
    }
}
