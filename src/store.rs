//! The configuration store: one owned tree, layered merges, on-demand
//! validation.

use std::path::Path;

use tracing::debug;

use crate::env::{self, EnvOptions, EnvSnapshot};
use crate::error::{ConfigError, Result};
use crate::merge::deep_merge;
use crate::schema::SchemaTree;
use crate::validate::validate_tree;
use crate::value::{ConfigTree, ConfigValue};

/// Layered configuration store.
///
/// Folds values from in-code defaults, JSON files, and environment variables
/// into one owned tree. Merge order is precedence order: call the lowest
/// layer first and the last writer wins, which conventionally puts the
/// environment on top. Validation against the declared schema happens only
/// when asked for, never as a side effect of merging.
///
/// ```
/// use objconf::{ConfigStore, EnvOptions, EnvSnapshot};
/// use serde_json::json;
///
/// let mut conf = ConfigStore::new();
/// conf.merge_defaults(
///     &serde_json::from_value(json!({"server": {"host": "localhost", "port": 8080}})).unwrap(),
/// );
///
/// let env: EnvSnapshot = [("APP_SERVER_PORT", "9000")].into_iter().collect();
/// conf.merge_env_snapshot(&env, EnvOptions::new().with_prefix("app")).unwrap();
///
/// assert_eq!(conf.get_number("server.port"), Some(9000.0));
/// assert_eq!(conf.get_str("server.host"), Some("localhost"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    conf: ConfigTree,
    schema: SchemaTree,
}

impl ConfigStore {
    /// An empty store with no schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge in-code defaults. Conventionally the first, lowest-precedence
    /// layer.
    pub fn merge_defaults(&mut self, source: &ConfigTree) {
        deep_merge(&mut self.conf, source);
    }

    /// Read `path` as a JSON document and merge it over the current tree.
    ///
    /// With `required` false, the usual setting for optional config files, a
    /// missing, unreadable, or malformed file leaves the store unchanged and
    /// returns `Ok(())`. With `required` true the failure surfaces as
    /// [`ConfigError::FileRead`] or [`ConfigError::FileParse`]. Nothing is
    /// merged from a file that failed to parse.
    pub fn merge_file(&mut self, path: impl AsRef<Path>, required: bool) -> Result<()> {
        let path = path.as_ref();
        match read_tree(path) {
            Ok(source) => {
                deep_merge(&mut self.conf, &source);
                debug!(path = %path.display(), keys = source.len(), "merged config file");
                Ok(())
            }
            Err(err) if required => Err(err),
            Err(_) => Ok(()),
        }
    }

    /// Project the current process environment into the store.
    ///
    /// Conventionally the last layer, so environment variables override both
    /// defaults and files. Coercion failures surface regardless of options;
    /// see [`EnvOptions`] for prefix filtering, schema use, and case
    /// handling.
    pub fn merge_env(&mut self, options: EnvOptions) -> Result<()> {
        self.merge_env_snapshot(&EnvSnapshot::from_process(), options)
    }

    /// Project an explicit [`EnvSnapshot`] instead of the live process
    /// environment.
    pub fn merge_env_snapshot(&mut self, env: &EnvSnapshot, options: EnvOptions) -> Result<()> {
        env::project_env(&mut self.conf, env, &self.schema, &options)
    }

    /// Replace the declared schema wholesale.
    pub fn set_schema(&mut self, schema: SchemaTree) {
        self.schema = schema;
    }

    /// The declared schema. Empty means unconstrained.
    pub fn schema(&self) -> &SchemaTree {
        &self.schema
    }

    /// Validate the assembled tree against the declared schema.
    ///
    /// Returns the first mismatch, found depth-first in sorted key order.
    /// With an empty schema this always succeeds.
    pub fn validate(&self) -> Result<()> {
        self.validate_against(&self.schema)
    }

    /// Validate against an explicit schema instead of the declared one.
    pub fn validate_against(&self, schema: &SchemaTree) -> Result<()> {
        validate_tree(&self.conf, schema)
    }

    /// A defensive copy of the assembled tree.
    ///
    /// The copy is deep at every level; mutating it cannot reach back into
    /// the store.
    pub fn get(&self) -> ConfigTree {
        self.conf.clone()
    }

    /// Borrow the assembled tree without copying.
    pub fn tree(&self) -> &ConfigTree {
        &self.conf
    }

    /// Look up a value by dot-separated path, `"server.port"` style.
    pub fn value(&self, path: &str) -> Option<&ConfigValue> {
        let mut segments = path.split('.');
        let mut current = self.conf.get(segments.next()?)?;
        for segment in segments {
            current = current.as_tree()?.get(segment)?;
        }
        Some(current)
    }

    /// The string at `path`, if present and string-typed.
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.value(path).and_then(ConfigValue::as_str)
    }

    /// The number at `path`, if present and number-typed.
    pub fn get_number(&self, path: &str) -> Option<f64> {
        self.value(path).and_then(ConfigValue::as_number)
    }

    /// The boolean at `path`, if present and boolean-typed.
    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.value(path).and_then(ConfigValue::as_bool)
    }
}

fn read_tree(path: &Path) -> Result<ConfigTree> {
    let content =
        std::fs::read_to_string(path).map_err(|source| ConfigError::file_read(path, source))?;
    serde_json::from_str(&content).map_err(|source| ConfigError::file_parse(path, source))
}
