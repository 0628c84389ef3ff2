//! Layered configuration assembly.
//!
//! A [`ConfigStore`] folds configuration from three kinds of sources into
//! one owned tree: in-code defaults, JSON files, and environment variables.
//! Layers are merged in call order and the last writer wins, so the
//! conventional sequence is defaults, then files, then environment.
//!
//! An optional schema describes the expected shape of the tree. During
//! environment projection it acts as an allow-list and a coercion hint;
//! [`ConfigStore::validate`] checks the assembled tree against it on
//! demand. Merging never validates.
//!
//! ```
//! use objconf::{ConfigStore, EnvOptions, EnvSnapshot, SchemaTree};
//! use serde_json::json;
//!
//! let mut conf = ConfigStore::new();
//! conf.set_schema(serde_json::from_value::<SchemaTree>(json!({
//!     "host": "string",
//!     "port": "number",
//!     "debug": "boolean",
//! })).unwrap());
//!
//! conf.merge_defaults(&serde_json::from_value(json!({
//!     "host": "localhost",
//!     "port": 8080,
//!     "debug": false,
//! })).unwrap());
//!
//! // Usually `conf.merge_env(...)` over the process environment; a snapshot
//! // behaves identically and keeps the example self-contained.
//! let env: EnvSnapshot = [("APP_PORT", "9000"), ("APP_DEBUG", "true")]
//!     .into_iter()
//!     .collect();
//! conf.merge_env_snapshot(&env, EnvOptions::new().with_prefix("app")).unwrap();
//!
//! conf.validate().unwrap();
//! assert_eq!(conf.get_number("port"), Some(9000.0));
//! assert_eq!(conf.get_bool("debug"), Some(true));
//! ```

mod env;
mod error;
mod merge;
mod schema;
mod store;
mod validate;
mod value;

pub use env::{EnvOptions, EnvSnapshot};
pub use error::{ConfigError, Result};
pub use merge::{deep_merge, set_path};
pub use schema::{SchemaNode, SchemaTree, TypeTag};
pub use store::ConfigStore;
pub use value::{ConfigTree, ConfigValue};
