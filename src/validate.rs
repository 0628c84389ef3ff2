//! Recursive validation of a configuration tree against a schema.

use crate::error::{ConfigError, Result};
use crate::schema::{SchemaNode, SchemaTree};
use crate::value::{ConfigTree, ConfigValue};

/// Validate `target` against `schema`, stopping at the first mismatch.
///
/// Only declared keys are inspected; anything else in the tree passes
/// unexamined. The walk is depth-first in sorted key order, so the error
/// for a given tree and schema is always the same one. A missing key has
/// runtime kind `undefined`, which means schemas can require absence.
pub(crate) fn validate_tree(target: &ConfigTree, schema: &SchemaTree) -> Result<()> {
    walk(target, schema, "")
}

fn walk(target: &ConfigTree, schema: &SchemaTree, path: &str) -> Result<()> {
    for (key, expected) in schema {
        let label = join(path, key);
        let value = target.get(key);
        match expected {
            SchemaNode::Tree(subtree) => match value {
                Some(ConfigValue::Tree(inner)) => walk(inner, subtree, &label)?,
                other => {
                    return Err(ConfigError::validation(label, "object", kind_of(other)));
                }
            },
            SchemaNode::Leaf(tag) => {
                let actual = kind_of(value);
                if actual != tag.as_str() {
                    return Err(ConfigError::validation(label, tag.clone(), actual));
                }
            }
        }
    }
    Ok(())
}

fn kind_of(value: Option<&ConfigValue>) -> &'static str {
    value.map_or("undefined", ConfigValue::kind)
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}
