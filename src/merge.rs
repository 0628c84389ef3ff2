//! Tree mutation primitives: deep merge and nested path assignment.
//!
//! Both operations mutate the target in place and share one rule for
//! structural conflicts: wherever a nested tree is needed and something else
//! is in the way, the obstruction is replaced by a fresh empty tree.

use crate::value::{ConfigTree, ConfigValue};

/// Get the nested tree at `key`, inserting or replacing with an empty tree
/// when the current value is not a tree.
fn subtree_entry<'a>(target: &'a mut ConfigTree, key: &str) -> &'a mut ConfigTree {
    let slot = target
        .entry(key.to_string())
        .or_insert_with(|| ConfigValue::Tree(ConfigTree::new()));
    if !matches!(slot, ConfigValue::Tree(_)) {
        *slot = ConfigValue::Tree(ConfigTree::new());
    }
    match slot {
        ConfigValue::Tree(inner) => inner,
        _ => unreachable!("slot was just normalized to a tree"),
    }
}

/// Deep merge `source` into `target`.
///
/// Keys present only in one side survive untouched. Where both sides hold a
/// nested tree the merge recurses; every other source value overwrites the
/// target entry outright, including a scalar paving over a whole subtree.
/// Fold layers lowest-precedence first and the last writer wins.
///
/// # Example
/// ```
/// use objconf::{deep_merge, ConfigTree};
/// use serde_json::json;
///
/// let mut target: ConfigTree =
///     serde_json::from_value(json!({"server": {"host": "localhost", "port": 8080}})).unwrap();
/// let source: ConfigTree = serde_json::from_value(json!({"server": {"port": 9000}})).unwrap();
///
/// deep_merge(&mut target, &source);
///
/// let expected: ConfigTree =
///     serde_json::from_value(json!({"server": {"host": "localhost", "port": 9000}})).unwrap();
/// assert_eq!(target, expected);
/// ```
pub fn deep_merge(target: &mut ConfigTree, source: &ConfigTree) {
    for (key, value) in source {
        match value {
            ConfigValue::Tree(subtree) => deep_merge(subtree_entry(target, key), subtree),
            other => {
                target.insert(key.clone(), other.clone());
            }
        }
    }
}

/// Assign `value` at the nested `path`, creating intermediate trees as
/// needed.
///
/// Intermediate segments that hold anything other than a tree are replaced
/// by a fresh empty tree before descending. The final segment is written
/// unconditionally, whether it previously held a scalar, a subtree, or
/// nothing.
///
/// # Panics
/// Panics when `path` is empty. Paths are derived by splitting a non-empty
/// name, which always yields at least one segment, so an empty path is a
/// caller bug rather than an input condition.
pub fn set_path(target: &mut ConfigTree, path: &[&str], value: ConfigValue) {
    match path {
        [] => panic!("set_path requires at least one path segment"),
        [leaf] => {
            target.insert((*leaf).to_string(), value);
        }
        [first, rest @ ..] => set_path(subtree_entry(target, first), rest, value),
    }
}
