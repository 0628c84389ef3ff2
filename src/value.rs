//! Configuration value model.
//!
//! Everything a configuration tree can hold is one of six shapes: string,
//! number, boolean, null, an explicit undefined sentinel, or a nested tree.
//! Arrays are deliberately not representable; merging and validation can
//! match exhaustively instead of inspecting runtime types.

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A nested configuration mapping from string keys to values.
///
/// Iteration is in sorted key order, which makes merge application and
/// validation walks deterministic.
pub type ConfigTree = BTreeMap<String, ConfigValue>;

/// A single configuration value.
///
/// `Number` carries `f64`: integers and floats are one kind here, the same
/// kind the `"number"` schema tag describes. `Undefined` is distinct from
/// `Null`; it marks a value that was explicitly declared absent (for example
/// by the environment string `"undefined"`), not merely missing.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    /// UTF-8 string.
    String(String),
    /// Numeric value.
    Number(f64),
    /// Boolean.
    Bool(bool),
    /// Explicit null.
    Null,
    /// Explicit absent sentinel.
    Undefined,
    /// Nested tree.
    Tree(ConfigTree),
}

impl ConfigValue {
    /// The runtime kind name, as reported in validation errors.
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigValue::String(_) => "string",
            ConfigValue::Number(_) => "number",
            ConfigValue::Bool(_) => "boolean",
            ConfigValue::Null => "null",
            ConfigValue::Undefined => "undefined",
            ConfigValue::Tree(_) => "object",
        }
    }

    /// The string inside, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// The number inside, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ConfigValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The boolean inside, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The nested tree inside, if this is a tree.
    pub fn as_tree(&self) -> Option<&ConfigTree> {
        match self {
            ConfigValue::Tree(tree) => Some(tree),
            _ => None,
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::String(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::String(value)
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        ConfigValue::Number(value)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<ConfigTree> for ConfigValue {
    fn from(value: ConfigTree) -> Self {
        ConfigValue::Tree(value)
    }
}

impl Serialize for ConfigValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ConfigValue::String(s) => serializer.serialize_str(s),
            ConfigValue::Number(n) => serializer.serialize_f64(*n),
            ConfigValue::Bool(b) => serializer.serialize_bool(*b),
            // JSON has no undefined; both sentinels render as null.
            ConfigValue::Null | ConfigValue::Undefined => serializer.serialize_unit(),
            ConfigValue::Tree(tree) => {
                let mut map = serializer.serialize_map(Some(tree.len()))?;
                for (key, value) in tree {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

struct ConfigValueVisitor;

impl<'de> Visitor<'de> for ConfigValueVisitor {
    type Value = ConfigValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a configuration value (string, number, boolean, null, or object)")
    }

    fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(ConfigValue::Bool(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(ConfigValue::Number(v as f64))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(ConfigValue::Number(v as f64))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(ConfigValue::Number(v))
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(ConfigValue::String(v.to_string()))
    }

    fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(ConfigValue::String(v))
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(ConfigValue::Null)
    }

    fn visit_seq<A>(self, _seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        Err(de::Error::custom(
            "array values are not supported in configuration trees",
        ))
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut tree = ConfigTree::new();
        while let Some((key, value)) = access.next_entry::<String, ConfigValue>()? {
            tree.insert(key, value);
        }
        Ok(ConfigValue::Tree(tree))
    }
}

impl<'de> Deserialize<'de> for ConfigValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ConfigValueVisitor)
    }
}
