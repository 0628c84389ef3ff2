//! Declared configuration shape.
//!
//! A schema mirrors the tree it describes: nested objects for structure,
//! type-tag strings at the leaves. The same schema serves two masters.
//! Environment projection treats it as an allow-list and a coercion hint;
//! validation treats it as the contract the assembled tree must satisfy.

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A nested schema mapping from string keys to expected shapes.
pub type SchemaTree = BTreeMap<String, SchemaNode>;

/// The primitive type tags a schema leaf can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    String,
    Number,
    Boolean,
    Null,
    Undefined,
}

impl TypeTag {
    /// Parse a leaf tag. Unrecognized tags yield `None`; they stay legal in
    /// a schema but carry no coercion preference.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "string" => Some(TypeTag::String),
            "number" => Some(TypeTag::Number),
            "boolean" => Some(TypeTag::Boolean),
            "null" => Some(TypeTag::Null),
            "undefined" => Some(TypeTag::Undefined),
            _ => None,
        }
    }

    /// The canonical tag string.
    pub fn as_str(self) -> &'static str {
        match self {
            TypeTag::String => "string",
            TypeTag::Number => "number",
            TypeTag::Boolean => "boolean",
            TypeTag::Null => "null",
            TypeTag::Undefined => "undefined",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node of a schema: a leaf type tag or a nested subtree.
///
/// Leaves keep their raw tag string so schemas parsed from documents are
/// preserved verbatim, recognized or not.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// Expected primitive kind, e.g. `"number"`.
    Leaf(String),
    /// Expected nested object shape.
    Tree(SchemaTree),
}

impl SchemaNode {
    /// Leaf node from any tag string.
    pub fn leaf(tag: impl Into<String>) -> Self {
        SchemaNode::Leaf(tag.into())
    }

    /// The recognized type tag at this node, if it is a leaf carrying one.
    pub fn as_tag(&self) -> Option<TypeTag> {
        match self {
            SchemaNode::Leaf(tag) => TypeTag::parse(tag),
            SchemaNode::Tree(_) => None,
        }
    }
}

impl From<TypeTag> for SchemaNode {
    fn from(tag: TypeTag) -> Self {
        SchemaNode::Leaf(tag.as_str().to_string())
    }
}

impl From<SchemaTree> for SchemaNode {
    fn from(tree: SchemaTree) -> Self {
        SchemaNode::Tree(tree)
    }
}

/// Resolve a key path against a schema.
///
/// Returns `None` when any segment is missing or the path tries to descend
/// through a leaf. An empty path resolves to nothing.
pub(crate) fn lookup<'a>(schema: &'a SchemaTree, path: &[&str]) -> Option<&'a SchemaNode> {
    let (first, rest) = path.split_first()?;
    let mut node = schema.get(*first)?;
    for segment in rest {
        match node {
            SchemaNode::Tree(subtree) => node = subtree.get(*segment)?,
            SchemaNode::Leaf(_) => return None,
        }
    }
    Some(node)
}

impl Serialize for SchemaNode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            SchemaNode::Leaf(tag) => serializer.serialize_str(tag),
            SchemaNode::Tree(tree) => {
                let mut map = serializer.serialize_map(Some(tree.len()))?;
                for (key, node) in tree {
                    map.serialize_entry(key, node)?;
                }
                map.end()
            }
        }
    }
}

struct SchemaNodeVisitor;

impl<'de> Visitor<'de> for SchemaNodeVisitor {
    type Value = SchemaNode;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a type-tag string or a nested schema object")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(SchemaNode::Leaf(v.to_string()))
    }

    fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(SchemaNode::Leaf(v))
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut tree = SchemaTree::new();
        while let Some((key, node)) = access.next_entry::<String, SchemaNode>()? {
            tree.insert(key, node);
        }
        Ok(SchemaNode::Tree(tree))
    }
}

impl<'de> Deserialize<'de> for SchemaNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(SchemaNodeVisitor)
    }
}
