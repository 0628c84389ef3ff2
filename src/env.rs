//! Environment projection: flat variables into nested configuration paths.
//!
//! A variable name turns into a key path by case normalization, prefix
//! stripping, and splitting on `_`. The raw string value is coerced to a
//! typed value, guided by the schema when one is set: the schema doubles as
//! an allow-list, and a declared leaf type turns coercion from inference
//! into a requirement.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::merge::set_path;
use crate::schema::{self, SchemaTree, TypeTag};
use crate::value::{ConfigTree, ConfigValue};

/// Separator between path segments in variable names.
const SEPARATOR: char = '_';

/// An immutable snapshot of environment variable names and raw values.
///
/// Projection reads a snapshot rather than the live process environment, so
/// one pass sees one consistent state and tests can inject variables without
/// touching the real environment. Iteration is in sorted name order, which
/// makes the outcome of overlapping assignments deterministic.
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, String>,
}

impl EnvSnapshot {
    /// Snapshot the current process environment.
    pub fn from_process() -> Self {
        std::env::vars().collect()
    }

    /// Number of captured variables.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// True when nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Name/value pairs in sorted name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for EnvSnapshot
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

/// Options controlling one environment projection pass.
#[derive(Debug, Clone)]
pub struct EnvOptions {
    prefix: Option<String>,
    use_schema: bool,
    preserve_case: bool,
}

impl Default for EnvOptions {
    fn default() -> Self {
        Self {
            prefix: None,
            use_schema: true,
            preserve_case: false,
        }
    }
}

impl EnvOptions {
    /// Defaults: no prefix filter, schema consulted when one is set, names
    /// lowercased.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only project variables whose normalized name contains `prefix`
    /// followed by `_`; the first occurrence is stripped from the name
    /// before it is split into a path.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Whether to consult the active schema as an allow-list and coercion
    /// hint (default `true`). With an empty schema this has no effect.
    pub fn use_schema(mut self, use_schema: bool) -> Self {
        self.use_schema = use_schema;
        self
    }

    /// Keep the original case of variable names instead of lowercasing
    /// (default `false`). Applies to the prefix as well.
    pub fn preserve_case(mut self, preserve_case: bool) -> Self {
        self.preserve_case = preserve_case;
        self
    }

    fn normalize(&self, name: &str) -> String {
        if self.preserve_case {
            name.to_string()
        } else {
            name.to_lowercase()
        }
    }
}

/// Project every applicable snapshot entry into `target`.
///
/// Entries are applied in sorted name order; the first coercion failure
/// stops the pass, and entries already applied stay applied.
pub(crate) fn project_env(
    target: &mut ConfigTree,
    env: &EnvSnapshot,
    active_schema: &SchemaTree,
    options: &EnvOptions,
) -> Result<()> {
    let prefix = options
        .prefix
        .as_deref()
        .map(|prefix| format!("{}{SEPARATOR}", options.normalize(prefix)));
    let filter = options.use_schema && !active_schema.is_empty();

    let mut applied = 0usize;
    for (name, raw) in env.iter() {
        let normalized = options.normalize(name);
        let stripped = match &prefix {
            Some(prefix) => {
                if !normalized.contains(prefix.as_str()) {
                    continue;
                }
                normalized.replacen(prefix.as_str(), "", 1)
            }
            None => normalized,
        };
        let path: Vec<&str> = stripped.split(SEPARATOR).collect();

        let desired = if filter {
            match schema::lookup(active_schema, &path) {
                // Undeclared paths are skipped; a declared subtree admits the
                // entry without preferring a type.
                Some(node) => node.as_tag(),
                None => continue,
            }
        } else {
            None
        };

        let value = coerce(name, raw, desired)?;
        set_path(target, &path, value);
        applied += 1;
    }

    debug!(applied, total = env.len(), "projected environment variables");
    Ok(())
}

/// Convert a raw environment string into a typed value.
///
/// `desired` comes from the schema when the entry's path resolves to a
/// recognized leaf tag. A declared string wins outright, so values that
/// would otherwise read as booleans or numbers stay verbatim strings. Any
/// other declared type turns the matching rung's failure into an error
/// instead of letting the value fall through.
fn coerce(name: &str, raw: &str, desired: Option<TypeTag>) -> Result<ConfigValue> {
    if desired == Some(TypeTag::String) {
        return Ok(ConfigValue::String(raw.to_string()));
    }

    match raw {
        "true" => return Ok(ConfigValue::Bool(true)),
        "false" => return Ok(ConfigValue::Bool(false)),
        _ if desired == Some(TypeTag::Boolean) => {
            return Err(ConfigError::coercion(name, raw, TypeTag::Boolean));
        }
        _ => {}
    }

    if raw == "null" {
        return Ok(ConfigValue::Null);
    }
    if desired == Some(TypeTag::Null) {
        return Err(ConfigError::coercion(name, raw, TypeTag::Null));
    }

    if raw == "undefined" {
        return Ok(ConfigValue::Undefined);
    }
    if desired == Some(TypeTag::Undefined) {
        return Err(ConfigError::coercion(name, raw, TypeTag::Undefined));
    }

    match raw.parse::<f64>() {
        // "NaN" and "inf" parse as floats; neither is a config number.
        Ok(number) if number.is_finite() => Ok(ConfigValue::Number(number.trunc())),
        _ if desired == Some(TypeTag::Number) => {
            Err(ConfigError::coercion(name, raw, TypeTag::Number))
        }
        _ => Ok(ConfigValue::String(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(value: serde_json::Value) -> ConfigTree {
        serde_json::from_value(value).unwrap()
    }

    fn schema_tree(value: serde_json::Value) -> SchemaTree {
        serde_json::from_value(value).unwrap()
    }

    fn snapshot(vars: &[(&str, &str)]) -> EnvSnapshot {
        vars.iter().copied().collect()
    }

    fn project(
        env: &EnvSnapshot,
        active_schema: &SchemaTree,
        options: EnvOptions,
    ) -> Result<ConfigTree> {
        let mut target = ConfigTree::new();
        project_env(&mut target, env, active_schema, &options)?;
        Ok(target)
    }

    #[test]
    fn test_coerce_infers_keywords() {
        assert_eq!(coerce("V", "true", None).unwrap(), ConfigValue::Bool(true));
        assert_eq!(coerce("V", "false", None).unwrap(), ConfigValue::Bool(false));
        assert_eq!(coerce("V", "null", None).unwrap(), ConfigValue::Null);
        assert_eq!(coerce("V", "undefined", None).unwrap(), ConfigValue::Undefined);
    }

    #[test]
    fn test_coerce_infers_numbers() {
        assert_eq!(coerce("V", "8080", None).unwrap(), ConfigValue::Number(8080.0));
        assert_eq!(coerce("V", "-3", None).unwrap(), ConfigValue::Number(-3.0));
        assert_eq!(coerce("V", "1e3", None).unwrap(), ConfigValue::Number(1000.0));
    }

    #[test]
    fn test_coerce_truncates_toward_zero() {
        assert_eq!(coerce("V", "12.9", None).unwrap(), ConfigValue::Number(12.0));
        assert_eq!(coerce("V", "-3.7", None).unwrap(), ConfigValue::Number(-3.0));
    }

    #[test]
    fn test_coerce_falls_back_to_string() {
        assert_eq!(
            coerce("V", "localhost", None).unwrap(),
            ConfigValue::String("localhost".into())
        );
        assert_eq!(coerce("V", "", None).unwrap(), ConfigValue::String("".into()));
        assert_eq!(
            coerce("V", "NaN", None).unwrap(),
            ConfigValue::String("NaN".into())
        );
        assert_eq!(
            coerce("V", "inf", None).unwrap(),
            ConfigValue::String("inf".into())
        );
        assert_eq!(
            coerce("V", "TRUE", None).unwrap(),
            ConfigValue::String("TRUE".into())
        );
    }

    #[test]
    fn test_coerce_desired_string_short_circuits() {
        assert_eq!(
            coerce("V", "true", Some(TypeTag::String)).unwrap(),
            ConfigValue::String("true".into())
        );
        assert_eq!(
            coerce("V", "12345", Some(TypeTag::String)).unwrap(),
            ConfigValue::String("12345".into())
        );
    }

    #[test]
    fn test_coerce_desired_type_can_still_yield_another_kind() {
        // The ladder runs top-down; a desired number does not stop "true"
        // from becoming a boolean on an earlier rung.
        assert_eq!(
            coerce("V", "true", Some(TypeTag::Number)).unwrap(),
            ConfigValue::Bool(true)
        );
    }

    #[test]
    fn test_coerce_desired_type_failures() {
        let err = coerce("V", "yes", Some(TypeTag::Boolean)).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Coercion {
                expected: TypeTag::Boolean,
                ..
            }
        ));

        assert!(coerce("V", "nil", Some(TypeTag::Null)).is_err());
        assert!(coerce("V", "none", Some(TypeTag::Undefined)).is_err());

        let err = coerce("V", "eighty", Some(TypeTag::Number)).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"environment variable V: cannot coerce "eighty" to number"#
        );
        assert!(coerce("V", "NaN", Some(TypeTag::Number)).is_err());
    }

    #[test]
    fn test_projection_lowercases_and_splits() {
        let env = snapshot(&[("SERVER_PORT", "8080")]);
        let conf = project(&env, &SchemaTree::new(), EnvOptions::new()).unwrap();
        assert_eq!(conf, tree(json!({"server": {"port": 8080}})));
    }

    #[test]
    fn test_projection_prefix_filters_and_strips() {
        let env = snapshot(&[("APP_HOST", "localhost"), ("HOME", "/root")]);
        let conf = project(
            &env,
            &SchemaTree::new(),
            EnvOptions::new().with_prefix("app"),
        )
        .unwrap();
        assert_eq!(conf, tree(json!({"host": "localhost"})));
    }

    #[test]
    fn test_projection_prefix_matches_anywhere_in_the_name() {
        // The filter is a containment check, and only the first occurrence
        // of "app_" is stripped.
        let env = snapshot(&[("MY_APP_HOST", "localhost")]);
        let conf = project(
            &env,
            &SchemaTree::new(),
            EnvOptions::new().with_prefix("app"),
        )
        .unwrap();
        assert_eq!(conf, tree(json!({"my": {"host": "localhost"}})));
    }

    #[test]
    fn test_projection_preserves_case_on_request() {
        let env = snapshot(&[("OBJCONF_Host", "localhost")]);

        let lowered = project(
            &env,
            &SchemaTree::new(),
            EnvOptions::new().with_prefix("objconf"),
        )
        .unwrap();
        assert_eq!(lowered, tree(json!({"host": "localhost"})));

        let preserved = project(
            &env,
            &SchemaTree::new(),
            EnvOptions::new().with_prefix("OBJCONF").preserve_case(true),
        )
        .unwrap();
        assert_eq!(preserved, tree(json!({"Host": "localhost"})));
    }

    #[test]
    fn test_projection_schema_is_an_allow_list() {
        let active = schema_tree(json!({"testing": "string"}));
        let env = snapshot(&[("TESTING", "test"), ("TESTING_TWO", "two"), ("OTHER", "x")]);
        let conf = project(&env, &active, EnvOptions::new()).unwrap();
        assert_eq!(conf, tree(json!({"testing": "test"})));
    }

    #[test]
    fn test_projection_schema_subtree_admits_without_typing() {
        let active = schema_tree(json!({"limits": {"max": "number"}}));
        let env = snapshot(&[("LIMITS", "5")]);
        let conf = project(&env, &active, EnvOptions::new()).unwrap();
        assert_eq!(conf, tree(json!({"limits": 5})));
    }

    #[test]
    fn test_projection_unknown_leaf_tag_admits_without_typing() {
        let active = schema_tree(json!({"when": "date"}));
        let env = snapshot(&[("WHEN", "2024-01-01")]);
        let conf = project(&env, &active, EnvOptions::new()).unwrap();
        // No recognized tag, so ordinary inference applies.
        assert_eq!(conf, tree(json!({"when": "2024-01-01"})));
    }

    #[test]
    fn test_projection_schema_can_be_ignored() {
        let active = schema_tree(json!({"testing": "string"}));
        let env = snapshot(&[("OTHER", "x")]);
        let conf = project(&env, &active, EnvOptions::new().use_schema(false)).unwrap();
        assert_eq!(conf, tree(json!({"other": "x"})));
    }

    #[test]
    fn test_projection_applies_in_sorted_name_order() {
        // "testing" lands first, then "testing_two" paves its scalar over
        // with a subtree.
        let env = snapshot(&[("TESTING_TWO", "two"), ("TESTING", "test")]);
        let conf = project(&env, &SchemaTree::new(), EnvOptions::new()).unwrap();
        assert_eq!(conf, tree(json!({"testing": {"two": "two"}})));
    }

    #[test]
    fn test_projection_stops_on_coercion_failure() {
        let active = schema_tree(json!({"alpha": "string", "beta": "number"}));
        let env = snapshot(&[("ALPHA", "ok"), ("BETA", "not a number")]);

        let mut target = ConfigTree::new();
        let err = project_env(&mut target, &env, &active, &EnvOptions::new()).unwrap_err();
        assert!(matches!(err, ConfigError::Coercion { .. }));
        // The earlier entry had already been applied.
        assert_eq!(target, tree(json!({"alpha": "ok"})));
    }
}
