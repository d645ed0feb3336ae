//! Conversion between JSON and `ConfigValue`.
//!
//! Persisted per-identity fragments and incoming patches are structured
//! JSON. Conversion is where the list-vs-map decision is made: JSON arrays
//! become `List`, JSON objects become `Map`, everything else becomes
//! `Scalar`. After this point merging never infers shape from keys.

use crate::types::{ConfigError, ConfigTree, ConfigValue};

/// Maximum nesting depth accepted when converting JSON input.
///
/// Deeply nested or adversarial input fails with
/// [`ConfigError::NestingTooDeep`] instead of overflowing the stack.
pub const MAX_CONVERT_DEPTH: usize = 256;

/// Convert a JSON value into a `ConfigValue`.
pub fn config_value_from_json(value: serde_json::Value) -> Result<ConfigValue, ConfigError> {
    from_json_at(value, 0)
}

/// Convert a JSON value into a `ConfigTree`.
///
/// The root must be a JSON object; `username` names the identity for the
/// error when it is not.
pub fn config_tree_from_json(
    value: serde_json::Value,
    username: &str,
) -> Result<ConfigTree, ConfigError> {
    match config_value_from_json(value)? {
        ConfigValue::Map(tree) => Ok(tree),
        _ => Err(ConfigError::FragmentNotMap {
            username: username.to_string(),
        }),
    }
}

fn from_json_at(value: serde_json::Value, depth: usize) -> Result<ConfigValue, ConfigError> {
    if depth > MAX_CONVERT_DEPTH {
        return Err(ConfigError::NestingTooDeep {
            max_depth: MAX_CONVERT_DEPTH,
        });
    }

    match value {
        serde_json::Value::Array(items) => {
            let converted = items
                .into_iter()
                .map(|item| from_json_at(item, depth + 1))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ConfigValue::List(converted))
        }
        serde_json::Value::Object(entries) => {
            let mut tree = ConfigTree::new();
            for (key, entry) in entries {
                tree.insert(key, from_json_at(entry, depth + 1)?);
            }
            Ok(ConfigValue::Map(tree))
        }
        scalar => Ok(ConfigValue::Scalar(scalar)),
    }
}

/// Convert a `ConfigValue` back into JSON for persistence.
pub fn config_value_to_json(value: &ConfigValue) -> serde_json::Value {
    match value {
        ConfigValue::Scalar(scalar) => scalar.clone(),
        ConfigValue::List(items) => {
            serde_json::Value::Array(items.iter().map(config_value_to_json).collect())
        }
        ConfigValue::Map(entries) => {
            let mut object = serde_json::Map::new();
            for (key, entry) in entries {
                object.insert(key.clone(), config_value_to_json(entry));
            }
            serde_json::Value::Object(object)
        }
    }
}

/// Convert a `ConfigTree` back into a JSON object for persistence.
pub fn config_tree_to_json(tree: &ConfigTree) -> serde_json::Value {
    config_value_to_json(&ConfigValue::Map(tree.clone()))
}
