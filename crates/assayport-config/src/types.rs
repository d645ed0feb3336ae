//! Core type definitions for layered configuration.

use indexmap::IndexMap;
use thiserror::Error;

/// An ordered mapping from setting keys to values.
///
/// Keys are case-sensitive identifiers; within one tree each key is unique
/// (last write wins on merge).
pub type ConfigTree = IndexMap<String, ConfigValue>;

/// A configuration value.
///
/// The list-vs-map distinction is decided once, at construction or
/// deserialization time, by the variant. Merging never re-inspects key
/// shapes, so an empty map stays a map and never merges element-wise
/// with a list.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    /// Atomic values (string, number, bool, null).
    ///
    /// Invariant: the wrapped JSON value is never an array or an object;
    /// those are constructed as `List` and `Map` instead.
    Scalar(serde_json::Value),

    /// Ordered list of values. Lists are atomic under merge: a patch list
    /// replaces a base list wholesale, never element-wise.
    List(Vec<ConfigValue>),

    /// Associative subtree. Maps merge field-wise.
    Map(ConfigTree),
}

impl ConfigValue {
    /// Create a string scalar.
    pub fn string(s: impl Into<String>) -> Self {
        ConfigValue::Scalar(serde_json::Value::String(s.into()))
    }

    /// Create an integer scalar.
    pub fn integer(n: i64) -> Self {
        ConfigValue::Scalar(serde_json::Value::from(n))
    }

    /// Create a boolean scalar.
    pub fn boolean(b: bool) -> Self {
        ConfigValue::Scalar(serde_json::Value::Bool(b))
    }

    /// Create a null scalar.
    pub fn null() -> Self {
        ConfigValue::Scalar(serde_json::Value::Null)
    }

    /// Create a list value.
    pub fn list(items: Vec<ConfigValue>) -> Self {
        ConfigValue::List(items)
    }

    /// Create a map value.
    pub fn map(entries: ConfigTree) -> Self {
        ConfigValue::Map(entries)
    }

    /// Check if this is a scalar value.
    pub fn is_scalar(&self) -> bool {
        matches!(self, ConfigValue::Scalar(_))
    }

    /// Check if this is a list value.
    pub fn is_list(&self) -> bool {
        matches!(self, ConfigValue::List(_))
    }

    /// Check if this is a map value.
    pub fn is_map(&self) -> bool {
        matches!(self, ConfigValue::Map(_))
    }

    /// Get the scalar payload if this is a scalar.
    pub fn as_scalar(&self) -> Option<&serde_json::Value> {
        match self {
            ConfigValue::Scalar(value) => Some(value),
            _ => None,
        }
    }

    /// Get as a string slice if this is a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(serde_json::Value::as_str)
    }

    /// Get as a bool if this is a boolean scalar.
    pub fn as_bool(&self) -> Option<bool> {
        self.as_scalar().and_then(serde_json::Value::as_bool)
    }

    /// Get the items if this is a list.
    pub fn as_list(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get the entries if this is a map.
    pub fn as_map(&self) -> Option<&ConfigTree> {
        match self {
            ConfigValue::Map(entries) => Some(entries),
            _ => None,
        }
    }
}

/// Errors that can occur during configuration operations.
///
/// Key absence is never an error: lookups return `Option::None` and callers
/// decide on a default. Unresolved tags are left verbatim in resolved
/// strings rather than failing the whole resolution.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration nesting exceeds the maximum depth.
    #[error("config nesting too deep (max depth: {max_depth})")]
    NestingTooDeep {
        /// Maximum allowed depth
        max_depth: usize,
    },

    /// A persisted per-identity fragment whose root is not a map.
    #[error("persisted settings for '{username}' are not a map")]
    FragmentNotMap {
        /// Identity whose fragment was malformed
        username: String,
    },

    /// Filesystem failure reading or writing a persisted fragment.
    #[error("{context}: {source}")]
    Store {
        /// What the store was doing when the failure occurred
        context: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// A request selected an output-format profile that does not exist.
    #[error("unknown output profile: {key}")]
    UnknownProfile {
        /// The profile key the request asked for
        key: String,
    },

    /// A persisted fragment that is not valid JSON.
    #[error("{context}: {source}")]
    Parse {
        /// What was being parsed
        context: String,
        /// Underlying parse error
        source: serde_json::Error,
    },
}

impl ConfigError {
    pub(crate) fn store(context: impl Into<String>, source: std::io::Error) -> Self {
        ConfigError::Store {
            context: context.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_accessors() {
        let value = ConfigValue::string("test");
        assert!(value.is_scalar());
        assert!(!value.is_list());
        assert!(!value.is_map());
        assert_eq!(value.as_str(), Some("test"));
        assert_eq!(value.as_bool(), None);
    }

    #[test]
    fn test_boolean_scalar() {
        let value = ConfigValue::boolean(true);
        assert_eq!(value.as_bool(), Some(true));
        assert_eq!(value.as_str(), None);
    }

    #[test]
    fn test_list_value() {
        let value = ConfigValue::list(vec![ConfigValue::string("a"), ConfigValue::string("b")]);
        assert!(value.is_list());
        assert_eq!(value.as_list().unwrap().len(), 2);
        assert!(value.as_map().is_none());
    }

    #[test]
    fn test_map_value() {
        let mut entries = ConfigTree::new();
        entries.insert("key".to_string(), ConfigValue::string("value"));
        let value = ConfigValue::map(entries);
        assert!(value.is_map());
        assert_eq!(value.as_map().unwrap().len(), 1);
    }

    #[test]
    fn test_empty_map_is_not_a_list() {
        let value = ConfigValue::map(ConfigTree::new());
        assert!(value.is_map());
        assert!(!value.is_list());
    }
}
