//! Named output-format profiles.
//!
//! A profile bundles the downstream artifact locations for one report
//! format: populator template, QA/QC configuration files, remote-target
//! path template, and so on. The values are opaque strings to this crate
//! and resolve the same way as any other setting when layered into a
//! request's configuration view.

use crate::convert::config_tree_from_json;
use crate::types::{ConfigError, ConfigTree};

/// Key inside a profile tree holding its human-readable description.
const DESCRIPTION_KEY: &str = "description";

/// Key inside a profile tree marking it as the default selection.
const DEFAULT_KEY: &str = "default";

/// One named output-format profile.
#[derive(Debug, Clone)]
pub struct OutputProfile {
    key: String,
    description: String,
    is_default: bool,
    settings: ConfigTree,
}

impl OutputProfile {
    /// Create a profile from its parts.
    pub fn new(
        key: impl Into<String>,
        description: impl Into<String>,
        settings: ConfigTree,
    ) -> Self {
        OutputProfile {
            key: key.into(),
            description: description.into(),
            is_default: false,
            settings,
        }
    }

    /// Mark this profile as the default selection.
    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    /// Build a profile from a JSON object.
    ///
    /// The `description` entry becomes the profile description and a
    /// truthy `default` entry marks the profile as the default selection;
    /// every other entry becomes part of the profile's setting layer.
    pub fn from_json(
        key: impl Into<String>,
        value: serde_json::Value,
    ) -> Result<Self, ConfigError> {
        let key = key.into();
        let mut settings = config_tree_from_json(value, &key)?;
        let description = settings
            .shift_remove(DESCRIPTION_KEY)
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        let is_default = settings
            .shift_remove(DEFAULT_KEY)
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        Ok(OutputProfile {
            key,
            description,
            is_default,
            settings,
        })
    }

    /// The profile's selection key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The profile's human-readable description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether this profile is the default selection.
    pub fn is_default(&self) -> bool {
        self.is_default
    }

    /// The profile's setting layer.
    pub fn settings(&self) -> &ConfigTree {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_splits_description() {
        let profile = OutputProfile::from_json(
            "wide_format",
            json!({
                "description": "Wide Format",
                "populator_template": "s3://[BUCKET]/v/[ANALYZER_VERSION]/config/template_wide.xlsx",
                "qaqc_config": ["a.yaml", "b.yaml"]
            }),
        )
        .unwrap();

        assert_eq!(profile.key(), "wide_format");
        assert_eq!(profile.description(), "Wide Format");
        assert!(profile.settings().get("description").is_none());
        assert!(profile.settings().get("populator_template").is_some());
        assert!(profile.settings().get("qaqc_config").unwrap().is_list());
    }

    #[test]
    fn test_missing_description_is_empty() {
        let profile = OutputProfile::from_json("x", json!({"a": 1})).unwrap();
        assert_eq!(profile.description(), "");
        assert!(!profile.is_default());
    }

    #[test]
    fn test_default_marker_extracted() {
        let profile = OutputProfile::from_json(
            "long_format",
            json!({"description": "Long Format", "default": true, "a": 1}),
        )
        .unwrap();

        assert!(profile.is_default());
        assert!(profile.settings().get("default").is_none());
        assert!(profile.settings().get("a").is_some());
    }

    #[test]
    fn test_non_object_profile_rejected() {
        let err = OutputProfile::from_json("x", json!("not a map")).unwrap_err();
        assert!(matches!(err, ConfigError::FragmentNotMap { .. }));
    }
}
