//! Layered configuration resolution with tag templating for Assayport.
//!
//! This crate provides the configuration engine behind the analyzer
//! portal: a layered key/value store (global defaults, named output-format
//! profiles, per-identity overrides) whose string values may reference
//! other settings through bracketed tags.
//!
//! # Key Features
//!
//! - **Layered lookup**: per-identity values win over the active profile,
//!   which wins over global defaults
//! - **Tag templating**: `"s3://[BUCKET]/u/[username]/"` expands against
//!   the layered store plus identity-scoped dynamic overrides
//! - **Deep merge**: per-identity updates merge field-wise into the
//!   persisted tree; lists replace wholesale
//! - **Pluggable persistence**: [`SettingsStore`] with filesystem and
//!   in-memory implementations
//!
//! # Example
//!
//! ```rust
//! use assayport_config::{
//!     ConfigStore, ConfigTree, ConfigValue, Identity, MemorySettingsStore,
//! };
//!
//! let mut defaults = ConfigTree::new();
//! defaults.insert("BUCKET".into(), ConfigValue::string("assay-results"));
//! defaults.insert(
//!     "inputs_root".into(),
//!     ConfigValue::string("s3://[BUCKET]/u/[username]/inputs/"),
//! );
//!
//! let store = ConfigStore::new(defaults, Vec::new(), MemorySettingsStore::new());
//! let view = store.for_request(&Identity::new("alice"), None).unwrap();
//! assert_eq!(
//!     view.get("inputs_root").unwrap().as_str(),
//!     Some("s3://assay-results/u/alice/inputs/")
//! );
//! ```

mod convert;
mod identity;
mod merge;
mod profiles;
mod resolve;
mod store;
mod types;

pub use types::{ConfigError, ConfigTree, ConfigValue};

pub use convert::{
    MAX_CONVERT_DEPTH, config_tree_from_json, config_tree_to_json, config_value_from_json,
    config_value_to_json,
};

pub use identity::Identity;

pub use merge::deep_merge;

pub use profiles::OutputProfile;

pub use resolve::{MAX_RESOLVE_STEPS, resolve_tags};

pub use store::{
    ADMIN_ANALYZER_VERSION_KEY, ANALYZER_VERSION_KEY, ConfigStore, FsSettingsStore,
    MemorySettingsStore, OUTPUT_DEBUG_KEY, RequestConfig, SettingsStore,
    USER_ANALYZER_VERSION_KEY,
};
