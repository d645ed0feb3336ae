//! The layered configuration store.
//!
//! Three layers compose, in priority order, into one resolved view:
//! the per-identity tree loaded from durable storage, the output-format
//! profile selected by the request, and the global defaults. Layers are
//! composed at resolution time rather than pre-merged; only the
//! per-identity layer is ever persisted.
//!
//! String values pass through tag resolution on the way out, with the
//! identity's dynamic overrides taking precedence over stored keys.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::convert::{config_tree_from_json, config_tree_to_json};
use crate::identity::Identity;
use crate::merge::deep_merge;
use crate::profiles::OutputProfile;
use crate::resolve::resolve_tags;
use crate::types::{ConfigError, ConfigTree, ConfigValue};

/// Derived key: resolves to the admin or user analyzer version depending
/// on the requesting identity. Computed at resolution time, never stored.
pub const ANALYZER_VERSION_KEY: &str = "ANALYZER_VERSION";
/// Stored key holding the analyzer version served to administrators.
pub const ADMIN_ANALYZER_VERSION_KEY: &str = "ADMIN_ANALYZER_VERSION";
/// Stored key holding the analyzer version served to regular users.
pub const USER_ANALYZER_VERSION_KEY: &str = "USER_ANALYZER_VERSION";
/// Derived key: true only for administrators. Computed, never stored.
pub const OUTPUT_DEBUG_KEY: &str = "OUTPUT_DEBUG";

/// The immutable identity anchor inside a persisted fragment.
const USERNAME_KEY: &str = "username";

/// Name of the per-identity settings file used by [`FsSettingsStore`].
const SETTINGS_FILE: &str = "settings.json";

/// Durable storage for per-identity configuration fragments.
///
/// Implementations load and save one opaque `ConfigTree` per identity.
/// A never-seen identity loads as an empty tree, not an error.
pub trait SettingsStore {
    /// Load the identity's persisted tree.
    fn load(&self, username: &str) -> Result<ConfigTree, ConfigError>;

    /// Persist the identity's tree, replacing any previous fragment.
    fn save(&self, username: &str, tree: &ConfigTree) -> Result<(), ConfigError>;
}

/// Settings store backed by the filesystem.
///
/// Fragments live at `<root>/<username>/settings.json` as structured JSON.
/// The username is assumed to already be a safe path segment; sanitization
/// happens at the authentication boundary.
#[derive(Debug, Clone)]
pub struct FsSettingsStore {
    root: PathBuf,
}

impl FsSettingsStore {
    /// Create a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsSettingsStore { root: root.into() }
    }

    fn settings_path(&self, username: &str) -> PathBuf {
        self.root.join(username).join(SETTINGS_FILE)
    }
}

impl SettingsStore for FsSettingsStore {
    fn load(&self, username: &str) -> Result<ConfigTree, ConfigError> {
        let path = self.settings_path(username);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ConfigTree::new()),
            Err(e) => return Err(ConfigError::store(format!("reading {}", path.display()), e)),
        };
        let json: serde_json::Value =
            serde_json::from_str(&raw).map_err(|e| ConfigError::Parse {
                context: format!("parsing {}", path.display()),
                source: e,
            })?;
        config_tree_from_json(json, username)
    }

    fn save(&self, username: &str, tree: &ConfigTree) -> Result<(), ConfigError> {
        let dir = self.root.join(username);
        std::fs::create_dir_all(&dir)
            .map_err(|e| ConfigError::store(format!("creating {}", dir.display()), e))?;
        let path = self.settings_path(username);
        let json = config_tree_to_json(tree);
        let raw = serde_json::to_string_pretty(&json).map_err(|e| ConfigError::Parse {
            context: format!("serializing {}", path.display()),
            source: e,
        })?;
        std::fs::write(&path, raw)
            .map_err(|e| ConfigError::store(format!("writing {}", path.display()), e))
    }
}

/// In-memory settings store (for testing without file I/O).
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    trees: RefCell<HashMap<String, ConfigTree>>,
}

impl MemorySettingsStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self, username: &str) -> Result<ConfigTree, ConfigError> {
        Ok(self
            .trees
            .borrow()
            .get(username)
            .cloned()
            .unwrap_or_default())
    }

    fn save(&self, username: &str, tree: &ConfigTree) -> Result<(), ConfigError> {
        self.trees
            .borrow_mut()
            .insert(username.to_string(), tree.clone());
        Ok(())
    }
}

/// The layered configuration store.
pub struct ConfigStore<S: SettingsStore> {
    defaults: ConfigTree,
    profiles: Vec<OutputProfile>,
    settings: S,
}

impl<S: SettingsStore> ConfigStore<S> {
    /// Create a store from global defaults, the available output-format
    /// profiles, and a persistence backend.
    pub fn new(defaults: ConfigTree, profiles: Vec<OutputProfile>, settings: S) -> Self {
        ConfigStore {
            defaults,
            profiles,
            settings,
        }
    }

    /// The named output-format profiles, in declaration order.
    pub fn list_output_profiles(&self) -> impl Iterator<Item = (&str, &str)> {
        self.profiles
            .iter()
            .map(|p| (p.key(), p.description()))
    }

    /// Look up a profile by key.
    pub fn profile(&self, key: &str) -> Option<&OutputProfile> {
        self.profiles.iter().find(|p| p.key() == key)
    }

    /// The profile marked as the default selection, if any.
    pub fn default_profile(&self) -> Option<&OutputProfile> {
        self.profiles.iter().find(|p| p.is_default())
    }

    /// Build the resolved configuration view for one request.
    ///
    /// With no explicit profile key the profile marked default is used,
    /// if one exists. Loads the identity's persisted layer once;
    /// `get`/`get_path` on the returned view are pure in-memory reads
    /// after that.
    pub fn for_request(
        &self,
        identity: &Identity,
        profile_key: Option<&str>,
    ) -> Result<RequestConfig<'_>, ConfigError> {
        let profile = match profile_key {
            Some(key) => Some(
                self.profile(key)
                    .ok_or_else(|| ConfigError::UnknownProfile {
                        key: key.to_string(),
                    })?
                    .settings(),
            ),
            None => self.default_profile().map(|p| p.settings()),
        };
        let user = self.settings.load(&identity.username)?;
        Ok(RequestConfig {
            defaults: &self.defaults,
            profile,
            identity: identity.clone(),
            user,
        })
    }

    /// Merge `patch` into the identity's persisted tree and save it.
    ///
    /// The `username` key is stripped from the patch first: the identity
    /// anchor is never writable through settings updates.
    pub fn update(&self, identity: &Identity, mut patch: ConfigTree) -> Result<(), ConfigError> {
        patch.shift_remove(USERNAME_KEY);
        let mut tree = self.settings.load(&identity.username)?;
        deep_merge(&mut tree, patch);
        self.settings.save(&identity.username, &tree)
    }
}

/// The resolved configuration view for one request.
///
/// Holds the three layers (per-identity, profile, defaults) plus the
/// requesting identity for derived keys and dynamic overrides.
#[derive(Debug)]
pub struct RequestConfig<'a> {
    defaults: &'a ConfigTree,
    profile: Option<&'a ConfigTree>,
    identity: Identity,
    user: ConfigTree,
}

impl RequestConfig<'_> {
    /// Look up a setting by key.
    ///
    /// Checks the per-identity layer first, then the active profile, then
    /// the global defaults. String values pass through tag resolution.
    /// Two keys are computed rather than looked up verbatim: the analyzer
    /// version (which depends on whether the identity is an administrator)
    /// and the debug-output flag (true only for administrators).
    pub fn get(&self, key: &str) -> Option<ConfigValue> {
        if key == OUTPUT_DEBUG_KEY {
            return Some(ConfigValue::boolean(self.identity.is_admin));
        }
        if key == ANALYZER_VERSION_KEY {
            return self.get(self.version_alias());
        }
        let value = self.raw(key)?.clone();
        Some(self.resolve_value(value))
    }

    /// Look up several settings at once, preserving key order.
    ///
    /// Each key resolves exactly as through [`get`](Self::get); keys that
    /// resolve to nothing are omitted from the result.
    pub fn get_many(&self, keys: &[&str]) -> ConfigTree {
        keys.iter()
            .filter_map(|key| self.get(key).map(|value| ((*key).to_string(), value)))
            .collect()
    }

    /// Look up a setting by dotted path, descending through nested maps.
    ///
    /// Returns `None` if any segment is absent or the current node is not
    /// a map. Each layer is tried in priority order; the first layer that
    /// contains the full path wins.
    pub fn get_path(&self, dotted: &str) -> Option<ConfigValue> {
        for layer in self.layers() {
            if let Some(value) = descend(layer, dotted) {
                return Some(self.resolve_value(value.clone()));
            }
        }
        None
    }

    /// Resolve tags in an arbitrary string against this view.
    pub fn resolve_string(&self, value: &str) -> String {
        resolve_tags(
            value,
            |name| self.lookup_replacement(name),
            |name| self.identity.dynamic_override(name),
        )
    }

    fn layers(&self) -> impl Iterator<Item = &ConfigTree> {
        [Some(&self.user), self.profile, Some(self.defaults)]
            .into_iter()
            .flatten()
    }

    fn raw(&self, key: &str) -> Option<&ConfigValue> {
        self.layers().find_map(|layer| layer.get(key))
    }

    fn version_alias(&self) -> &'static str {
        if self.identity.is_admin {
            ADMIN_ANALYZER_VERSION_KEY
        } else {
            USER_ANALYZER_VERSION_KEY
        }
    }

    fn resolve_value(&self, value: ConfigValue) -> ConfigValue {
        match value {
            ConfigValue::Scalar(serde_json::Value::String(s)) => {
                ConfigValue::string(self.resolve_string(&s))
            }
            other => other,
        }
    }

    /// Replacement text for a tag, from the layered store.
    ///
    /// Derived keys participate here too, so `[ANALYZER_VERSION]` inside a
    /// path template expands per-identity. Only scalars substitute; lists,
    /// maps, and null leave the tag verbatim.
    fn lookup_replacement(&self, name: &str) -> Option<String> {
        if name == OUTPUT_DEBUG_KEY {
            return Some(self.identity.is_admin.to_string());
        }
        if name == ANALYZER_VERSION_KEY {
            return self.lookup_replacement(self.version_alias());
        }
        match self.raw(name)? {
            ConfigValue::Scalar(serde_json::Value::String(s)) => Some(s.clone()),
            ConfigValue::Scalar(serde_json::Value::Bool(b)) => Some(b.to_string()),
            ConfigValue::Scalar(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }
}

fn descend<'t>(tree: &'t ConfigTree, dotted: &str) -> Option<&'t ConfigValue> {
    let mut segments = dotted.split('.');
    let mut current = tree.get(segments.next()?)?;
    for segment in segments {
        current = current.as_map()?.get(segment)?;
    }
    Some(current)
}
