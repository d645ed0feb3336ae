//! The requesting identity and its dynamic override values.

/// The authenticated principal a request acts on behalf of.
///
/// Identities are supplied by the surrounding authentication layer; this
/// crate never invents or mutates them. The name is assumed to already be
/// a safe path segment when used by filesystem-backed stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// The identity's unique name.
    pub username: String,
    /// Whether this identity has administrator privileges. Controls the
    /// derived version and debug-output settings.
    pub is_admin: bool,
    /// The identity's saved parent-folder reference on the remote drive,
    /// if one has been configured.
    pub drive_parent: Option<String>,
}

impl Identity {
    /// Create a regular (non-admin) identity.
    pub fn new(username: impl Into<String>) -> Self {
        Identity {
            username: username.into(),
            is_admin: false,
            drive_parent: None,
        }
    }

    /// Create an administrator identity.
    pub fn admin(username: impl Into<String>) -> Self {
        Identity {
            is_admin: true,
            ..Identity::new(username)
        }
    }

    /// Set the saved parent-folder reference.
    pub fn with_drive_parent(mut self, drive_parent: impl Into<String>) -> Self {
        self.drive_parent = Some(drive_parent.into());
        self
    }

    /// Dynamic override value for a tag name, if this identity supplies one.
    ///
    /// These values substitute into string settings as if they were stored
    /// keys, and take precedence over stored keys of the same name.
    pub fn dynamic_override(&self, name: &str) -> Option<String> {
        match name {
            "username" => Some(self.username.clone()),
            "drive_parent" => self.drive_parent.clone(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_override() {
        let identity = Identity::new("alice");
        assert_eq!(identity.dynamic_override("username"), Some("alice".into()));
    }

    #[test]
    fn test_drive_parent_override_absent_by_default() {
        let identity = Identity::new("alice");
        assert_eq!(identity.dynamic_override("drive_parent"), None);
    }

    #[test]
    fn test_drive_parent_override() {
        let identity = Identity::new("alice").with_drive_parent("folder-1");
        assert_eq!(
            identity.dynamic_override("drive_parent"),
            Some("folder-1".into())
        );
    }

    #[test]
    fn test_unknown_name_has_no_override() {
        let identity = Identity::admin("root");
        assert_eq!(identity.dynamic_override("BUCKET"), None);
    }
}
