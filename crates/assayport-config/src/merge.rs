//! Deep merging of configuration trees.
//!
//! A patch merges into a base tree field-wise: recursion happens only when
//! both the existing value and the patch value are maps. In every other
//! case - a new key, a scalar on either side, or a list on either side -
//! the patch value replaces the base value wholesale. Lists are atomic;
//! they are never combined element-wise.

use indexmap::map::Entry;

use crate::types::{ConfigTree, ConfigValue};

/// Merge `patch` into `base` in place.
///
/// After the call `base` is the canonical merged value. Keys unique to
/// `base` are untouched; keys unique to `patch` are inserted; keys present
/// in both recurse only when both sides are maps.
pub fn deep_merge(base: &mut ConfigTree, patch: ConfigTree) {
    for (key, patch_value) in patch {
        match base.entry(key) {
            Entry::Occupied(mut occupied) => match (occupied.get_mut(), patch_value) {
                (ConfigValue::Map(base_map), ConfigValue::Map(patch_map)) => {
                    deep_merge(base_map, patch_map);
                }
                (slot, patch_value) => {
                    *slot = patch_value;
                }
            },
            Entry::Vacant(vacant) => {
                vacant.insert(patch_value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(entries: Vec<(&str, ConfigValue)>) -> ConfigTree {
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    #[test]
    fn test_disjoint_keys_union() {
        let mut base = tree(vec![("a", ConfigValue::string("1"))]);
        let patch = tree(vec![("b", ConfigValue::string("2"))]);
        deep_merge(&mut base, patch);

        assert_eq!(base.get("a").unwrap().as_str(), Some("1"));
        assert_eq!(base.get("b").unwrap().as_str(), Some("2"));
    }

    #[test]
    fn test_scalar_override() {
        let mut base = tree(vec![("a", ConfigValue::string("old"))]);
        let patch = tree(vec![("a", ConfigValue::string("new"))]);
        deep_merge(&mut base, patch);

        assert_eq!(base.get("a").unwrap().as_str(), Some("new"));
    }

    #[test]
    fn test_nested_maps_merge_recursively() {
        let mut base = tree(vec![(
            "drive",
            ConfigValue::map(tree(vec![
                ("parent", ConfigValue::string("abc")),
                ("owner", ConfigValue::string("alice")),
            ])),
        )]);
        let patch = tree(vec![(
            "drive",
            ConfigValue::map(tree(vec![("parent", ConfigValue::string("xyz"))])),
        )]);
        deep_merge(&mut base, patch);

        let drive = base.get("drive").unwrap().as_map().unwrap();
        assert_eq!(drive.get("parent").unwrap().as_str(), Some("xyz"));
        // Sibling untouched by the patch survives the merge.
        assert_eq!(drive.get("owner").unwrap().as_str(), Some("alice"));
    }

    #[test]
    fn test_lists_replace_wholesale() {
        let mut base = tree(vec![(
            "x",
            ConfigValue::list(vec![ConfigValue::integer(9)]),
        )]);
        let patch = tree(vec![(
            "x",
            ConfigValue::list(vec![
                ConfigValue::integer(1),
                ConfigValue::integer(2),
                ConfigValue::integer(3),
            ]),
        )]);
        deep_merge(&mut base, patch);

        let items = base.get("x").unwrap().as_list().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0], ConfigValue::integer(1));
    }

    #[test]
    fn test_map_patch_replaces_scalar() {
        // No recursion attempted against a non-tree: the subtree replaces
        // the scalar wholesale.
        let mut base = tree(vec![("a", ConfigValue::string("scalar"))]);
        let patch = tree(vec![(
            "a",
            ConfigValue::map(tree(vec![("inner", ConfigValue::string("v"))])),
        )]);
        deep_merge(&mut base, patch);

        let inner = base.get("a").unwrap().as_map().unwrap();
        assert_eq!(inner.get("inner").unwrap().as_str(), Some("v"));
    }

    #[test]
    fn test_scalar_patch_replaces_map() {
        let mut base = tree(vec![(
            "a",
            ConfigValue::map(tree(vec![("inner", ConfigValue::string("v"))])),
        )]);
        let patch = tree(vec![("a", ConfigValue::string("flat"))]);
        deep_merge(&mut base, patch);

        assert_eq!(base.get("a").unwrap().as_str(), Some("flat"));
    }

    #[test]
    fn test_empty_map_patch_preserves_base_map() {
        // An empty patch map is still a map: recursion happens and changes
        // nothing, rather than wiping the base subtree.
        let mut base = tree(vec![(
            "a",
            ConfigValue::map(tree(vec![("keep", ConfigValue::string("v"))])),
        )]);
        let patch = tree(vec![("a", ConfigValue::map(ConfigTree::new()))]);
        deep_merge(&mut base, patch);

        let a = base.get("a").unwrap().as_map().unwrap();
        assert_eq!(a.get("keep").unwrap().as_str(), Some("v"));
    }

    #[test]
    fn test_list_patch_replaces_map() {
        let mut base = tree(vec![(
            "a",
            ConfigValue::map(tree(vec![("inner", ConfigValue::string("v"))])),
        )]);
        let patch = tree(vec![(
            "a",
            ConfigValue::list(vec![ConfigValue::string("item")]),
        )]);
        deep_merge(&mut base, patch);

        assert!(base.get("a").unwrap().is_list());
    }
}
