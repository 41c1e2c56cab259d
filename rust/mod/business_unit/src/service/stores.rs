//! Effective store resolution.
//!
//! A `FromParent` unit has no stores of its own; it sells through the
//! stores of its nearest `Explicit` ancestor. Resolution walks the parent
//! chain through a caller-supplied lookup and does no I/O itself.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::model::{BusinessUnit, StoreMode, StoreRef};
use crate::service::OrgError;

/// Parent hops followed before a chain is declared cyclic.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Resolve the stores `unit` may transact against.
///
/// - `Explicit` units return their own stores without any lookup.
/// - `FromParent` units walk up until an `Explicit` ancestor (its stores)
///   or a root. A `FromParent` root resolves to no stores.
/// - More than `max_depth` hops fails with [`OrgError::CycleDetected`].
pub fn resolve_stores<F>(
    unit: &BusinessUnit,
    mut lookup: F,
    max_depth: usize,
) -> Result<Vec<StoreRef>, OrgError>
where
    F: FnMut(&str) -> Result<BusinessUnit, OrgError>,
{
    if unit.store_mode == StoreMode::Explicit {
        return Ok(unit.stores.clone());
    }

    let mut hops = 0;
    let mut current: Option<BusinessUnit> = None;
    loop {
        let node = current.as_ref().unwrap_or(unit);
        if node.store_mode == StoreMode::Explicit {
            debug!(
                "business unit {} inherits {} stores from {} ({} hops)",
                unit.key,
                node.stores.len(),
                node.key,
                hops
            );
            return Ok(node.stores.clone());
        }

        let Some(parent_key) = node.parent_key() else {
            debug!(
                "business unit {} inherits stores but root {} has none",
                unit.key, node.key
            );
            return Ok(Vec::new());
        };

        if hops >= max_depth {
            warn!(
                "parent chain of business unit {} exceeds {} levels, last seen {}",
                unit.key, max_depth, node.key
            );
            return Err(OrgError::CycleDetected {
                key: unit.key.clone(),
                depth: max_depth,
            });
        }

        let parent = lookup(parent_key)?;
        hops += 1;
        current = Some(parent);
    }
}

/// Lookup over an already-fetched set of units.
pub fn chain_lookup(
    units: &[BusinessUnit],
) -> impl FnMut(&str) -> Result<BusinessUnit, OrgError> + '_ {
    let index: HashMap<&str, &BusinessUnit> =
        units.iter().map(|u| (u.key.as_str(), u)).collect();
    move |key: &str| {
        index
            .get(key)
            .map(|u| (*u).clone())
            .ok_or_else(|| OrgError::NotFound(format!("business unit '{}'", key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn explicit_root(stores: &[&str]) -> BusinessUnit {
        let mut root = BusinessUnit::company("root", "Root");
        root.stores = stores.iter().map(|k| StoreRef::from_key(*k)).collect();
        root
    }

    /// root ← d1 ← d2 ← ... ← dn, all FromParent.
    fn chain(root: BusinessUnit, n: usize) -> Vec<BusinessUnit> {
        let mut units = vec![root];
        for i in 1..=n {
            let parent = units.last().unwrap().clone();
            units.push(BusinessUnit::division(format!("d{}", i), format!("D{}", i), &parent));
        }
        units
    }

    fn keys(stores: &[StoreRef]) -> Vec<&str> {
        stores.iter().map(|s| s.key.as_str()).collect()
    }

    #[test]
    fn test_explicit_returns_own_stores_without_lookup() {
        let root = explicit_root(&["eu", "us"]);
        let stores = resolve_stores(
            &root,
            |_| panic!("explicit units must not look anything up"),
            DEFAULT_MAX_DEPTH,
        )
        .unwrap();
        assert_eq!(keys(&stores), vec!["eu", "us"]);
    }

    #[test]
    fn test_explicit_empty_stays_empty() {
        let root = explicit_root(&[]);
        let stores = resolve_stores(&root, chain_lookup(&[]), DEFAULT_MAX_DEPTH).unwrap();
        assert!(stores.is_empty());
    }

    #[test]
    fn test_inheritance_terminates_at_any_depth() {
        for n in [1, 2, 5, 20, DEFAULT_MAX_DEPTH] {
            let units = chain(explicit_root(&["eu", "us"]), n);
            let leaf = units.last().unwrap();
            let stores = resolve_stores(leaf, chain_lookup(&units), DEFAULT_MAX_DEPTH).unwrap();
            assert_eq!(keys(&stores), vec!["eu", "us"], "chain of length {}", n);
        }
    }

    #[test]
    fn test_stops_at_nearest_explicit_ancestor() {
        let mut units = chain(explicit_root(&["eu"]), 3);
        units[1].store_mode = StoreMode::Explicit;
        units[1].stores = vec![StoreRef::from_key("apac")];
        let stores = resolve_stores(&units[3], chain_lookup(&units), DEFAULT_MAX_DEPTH).unwrap();
        assert_eq!(keys(&stores), vec!["apac"]);
    }

    #[test]
    fn test_from_parent_root_resolves_empty() {
        let mut root = explicit_root(&["eu"]);
        root.store_mode = StoreMode::FromParent;
        let stores = resolve_stores(&root, chain_lookup(&[]), DEFAULT_MAX_DEPTH).unwrap();
        assert!(stores.is_empty());

        // Same when the FromParent root sits at the top of a chain.
        let units = chain(root, 3);
        let stores = resolve_stores(&units[3], chain_lookup(&units), DEFAULT_MAX_DEPTH).unwrap();
        assert!(stores.is_empty());
    }

    #[test]
    fn test_two_unit_cycle_is_detected() {
        let root = BusinessUnit::company("a", "A");
        let mut a = BusinessUnit::division("a", "A", &root);
        let mut b = BusinessUnit::division("b", "B", &root);
        a.parent_unit = Some(crate::model::KeyReference::business_unit("b"));
        b.parent_unit = Some(crate::model::KeyReference::business_unit("a"));
        let units = vec![a, b];

        let err = resolve_stores(&units[0], chain_lookup(&units), DEFAULT_MAX_DEPTH).unwrap_err();
        match err {
            OrgError::CycleDetected { key, depth } => {
                assert_eq!(key, "a");
                assert_eq!(depth, DEFAULT_MAX_DEPTH);
            }
            other => panic!("expected CycleDetected, got {:?}", other),
        }
    }

    #[test]
    fn test_chain_longer_than_bound_is_cycle() {
        let units = chain(explicit_root(&["eu"]), 5);
        let result = resolve_stores(&units[5], chain_lookup(&units), 4);
        assert!(matches!(result, Err(OrgError::CycleDetected { .. })));
    }

    #[test]
    fn test_missing_parent_is_not_found() {
        let units = chain(explicit_root(&["eu"]), 2);
        let result = resolve_stores(&units[2], chain_lookup(&units[2..]), DEFAULT_MAX_DEPTH);
        assert!(matches!(result, Err(OrgError::NotFound(_))));
    }
}
