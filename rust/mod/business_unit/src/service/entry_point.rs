//! Entry-point selection.
//!
//! The backend returns every unit an account can see, flat and unordered.
//! The entry points are the most senior of those: true roots when any are
//! visible, otherwise the topmost unit of each visible subtree.

use std::collections::HashSet;

use crate::model::BusinessUnit;
use crate::service::authorization::is_admin;

/// How candidates are narrowed once no true root is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// All candidates, the account's admin units first.
    AdminFirst,
    /// Only candidates where the account is admin.
    AdminOnly,
}

/// Select the entry points of `units` for `account_id`.
///
/// 1. Any root (no parent) present: the roots, verbatim and in input order.
///    An account may sit directly in several organizations.
/// 2. Otherwise the units whose parent is not itself in `units`, then
///    either filtered or stably partitioned on the admin role.
pub fn select_entry_points(
    units: &[BusinessUnit],
    account_id: &str,
    admin_role_key: &str,
    selection: Selection,
) -> Vec<BusinessUnit> {
    let roots: Vec<BusinessUnit> = units.iter().filter(|u| u.is_root()).cloned().collect();
    if !roots.is_empty() {
        return roots;
    }

    let visible: HashSet<&str> = units.iter().map(|u| u.key.as_str()).collect();
    let candidates = units
        .iter()
        .filter(|u| u.parent_key().is_some_and(|p| !visible.contains(p)));

    match selection {
        Selection::AdminOnly => candidates
            .filter(|u| is_admin(u, account_id, admin_role_key))
            .cloned()
            .collect(),
        Selection::AdminFirst => {
            let (mut admin, other): (Vec<BusinessUnit>, Vec<BusinessUnit>) = candidates
                .cloned()
                .partition(|u| is_admin(u, account_id, admin_role_key));
            admin.extend(other);
            admin
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Associate, InheritanceMode, KeyReference, RoleAssignment};

    fn unit(key: &str, parent: Option<&str>) -> BusinessUnit {
        let mut u = BusinessUnit::company(key, key.to_uppercase());
        u.parent_unit = parent.map(KeyReference::business_unit);
        u
    }

    fn admin(mut u: BusinessUnit, account: &str) -> BusinessUnit {
        u.associates.push(Associate::new(
            account,
            vec![RoleAssignment::new("admin", InheritanceMode::Enabled)],
        ));
        u
    }

    fn keys(units: &[BusinessUnit]) -> Vec<&str> {
        units.iter().map(|u| u.key.as_str()).collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(select_entry_points(&[], "alice", "admin", Selection::AdminFirst).is_empty());
        assert!(select_entry_points(&[], "alice", "admin", Selection::AdminOnly).is_empty());
    }

    #[test]
    fn test_true_root_present() {
        let units = vec![unit("a", None)];
        let selected = select_entry_points(&units, "alice", "admin", Selection::AdminFirst);
        assert_eq!(keys(&selected), vec!["a"]);
    }

    #[test]
    fn test_roots_returned_verbatim() {
        // Roots win even when filtering, and non-roots are dropped.
        let units = vec![unit("x", Some("a")), unit("a", None), unit("b", None)];
        let selected = select_entry_points(&units, "alice", "admin", Selection::AdminOnly);
        assert_eq!(keys(&selected), vec!["a", "b"]);
    }

    #[test]
    fn test_topmost_visible_unit_without_root() {
        let units = vec![unit("b", Some("a")), unit("c", Some("b"))];
        let selected = select_entry_points(&units, "alice", "admin", Selection::AdminFirst);
        assert_eq!(keys(&selected), vec!["b"]);
    }

    #[test]
    fn test_flat_forest_of_orphans() {
        let units = vec![unit("x", Some("p")), unit("y", Some("q")), unit("z", Some("r"))];
        let selected = select_entry_points(&units, "alice", "admin", Selection::AdminFirst);
        assert_eq!(keys(&selected), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_stable_admin_partition() {
        let units = vec![
            unit("x", Some("p")),
            admin(unit("y", Some("p")), "alice"),
            unit("z", Some("p")),
            admin(unit("w", Some("p")), "alice"),
        ];
        let selected = select_entry_points(&units, "alice", "admin", Selection::AdminFirst);
        assert_eq!(keys(&selected), vec!["y", "w", "x", "z"]);
    }

    #[test]
    fn test_admin_only_filter() {
        let units = vec![
            unit("x", Some("p")),
            admin(unit("y", Some("p")), "alice"),
            admin(unit("w", Some("p")), "bob"),
        ];
        let selected = select_entry_points(&units, "alice", "admin", Selection::AdminOnly);
        assert_eq!(keys(&selected), vec!["y"]);
    }

    #[test]
    fn test_selection_is_idempotent() {
        let inputs = vec![
            vec![unit("a", None), unit("b", Some("a"))],
            vec![unit("b", Some("a")), unit("c", Some("b"))],
            vec![
                unit("x", Some("p")),
                admin(unit("y", Some("p")), "alice"),
                unit("z", Some("q")),
            ],
        ];
        for input in inputs {
            for selection in [Selection::AdminFirst, Selection::AdminOnly] {
                let once = select_entry_points(&input, "alice", "admin", selection);
                let twice = select_entry_points(&once, "alice", "admin", selection);
                assert_eq!(once, twice);
            }
        }
    }
}
