//! Role checks against a single unit's associate list.
//!
//! Only direct membership is consulted. Associates inherited from ancestor
//! units are the backend's concern and must already be merged into the
//! unit if they matter.

use crate::model::BusinessUnit;

/// True if the account is an associate of `unit` holding `role_key`.
///
/// Only the first associate entry for the account is considered.
pub fn has_role(unit: &BusinessUnit, account_id: &str, role_key: &str) -> bool {
    unit.associate(account_id)
        .map(|a| a.has_role(role_key))
        .unwrap_or(false)
}

pub fn is_admin(unit: &BusinessUnit, account_id: &str, admin_role_key: &str) -> bool {
    has_role(unit, account_id, admin_role_key)
}

/// Admin of an organization root. Implies [`is_admin`].
pub fn is_root_admin(unit: &BusinessUnit, account_id: &str, admin_role_key: &str) -> bool {
    is_admin(unit, account_id, admin_role_key) && unit.is_root()
}
