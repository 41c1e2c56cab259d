use crate::model::{
    BusinessUnit, CustomerId, OrganizationView, StoreRef, TrimmedAssociate, TrimmedBusinessUnit,
};
use crate::service::authorization::{is_admin, is_root_admin};

/// Build the view of `unit` for `account_id`.
///
/// `resolved_stores` are the unit's effective stores and replace its own
/// `stores` field in the trimmed output.
pub fn project(
    unit: &BusinessUnit,
    resolved_stores: Vec<StoreRef>,
    account_id: &str,
    admin_role_key: &str,
) -> OrganizationView {
    let admin = is_admin(unit, account_id, admin_role_key);
    let root_admin = is_root_admin(unit, account_id, admin_role_key);

    OrganizationView {
        business_unit: trim(unit, resolved_stores.clone(), admin, root_admin),
        resolved_stores,
        is_admin: admin,
        is_root_admin: root_admin,
    }
}

/// Strip `unit` down to its public fields.
pub fn trim(
    unit: &BusinessUnit,
    stores: Vec<StoreRef>,
    is_admin: bool,
    is_root_admin: bool,
) -> TrimmedBusinessUnit {
    TrimmedBusinessUnit {
        top_level_unit: unit.top_level_unit.clone(),
        key: unit.key.clone(),
        name: unit.name.clone(),
        parent_unit: unit.parent_unit.clone(),
        store_mode: unit.store_mode,
        stores,
        is_admin,
        is_root_admin,
        associates: unit
            .associates
            .iter()
            .map(|a| TrimmedAssociate {
                customer: CustomerId {
                    id: a.customer.id.clone(),
                },
                role_keys: a.role_keys(),
            })
            .collect(),
    }
}
