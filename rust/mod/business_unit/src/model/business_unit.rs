use serde::{Deserialize, Serialize};

use crate::model::StoreRef;

pub const BUSINESS_UNIT_TYPE_ID: &str = "business-unit";
pub const CUSTOMER_TYPE_ID: &str = "customer";
pub const ASSOCIATE_ROLE_TYPE_ID: &str = "associate-role";

/// Whether a unit may currently be used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BusinessUnitStatus {
    #[default]
    Active,
    Inactive,
}

/// Where a unit's sellable stores come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreMode {
    /// The unit's own `stores` list.
    #[default]
    Explicit,
    /// The nearest `Explicit` ancestor's stores.
    FromParent,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitType {
    #[default]
    Company,
    Division,
}

/// Whether an associate's role also applies to descendant units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InheritanceMode {
    #[default]
    Enabled,
    Disabled,
}

/// A typed reference by key, e.g. `{"key": "acme", "typeId": "business-unit"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyReference {
    pub key: String,
    pub type_id: String,
}

impl KeyReference {
    pub fn business_unit(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            type_id: BUSINESS_UNIT_TYPE_ID.to_string(),
        }
    }

    pub fn associate_role(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            type_id: ASSOCIATE_ROLE_TYPE_ID.to_string(),
        }
    }
}

/// Denormalized customer profile the backend may expand into a reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRef {
    pub id: String,

    #[serde(default = "customer_type_id")]
    pub type_id: String,

    /// Expanded profile, present only when the backend query asked for it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obj: Option<CustomerProfile>,
}

fn customer_type_id() -> String {
    CUSTOMER_TYPE_ID.to_string()
}

impl CustomerRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            type_id: customer_type_id(),
            obj: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleAssignment {
    pub associate_role: KeyReference,
    #[serde(default)]
    pub inheritance: InheritanceMode,
}

impl RoleAssignment {
    pub fn new(role_key: impl Into<String>, inheritance: InheritanceMode) -> Self {
        Self {
            associate_role: KeyReference::associate_role(role_key),
            inheritance,
        }
    }

    pub fn role_key(&self) -> &str {
        &self.associate_role.key
    }
}

/// An account linked to a business unit with one or more roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Associate {
    pub customer: CustomerRef,
    #[serde(default)]
    pub associate_role_assignments: Vec<RoleAssignment>,
}

impl Associate {
    pub fn new(account_id: impl Into<String>, assignments: Vec<RoleAssignment>) -> Self {
        Self {
            customer: CustomerRef::new(account_id),
            associate_role_assignments: assignments,
        }
    }

    pub fn has_role(&self, role_key: &str) -> bool {
        self.associate_role_assignments
            .iter()
            .any(|a| a.role_key() == role_key)
    }

    /// Role keys in assignment order.
    pub fn role_keys(&self) -> Vec<String> {
        self.associate_role_assignments
            .iter()
            .map(|a| a.role_key().to_string())
            .collect()
    }

    /// True if at least one assignment carries over to descendant units.
    pub fn has_inherited_role(&self) -> bool {
        self.associate_role_assignments
            .iter()
            .any(|a| a.inheritance == InheritanceMode::Enabled)
    }
}

/// A node in a customer organization's hierarchy.
///
/// Units form a tree via `parent_unit`; every unit of one organization
/// points at the same `top_level_unit`. The backend owns these records,
/// the resolver only reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessUnit {
    /// Unique, stable key. Primary key everywhere.
    pub key: String,

    pub name: String,

    #[serde(default)]
    pub status: BusinessUnitStatus,

    #[serde(default)]
    pub store_mode: StoreMode,

    #[serde(default)]
    pub unit_type: UnitType,

    /// Parent unit (None = organization root).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_unit: Option<KeyReference>,

    /// Root of the organization; the unit's own key when it is the root.
    pub top_level_unit: KeyReference,

    /// Own stores. Only meaningful for `StoreMode::Explicit` units or
    /// when consulted as an ancestor.
    #[serde(default)]
    pub stores: Vec<StoreRef>,

    #[serde(default)]
    pub associates: Vec<Associate>,

    /// Optimistic concurrency token, bumped by every backend update.
    #[serde(default)]
    pub version: u64,
}

impl BusinessUnit {
    /// A root company: no parent, top-level unit is itself.
    pub fn company(key: impl Into<String>, name: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            top_level_unit: KeyReference::business_unit(key.clone()),
            key,
            name: name.into(),
            status: BusinessUnitStatus::Active,
            store_mode: StoreMode::Explicit,
            unit_type: UnitType::Company,
            parent_unit: None,
            stores: Vec::new(),
            associates: Vec::new(),
            version: 1,
        }
    }

    /// A division under `parent`, inheriting stores by default.
    pub fn division(
        key: impl Into<String>,
        name: impl Into<String>,
        parent: &BusinessUnit,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            status: BusinessUnitStatus::Active,
            store_mode: StoreMode::FromParent,
            unit_type: UnitType::Division,
            parent_unit: Some(KeyReference::business_unit(parent.key.clone())),
            top_level_unit: parent.top_level_unit.clone(),
            stores: Vec::new(),
            associates: Vec::new(),
            version: 1,
        }
    }

    pub fn parent_key(&self) -> Option<&str> {
        self.parent_unit.as_ref().map(|p| p.key.as_str())
    }

    pub fn top_level_key(&self) -> &str {
        &self.top_level_unit.key
    }

    pub fn is_root(&self) -> bool {
        self.parent_unit.is_none()
    }

    /// First associate entry for the given account.
    pub fn associate(&self, account_id: &str) -> Option<&Associate> {
        self.associates.iter().find(|a| a.customer.id == account_id)
    }

    pub fn store_keys(&self) -> Vec<&str> {
        self.stores.iter().map(|s| s.key.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_backend_shape() {
        let unit: BusinessUnit = serde_json::from_value(serde_json::json!({
            "key": "acme-west",
            "name": "ACME West",
            "status": "Active",
            "storeMode": "FromParent",
            "unitType": "Division",
            "parentUnit": {"key": "acme", "typeId": "business-unit"},
            "topLevelUnit": {"key": "acme", "typeId": "business-unit"},
            "associates": [{
                "customer": {"id": "c-1", "typeId": "customer", "obj": {"email": "a@acme.test"}},
                "associateRoleAssignments": [
                    {"associateRole": {"key": "admin", "typeId": "associate-role"}, "inheritance": "Disabled"}
                ]
            }],
            "version": 7
        }))
        .unwrap();

        assert_eq!(unit.parent_key(), Some("acme"));
        assert_eq!(unit.top_level_key(), "acme");
        assert_eq!(unit.store_mode, StoreMode::FromParent);
        assert!(unit.stores.is_empty());
        assert_eq!(unit.version, 7);

        let associate = unit.associate("c-1").unwrap();
        assert!(associate.has_role("admin"));
        assert!(!associate.has_inherited_role());
        assert_eq!(
            associate.customer.obj.as_ref().and_then(|p| p.email.as_deref()),
            Some("a@acme.test")
        );
    }

    #[test]
    fn test_minimal_unit_defaults() {
        let unit: BusinessUnit = serde_json::from_value(serde_json::json!({
            "key": "solo",
            "name": "Solo",
            "topLevelUnit": {"key": "solo", "typeId": "business-unit"}
        }))
        .unwrap();
        assert!(unit.is_root());
        assert_eq!(unit.status, BusinessUnitStatus::Active);
        assert_eq!(unit.store_mode, StoreMode::Explicit);
        assert_eq!(unit.unit_type, UnitType::Company);
        assert_eq!(unit.version, 0);
    }

    #[test]
    fn test_division_links_to_parent() {
        let root = BusinessUnit::company("acme", "ACME");
        let div = BusinessUnit::division("acme-east", "ACME East", &root);
        assert_eq!(div.parent_key(), Some("acme"));
        assert_eq!(div.top_level_key(), "acme");
        assert_eq!(div.store_mode, StoreMode::FromParent);
        assert!(!div.is_root());
    }

    #[test]
    fn test_role_keys_preserve_order() {
        let associate = Associate::new(
            "c-9",
            vec![
                RoleAssignment::new("buyer", InheritanceMode::Disabled),
                RoleAssignment::new("admin", InheritanceMode::Enabled),
            ],
        );
        assert_eq!(associate.role_keys(), vec!["buyer", "admin"]);
        assert!(associate.has_inherited_role());
    }
}
