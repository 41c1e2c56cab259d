use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use bizorg_core::{ListParams, ListResult};
use serde::Deserialize;
use tracing::debug;

use crate::backend::{BackendError, BusinessUnitBackend};
use crate::model::{
    Associate, BusinessUnit, BusinessUnitStatus, CustomerRef, KeyReference, Store, StoreMode,
    StoreRef, UpdateRequest,
};

/// Backend that keeps every record in memory.
///
/// Units are returned in insertion order. Used by tests and by the CLI,
/// which fills it from a snapshot file.
#[derive(Default)]
pub struct InMemoryBackend {
    units: RwLock<Vec<BusinessUnit>>,
    stores: RwLock<Vec<Store>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(units: Vec<BusinessUnit>, stores: Vec<Store>) -> Self {
        Self {
            units: RwLock::new(units),
            stores: RwLock::new(stores),
        }
    }

    /// Insert a unit, replacing any existing unit with the same key.
    pub fn insert_unit(&self, unit: BusinessUnit) -> Result<(), BackendError> {
        let mut units = self.write_units()?;
        match units.iter_mut().find(|u| u.key == unit.key) {
            Some(existing) => *existing = unit,
            None => units.push(unit),
        }
        Ok(())
    }

    pub fn unit_count(&self) -> Result<usize, BackendError> {
        Ok(self.read_units()?.len())
    }

    fn read_units(&self) -> Result<RwLockReadGuard<'_, Vec<BusinessUnit>>, BackendError> {
        self.units
            .read()
            .map_err(|_| BackendError::Storage("business unit table lock poisoned".into()))
    }

    fn write_units(&self) -> Result<RwLockWriteGuard<'_, Vec<BusinessUnit>>, BackendError> {
        self.units
            .write()
            .map_err(|_| BackendError::Storage("business unit table lock poisoned".into()))
    }

    fn read_stores(&self) -> Result<RwLockReadGuard<'_, Vec<Store>>, BackendError> {
        self.stores
            .read()
            .map_err(|_| BackendError::Storage("store table lock poisoned".into()))
    }
}

impl BusinessUnitBackend for InMemoryBackend {
    fn query_for_account(
        &self,
        account_id: &str,
        params: &ListParams,
    ) -> Result<ListResult<BusinessUnit>, BackendError> {
        let units = self.read_units()?;
        let index: HashMap<&str, &BusinessUnit> =
            units.iter().map(|u| (u.key.as_str(), u)).collect();

        let matches: Vec<BusinessUnit> = units
            .iter()
            .filter(|u| is_associate(u, account_id, &index))
            .cloned()
            .collect();

        debug!(
            "account {} is associated with {} business units",
            account_id,
            matches.len()
        );
        Ok(ListResult::paginate(matches, params))
    }

    fn query_by_top_level(
        &self,
        top_level_key: &str,
        params: &ListParams,
    ) -> Result<ListResult<BusinessUnit>, BackendError> {
        let units = self.read_units()?;
        let matches: Vec<BusinessUnit> = units
            .iter()
            .filter(|u| u.top_level_key() == top_level_key)
            .cloned()
            .collect();
        Ok(ListResult::paginate(matches, params))
    }

    fn get_by_key(&self, key: &str) -> Result<Option<BusinessUnit>, BackendError> {
        let units = self.read_units()?;
        Ok(units.iter().find(|u| u.key == key).cloned())
    }

    fn get_stores(&self, keys: &[String]) -> Result<Vec<Store>, BackendError> {
        let stores = self.read_stores()?;
        Ok(keys
            .iter()
            .filter_map(|k| stores.iter().find(|s| &s.key == k).cloned())
            .collect())
    }

    fn update(&self, request: UpdateRequest) -> Result<BusinessUnit, BackendError> {
        let actions = request
            .actions
            .iter()
            .map(|a| {
                serde_json::from_value::<UpdateAction>(a.clone())
                    .map_err(|e| BackendError::Validation(format!("unsupported action: {}", e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let store_keys: HashSet<String> =
            self.read_stores()?.iter().map(|s| s.key.clone()).collect();
        let mut units = self.write_units()?;

        let pos = units
            .iter()
            .position(|u| u.key == request.key)
            .ok_or_else(|| BackendError::NotFound(format!("business unit '{}'", request.key)))?;

        let current_version = units[pos].version;
        if current_version != request.version {
            return Err(BackendError::Conflict(format!(
                "business unit '{}' is at version {}, update expected {}",
                request.key, current_version, request.version
            )));
        }

        let mut updated = units[pos].clone();
        for action in actions {
            apply_action(&mut updated, action, &units, &store_keys)?;
        }
        updated.version = current_version + 1;

        let top_level_changed = units[pos].top_level_unit != updated.top_level_unit;
        units[pos] = updated.clone();
        if top_level_changed {
            retarget_descendants(&mut units, &updated.key, &updated.top_level_unit);
        }

        debug!(
            "updated business unit {} to version {}",
            updated.key, updated.version
        );
        Ok(updated)
    }
}

/// Update actions this backend understands.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
enum UpdateAction {
    ChangeName {
        name: String,
    },
    ChangeStatus {
        status: BusinessUnitStatus,
    },
    SetStoreMode {
        #[serde(rename = "storeMode")]
        store_mode: StoreMode,
        #[serde(default)]
        stores: Vec<StoreRef>,
    },
    AddStore {
        store: StoreRef,
    },
    RemoveStore {
        store: StoreRef,
    },
    ChangeParentUnit {
        #[serde(rename = "parentUnit")]
        parent_unit: KeyReference,
    },
    AddAssociate {
        associate: Associate,
    },
    RemoveAssociate {
        customer: CustomerRef,
    },
}

fn apply_action(
    unit: &mut BusinessUnit,
    action: UpdateAction,
    units: &[BusinessUnit],
    store_keys: &HashSet<String>,
) -> Result<(), BackendError> {
    match action {
        UpdateAction::ChangeName { name } => unit.name = name,
        UpdateAction::ChangeStatus { status } => unit.status = status,
        UpdateAction::SetStoreMode { store_mode, stores } => {
            unit.store_mode = store_mode;
            unit.stores = match store_mode {
                StoreMode::Explicit => {
                    for store in &stores {
                        ensure_store(store_keys, &store.key)?;
                    }
                    stores
                }
                StoreMode::FromParent => Vec::new(),
            };
        }
        UpdateAction::AddStore { store } => {
            ensure_store(store_keys, &store.key)?;
            if !unit.stores.iter().any(|s| s.key == store.key) {
                unit.stores.push(store);
            }
        }
        UpdateAction::RemoveStore { store } => {
            let before = unit.stores.len();
            unit.stores.retain(|s| s.key != store.key);
            if unit.stores.len() == before {
                return Err(BackendError::Validation(format!(
                    "store '{}' is not assigned to business unit '{}'",
                    store.key, unit.key
                )));
            }
        }
        UpdateAction::ChangeParentUnit { parent_unit } => {
            let parent = check_parent(units, &unit.key, &parent_unit.key)?;
            unit.parent_unit = Some(KeyReference::business_unit(parent.key.clone()));
            unit.top_level_unit = parent.top_level_unit.clone();
        }
        UpdateAction::AddAssociate { associate } => {
            unit.associates
                .retain(|a| a.customer.id != associate.customer.id);
            unit.associates.push(associate);
        }
        UpdateAction::RemoveAssociate { customer } => {
            let before = unit.associates.len();
            unit.associates.retain(|a| a.customer.id != customer.id);
            if unit.associates.len() == before {
                return Err(BackendError::Validation(format!(
                    "customer '{}' is not an associate of business unit '{}'",
                    customer.id, unit.key
                )));
            }
        }
    }
    Ok(())
}

fn ensure_store(store_keys: &HashSet<String>, key: &str) -> Result<(), BackendError> {
    if store_keys.contains(key) {
        Ok(())
    } else {
        Err(BackendError::Validation(format!("store '{}' does not exist", key)))
    }
}

/// Check that `parent_key` may become the parent of `child_key`: the parent
/// must exist and must not be `child_key` or one of its descendants.
fn check_parent<'a>(
    units: &'a [BusinessUnit],
    child_key: &str,
    parent_key: &str,
) -> Result<&'a BusinessUnit, BackendError> {
    if child_key == parent_key {
        return Err(BackendError::Validation(
            "cycle detected: a business unit cannot be its own parent".to_string(),
        ));
    }

    let find = |key: &str| units.iter().find(|u| u.key == key);
    let parent = find(parent_key)
        .ok_or_else(|| BackendError::NotFound(format!("business unit '{}'", parent_key)))?;

    let mut visited = HashSet::new();
    let mut current = Some(parent);
    while let Some(unit) = current {
        if unit.key == child_key {
            return Err(BackendError::Validation(format!(
                "cycle detected: '{}' is a descendant of '{}'",
                parent_key, child_key
            )));
        }
        if !visited.insert(unit.key.as_str()) {
            break;
        }
        current = unit.parent_key().and_then(find);
    }

    Ok(parent)
}

/// Point every descendant of `root_key` at `top_level`.
fn retarget_descendants(units: &mut [BusinessUnit], root_key: &str, top_level: &KeyReference) {
    let mut seen: HashSet<String> = HashSet::new();
    seen.insert(root_key.to_string());
    let mut queue = VecDeque::from([root_key.to_string()]);

    while let Some(key) = queue.pop_front() {
        for unit in units.iter_mut() {
            if unit.parent_key() == Some(key.as_str()) && seen.insert(unit.key.clone()) {
                unit.top_level_unit = top_level.clone();
                queue.push_back(unit.key.clone());
            }
        }
    }
}

/// Direct associate of `unit`, or associate of an ancestor with a role
/// that carries over to descendants.
fn is_associate<'a>(
    unit: &'a BusinessUnit,
    account_id: &str,
    index: &HashMap<&'a str, &'a BusinessUnit>,
) -> bool {
    if unit.associate(account_id).is_some() {
        return true;
    }

    let mut visited: HashSet<&str> = HashSet::new();
    visited.insert(unit.key.as_str());
    let mut current = unit.parent_key();
    while let Some(key) = current {
        if !visited.insert(key) {
            break;
        }
        let Some(&ancestor) = index.get(key) else {
            break;
        };
        if ancestor
            .associate(account_id)
            .is_some_and(|a| a.has_inherited_role())
        {
            return true;
        }
        current = ancestor.parent_key();
    }
    false
}
