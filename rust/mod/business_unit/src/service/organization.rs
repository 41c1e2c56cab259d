use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::backend::BackendError;
use crate::model::{BusinessUnit, OrganizationView, StoreRef, UpdateRequest};
use crate::service::entry_point::{select_entry_points, Selection};
use crate::service::projection::project;
use crate::service::stores::{chain_lookup, resolve_stores};
use crate::service::tree::build_tree;
use crate::service::{enrich_stores, OrgError, OrganizationService};

impl OrganizationService {
    /// Every unit the account is a direct or inherited associate of.
    pub fn units_for_account(&self, account_id: &str) -> Result<Vec<BusinessUnit>, OrgError> {
        let units = self.fetch_all(|params| self.backend.query_for_account(account_id, params))?;
        debug!("account {} sees {} business units", account_id, units.len());
        Ok(units)
    }

    /// Entry points for the account, admin units first.
    pub fn entry_points(&self, account_id: &str) -> Result<Vec<BusinessUnit>, OrgError> {
        let units = self.units_for_account(account_id)?;
        Ok(select_entry_points(
            &units,
            account_id,
            self.admin_role_key(),
            Selection::AdminFirst,
        ))
    }

    /// Entry points where the account is admin.
    pub fn admin_entry_points(&self, account_id: &str) -> Result<Vec<BusinessUnit>, OrgError> {
        let units = self.units_for_account(account_id)?;
        Ok(select_entry_points(
            &units,
            account_id,
            self.admin_role_key(),
            Selection::AdminOnly,
        ))
    }

    /// The account's organization: the view of its first entry point.
    pub fn organization(&self, account_id: &str) -> Result<OrganizationView, OrgError> {
        let units = self.units_for_account(account_id)?;
        let entry_points = select_entry_points(
            &units,
            account_id,
            self.admin_role_key(),
            Selection::AdminFirst,
        );

        let Some(entry) = entry_points.first() else {
            return Err(no_units(account_id));
        };
        if entry_points.len() > 1 {
            debug!(
                "account {} has {} entry points, using {}",
                account_id,
                entry_points.len(),
                entry.key
            );
        }

        self.view(entry, &units, account_id)
    }

    /// The units reachable from the account's entry points, one view per
    /// unit, grouped by organization.
    ///
    /// Entry points are rendered without a parent; their flags and stores
    /// still come from the real record.
    pub fn tree(&self, account_id: &str) -> Result<Vec<OrganizationView>, OrgError> {
        let entry_points = self.entry_points(account_id)?;
        if entry_points.is_empty() {
            return Err(no_units(account_id));
        }

        let mut organizations: Vec<(&str, Vec<BusinessUnit>)> = Vec::new();
        for entry in &entry_points {
            match organizations
                .iter()
                .position(|(top_level, _)| *top_level == entry.top_level_key())
            {
                Some(idx) => organizations[idx].1.push(entry.clone()),
                None => organizations.push((entry.top_level_key(), vec![entry.clone()])),
            }
        }

        let mut views = Vec::new();
        for (top_level, entries) in organizations {
            let universe =
                self.fetch_all(|params| self.backend.query_by_top_level(top_level, params))?;
            let nodes = build_tree(&entries, &universe);

            let records: HashMap<&str, &BusinessUnit> = universe
                .iter()
                .chain(entries.iter())
                .map(|u| (u.key.as_str(), u))
                .collect();
            let mut local = chain_lookup(&universe);

            let mut resolved = Vec::with_capacity(nodes.len());
            for node in &nodes {
                let record = records.get(node.key.as_str()).copied().unwrap_or(node);
                let stores = self.resolve_with(record, &mut local)?;
                resolved.push((record, node, stores));
            }

            let catalog = self.store_catalog(resolved.iter().flat_map(|(_, _, s)| s.iter()))?;
            for (record, node, stores) in resolved {
                let stores = enrich_stores(&stores, &catalog)?;
                let mut view = project(record, stores, account_id, self.admin_role_key());
                view.business_unit.parent_unit = node.parent_unit.clone();
                views.push(view);
            }
            debug!("organization {} contributes {} units", top_level, nodes.len());
        }

        info!("resolved tree of {} units for account {}", views.len(), account_id);
        Ok(views)
    }

    /// View of one unit by key, as seen by the account.
    pub fn unit_for_account(
        &self,
        key: &str,
        account_id: &str,
    ) -> Result<OrganizationView, OrgError> {
        let unit = self.get_unit(key)?;
        self.view(&unit, &[], account_id)
    }

    /// Effective, fully resolved stores of a unit.
    pub fn stores_for_unit(&self, key: &str) -> Result<Vec<StoreRef>, OrgError> {
        let unit = self.get_unit(key)?;
        let stores = self.resolve_with(&unit, &mut chain_lookup(&[]))?;
        let catalog = self.store_catalog(&stores)?;
        enrich_stores(&stores, &catalog)
    }

    /// Forward an update to the backend. A stale version surfaces as
    /// [`OrgError::Conflict`]; nothing is retried.
    pub fn update_unit(
        &self,
        key: &str,
        expected_version: u64,
        actions: Vec<serde_json::Value>,
    ) -> Result<BusinessUnit, OrgError> {
        let request = UpdateRequest::new(key, expected_version, actions);
        match self.backend.update(request) {
            Ok(unit) => {
                info!("business unit {} updated to version {}", unit.key, unit.version);
                Ok(unit)
            }
            Err(BackendError::Conflict(msg)) => {
                warn!("update of business unit {} rejected: {}", key, msg);
                Err(OrgError::Conflict(msg))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn view(
        &self,
        unit: &BusinessUnit,
        known: &[BusinessUnit],
        account_id: &str,
    ) -> Result<OrganizationView, OrgError> {
        let stores = self.resolve_with(unit, &mut chain_lookup(known))?;
        let catalog = self.store_catalog(&stores)?;
        let stores = enrich_stores(&stores, &catalog)?;
        Ok(project(unit, stores, account_id, self.admin_role_key()))
    }

    /// Resolve stores, looking ancestors up in `local` first and in the
    /// backend when `local` does not have them.
    fn resolve_with<L>(&self, unit: &BusinessUnit, local: &mut L) -> Result<Vec<StoreRef>, OrgError>
    where
        L: FnMut(&str) -> Result<BusinessUnit, OrgError>,
    {
        resolve_stores(
            unit,
            |key| match local(key) {
                Err(OrgError::NotFound(_)) => self.get_unit(key),
                found => found,
            },
            self.config.max_depth,
        )
    }
}

fn no_units(account_id: &str) -> OrgError {
    OrgError::NotFound(format!(
        "account '{}' is not associated with any business unit",
        account_id
    ))
}
