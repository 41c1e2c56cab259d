//! Read-only organization commands.
//!
//! Each command renders to a `String` so `main` only prints.

use anyhow::Result;
use bizorg_business_unit::model::{BusinessUnit, OrganizationView, StoreRef};
use bizorg_business_unit::service::authorization::is_admin;
use bizorg_business_unit::{OrgError, OrganizationService};
use bizorg_core::ServiceError;

/// Output format selected with `--output`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    Table,
    Json,
}

impl Output {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "table" => Ok(Output::Table),
            "json" => Ok(Output::Json),
            other => anyhow::bail!("unknown output format '{}' (expected table or json)", other),
        }
    }
}

/// Surface the service error code alongside the message: `CODE: message`
/// for tables, the `{"code", "status", "message"}` body for JSON.
fn service_error(e: OrgError, output: Output) -> anyhow::Error {
    let e = ServiceError::from(e);
    match output {
        Output::Json => anyhow::anyhow!("{}", e.to_json()),
        Output::Table => anyhow::anyhow!("{}: {}", e.error_code(), e),
    }
}

pub fn organization(svc: &OrganizationService, account_id: &str, output: Output) -> Result<String> {
    let view = svc.organization(account_id).map_err(|e| service_error(e, output))?;
    match output {
        Output::Json => Ok(serde_json::to_string_pretty(&view)?),
        Output::Table => Ok(view_table(std::slice::from_ref(&view))),
    }
}

pub fn tree(svc: &OrganizationService, account_id: &str, output: Output) -> Result<String> {
    let views = svc.tree(account_id).map_err(|e| service_error(e, output))?;
    match output {
        Output::Json => Ok(serde_json::to_string_pretty(&views)?),
        Output::Table => Ok(view_table(&views)),
    }
}

pub fn entry_points(
    svc: &OrganizationService,
    account_id: &str,
    admin_only: bool,
    output: Output,
) -> Result<String> {
    let units = if admin_only {
        svc.admin_entry_points(account_id)
    } else {
        svc.entry_points(account_id)
    }
    .map_err(|e| service_error(e, output))?;

    match output {
        Output::Json => {
            let summary: Vec<serde_json::Value> = units
                .iter()
                .map(|u| {
                    serde_json::json!({
                        "key": u.key,
                        "name": u.name,
                        "topLevelUnit": u.top_level_key(),
                        "isAdmin": is_admin(u, account_id, svc.admin_role_key()),
                    })
                })
                .collect();
            Ok(serde_json::to_string_pretty(&summary)?)
        }
        Output::Table => Ok(unit_table(&units)),
    }
}

pub fn unit(
    svc: &OrganizationService,
    key: &str,
    account_id: &str,
    output: Output,
) -> Result<String> {
    let view = svc.unit_for_account(key, account_id).map_err(|e| service_error(e, output))?;
    match output {
        Output::Json => Ok(serde_json::to_string_pretty(&view)?),
        Output::Table => Ok(view_table(std::slice::from_ref(&view))),
    }
}

pub fn stores(svc: &OrganizationService, key: &str, output: Output) -> Result<String> {
    let stores = svc.stores_for_unit(key).map_err(|e| service_error(e, output))?;
    match output {
        Output::Json => Ok(serde_json::to_string_pretty(&stores)?),
        Output::Table => {
            let mut out = format!("{:<24} {:<24} {}\n", "KEY", "ID", "NAME");
            for s in &stores {
                out.push_str(&format!(
                    "{:<24} {:<24} {}\n",
                    s.key,
                    s.id.as_deref().unwrap_or("-"),
                    s.name.as_deref().unwrap_or("-")
                ));
            }
            Ok(out)
        }
    }
}

fn view_table(views: &[OrganizationView]) -> String {
    let mut out = format!(
        "{:<24} {:<24} {:<6} {:<10} {}\n",
        "KEY", "PARENT", "ADMIN", "ROOT-ADMIN", "STORES"
    );
    for v in views {
        let parent = v
            .business_unit
            .parent_unit
            .as_ref()
            .map(|p| p.key.as_str())
            .unwrap_or("-");
        out.push_str(&format!(
            "{:<24} {:<24} {:<6} {:<10} {}\n",
            v.key(),
            parent,
            v.is_admin,
            v.is_root_admin,
            join_keys(&v.resolved_stores)
        ));
    }
    out
}

fn unit_table(units: &[BusinessUnit]) -> String {
    let mut out = format!("{:<24} {:<24} {}\n", "KEY", "TOP-LEVEL", "NAME");
    for u in units {
        out.push_str(&format!("{:<24} {:<24} {}\n", u.key, u.top_level_key(), u.name));
    }
    out
}

fn join_keys(stores: &[StoreRef]) -> String {
    if stores.is_empty() {
        return "-".to_string();
    }
    stores.iter().map(|s| s.key.as_str()).collect::<Vec<_>>().join(",")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bizorg_business_unit::model::{Associate, InheritanceMode, RoleAssignment, Store};
    use bizorg_business_unit::{InMemoryBackend, OrganizationConfig};

    use super::*;

    fn service() -> Arc<OrganizationService> {
        let mut acme = BusinessUnit::company("acme", "ACME");
        acme.stores = vec![StoreRef::from_key("eu")];
        acme.associates.push(Associate::new(
            "alice",
            vec![RoleAssignment::new("admin", InheritanceMode::Disabled)],
        ));
        let east = BusinessUnit::division("acme-east", "ACME East", &acme);
        let store = Store {
            id: "store-eu".into(),
            key: "eu".into(),
            name: Some("Europe".into()),
            version: 1,
        };
        let backend = InMemoryBackend::with_data(vec![acme, east], vec![store]);
        OrganizationService::new(Arc::new(backend), OrganizationConfig::with_admin_role("admin"))
            .unwrap()
    }

    #[test]
    fn test_output_parse() {
        assert_eq!(Output::parse("json").unwrap(), Output::Json);
        assert_eq!(Output::parse("table").unwrap(), Output::Table);
        assert!(Output::parse("yaml").is_err());
    }

    #[test]
    fn test_organization_json() {
        let out = organization(&service(), "alice", Output::Json).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["businessUnit"]["key"], "acme");
        assert_eq!(json["isRootAdmin"], true);
        assert_eq!(json["resolvedStores"][0]["name"], "Europe");
    }

    #[test]
    fn test_tree_table() {
        let out = tree(&service(), "alice", Output::Table).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("acme "));
        assert!(lines[2].starts_with("acme-east"));
        assert!(lines[2].contains("eu"));
    }

    #[test]
    fn test_entry_points_json() {
        let out = entry_points(&service(), "alice", true, Output::Json).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json[0]["key"], "acme");
        assert_eq!(json[0]["isAdmin"], true);
    }

    #[test]
    fn test_unknown_account_reports_code() {
        let err = organization(&service(), "nobody", Output::Table).unwrap_err();
        assert!(err.to_string().starts_with("NOT_FOUND:"));
    }

    #[test]
    fn test_json_error_body() {
        let err = unit(&service(), "nope", "alice", Output::Json).unwrap_err();
        let body: serde_json::Value = serde_json::from_str(&err.to_string()).unwrap();
        assert_eq!(body["code"], "NOT_FOUND");
        assert_eq!(body["status"], 404);
        assert_eq!(body["message"], "business unit 'nope'");
    }

    #[test]
    fn test_stores_table() {
        let out = stores(&service(), "acme-east", Output::Table).unwrap();
        assert!(out.contains("store-eu"));
        assert!(out.contains("Europe"));
    }
}
