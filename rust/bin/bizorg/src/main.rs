//! `bizorg`: resolve B2B business-unit organizations from a snapshot.
//!
//! Loads a JSON snapshot of business units and stores, then answers
//! "where does this account sit, and what may it do there".

mod commands;
mod config;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use bizorg_business_unit::{OrganizationService, SnapshotLoader};
use bizorg_core::ServiceError;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use commands::view::Output;

/// Business-unit organization resolver.
#[derive(Parser, Debug)]
#[command(name = "bizorg", about = "Business-unit organization resolver")]
struct Cli {
    /// Path to config file (default: ~/.bizorg/config.toml).
    #[arg(long = "config", global = true)]
    config: Option<String>,

    /// Snapshot file, relative to [storage] data_dir unless absolute.
    #[arg(long = "snapshot", global = true)]
    snapshot: Option<String>,

    /// Admin role key (overrides [organization] admin_role_key).
    #[arg(long = "admin-role", global = true)]
    admin_role: Option<String>,

    /// Output format: table or json.
    #[arg(long = "output", short = 'o', global = true, default_value = "json")]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the organization an account belongs to.
    Organization {
        /// Customer ID.
        account_id: String,
    },

    /// Show every unit reachable from the account's entry points.
    Tree {
        /// Customer ID.
        account_id: String,
    },

    /// List the account's entry points, admin units first.
    #[command(name = "entry-points")]
    EntryPoints {
        /// Customer ID.
        account_id: String,
        /// Only units the account administers.
        #[arg(long)]
        admin_only: bool,
    },

    /// Show one business unit as seen by an account.
    Unit {
        /// Business unit key.
        key: String,
        /// Customer ID.
        account_id: String,
    },

    /// Show the effective stores of a business unit.
    Stores {
        /// Business unit key.
        key: String,
    },

    /// Show version.
    Version,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = Output::parse(&cli.output)?;

    let rendered = match cli.command {
        Commands::Version => version(),
        command => {
            let config_path = cli
                .config
                .map(PathBuf::from)
                .unwrap_or_else(config::BizorgConfig::default_path);
            let svc = open_service(&config_path, cli.snapshot.as_deref(), cli.admin_role)?;
            run(command, &svc, output)?
        }
    };
    println!("{}", rendered.trim_end());

    Ok(())
}

/// Load config and snapshot, then build the service.
fn open_service(
    config_path: &Path,
    snapshot: Option<&str>,
    admin_role: Option<String>,
) -> anyhow::Result<Arc<OrganizationService>> {
    let mut cfg = config::BizorgConfig::load(config_path)
        .with_context(|| format!("failed to read config {}", config_path.display()))?;
    if let Some(role) = admin_role {
        cfg.organization.admin_role_key = Some(role);
    }

    let snapshot_path = cfg.service_config(snapshot).resolve_snapshot_path();
    info!("Loading snapshot from {}", snapshot_path.display());
    let backend = SnapshotLoader::load(&snapshot_path)
        .map_err(|e| anyhow::anyhow!("failed to load snapshot: {}", e))?;
    info!("Loaded {} business units", backend.unit_count()?);

    let svc = OrganizationService::new(Arc::new(backend), cfg.organization_config())
        .map_err(ServiceError::from)?;
    Ok(svc)
}

fn run(command: Commands, svc: &OrganizationService, output: Output) -> anyhow::Result<String> {
    match command {
        Commands::Organization { account_id } => {
            commands::view::organization(svc, &account_id, output)
        }
        Commands::Tree { account_id } => commands::view::tree(svc, &account_id, output),
        Commands::EntryPoints {
            account_id,
            admin_only,
        } => commands::view::entry_points(svc, &account_id, admin_only, output),
        Commands::Unit { key, account_id } => commands::view::unit(svc, &key, &account_id, output),
        Commands::Stores { key } => commands::view::stores(svc, &key, output),
        Commands::Version => Ok(version()),
    }
}

fn version() -> String {
    format!("bizorg v{}", env!("CARGO_PKG_VERSION"))
}
