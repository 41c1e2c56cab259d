//! Business-unit module: organization resolution for B2B accounts.
//!
//! Given an account and the business units the backend says it belongs to,
//! work out where the account sits in its organization, which stores it may
//! sell through, and whether it administers the unit or the whole
//! organization.
//!
//! # Resources
//!
//! - **BusinessUnit**: company or division node, linked by `parentUnit`
//! - **Associate**: account attached to a unit with role assignments
//! - **StoreRef**: store a unit sells through, own or inherited
//! - **OrganizationView**: trimmed unit plus admin / root-admin flags
//!
//! # Usage
//!
//! ```ignore
//! use bizorg_business_unit::backend::SnapshotLoader;
//! use bizorg_business_unit::service::{OrganizationConfig, OrganizationService};
//!
//! let backend = Arc::new(SnapshotLoader::load(&path)?);
//! let svc = OrganizationService::new(backend, OrganizationConfig::with_admin_role("admin"))?;
//! let view = svc.organization("customer-id")?;
//! ```

pub mod backend;
pub mod model;
pub mod service;

pub use backend::{BackendError, BusinessUnitBackend, InMemoryBackend, SnapshotLoader};
pub use service::{OrgError, OrganizationConfig, OrganizationService};
