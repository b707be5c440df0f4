//! Repository implementations for database access.
//!
//! This module provides repository structs for each major entity in the
//! system. Repositories wrap a SQLx connection or transaction, provide
//! strongly-typed operations, and return domain models from
//! [`crate::db::models`]. Entities with full CRUD lifecycles implement the
//! [`Repository`] trait; the narrower tenant-scoped resources expose just
//! the operations the API surface needs.
//!
//! # Available Repositories
//!
//! - [`Users`]: User account management and authentication lookups
//! - [`Tenants`]: Tenant catalog
//! - [`Permissions`]: Role grants and per-user override grants
//! - [`Deployments`]: Deployment records
//! - [`CloudAccounts`], [`Templates`], [`Environments`]: other tenant-scoped
//!   resources

pub mod cloud_accounts;
pub mod deployments;
pub mod environments;
pub mod permissions;
pub mod repository;
pub mod templates;
pub mod tenants;
pub mod users;

pub use cloud_accounts::CloudAccounts;
pub use deployments::Deployments;
pub use environments::Environments;
pub use permissions::Permissions;
pub use repository::Repository;
pub use templates::Templates;
pub use tenants::Tenants;
pub use users::Users;
