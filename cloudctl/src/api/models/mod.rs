//! API request and response data models.
//!
//! This module contains the data structures used for HTTP request
//! deserialization and response serialization. These models define the
//! public API contract.
//!
//! # Design Principles
//!
//! - **Separation of Concerns**: API models are distinct from database
//!   models, allowing independent evolution of API and storage
//!   representations
//! - **OpenAPI**: All models are annotated with `utoipa` for automatic API
//!   docs
//!
//! # Model Categories
//!
//! - [`users`]: User profiles, roles, and the authenticated caller
//! - [`auth`]: Login and permission-check payloads
//! - [`sso`]: SSO initiate/callback payloads
//! - [`tenants`]: Tenant responses
//! - [`deployments`], [`cloud_accounts`], [`templates`], [`environments`]:
//!   tenant-scoped resources
//! - [`deployment_sessions`]: deployment wizard session payloads

pub mod auth;
pub mod cloud_accounts;
pub mod deployment_sessions;
pub mod deployments;
pub mod environments;
pub mod sso;
pub mod templates;
pub mod tenants;
pub mod users;
