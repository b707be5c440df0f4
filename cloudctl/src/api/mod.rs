//! API layer for HTTP request handling and data models.
//!
//! This module contains the REST API implementation, organized into:
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - **Authentication** (`/auth/*`): Login, token verification, visible
//!   tenants, permission checks
//! - **SSO** (`/sso/*`): OAuth2 authorization-code login
//! - **Deployment sessions** (`/deployment-sessions*`): wizard session
//!   lifecycle
//! - **Tenant-scoped resources** (`/tenants/{tenant_id}/*`): deployments,
//!   cloud accounts, templates, environments
//!
//! All endpoints are documented with OpenAPI annotations using `utoipa`;
//! interactive documentation is served at `/docs`.

pub mod handlers;
pub mod models;
