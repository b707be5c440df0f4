//! Common type definitions.
//!
//! All entity IDs are UUIDs wrapped in type aliases:
//!
//! - [`UserId`]: User account identifier
//! - [`TenantId`]: Tenant identifier (the external, stable id of the
//!   isolation boundary)
//! - [`DeploymentId`], [`CloudAccountId`], [`TemplateId`], [`EnvironmentId`]:
//!   tenant-scoped resource identifiers
//! - [`PermissionId`]: Permission identifier

use uuid::Uuid;

// Type aliases for IDs
pub type UserId = Uuid;
pub type TenantId = Uuid;
pub type DeploymentId = Uuid;
pub type CloudAccountId = Uuid;
pub type TemplateId = Uuid;
pub type EnvironmentId = Uuid;
pub type PermissionId = Uuid;

/// The tenant that receives accounts provisioned on SSO first login, seeded
/// by the migrations under the nil UUID.
pub const DEFAULT_TENANT_ID: TenantId = Uuid::nil();

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abbrev_uuid() {
        let uuid: Uuid = "550e8400-e29b-41d4-a716-446655440000".parse().unwrap();
        assert_eq!(abbrev_uuid(&uuid), "550e8400");
    }
}
