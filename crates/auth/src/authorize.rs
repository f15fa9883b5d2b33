use thiserror::Error;

use crate::{Permission, Principal, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: role {role} lacks permission '{permission}'")]
    Forbidden { role: Role, permission: String },
}

/// Intent-side authorization contract (checked before dispatch).
///
/// Implement this on intents that require permissions.
pub trait CommandAuthorization {
    fn required_permissions(&self) -> Vec<Permission>;
}

/// Permissions granted to a role.
///
/// | | ADMIN | ACCOUNTANT | OPERATOR |
/// |---|---|---|---|
/// | dashboard | ✓ | ✓ | |
/// | create transactions | ✓ | | ✓ |
/// | validate transactions | ✓ | ✓ | |
/// | manage users | ✓ | | |
///
/// Everything else (reading, deleting pending transactions, invoices,
/// custodians, transfers) is open to every role.
pub fn permissions_for_role(role: Role) -> Vec<Permission> {
    let shared = [
        Permission::TRANSACTIONS_READ,
        Permission::TRANSACTIONS_DELETE,
        Permission::INVOICES_READ,
        Permission::INVOICES_WRITE,
        Permission::INVOICES_SETTLE,
        Permission::CUSTODIANS_READ,
        Permission::CUSTODIANS_WRITE,
        Permission::CUSTODIANS_TRANSFER,
    ];

    match role {
        Role::Admin => vec![Permission::WILDCARD],
        Role::Accountant => {
            let mut perms = shared.to_vec();
            perms.push(Permission::DASHBOARD_READ);
            perms.push(Permission::TRANSACTIONS_VALIDATE);
            perms
        }
        Role::Operator => {
            let mut perms = shared.to_vec();
            perms.push(Permission::TRANSACTIONS_CREATE);
            perms
        }
    }
}

/// Whether `role` is granted `required`, directly or through the wildcard.
pub fn role_has(role: Role, required: &Permission) -> bool {
    permissions_for_role(role)
        .iter()
        .any(|p| p.is_wildcard() || p == required)
}

/// Authorize a principal for one permission.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(principal: &Principal, required: &Permission) -> Result<(), AuthzError> {
    if role_has(principal.role, required) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden {
            role: principal.role,
            permission: required.as_str().to_string(),
        })
    }
}
