use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Permission identifier.
///
/// Permissions are opaque strings (e.g. "transactions.validate"). The wildcard
/// `"*"` grants everything.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub const WILDCARD: Permission = Permission::from_static("*");

    pub const DASHBOARD_READ: Permission = Permission::from_static("dashboard.read");
    pub const TRANSACTIONS_READ: Permission = Permission::from_static("transactions.read");
    pub const TRANSACTIONS_CREATE: Permission = Permission::from_static("transactions.create");
    pub const TRANSACTIONS_VALIDATE: Permission = Permission::from_static("transactions.validate");
    pub const TRANSACTIONS_DELETE: Permission = Permission::from_static("transactions.delete");
    pub const INVOICES_READ: Permission = Permission::from_static("invoices.read");
    pub const INVOICES_WRITE: Permission = Permission::from_static("invoices.write");
    pub const INVOICES_SETTLE: Permission = Permission::from_static("invoices.settle");
    pub const CUSTODIANS_READ: Permission = Permission::from_static("custodians.read");
    pub const CUSTODIANS_WRITE: Permission = Permission::from_static("custodians.write");
    pub const CUSTODIANS_TRANSFER: Permission = Permission::from_static("custodians.transfer");
    pub const USERS_MANAGE: Permission = Permission::from_static("users.manage");

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "*"
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
