use core::fmt;

use serde::{Deserialize, Serialize};

use cashguard_auth::{Permission, Role, role_has};

/// Top-level screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum View {
    Dashboard,
    Transactions,
    /// Invoices (receivables and payables).
    Accounts,
    Custodians,
    Users,
}

impl View {
    /// Navigation order.
    pub const ALL: [View; 5] = [
        View::Dashboard,
        View::Transactions,
        View::Accounts,
        View::Custodians,
        View::Users,
    ];

    /// Permission needed to open the view.
    pub fn permission(self) -> Permission {
        match self {
            View::Dashboard => Permission::DASHBOARD_READ,
            View::Transactions => Permission::TRANSACTIONS_READ,
            View::Accounts => Permission::INVOICES_READ,
            View::Custodians => Permission::CUSTODIANS_READ,
            View::Users => Permission::USERS_MANAGE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            View::Dashboard => "DASHBOARD",
            View::Transactions => "TRANSACTIONS",
            View::Accounts => "ACCOUNTS",
            View::Custodians => "CUSTODIANS",
            View::Users => "USERS",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Landing view right after login.
pub fn default_view(role: Role) -> View {
    match role {
        Role::Operator => View::Transactions,
        Role::Admin | Role::Accountant => View::Dashboard,
    }
}

/// Views offered to a role, in navigation order.
pub fn navigation(role: Role) -> Vec<View> {
    View::ALL
        .into_iter()
        .filter(|view| role_has(role, &view.permission()))
        .collect()
}
