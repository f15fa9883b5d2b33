use cashguard_auth::{CommandAuthorization, Permission};

/// Something a logged-in user asks the application to do.
///
/// Each intent maps to exactly one permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    ViewDashboard,
    ListTransactions,
    RecordTransaction,
    ReviewTransaction,
    DeleteTransaction,
    ListInvoices,
    SaveInvoice,
    DeleteInvoice,
    SettleInvoice,
    ListCustodians,
    SaveCustodian,
    DeleteCustodian,
    RequestTransfer,
    ManageUsers,
}

impl Intent {
    pub fn permission(self) -> Permission {
        match self {
            Intent::ViewDashboard => Permission::DASHBOARD_READ,
            Intent::ListTransactions => Permission::TRANSACTIONS_READ,
            Intent::RecordTransaction => Permission::TRANSACTIONS_CREATE,
            Intent::ReviewTransaction => Permission::TRANSACTIONS_VALIDATE,
            Intent::DeleteTransaction => Permission::TRANSACTIONS_DELETE,
            Intent::ListInvoices => Permission::INVOICES_READ,
            Intent::SaveInvoice | Intent::DeleteInvoice => Permission::INVOICES_WRITE,
            Intent::SettleInvoice => Permission::INVOICES_SETTLE,
            Intent::ListCustodians => Permission::CUSTODIANS_READ,
            Intent::SaveCustodian | Intent::DeleteCustodian => Permission::CUSTODIANS_WRITE,
            Intent::RequestTransfer => Permission::CUSTODIANS_TRANSFER,
            Intent::ManageUsers => Permission::USERS_MANAGE,
        }
    }
}

impl CommandAuthorization for Intent {
    fn required_permissions(&self) -> Vec<Permission> {
        vec![self.permission()]
    }
}
