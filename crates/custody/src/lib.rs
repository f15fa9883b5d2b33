//! Custody ledger: custodians, invoices, transactions and users.
//!
//! Pure domain logic only: no IO, no clock, no logging. Every state change
//! goes through [`Ledger`] as a command that is decided, then applied.

pub mod custodian;
pub mod dashboard;
pub mod invoice;
pub mod ledger;
pub mod reconciliation;
pub mod seed;
pub mod transaction;
pub mod user;

pub use custodian::{Custodian, UNKNOWN_CUSTODIAN};
pub use dashboard::{CustodianSummary, DashboardSummary};
pub use invoice::{Invoice, InvoiceDraft, InvoiceStatus, InvoiceType};
pub use ledger::{
    AddCustodian, AddInvoice, AddUser, BalanceChange, Ledger, LedgerCommand, LedgerEvent,
    RecordTransaction, RemoveCustodian, RemoveInvoice, RemoveTransaction, RemoveUser,
    RequestTransfer, ReviewTransaction, SettleInvoice, UpdateInvoice,
};
pub use reconciliation::{BalanceDrift, ReconciliationReport};
pub use seed::SeedData;
pub use transaction::{
    ReviewDecision, Transaction, TransactionDraft, TransactionFilter, TransactionStatus,
    TransactionType,
};
pub use user::User;
