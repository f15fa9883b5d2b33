//! Fixed starting data.
//!
//! Custodian balances equal the sum of their seeded validated transactions,
//! so a freshly seeded ledger reconciles with zero drift.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use cashguard_auth::Role;
use cashguard_core::{CustodianId, InvoiceId, Money, TransactionId, UserId};

use crate::custodian::Custodian;
use crate::invoice::{Invoice, InvoiceStatus, InvoiceType};
use crate::transaction::{Transaction, TransactionStatus, TransactionType};
use crate::user::User;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedData {
    pub custodians: Vec<Custodian>,
    pub invoices: Vec<Invoice>,
    pub transactions: Vec<Transaction>,
    pub users: Vec<User>,
}

impl SeedData {
    /// Nothing but the three role users, so someone can log in.
    pub fn users_only() -> Self {
        Self {
            users: demo_users(),
            ..Self::default()
        }
    }

    pub fn demo() -> Self {
        Self {
            custodians: vec![
                custodian("c1", "Caja Chica Oficina", 1_500),
                custodian("c2", "Juan Pérez", 850),
                custodian("c3", "Cuenta Banco Principal", 12_800),
            ],
            invoices: vec![
                invoice(
                    "i1",
                    InvoiceType::Receivable,
                    3_500,
                    "Comercial Andina S.A.",
                    InvoiceStatus::Pending,
                    day(2024, 2, 15),
                ),
                invoice(
                    "i2",
                    InvoiceType::Payable,
                    1_200,
                    "Servicios Eléctricos del Norte",
                    InvoiceStatus::Pending,
                    day(2024, 2, 28),
                ),
                invoice(
                    "i3",
                    InvoiceType::Receivable,
                    800,
                    "Distribuidora Sur",
                    InvoiceStatus::Paid,
                    day(2024, 1, 20),
                ),
            ],
            transactions: vec![
                Transaction {
                    related_invoice_id: Some(InvoiceId::new("i3")),
                    ..transaction(
                        "t8",
                        at(2024, 1, 18),
                        800,
                        TransactionType::Income,
                        "c3",
                        "Cobro Factura: Distribuidora Sur",
                        TransactionStatus::Validated,
                    )
                },
                transaction(
                    "t7",
                    at(2024, 1, 16),
                    300,
                    TransactionType::Income,
                    "c1",
                    "Reembolso duplicado",
                    TransactionStatus::Rejected,
                ),
                transaction(
                    "t6",
                    at(2024, 1, 15),
                    80,
                    TransactionType::Expense,
                    "c2",
                    "Almuerzo de trabajo",
                    TransactionStatus::Pending,
                ),
                transaction(
                    "t5",
                    at(2024, 1, 10),
                    12_000,
                    TransactionType::Income,
                    "c3",
                    "Depósito inicial",
                    TransactionStatus::Validated,
                ),
                transaction(
                    "t4",
                    at(2024, 1, 8),
                    150,
                    TransactionType::Expense,
                    "c2",
                    "Taxi visita a cliente",
                    TransactionStatus::Validated,
                ),
                transaction(
                    "t3",
                    at(2024, 1, 5),
                    1_000,
                    TransactionType::Income,
                    "c2",
                    "Anticipo de viáticos",
                    TransactionStatus::Validated,
                ),
                transaction(
                    "t2",
                    at(2024, 1, 3),
                    500,
                    TransactionType::Expense,
                    "c1",
                    "Compra de papelería",
                    TransactionStatus::Validated,
                ),
                transaction(
                    "t1",
                    at(2024, 1, 2),
                    2_000,
                    TransactionType::Income,
                    "c1",
                    "Fondo inicial caja chica",
                    TransactionStatus::Validated,
                ),
            ],
            users: demo_users(),
        }
    }
}

fn demo_users() -> Vec<User> {
    vec![
        user("u1", "Carla Admin", Role::Admin),
        user("u2", "Luis Contable", Role::Accountant),
        user("u3", "Ana Operaciones", Role::Operator),
    ]
}

fn user(id: &str, name: &str, role: Role) -> User {
    User {
        id: UserId::new(id),
        name: name.to_string(),
        role,
        avatar: format!("https://i.pravatar.cc/150?u={id}"),
    }
}

fn custodian(id: &str, name: &str, units: i64) -> Custodian {
    Custodian {
        id: CustodianId::new(id),
        name: name.to_string(),
        balance: Money::from_units(units),
    }
}

fn invoice(
    id: &str,
    kind: InvoiceType,
    units: i64,
    entity_name: &str,
    status: InvoiceStatus,
    due_date: Option<NaiveDate>,
) -> Invoice {
    Invoice {
        id: InvoiceId::new(id),
        kind,
        amount: Money::from_units(units),
        entity_name: entity_name.to_string(),
        status,
        due_date,
        description: None,
    }
}

fn transaction(
    id: &str,
    date: DateTime<Utc>,
    units: i64,
    kind: TransactionType,
    custodian_id: &str,
    description: &str,
    status: TransactionStatus,
) -> Transaction {
    Transaction {
        id: TransactionId::new(id),
        date,
        amount: Money::from_units(units),
        kind,
        custodian_id: CustodianId::new(custodian_id),
        description: description.to_string(),
        status,
        related_invoice_id: None,
    }
}

fn day(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

fn at(year: i32, month: u32, d: u32) -> DateTime<Utc> {
    day(year, month, d)
        .and_then(|date| date.and_hms_opt(9, 0, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Ledger;
    use crate::reconciliation::ReconciliationReport;
    use cashguard_core::LedgerId;
    use std::collections::HashSet;

    #[test]
    fn demo_seed_reconciles_with_zero_drift() {
        let ledger = Ledger::seeded(LedgerId::new(), SeedData::demo());
        let report = ReconciliationReport::for_ledger(&ledger);
        assert!(report.is_balanced(), "drift: {:?}", report.drifted().collect::<Vec<_>>());
        assert!(report.orphaned.is_empty());
    }

    #[test]
    fn demo_seed_has_one_user_per_role_and_unique_ids() {
        let seed = SeedData::demo();
        for role in Role::ALL {
            assert_eq!(seed.users.iter().filter(|u| u.role == role).count(), 1);
        }

        let tx_ids: HashSet<_> = seed.transactions.iter().map(|t| &t.id).collect();
        assert_eq!(tx_ids.len(), seed.transactions.len());
    }

    #[test]
    fn paid_seed_invoices_have_their_settlement() {
        let seed = SeedData::demo();
        for invoice in seed.invoices.iter().filter(|i| i.is_paid()) {
            assert!(
                seed.transactions
                    .iter()
                    .any(|t| t.related_invoice_id.as_ref() == Some(&invoice.id) && t.is_validated())
            );
        }
    }

    #[test]
    fn users_only_seed_has_no_records() {
        let seed = SeedData::users_only();
        assert_eq!(seed.users.len(), 3);
        assert!(seed.custodians.is_empty() && seed.transactions.is_empty());
    }
}
