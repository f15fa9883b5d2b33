use serde::{Deserialize, Serialize};

use cashguard_core::{CustodianId, Money};

use crate::invoice::{Invoice, InvoiceType};
use crate::ledger::Ledger;
use crate::transaction::{TransactionStatus, TransactionType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustodianSummary {
    pub id: CustodianId,
    pub name: String,
    pub balance: Money,
    pub pending_transactions: usize,
}

/// Headline figures shown on the dashboard.
///
/// Income and expense totals count validated transactions only; invoice
/// totals count pending invoices only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_balance: Money,
    pub pending_receivables: Money,
    pub pending_payables: Money,
    pub validated_income: Money,
    pub validated_expense: Money,
    pub pending_transactions: usize,
    pub custodians: Vec<CustodianSummary>,
}

impl DashboardSummary {
    pub fn from_ledger(ledger: &Ledger) -> Self {
        let pending_invoices = |kind: InvoiceType| -> Money {
            ledger
                .invoices()
                .iter()
                .filter(|i| i.kind == kind && !i.is_paid())
                .map(|i: &Invoice| i.amount)
                .sum()
        };
        let validated = |kind: TransactionType| -> Money {
            ledger
                .transactions()
                .iter()
                .filter(|t| t.kind == kind && t.status == TransactionStatus::Validated)
                .map(|t| t.amount)
                .sum()
        };

        let custodians = ledger
            .custodians()
            .iter()
            .map(|c| CustodianSummary {
                id: c.id.clone(),
                name: c.name.clone(),
                balance: c.balance,
                pending_transactions: ledger
                    .transactions_of(&c.id)
                    .filter(|t| t.status == TransactionStatus::Pending)
                    .count(),
            })
            .collect();

        Self {
            total_balance: ledger.custodians().iter().map(|c| c.balance).sum(),
            pending_receivables: pending_invoices(InvoiceType::Receivable),
            pending_payables: pending_invoices(InvoiceType::Payable),
            validated_income: validated(TransactionType::Income),
            validated_expense: validated(TransactionType::Expense),
            pending_transactions: ledger.pending_transactions().count(),
            custodians,
        }
    }

    /// Validated income minus validated expense.
    pub fn net_flow(&self) -> Money {
        self.validated_income.saturating_sub(self.validated_expense)
    }
}
