use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use cashguard_core::{DomainError, Entity, InvoiceId, Money};

use crate::transaction::TransactionType;

/// Receivable invoices bring cash in; payable invoices take it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceType {
    Receivable,
    Payable,
}

impl InvoiceType {
    /// Signed effect of settling `amount` on the settling custodian.
    pub fn balance_effect(self, amount: Money) -> Money {
        match self {
            InvoiceType::Receivable => amount,
            InvoiceType::Payable => -amount,
        }
    }

    /// Type of the transaction a settlement produces.
    pub fn settlement_transaction_type(self) -> TransactionType {
        match self {
            InvoiceType::Receivable => TransactionType::Income,
            InvoiceType::Payable => TransactionType::Expense,
        }
    }

    /// Description prefix of the settlement transaction.
    pub fn settlement_verb(self) -> &'static str {
        match self {
            InvoiceType::Receivable => "Cobro",
            InvoiceType::Payable => "Pago",
        }
    }
}

/// Invoice status lifecycle: `Pending` → `Paid` (terminal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    Pending,
    Paid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: InvoiceId,
    #[serde(rename = "type")]
    pub kind: InvoiceType,
    pub amount: Money,
    /// Counterparty (customer or supplier).
    pub entity_name: String,
    pub status: InvoiceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Invoice {
    pub fn is_paid(&self) -> bool {
        self.status == InvoiceStatus::Paid
    }
}

impl Entity for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Editable invoice fields, used for both creation and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDraft {
    #[serde(rename = "type")]
    pub kind: InvoiceType,
    pub amount: Money,
    pub entity_name: String,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
}

impl InvoiceDraft {
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.amount.is_positive() {
            return Err(DomainError::validation("invoice amount must be positive"));
        }
        if self.entity_name.trim().is_empty() {
            return Err(DomainError::validation("invoice entity name is required"));
        }
        Ok(())
    }

    /// A fresh pending invoice.
    pub fn into_invoice(self, id: InvoiceId) -> Invoice {
        Invoice {
            id,
            kind: self.kind,
            amount: self.amount,
            entity_name: self.entity_name.trim().to_string(),
            status: InvoiceStatus::Pending,
            due_date: self.due_date,
            description: self.description,
        }
    }

    /// Overwrite the editable fields of `invoice`, keeping id and status.
    pub fn apply_to(self, invoice: &Invoice) -> Invoice {
        let mut updated = self.into_invoice(invoice.id.clone());
        updated.status = invoice.status;
        updated
    }
}
