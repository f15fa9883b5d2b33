use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cashguard_core::{CustodianId, DomainError, Entity, InvoiceId, Money, TransactionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    /// Signed effect of `amount` on the custodian's balance.
    pub fn balance_effect(self, amount: Money) -> Money {
        match self {
            TransactionType::Income => amount,
            TransactionType::Expense => -amount,
        }
    }
}

/// Approval lifecycle. Only `Validated` affects balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Validated,
    Rejected,
}

/// Outcome an approver can give a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewDecision {
    Validated,
    Rejected,
}

impl From<ReviewDecision> for TransactionStatus {
    fn from(value: ReviewDecision) -> Self {
        match value {
            ReviewDecision::Validated => TransactionStatus::Validated,
            ReviewDecision::Rejected => TransactionStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    pub date: DateTime<Utc>,
    /// Always positive; direction comes from `kind`.
    pub amount: Money,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub custodian_id: CustodianId,
    pub description: String,
    pub status: TransactionStatus,
    /// Set on transactions produced by an invoice settlement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_invoice_id: Option<InvoiceId>,
}

impl Transaction {
    pub fn signed_amount(&self) -> Money {
        self.kind.balance_effect(self.amount)
    }

    pub fn is_validated(&self) -> bool {
        self.status == TransactionStatus::Validated
    }

    /// Balance effect this transaction currently contributes (zero unless validated).
    pub fn validated_effect(&self) -> Money {
        if self.is_validated() {
            self.signed_amount()
        } else {
            Money::ZERO
        }
    }
}

impl Entity for Transaction {
    type Id = TransactionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A manually entered transaction. It is always recorded as pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDraft {
    pub date: DateTime<Utc>,
    pub amount: Money,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub custodian_id: CustodianId,
    pub description: String,
}

impl TransactionDraft {
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.amount.is_positive() {
            return Err(DomainError::validation("transaction amount must be positive"));
        }
        if self.description.trim().is_empty() {
            return Err(DomainError::validation("transaction description is required"));
        }
        Ok(())
    }

    pub fn into_transaction(self, id: TransactionId) -> Transaction {
        Transaction {
            id,
            date: self.date,
            amount: self.amount,
            kind: self.kind,
            custodian_id: self.custodian_id,
            description: self.description.trim().to_string(),
            status: TransactionStatus::Pending,
            related_invoice_id: None,
        }
    }
}

/// Listing filter for the transaction register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionFilter {
    #[default]
    All,
    Income,
    Expense,
}

impl TransactionFilter {
    pub fn matches(self, transaction: &Transaction) -> bool {
        match self {
            TransactionFilter::All => true,
            TransactionFilter::Income => transaction.kind == TransactionType::Income,
            TransactionFilter::Expense => transaction.kind == TransactionType::Expense,
        }
    }
}
