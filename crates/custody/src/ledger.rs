use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cashguard_core::entity::{find, position_of};
use cashguard_core::{
    Aggregate, AggregateRoot, CustodianId, DomainError, InvoiceId, LedgerId, Money,
    TransactionId, UserId,
};
use cashguard_events::Event;

use crate::custodian::{Custodian, UNKNOWN_CUSTODIAN};
use crate::invoice::{Invoice, InvoiceDraft, InvoiceStatus};
use crate::seed::SeedData;
use crate::transaction::{
    ReviewDecision, Transaction, TransactionDraft, TransactionFilter, TransactionStatus,
    TransactionType,
};
use crate::user::User;

/// Aggregate root: the session ledger.
///
/// Owns the four ordered collections. Invoices and transactions are kept
/// newest first; custodians and users in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    id: LedgerId,
    custodians: Vec<Custodian>,
    invoices: Vec<Invoice>,
    transactions: Vec<Transaction>,
    users: Vec<User>,
    version: u64,
}

impl Ledger {
    pub fn empty(id: LedgerId) -> Self {
        Self {
            id,
            custodians: Vec::new(),
            invoices: Vec::new(),
            transactions: Vec::new(),
            users: Vec::new(),
            version: 0,
        }
    }

    /// Start from a fixed data set. Seeding is not an event.
    pub fn seeded(id: LedgerId, seed: SeedData) -> Self {
        Self {
            id,
            custodians: seed.custodians,
            invoices: seed.invoices,
            transactions: seed.transactions,
            users: seed.users,
            version: 0,
        }
    }

    pub fn custodians(&self) -> &[Custodian] {
        &self.custodians
    }

    pub fn invoices(&self) -> &[Invoice] {
        &self.invoices
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn custodian(&self, id: &CustodianId) -> Option<&Custodian> {
        find(&self.custodians, id)
    }

    pub fn invoice(&self, id: &InvoiceId) -> Option<&Invoice> {
        find(&self.invoices, id)
    }

    pub fn transaction(&self, id: &TransactionId) -> Option<&Transaction> {
        find(&self.transactions, id)
    }

    pub fn user(&self, id: &UserId) -> Option<&User> {
        find(&self.users, id)
    }

    /// Custodian name, or "Desconocido" for a dangling reference.
    pub fn custodian_name(&self, id: &CustodianId) -> &str {
        self.custodian(id)
            .map(|c| c.name.as_str())
            .unwrap_or(UNKNOWN_CUSTODIAN)
    }

    pub fn filtered_transactions(
        &self,
        filter: TransactionFilter,
    ) -> impl Iterator<Item = &Transaction> + '_ {
        self.transactions.iter().filter(move |t| filter.matches(t))
    }

    pub fn transactions_of<'a, 'b>(
        &'a self,
        custodian_id: &'b CustodianId,
    ) -> impl Iterator<Item = &'a Transaction> + 'b
    where
        'a: 'b,
    {
        self.transactions
            .iter()
            .filter(move |t| &t.custodian_id == custodian_id)
    }

    pub fn pending_transactions(&self) -> impl Iterator<Item = &Transaction> + '_ {
        self.transactions
            .iter()
            .filter(|t| t.status == TransactionStatus::Pending)
    }

    fn custodian_mut(&mut self, id: &CustodianId) -> Option<&mut Custodian> {
        self.custodians.iter_mut().find(|c| &c.id == id)
    }

    fn require_custodian(&self, id: &CustodianId) -> Result<&Custodian, DomainError> {
        self.custodian(id)
            .ok_or_else(|| DomainError::not_found("custodian", id))
    }

    fn ensure_new_transaction_id(&self, id: &TransactionId) -> Result<(), DomainError> {
        if self.transaction(id).is_some() {
            return Err(DomainError::conflict(format!("transaction {id} already exists")));
        }
        Ok(())
    }

    fn adjusted_balance(custodian: &Custodian, change: Money) -> Result<Money, DomainError> {
        custodian
            .balance
            .checked_add(change)
            .ok_or_else(|| DomainError::validation("custodian balance overflow"))
    }
}

impl AggregateRoot for Ledger {
    type Id = LedgerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddCustodian {
    pub custodian_id: CustodianId,
    pub name: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveCustodian {
    pub custodian_id: CustodianId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddInvoice {
    pub invoice_id: InvoiceId,
    pub draft: InvoiceDraft,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateInvoice {
    pub invoice_id: InvoiceId,
    pub draft: InvoiceDraft,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveInvoice {
    pub invoice_id: InvoiceId,
    pub occurred_at: DateTime<Utc>,
}

/// Settle an invoice into a custodian's cash.
///
/// `transaction_id` names the derived transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettleInvoice {
    pub invoice_id: InvoiceId,
    pub custodian_id: CustodianId,
    pub transaction_id: TransactionId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordTransaction {
    pub transaction_id: TransactionId,
    pub draft: TransactionDraft,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewTransaction {
    pub transaction_id: TransactionId,
    pub decision: ReviewDecision,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveTransaction {
    pub transaction_id: TransactionId,
    pub occurred_at: DateTime<Utc>,
}

/// Move cash between custodians as two independent pending legs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestTransfer {
    pub from: CustodianId,
    pub to: CustodianId,
    pub amount: Money,
    pub expense_id: TransactionId,
    pub income_id: TransactionId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddUser {
    pub user: User,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveUser {
    pub user_id: UserId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerCommand {
    AddCustodian(AddCustodian),
    RemoveCustodian(RemoveCustodian),
    AddInvoice(AddInvoice),
    UpdateInvoice(UpdateInvoice),
    RemoveInvoice(RemoveInvoice),
    SettleInvoice(SettleInvoice),
    RecordTransaction(RecordTransaction),
    ReviewTransaction(ReviewTransaction),
    RemoveTransaction(RemoveTransaction),
    RequestTransfer(RequestTransfer),
    AddUser(AddUser),
    RemoveUser(RemoveUser),
}

impl LedgerCommand {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            LedgerCommand::AddCustodian(_) => "add_custodian",
            LedgerCommand::RemoveCustodian(_) => "remove_custodian",
            LedgerCommand::AddInvoice(_) => "add_invoice",
            LedgerCommand::UpdateInvoice(_) => "update_invoice",
            LedgerCommand::RemoveInvoice(_) => "remove_invoice",
            LedgerCommand::SettleInvoice(_) => "settle_invoice",
            LedgerCommand::RecordTransaction(_) => "record_transaction",
            LedgerCommand::ReviewTransaction(_) => "review_transaction",
            LedgerCommand::RemoveTransaction(_) => "remove_transaction",
            LedgerCommand::RequestTransfer(_) => "request_transfer",
            LedgerCommand::AddUser(_) => "add_user",
            LedgerCommand::RemoveUser(_) => "remove_user",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Events
// ─────────────────────────────────────────────────────────────────────────────

/// A signed adjustment to one custodian's stored balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceChange {
    pub custodian_id: CustodianId,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    CustodianAdded {
        custodian: Custodian,
        occurred_at: DateTime<Utc>,
    },
    CustodianRemoved {
        custodian_id: CustodianId,
        occurred_at: DateTime<Utc>,
    },
    InvoiceAdded {
        invoice: Invoice,
        occurred_at: DateTime<Utc>,
    },
    InvoiceUpdated {
        invoice: Invoice,
        occurred_at: DateTime<Utc>,
    },
    InvoiceRemoved {
        invoice_id: InvoiceId,
        occurred_at: DateTime<Utc>,
    },
    /// Paid status, balance change and derived transaction, applied together.
    InvoiceSettled {
        invoice_id: InvoiceId,
        balance_change: BalanceChange,
        transaction: Transaction,
        occurred_at: DateTime<Utc>,
    },
    TransactionRecorded {
        transaction: Transaction,
        occurred_at: DateTime<Utc>,
    },
    TransactionReviewed {
        transaction_id: TransactionId,
        previous: TransactionStatus,
        status: TransactionStatus,
        /// Present only on the transition into `Validated` for a live custodian.
        balance_change: Option<BalanceChange>,
        occurred_at: DateTime<Utc>,
    },
    TransactionRemoved {
        transaction_id: TransactionId,
        occurred_at: DateTime<Utc>,
    },
    TransferRequested {
        expense: Transaction,
        income: Transaction,
        occurred_at: DateTime<Utc>,
    },
    UserAdded {
        user: User,
        occurred_at: DateTime<Utc>,
    },
    UserRemoved {
        user_id: UserId,
        occurred_at: DateTime<Utc>,
    },
}

impl LedgerEvent {
    /// Balance adjustments carried by this event.
    pub fn balance_change(&self) -> Option<&BalanceChange> {
        match self {
            LedgerEvent::InvoiceSettled { balance_change, .. } => Some(balance_change),
            LedgerEvent::TransactionReviewed { balance_change, .. } => balance_change.as_ref(),
            _ => None,
        }
    }
}

impl Event for LedgerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            LedgerEvent::CustodianAdded { .. } => "custody.custodian.added",
            LedgerEvent::CustodianRemoved { .. } => "custody.custodian.removed",
            LedgerEvent::InvoiceAdded { .. } => "custody.invoice.added",
            LedgerEvent::InvoiceUpdated { .. } => "custody.invoice.updated",
            LedgerEvent::InvoiceRemoved { .. } => "custody.invoice.removed",
            LedgerEvent::InvoiceSettled { .. } => "custody.invoice.settled",
            LedgerEvent::TransactionRecorded { .. } => "custody.transaction.recorded",
            LedgerEvent::TransactionReviewed { .. } => "custody.transaction.reviewed",
            LedgerEvent::TransactionRemoved { .. } => "custody.transaction.removed",
            LedgerEvent::TransferRequested { .. } => "custody.transfer.requested",
            LedgerEvent::UserAdded { .. } => "custody.user.added",
            LedgerEvent::UserRemoved { .. } => "custody.user.removed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            LedgerEvent::CustodianAdded { occurred_at, .. }
            | LedgerEvent::CustodianRemoved { occurred_at, .. }
            | LedgerEvent::InvoiceAdded { occurred_at, .. }
            | LedgerEvent::InvoiceUpdated { occurred_at, .. }
            | LedgerEvent::InvoiceRemoved { occurred_at, .. }
            | LedgerEvent::InvoiceSettled { occurred_at, .. }
            | LedgerEvent::TransactionRecorded { occurred_at, .. }
            | LedgerEvent::TransactionReviewed { occurred_at, .. }
            | LedgerEvent::TransactionRemoved { occurred_at, .. }
            | LedgerEvent::TransferRequested { occurred_at, .. }
            | LedgerEvent::UserAdded { occurred_at, .. }
            | LedgerEvent::UserRemoved { occurred_at, .. } => *occurred_at,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Decide / apply
// ─────────────────────────────────────────────────────────────────────────────

impl Aggregate for Ledger {
    type Command = LedgerCommand;
    type Event = LedgerEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            LedgerEvent::CustodianAdded { custodian, .. } => {
                self.custodians.push(custodian.clone());
            }
            LedgerEvent::CustodianRemoved { custodian_id, .. } => {
                self.custodians.retain(|c| &c.id != custodian_id);
            }
            LedgerEvent::InvoiceAdded { invoice, .. } => {
                self.invoices.insert(0, invoice.clone());
            }
            LedgerEvent::InvoiceUpdated { invoice, .. } => {
                if let Some(pos) = position_of(&self.invoices, &invoice.id) {
                    self.invoices[pos] = invoice.clone();
                }
            }
            LedgerEvent::InvoiceRemoved { invoice_id, .. } => {
                self.invoices.retain(|i| &i.id != invoice_id);
            }
            LedgerEvent::InvoiceSettled {
                invoice_id,
                balance_change,
                transaction,
                ..
            } => {
                if let Some(pos) = position_of(&self.invoices, invoice_id) {
                    self.invoices[pos].status = InvoiceStatus::Paid;
                }
                self.apply_balance_change(balance_change);
                self.transactions.insert(0, transaction.clone());
            }
            LedgerEvent::TransactionRecorded { transaction, .. } => {
                self.transactions.insert(0, transaction.clone());
            }
            LedgerEvent::TransactionReviewed {
                transaction_id,
                status,
                balance_change,
                ..
            } => {
                if let Some(pos) = position_of(&self.transactions, transaction_id) {
                    self.transactions[pos].status = *status;
                }
                if let Some(change) = balance_change {
                    self.apply_balance_change(change);
                }
            }
            LedgerEvent::TransactionRemoved { transaction_id, .. } => {
                self.transactions.retain(|t| &t.id != transaction_id);
            }
            LedgerEvent::TransferRequested { expense, income, .. } => {
                self.transactions.insert(0, expense.clone());
                self.transactions.insert(0, income.clone());
            }
            LedgerEvent::UserAdded { user, .. } => {
                self.users.push(user.clone());
            }
            LedgerEvent::UserRemoved { user_id, .. } => {
                self.users.retain(|u| &u.id != user_id);
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            LedgerCommand::AddCustodian(cmd) => self.handle_add_custodian(cmd),
            LedgerCommand::RemoveCustodian(cmd) => self.handle_remove_custodian(cmd),
            LedgerCommand::AddInvoice(cmd) => self.handle_add_invoice(cmd),
            LedgerCommand::UpdateInvoice(cmd) => self.handle_update_invoice(cmd),
            LedgerCommand::RemoveInvoice(cmd) => self.handle_remove_invoice(cmd),
            LedgerCommand::SettleInvoice(cmd) => self.handle_settle_invoice(cmd),
            LedgerCommand::RecordTransaction(cmd) => self.handle_record_transaction(cmd),
            LedgerCommand::ReviewTransaction(cmd) => self.handle_review_transaction(cmd),
            LedgerCommand::RemoveTransaction(cmd) => self.handle_remove_transaction(cmd),
            LedgerCommand::RequestTransfer(cmd) => self.handle_request_transfer(cmd),
            LedgerCommand::AddUser(cmd) => self.handle_add_user(cmd),
            LedgerCommand::RemoveUser(cmd) => self.handle_remove_user(cmd),
        }
    }
}

impl Ledger {
    fn apply_balance_change(&mut self, change: &BalanceChange) {
        if let Some(custodian) = self.custodian_mut(&change.custodian_id) {
            custodian.balance = custodian.balance.saturating_add(change.amount);
        }
    }

    fn handle_add_custodian(&self, cmd: &AddCustodian) -> Result<Vec<LedgerEvent>, DomainError> {
        let name = cmd.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("custodian name is required"));
        }
        if self.custodian(&cmd.custodian_id).is_some() {
            return Err(DomainError::conflict(format!(
                "custodian {} already exists",
                cmd.custodian_id
            )));
        }

        Ok(vec![LedgerEvent::CustodianAdded {
            custodian: Custodian::new(cmd.custodian_id.clone(), name),
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_remove_custodian(
        &self,
        cmd: &RemoveCustodian,
    ) -> Result<Vec<LedgerEvent>, DomainError> {
        self.require_custodian(&cmd.custodian_id)?;

        Ok(vec![LedgerEvent::CustodianRemoved {
            custodian_id: cmd.custodian_id.clone(),
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_add_invoice(&self, cmd: &AddInvoice) -> Result<Vec<LedgerEvent>, DomainError> {
        cmd.draft.validate()?;
        if self.invoice(&cmd.invoice_id).is_some() {
            return Err(DomainError::conflict(format!(
                "invoice {} already exists",
                cmd.invoice_id
            )));
        }

        Ok(vec![LedgerEvent::InvoiceAdded {
            invoice: cmd.draft.clone().into_invoice(cmd.invoice_id.clone()),
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_update_invoice(&self, cmd: &UpdateInvoice) -> Result<Vec<LedgerEvent>, DomainError> {
        let existing = self
            .invoice(&cmd.invoice_id)
            .ok_or_else(|| DomainError::not_found("invoice", &cmd.invoice_id))?;
        cmd.draft.validate()?;

        Ok(vec![LedgerEvent::InvoiceUpdated {
            invoice: cmd.draft.clone().apply_to(existing),
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_remove_invoice(&self, cmd: &RemoveInvoice) -> Result<Vec<LedgerEvent>, DomainError> {
        if self.invoice(&cmd.invoice_id).is_none() {
            return Err(DomainError::not_found("invoice", &cmd.invoice_id));
        }

        Ok(vec![LedgerEvent::InvoiceRemoved {
            invoice_id: cmd.invoice_id.clone(),
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_settle_invoice(&self, cmd: &SettleInvoice) -> Result<Vec<LedgerEvent>, DomainError> {
        let invoice = self
            .invoice(&cmd.invoice_id)
            .ok_or_else(|| DomainError::not_found("invoice", &cmd.invoice_id))?;
        let custodian = self.require_custodian(&cmd.custodian_id)?;

        if invoice.is_paid() {
            return Err(DomainError::conflict(format!(
                "invoice {} is already paid",
                invoice.id
            )));
        }
        self.ensure_new_transaction_id(&cmd.transaction_id)?;

        let change = invoice.kind.balance_effect(invoice.amount);
        Self::adjusted_balance(custodian, change)?;

        let transaction = Transaction {
            id: cmd.transaction_id.clone(),
            date: cmd.occurred_at,
            amount: invoice.amount,
            kind: invoice.kind.settlement_transaction_type(),
            custodian_id: custodian.id.clone(),
            description: format!(
                "{} Factura: {}",
                invoice.kind.settlement_verb(),
                invoice.entity_name
            ),
            status: TransactionStatus::Validated,
            related_invoice_id: Some(invoice.id.clone()),
        };

        Ok(vec![LedgerEvent::InvoiceSettled {
            invoice_id: invoice.id.clone(),
            balance_change: BalanceChange {
                custodian_id: custodian.id.clone(),
                amount: change,
            },
            transaction,
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_record_transaction(
        &self,
        cmd: &RecordTransaction,
    ) -> Result<Vec<LedgerEvent>, DomainError> {
        cmd.draft.validate()?;
        self.require_custodian(&cmd.draft.custodian_id)?;
        self.ensure_new_transaction_id(&cmd.transaction_id)?;

        Ok(vec![LedgerEvent::TransactionRecorded {
            transaction: cmd.draft.clone().into_transaction(cmd.transaction_id.clone()),
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_review_transaction(
        &self,
        cmd: &ReviewTransaction,
    ) -> Result<Vec<LedgerEvent>, DomainError> {
        let transaction = self
            .transaction(&cmd.transaction_id)
            .ok_or_else(|| DomainError::not_found("transaction", &cmd.transaction_id))?;

        let target = TransactionStatus::from(cmd.decision);
        if transaction.status == target {
            return Ok(Vec::new());
        }

        // Only the step into Validated moves money; a rejection never
        // reverses an earlier validation.
        let balance_change = match (target, self.custodian(&transaction.custodian_id)) {
            (TransactionStatus::Validated, Some(custodian)) => {
                let amount = transaction.signed_amount();
                Self::adjusted_balance(custodian, amount)?;
                Some(BalanceChange {
                    custodian_id: custodian.id.clone(),
                    amount,
                })
            }
            _ => None,
        };

        Ok(vec![LedgerEvent::TransactionReviewed {
            transaction_id: transaction.id.clone(),
            previous: transaction.status,
            status: target,
            balance_change,
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_remove_transaction(
        &self,
        cmd: &RemoveTransaction,
    ) -> Result<Vec<LedgerEvent>, DomainError> {
        if self.transaction(&cmd.transaction_id).is_none() {
            return Err(DomainError::not_found("transaction", &cmd.transaction_id));
        }

        Ok(vec![LedgerEvent::TransactionRemoved {
            transaction_id: cmd.transaction_id.clone(),
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_request_transfer(
        &self,
        cmd: &RequestTransfer,
    ) -> Result<Vec<LedgerEvent>, DomainError> {
        if !cmd.amount.is_positive() {
            return Err(DomainError::validation("transfer amount must be positive"));
        }
        let from = self.require_custodian(&cmd.from)?;
        let to = self.require_custodian(&cmd.to)?;

        if cmd.expense_id == cmd.income_id {
            return Err(DomainError::conflict("transfer legs need distinct ids"));
        }
        self.ensure_new_transaction_id(&cmd.expense_id)?;
        self.ensure_new_transaction_id(&cmd.income_id)?;

        let expense = Transaction {
            id: cmd.expense_id.clone(),
            date: cmd.occurred_at,
            amount: cmd.amount,
            kind: TransactionType::Expense,
            custodian_id: from.id.clone(),
            description: format!("Transferencia enviada a {}", to.name),
            status: TransactionStatus::Pending,
            related_invoice_id: None,
        };
        let income = Transaction {
            id: cmd.income_id.clone(),
            date: cmd.occurred_at,
            amount: cmd.amount,
            kind: TransactionType::Income,
            custodian_id: to.id.clone(),
            description: format!("Transferencia recibida de {}", from.name),
            status: TransactionStatus::Pending,
            related_invoice_id: None,
        };

        Ok(vec![LedgerEvent::TransferRequested {
            expense,
            income,
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_add_user(&self, cmd: &AddUser) -> Result<Vec<LedgerEvent>, DomainError> {
        if cmd.user.name.trim().is_empty() {
            return Err(DomainError::validation("user name is required"));
        }
        if self.user(&cmd.user.id).is_some() {
            return Err(DomainError::conflict(format!(
                "user {} already exists",
                cmd.user.id
            )));
        }

        Ok(vec![LedgerEvent::UserAdded {
            user: cmd.user.clone(),
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_remove_user(&self, cmd: &RemoveUser) -> Result<Vec<LedgerEvent>, DomainError> {
        if self.user(&cmd.user_id).is_none() {
            return Err(DomainError::not_found("user", &cmd.user_id));
        }

        Ok(vec![LedgerEvent::UserRemoved {
            user_id: cmd.user_id.clone(),
            occurred_at: cmd.occurred_at,
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::InvoiceType;
    use cashguard_auth::Role;
    use cashguard_events::execute;
    use proptest::prelude::*;

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn cid(raw: &str) -> CustodianId {
        CustodianId::new(raw)
    }

    fn tid(raw: &str) -> TransactionId {
        TransactionId::new(raw)
    }

    fn custodian(id: &str, name: &str, balance: i64) -> Custodian {
        Custodian {
            id: cid(id),
            name: name.to_string(),
            balance: Money::from_units(balance),
        }
    }

    fn invoice(id: &str, kind: InvoiceType, amount: i64) -> Invoice {
        Invoice {
            id: InvoiceId::new(id),
            kind,
            amount: Money::from_units(amount),
            entity_name: "Cliente Norte".to_string(),
            status: InvoiceStatus::Pending,
            due_date: None,
            description: None,
        }
    }

    fn pending(id: &str, kind: TransactionType, amount: i64, custodian: &str) -> Transaction {
        Transaction {
            id: tid(id),
            date: t0(),
            amount: Money::from_units(amount),
            kind,
            custodian_id: cid(custodian),
            description: "Movimiento".to_string(),
            status: TransactionStatus::Pending,
            related_invoice_id: None,
        }
    }

    fn ledger(
        custodians: Vec<Custodian>,
        invoices: Vec<Invoice>,
        transactions: Vec<Transaction>,
    ) -> Ledger {
        Ledger::seeded(
            LedgerId::new(),
            SeedData {
                custodians,
                invoices,
                transactions,
                users: Vec::new(),
            },
        )
    }

    fn settle(invoice_id: &str, custodian_id: &str, tx_id: &str) -> LedgerCommand {
        LedgerCommand::SettleInvoice(SettleInvoice {
            invoice_id: InvoiceId::new(invoice_id),
            custodian_id: cid(custodian_id),
            transaction_id: tid(tx_id),
            occurred_at: t0(),
        })
    }

    fn review(tx_id: &str, decision: ReviewDecision) -> LedgerCommand {
        LedgerCommand::ReviewTransaction(ReviewTransaction {
            transaction_id: tid(tx_id),
            decision,
            occurred_at: t0(),
        })
    }

    fn transfer(from: &str, to: &str, amount: i64, stamp: u64) -> LedgerCommand {
        LedgerCommand::RequestTransfer(RequestTransfer {
            from: cid(from),
            to: cid(to),
            amount: Money::from_units(amount),
            expense_id: tid(&format!("tx-{stamp}-1")),
            income_id: tid(&format!("tx-{stamp}-2")),
            occurred_at: t0(),
        })
    }

    fn balance(ledger: &Ledger, id: &str) -> Money {
        ledger.custodian(&cid(id)).unwrap().balance
    }

    #[test]
    fn settling_receivable_credits_custodian_and_records_validated_income() {
        let mut ledger = ledger(
            vec![custodian("c1", "Caja", 0)],
            vec![invoice("i1", InvoiceType::Receivable, 100)],
            Vec::new(),
        );

        let events = execute(&mut ledger, &settle("i1", "c1", "t-new")).unwrap();
        assert_eq!(events.len(), 1);

        assert_eq!(ledger.invoice(&InvoiceId::new("i1")).unwrap().status, InvoiceStatus::Paid);
        assert_eq!(balance(&ledger, "c1"), Money::from_units(100));
        assert_eq!(ledger.transactions().len(), 1);

        let tx = &ledger.transactions()[0];
        assert_eq!(tx.kind, TransactionType::Income);
        assert_eq!(tx.amount, Money::from_units(100));
        assert_eq!(tx.status, TransactionStatus::Validated);
        assert_eq!(tx.related_invoice_id, Some(InvoiceId::new("i1")));
        assert_eq!(tx.custodian_id, cid("c1"));
        assert_eq!(tx.description, "Cobro Factura: Cliente Norte");
    }

    #[test]
    fn settling_payable_debits_custodian_and_records_expense() {
        let mut ledger = ledger(
            vec![custodian("c1", "Caja", 300)],
            vec![invoice("i2", InvoiceType::Payable, 120)],
            vec![pending("old", TransactionType::Income, 5, "c1")],
        );

        execute(&mut ledger, &settle("i2", "c1", "t-new")).unwrap();

        assert_eq!(balance(&ledger, "c1"), Money::from_units(180));
        let tx = &ledger.transactions()[0];
        assert_eq!(tx.id, tid("t-new"));
        assert_eq!(tx.kind, TransactionType::Expense);
        assert_eq!(tx.description, "Pago Factura: Cliente Norte");
        assert_eq!(ledger.transactions()[1].id, tid("old"));
    }

    #[test]
    fn settlement_with_missing_reference_changes_nothing() {
        let mut ledger = ledger(
            vec![custodian("c1", "Caja", 0)],
            vec![invoice("i1", InvoiceType::Receivable, 100)],
            Vec::new(),
        );
        let before = ledger.clone();

        let err = execute(&mut ledger, &settle("i1", "ghost", "t1")).unwrap_err();
        assert!(err.is_not_found());
        let err = execute(&mut ledger, &settle("nope", "c1", "t1")).unwrap_err();
        assert!(err.is_not_found());

        assert_eq!(ledger, before);
    }

    #[test]
    fn paid_invoice_cannot_be_settled_twice() {
        let mut ledger = ledger(
            vec![custodian("c1", "Caja", 0)],
            vec![invoice("i1", InvoiceType::Receivable, 100)],
            Vec::new(),
        );
        execute(&mut ledger, &settle("i1", "c1", "t1")).unwrap();

        let err = execute(&mut ledger, &settle("i1", "c1", "t2")).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(msg) if msg.contains("already paid")));
        assert_eq!(balance(&ledger, "c1"), Money::from_units(100));
        assert_eq!(ledger.transactions().len(), 1);
    }

    #[test]
    fn validating_expense_debits_once() {
        let mut ledger = ledger(
            vec![custodian("c1", "Caja", 100)],
            Vec::new(),
            vec![pending("t1", TransactionType::Expense, 50, "c1")],
        );

        let events = execute(&mut ledger, &review("t1", ReviewDecision::Validated)).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(balance(&ledger, "c1"), Money::from_units(50));
        assert_eq!(
            ledger.transaction(&tid("t1")).unwrap().status,
            TransactionStatus::Validated
        );

        let events = execute(&mut ledger, &review("t1", ReviewDecision::Validated)).unwrap();
        assert!(events.is_empty());
        assert_eq!(balance(&ledger, "c1"), Money::from_units(50));
    }

    #[test]
    fn rejection_never_moves_money() {
        let mut ledger = ledger(
            vec![custodian("c1", "Caja", 100)],
            Vec::new(),
            vec![
                pending("t1", TransactionType::Income, 40, "c1"),
                pending("t2", TransactionType::Expense, 30, "c1"),
            ],
        );

        execute(&mut ledger, &review("t1", ReviewDecision::Rejected)).unwrap();
        assert_eq!(balance(&ledger, "c1"), Money::from_units(100));
        assert_eq!(
            ledger.transaction(&tid("t1")).unwrap().status,
            TransactionStatus::Rejected
        );

        // Rejecting after validation keeps the earlier effect.
        execute(&mut ledger, &review("t2", ReviewDecision::Validated)).unwrap();
        assert_eq!(balance(&ledger, "c1"), Money::from_units(70));
        execute(&mut ledger, &review("t2", ReviewDecision::Rejected)).unwrap();
        assert_eq!(balance(&ledger, "c1"), Money::from_units(70));
    }

    #[test]
    fn rejected_transaction_can_still_be_validated_later() {
        let mut ledger = ledger(
            vec![custodian("c1", "Caja", 0)],
            Vec::new(),
            vec![pending("t1", TransactionType::Income, 25, "c1")],
        );

        execute(&mut ledger, &review("t1", ReviewDecision::Rejected)).unwrap();
        execute(&mut ledger, &review("t1", ReviewDecision::Validated)).unwrap();
        assert_eq!(balance(&ledger, "c1"), Money::from_units(25));
    }

    #[test]
    fn validating_transaction_of_deleted_custodian_only_changes_status() {
        let mut ledger = ledger(
            vec![custodian("c2", "Banco", 10)],
            Vec::new(),
            vec![pending("t1", TransactionType::Income, 25, "gone")],
        );

        let events = execute(&mut ledger, &review("t1", ReviewDecision::Validated)).unwrap();
        assert_eq!(events[0].balance_change(), None);
        assert_eq!(
            ledger.transaction(&tid("t1")).unwrap().status,
            TransactionStatus::Validated
        );
        assert_eq!(balance(&ledger, "c2"), Money::from_units(10));
        assert_eq!(ledger.custodian_name(&cid("gone")), UNKNOWN_CUSTODIAN);
    }

    #[test]
    fn reviewing_missing_transaction_is_not_found() {
        let mut ledger = ledger(Vec::new(), Vec::new(), Vec::new());
        let err = execute(&mut ledger, &review("t404", ReviewDecision::Validated)).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(ledger.version(), 0);
    }

    #[test]
    fn transfer_creates_two_pending_legs_without_moving_money() {
        let mut ledger = ledger(
            vec![custodian("c1", "Ana", 100), custodian("c2", "Luis", 20)],
            Vec::new(),
            vec![pending("old", TransactionType::Income, 1, "c1")],
        );

        execute(&mut ledger, &transfer("c1", "c2", 30, 1_700_000_000_000)).unwrap();

        assert_eq!(balance(&ledger, "c1"), Money::from_units(100));
        assert_eq!(balance(&ledger, "c2"), Money::from_units(20));

        let txs = ledger.transactions();
        assert_eq!(txs.len(), 3);
        let (income, expense) = (&txs[0], &txs[1]);
        assert_eq!(txs[2].id, tid("old"));

        assert_eq!(income.id, tid("tx-1700000000000-2"));
        assert_eq!(income.kind, TransactionType::Income);
        assert_eq!(income.custodian_id, cid("c2"));
        assert_eq!(income.description, "Transferencia recibida de Ana");

        assert_eq!(expense.id, tid("tx-1700000000000-1"));
        assert_eq!(expense.kind, TransactionType::Expense);
        assert_eq!(expense.custodian_id, cid("c1"));
        assert_eq!(expense.description, "Transferencia enviada a Luis");

        for leg in [income, expense] {
            assert_eq!(leg.status, TransactionStatus::Pending);
            assert_eq!(leg.amount, Money::from_units(30));
            assert_eq!(leg.date, t0());
        }
    }

    #[test]
    fn transfer_legs_are_validated_independently() {
        let mut ledger = ledger(
            vec![custodian("c1", "Ana", 100), custodian("c2", "Luis", 0)],
            Vec::new(),
            Vec::new(),
        );
        execute(&mut ledger, &transfer("c1", "c2", 30, 7)).unwrap();

        execute(&mut ledger, &review("tx-7-1", ReviewDecision::Validated)).unwrap();
        assert_eq!(balance(&ledger, "c1"), Money::from_units(70));
        assert_eq!(balance(&ledger, "c2"), Money::ZERO);

        execute(&mut ledger, &review("tx-7-2", ReviewDecision::Rejected)).unwrap();
        assert_eq!(balance(&ledger, "c2"), Money::ZERO);
    }

    #[test]
    fn self_transfer_produces_offsetting_legs() {
        let mut ledger = ledger(vec![custodian("c1", "Ana", 10)], Vec::new(), Vec::new());
        execute(&mut ledger, &transfer("c1", "c1", 5, 9)).unwrap();
        execute(&mut ledger, &review("tx-9-1", ReviewDecision::Validated)).unwrap();
        execute(&mut ledger, &review("tx-9-2", ReviewDecision::Validated)).unwrap();
        assert_eq!(balance(&ledger, "c1"), Money::from_units(10));
    }

    #[test]
    fn transfer_requires_both_custodians_and_positive_amount() {
        let mut ledger = ledger(vec![custodian("c1", "Ana", 10)], Vec::new(), Vec::new());

        assert!(execute(&mut ledger, &transfer("c1", "zz", 5, 1)).unwrap_err().is_not_found());
        assert!(matches!(
            execute(&mut ledger, &transfer("c1", "c1", 0, 2)),
            Err(DomainError::Validation(_))
        ));
        assert!(ledger.transactions().is_empty());
    }

    #[test]
    fn deletions_remove_exactly_one_record_without_cascade() {
        let mut ledger = ledger(
            vec![custodian("c1", "Ana", 0), custodian("c2", "Luis", 0)],
            vec![
                invoice("i1", InvoiceType::Receivable, 10),
                invoice("i2", InvoiceType::Payable, 20),
            ],
            vec![
                pending("t1", TransactionType::Income, 1, "c1"),
                pending("t2", TransactionType::Expense, 2, "c2"),
            ],
        );

        execute(
            &mut ledger,
            &LedgerCommand::RemoveCustodian(RemoveCustodian {
                custodian_id: cid("c1"),
                occurred_at: t0(),
            }),
        )
        .unwrap();
        assert_eq!(ledger.custodians().len(), 1);
        assert_eq!(ledger.transactions().len(), 2);
        assert_eq!(ledger.transaction(&tid("t1")).unwrap().custodian_id, cid("c1"));

        execute(
            &mut ledger,
            &LedgerCommand::RemoveInvoice(RemoveInvoice {
                invoice_id: InvoiceId::new("i2"),
                occurred_at: t0(),
            }),
        )
        .unwrap();
        assert_eq!(ledger.invoices().len(), 1);
        assert_eq!(ledger.invoices()[0].id, InvoiceId::new("i1"));

        execute(
            &mut ledger,
            &LedgerCommand::RemoveTransaction(RemoveTransaction {
                transaction_id: tid("t2"),
                occurred_at: t0(),
            }),
        )
        .unwrap();
        assert_eq!(ledger.transactions().len(), 1);
        assert_eq!(ledger.transactions()[0].id, tid("t1"));
    }

    #[test]
    fn deleting_validated_transaction_keeps_balance() {
        let mut ledger = ledger(
            vec![custodian("c1", "Ana", 0)],
            Vec::new(),
            vec![pending("t1", TransactionType::Income, 40, "c1")],
        );
        execute(&mut ledger, &review("t1", ReviewDecision::Validated)).unwrap();
        execute(
            &mut ledger,
            &LedgerCommand::RemoveTransaction(RemoveTransaction {
                transaction_id: tid("t1"),
                occurred_at: t0(),
            }),
        )
        .unwrap();

        assert!(ledger.transactions().is_empty());
        assert_eq!(balance(&ledger, "c1"), Money::from_units(40));
    }

    #[test]
    fn users_are_appended_and_removed() {
        let mut ledger = ledger(Vec::new(), Vec::new(), Vec::new());
        let user = User {
            id: UserId::new("u9"),
            name: "Marta".to_string(),
            role: Role::Accountant,
            avatar: "https://example.test/marta.png".to_string(),
        };

        execute(
            &mut ledger,
            &LedgerCommand::AddUser(AddUser {
                user: user.clone(),
                occurred_at: t0(),
            }),
        )
        .unwrap();
        assert_eq!(ledger.users(), &[user.clone()]);

        let dup = execute(
            &mut ledger,
            &LedgerCommand::AddUser(AddUser {
                user,
                occurred_at: t0(),
            }),
        );
        assert!(matches!(dup, Err(DomainError::Conflict(_))));

        execute(
            &mut ledger,
            &LedgerCommand::RemoveUser(RemoveUser {
                user_id: UserId::new("u9"),
                occurred_at: t0(),
            }),
        )
        .unwrap();
        assert!(ledger.users().is_empty());
    }

    #[test]
    fn new_custodians_start_at_zero_and_go_last() {
        let mut ledger = ledger(vec![custodian("c1", "Ana", 5)], Vec::new(), Vec::new());
        execute(
            &mut ledger,
            &LedgerCommand::AddCustodian(AddCustodian {
                custodian_id: cid("c2"),
                name: " Luis ".to_string(),
                occurred_at: t0(),
            }),
        )
        .unwrap();

        let last = ledger.custodians().last().unwrap();
        assert_eq!(last.id, cid("c2"));
        assert_eq!(last.name, "Luis");
        assert_eq!(last.balance, Money::ZERO);
    }

    #[test]
    fn new_invoices_and_transactions_go_first() {
        let mut ledger = ledger(
            vec![custodian("c1", "Ana", 0)],
            vec![invoice("i1", InvoiceType::Receivable, 10)],
            vec![pending("t1", TransactionType::Income, 1, "c1")],
        );

        execute(
            &mut ledger,
            &LedgerCommand::AddInvoice(AddInvoice {
                invoice_id: InvoiceId::new("i2"),
                draft: InvoiceDraft {
                    kind: InvoiceType::Payable,
                    amount: Money::from_units(75),
                    entity_name: "Papelería".to_string(),
                    due_date: None,
                    description: None,
                },
                occurred_at: t0(),
            }),
        )
        .unwrap();
        execute(
            &mut ledger,
            &LedgerCommand::RecordTransaction(RecordTransaction {
                transaction_id: tid("t2"),
                draft: TransactionDraft {
                    date: t0(),
                    amount: Money::from_units(3),
                    kind: TransactionType::Expense,
                    custodian_id: cid("c1"),
                    description: "Taxi".to_string(),
                },
                occurred_at: t0(),
            }),
        )
        .unwrap();

        assert_eq!(ledger.invoices()[0].id, InvoiceId::new("i2"));
        assert_eq!(ledger.invoices()[0].status, InvoiceStatus::Pending);
        assert_eq!(ledger.transactions()[0].id, tid("t2"));
        assert_eq!(ledger.transactions()[0].status, TransactionStatus::Pending);
        assert_eq!(ledger.version(), 2);
    }

    #[test]
    fn update_invoice_cannot_change_status() {
        let mut ledger = ledger(
            vec![custodian("c1", "Ana", 0)],
            vec![invoice("i1", InvoiceType::Receivable, 10)],
            Vec::new(),
        );
        execute(&mut ledger, &settle("i1", "c1", "t1")).unwrap();

        execute(
            &mut ledger,
            &LedgerCommand::UpdateInvoice(UpdateInvoice {
                invoice_id: InvoiceId::new("i1"),
                draft: InvoiceDraft {
                    kind: InvoiceType::Receivable,
                    amount: Money::from_units(12),
                    entity_name: "Cliente Sur".to_string(),
                    due_date: None,
                    description: Some("corrección".to_string()),
                },
                occurred_at: t0(),
            }),
        )
        .unwrap();

        let updated = ledger.invoice(&InvoiceId::new("i1")).unwrap();
        assert_eq!(updated.status, InvoiceStatus::Paid);
        assert_eq!(updated.entity_name, "Cliente Sur");
        assert_eq!(updated.amount, Money::from_units(12));
    }

    #[test]
    fn record_transaction_rejects_duplicates_and_unknown_custodians() {
        let mut ledger = ledger(
            vec![custodian("c1", "Ana", 0)],
            Vec::new(),
            vec![pending("t1", TransactionType::Income, 1, "c1")],
        );
        let draft = TransactionDraft {
            date: t0(),
            amount: Money::from_units(3),
            kind: TransactionType::Expense,
            custodian_id: cid("c1"),
            description: "Taxi".to_string(),
        };

        let dup = execute(
            &mut ledger,
            &LedgerCommand::RecordTransaction(RecordTransaction {
                transaction_id: tid("t1"),
                draft: draft.clone(),
                occurred_at: t0(),
            }),
        );
        assert!(matches!(dup, Err(DomainError::Conflict(_))));

        let unknown = execute(
            &mut ledger,
            &LedgerCommand::RecordTransaction(RecordTransaction {
                transaction_id: tid("t2"),
                draft: TransactionDraft {
                    custodian_id: cid("nobody"),
                    ..draft
                },
                occurred_at: t0(),
            }),
        );
        assert!(unknown.unwrap_err().is_not_found());
    }

    #[test]
    fn events_report_type_and_time() {
        let mut ledger = ledger(
            vec![custodian("c1", "Ana", 0)],
            vec![invoice("i1", InvoiceType::Receivable, 10)],
            Vec::new(),
        );
        let events = execute(&mut ledger, &settle("i1", "c1", "t1")).unwrap();
        assert_eq!(events[0].event_type(), "custody.invoice.settled");
        assert_eq!(events[0].occurred_at(), t0());
        assert_eq!(
            events[0].balance_change().map(|c| c.amount),
            Some(Money::from_units(10))
        );
    }

    #[derive(Debug, Clone)]
    enum Op {
        Settle(usize, usize),
        Validate(usize),
        Reject(usize),
        Transfer(usize, usize, i64),
        Record(usize, bool, i64),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0usize..6, 0usize..3).prop_map(|(i, c)| Op::Settle(i, c)),
            (0usize..32).prop_map(Op::Validate),
            (0usize..32).prop_map(Op::Reject),
            (0usize..3, 0usize..3, 1i64..10_000).prop_map(|(a, b, m)| Op::Transfer(a, b, m)),
            (0usize..3, any::<bool>(), 1i64..10_000).prop_map(|(c, inc, m)| Op::Record(c, inc, m)),
        ]
    }

    fn random_ledger() -> Ledger {
        let invoices = (0..6)
            .map(|i| {
                let kind = if i % 2 == 0 {
                    InvoiceType::Receivable
                } else {
                    InvoiceType::Payable
                };
                invoice(&format!("i{i}"), kind, 100 + i as i64 * 10)
            })
            .collect();
        ledger(
            vec![
                custodian("c0", "Ana", 0),
                custodian("c1", "Luis", 0),
                custodian("c2", "Rosa", 0),
            ],
            invoices,
            Vec::new(),
        )
    }

    fn run(ledger: &mut Ledger, ops: &[Op]) {
        for (n, op) in ops.iter().enumerate() {
            let cmd = match op {
                Op::Settle(i, c) => settle(&format!("i{i}"), &format!("c{c}"), &format!("s{n}")),
                Op::Validate(idx) | Op::Reject(idx) => {
                    let Some(tx) = ledger.transactions().get(*idx) else {
                        continue;
                    };
                    let decision = if matches!(op, Op::Validate(_)) {
                        ReviewDecision::Validated
                    } else if tx.is_validated() {
                        // Rejecting a validated entry is the one unmodelled
                        // transition; it is covered by its own test.
                        continue;
                    } else {
                        ReviewDecision::Rejected
                    };
                    review(tx.id.as_str(), decision)
                }
                Op::Transfer(a, b, amount) => {
                    transfer(&format!("c{a}"), &format!("c{b}"), *amount, n as u64)
                }
                Op::Record(c, income, amount) => {
                    LedgerCommand::RecordTransaction(RecordTransaction {
                        transaction_id: tid(&format!("r{n}")),
                        draft: TransactionDraft {
                            date: t0(),
                            amount: Money::from_cents(*amount),
                            kind: if *income {
                                TransactionType::Income
                            } else {
                                TransactionType::Expense
                            },
                            custodian_id: cid(&format!("c{c}")),
                            description: "Movimiento".to_string(),
                        },
                        occurred_at: t0(),
                    })
                }
            };
            // Conflicts (already paid) are expected; state must stay consistent.
            let _ = execute(ledger, &cmd);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: without deletions or reject-after-validate, every stored
        /// balance equals the sum of its validated transactions.
        #[test]
        fn stored_balance_matches_validated_history(ops in prop::collection::vec(op(), 0..40)) {
            let mut ledger = random_ledger();
            run(&mut ledger, &ops);

            for c in ledger.custodians() {
                let derived: Money = ledger
                    .transactions_of(&c.id)
                    .map(Transaction::validated_effect)
                    .sum();
                prop_assert_eq!(c.balance, derived);
            }
        }

        /// Property: a rejection never changes any balance.
        #[test]
        fn rejection_leaves_balances_untouched(
            ops in prop::collection::vec(op(), 0..30),
            pick in 0usize..32,
        ) {
            let mut ledger = random_ledger();
            run(&mut ledger, &ops);

            let Some(tx) = ledger.transactions().get(pick).cloned() else {
                return Ok(());
            };
            let before: Vec<Money> = ledger.custodians().iter().map(|c| c.balance).collect();
            execute(&mut ledger, &review(tx.id.as_str(), ReviewDecision::Rejected)).unwrap();
            let after: Vec<Money> = ledger.custodians().iter().map(|c| c.balance).collect();

            prop_assert_eq!(before, after);
            prop_assert_eq!(
                ledger.transaction(&tx.id).unwrap().status,
                TransactionStatus::Rejected
            );
        }

        /// Property: each effective settlement adds exactly one validated
        /// transaction linked to its invoice.
        #[test]
        fn settlement_adds_exactly_one_linked_transaction(i in 0usize..6, c in 0usize..3) {
            let mut ledger = random_ledger();
            let before = ledger.transactions().len();
            execute(&mut ledger, &settle(&format!("i{i}"), &format!("c{c}"), "s")).unwrap();

            prop_assert_eq!(ledger.transactions().len(), before + 1);
            let tx = &ledger.transactions()[0];
            prop_assert_eq!(tx.status, TransactionStatus::Validated);
            prop_assert_eq!(tx.related_invoice_id.clone(), Some(InvoiceId::new(format!("i{i}"))));
        }
    }
}
