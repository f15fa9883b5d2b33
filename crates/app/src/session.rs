//! Login-by-selection session over one ledger.
//!
//! Every mutating method follows the same path: check the logged-in user's
//! permission for the intent, stamp a ledger command with generated ids and
//! the current time, then hand it to the [`Dispatcher`].

use std::sync::Arc;

use cashguard_auth::{Principal, Role};
use cashguard_core::{
    Clock, CustodianId, InvoiceId, LedgerId, Money, SystemClock, TransactionId, UserId,
};
use cashguard_custody::{
    AddCustodian, AddInvoice, AddUser, Custodian, DashboardSummary, Invoice, InvoiceDraft, Ledger,
    LedgerCommand,
    RecordTransaction, ReconciliationReport, RemoveCustodian, RemoveInvoice, RemoveTransaction,
    RemoveUser, RequestTransfer, ReviewDecision, ReviewTransaction, SettleInvoice, Transaction,
    TransactionDraft, TransactionFilter, TransactionStatus, UpdateInvoice, User,
};
use cashguard_events::{EventBus, Subscription};

use crate::authz::authorize_intent;
use crate::config::AppConfig;
use crate::dispatcher::{Dispatcher, LedgerEnvelope};
use crate::errors::AppError;
use crate::ids::IdGenerator;
use crate::intent::Intent;
use crate::navigation::{View, default_view, navigation};

type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
struct LoggedIn {
    principal: Principal,
    view: View,
}

#[derive(Debug)]
pub struct Session<B> {
    ledger: Ledger,
    dispatcher: Dispatcher<B>,
    ids: IdGenerator,
    current: Option<LoggedIn>,
}

impl<B> Session<B>
where
    B: EventBus<LedgerEnvelope>,
{
    pub fn new(ledger: Ledger, dispatcher: Dispatcher<B>, clock: Arc<dyn Clock>) -> Self {
        Self {
            ledger,
            dispatcher,
            ids: IdGenerator::new(clock),
            current: None,
        }
    }

    /// Seeded ledger on the system clock, as configured.
    pub fn from_config(config: &AppConfig, bus: B) -> Self {
        let ledger = Ledger::seeded(LedgerId::new(), config.seed.data());
        tracing::info!(
            seed = %config.seed,
            custodians = ledger.custodians().len(),
            transactions = ledger.transactions().len(),
            "ledger seeded"
        );
        Self::new(
            ledger,
            Dispatcher::new(bus, config.strict_references),
            Arc::new(SystemClock),
        )
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn subscribe(&self) -> Subscription<LedgerEnvelope> {
        self.dispatcher.subscribe()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Login and navigation
    // ─────────────────────────────────────────────────────────────────────

    /// Log in as one of the known users and land on the role's default view.
    pub fn login(&mut self, user_id: &UserId) -> AppResult<View> {
        let user = self
            .ledger
            .user(user_id)
            .ok_or_else(|| AppError::UnknownUser(user_id.clone()))?;

        let view = default_view(user.role);
        tracing::info!(user_id = %user.id, role = %user.role, view = %view, "logged in");
        self.current = Some(LoggedIn {
            principal: Principal::new(user.id.clone(), user.role),
            view,
        });
        Ok(view)
    }

    pub fn logout(&mut self) {
        if let Some(session) = self.current.take() {
            tracing::info!(user_id = %session.principal.user_id, "logged out");
        }
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current
            .as_ref()
            .and_then(|s| self.ledger.user(&s.principal.user_id))
    }

    pub fn role(&self) -> AppResult<Role> {
        Ok(self.principal()?.role)
    }

    pub fn active_view(&self) -> AppResult<View> {
        Ok(self.logged_in()?.view)
    }

    pub fn navigation(&self) -> AppResult<Vec<View>> {
        Ok(navigation(self.role()?))
    }

    pub fn select_view(&mut self, view: View) -> AppResult<()> {
        let role = self.role()?;
        if !navigation(role).contains(&view) {
            tracing::warn!(view = %view, role = %role, "view not available");
            return Err(AppError::ViewNotAvailable { view, role });
        }
        if let Some(session) = self.current.as_mut() {
            session.view = view;
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────

    pub fn dashboard(&self) -> AppResult<DashboardSummary> {
        self.guard(Intent::ViewDashboard)?;
        Ok(DashboardSummary::from_ledger(&self.ledger))
    }

    pub fn reconciliation(&self) -> AppResult<ReconciliationReport> {
        self.guard(Intent::ViewDashboard)?;
        Ok(ReconciliationReport::for_ledger(&self.ledger))
    }

    pub fn transactions(&self, filter: TransactionFilter) -> AppResult<Vec<&Transaction>> {
        self.guard(Intent::ListTransactions)?;
        Ok(self.ledger.filtered_transactions(filter).collect())
    }

    pub fn invoices(&self) -> AppResult<&[Invoice]> {
        self.guard(Intent::ListInvoices)?;
        Ok(self.ledger.invoices())
    }

    pub fn custodians(&self) -> AppResult<&[Custodian]> {
        self.guard(Intent::ListCustodians)?;
        Ok(self.ledger.custodians())
    }

    /// Transactions referencing one custodian, including reviewed ones.
    pub fn custodian_transactions(&self, id: &CustodianId) -> AppResult<Vec<&Transaction>> {
        self.guard(Intent::ListCustodians)?;
        Ok(self.ledger.transactions_of(id).collect())
    }

    /// Display name for a custodian reference, `"Desconocido"` if dangling.
    pub fn custodian_name(&self, id: &CustodianId) -> &str {
        self.ledger.custodian_name(id)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Transactions
    // ─────────────────────────────────────────────────────────────────────

    /// Record a manual transaction; it always starts pending.
    pub fn record_transaction(
        &mut self,
        draft: TransactionDraft,
    ) -> AppResult<Vec<LedgerEnvelope>> {
        self.guard(Intent::RecordTransaction)?;
        let command = LedgerCommand::RecordTransaction(RecordTransaction {
            transaction_id: self.ids.next_id(),
            draft,
            occurred_at: self.ids.now(),
        });
        self.dispatch(command)
    }

    /// Validate or reject a pending transaction. Reviews are final.
    pub fn review_transaction(
        &mut self,
        transaction_id: &TransactionId,
        decision: ReviewDecision,
    ) -> AppResult<Vec<LedgerEnvelope>> {
        self.guard(Intent::ReviewTransaction)?;
        if let Some(tx) = self.ledger.transaction(transaction_id) {
            if tx.status != TransactionStatus::Pending {
                return Err(AppError::policy(format!(
                    "transaction {transaction_id} has already been reviewed"
                )));
            }
        }
        let command = LedgerCommand::ReviewTransaction(ReviewTransaction {
            transaction_id: transaction_id.clone(),
            decision,
            occurred_at: self.ids.now(),
        });
        self.dispatch(command)
    }

    /// Delete a pending or rejected transaction. Validated ones are kept.
    pub fn delete_transaction(
        &mut self,
        transaction_id: &TransactionId,
    ) -> AppResult<Vec<LedgerEnvelope>> {
        self.guard(Intent::DeleteTransaction)?;
        if let Some(tx) = self.ledger.transaction(transaction_id) {
            if tx.status == TransactionStatus::Validated {
                return Err(AppError::policy(format!(
                    "transaction {transaction_id} is validated and cannot be deleted"
                )));
            }
        }
        let command = LedgerCommand::RemoveTransaction(RemoveTransaction {
            transaction_id: transaction_id.clone(),
            occurred_at: self.ids.now(),
        });
        self.dispatch(command)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Invoices
    // ─────────────────────────────────────────────────────────────────────

    pub fn add_invoice(&mut self, draft: InvoiceDraft) -> AppResult<Vec<LedgerEnvelope>> {
        self.guard(Intent::SaveInvoice)?;
        let command = LedgerCommand::AddInvoice(AddInvoice {
            invoice_id: self.ids.next_id(),
            draft,
            occurred_at: self.ids.now(),
        });
        self.dispatch(command)
    }

    pub fn update_invoice(
        &mut self,
        invoice_id: &InvoiceId,
        draft: InvoiceDraft,
    ) -> AppResult<Vec<LedgerEnvelope>> {
        self.guard(Intent::SaveInvoice)?;
        let command = LedgerCommand::UpdateInvoice(UpdateInvoice {
            invoice_id: invoice_id.clone(),
            draft,
            occurred_at: self.ids.now(),
        });
        self.dispatch(command)
    }

    pub fn delete_invoice(&mut self, invoice_id: &InvoiceId) -> AppResult<Vec<LedgerEnvelope>> {
        self.guard(Intent::DeleteInvoice)?;
        let command = LedgerCommand::RemoveInvoice(RemoveInvoice {
            invoice_id: invoice_id.clone(),
            occurred_at: self.ids.now(),
        });
        self.dispatch(command)
    }

    /// Mark an invoice paid through a custodian's cash.
    pub fn settle_invoice(
        &mut self,
        invoice_id: &InvoiceId,
        custodian_id: &CustodianId,
    ) -> AppResult<Vec<LedgerEnvelope>> {
        self.guard(Intent::SettleInvoice)?;
        let command = LedgerCommand::SettleInvoice(SettleInvoice {
            invoice_id: invoice_id.clone(),
            custodian_id: custodian_id.clone(),
            transaction_id: self.ids.next_id(),
            occurred_at: self.ids.now(),
        });
        self.dispatch(command)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Custodians
    // ─────────────────────────────────────────────────────────────────────

    pub fn add_custodian(&mut self, name: &str) -> AppResult<Vec<LedgerEnvelope>> {
        self.guard(Intent::SaveCustodian)?;
        let command = LedgerCommand::AddCustodian(AddCustodian {
            custodian_id: self.ids.next_id(),
            name: name.to_string(),
            occurred_at: self.ids.now(),
        });
        self.dispatch(command)
    }

    pub fn delete_custodian(
        &mut self,
        custodian_id: &CustodianId,
    ) -> AppResult<Vec<LedgerEnvelope>> {
        self.guard(Intent::DeleteCustodian)?;
        let command = LedgerCommand::RemoveCustodian(RemoveCustodian {
            custodian_id: custodian_id.clone(),
            occurred_at: self.ids.now(),
        });
        self.dispatch(command)
    }

    /// Create the two pending legs of a transfer.
    pub fn request_transfer(
        &mut self,
        from: &CustodianId,
        to: &CustodianId,
        amount: Money,
    ) -> AppResult<Vec<LedgerEnvelope>> {
        self.guard(Intent::RequestTransfer)?;
        let (expense_id, income_id) = self.ids.transfer_ids();
        let command = LedgerCommand::RequestTransfer(RequestTransfer {
            from: from.clone(),
            to: to.clone(),
            amount,
            expense_id,
            income_id,
            occurred_at: self.ids.now(),
        });
        self.dispatch(command)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Users
    // ─────────────────────────────────────────────────────────────────────

    pub fn users(&self) -> AppResult<&[User]> {
        self.guard(Intent::ManageUsers)?;
        Ok(self.ledger.users())
    }

    pub fn add_user(&mut self, name: &str, role: Role) -> AppResult<Vec<LedgerEnvelope>> {
        self.guard(Intent::ManageUsers)?;
        let id: UserId = self.ids.next_id();
        let user = User {
            avatar: format!("https://i.pravatar.cc/150?u={id}"),
            id,
            name: name.trim().to_string(),
            role,
        };
        let command = LedgerCommand::AddUser(AddUser {
            user,
            occurred_at: self.ids.now(),
        });
        self.dispatch(command)
    }

    /// Remove a user other than the one logged in.
    pub fn delete_user(&mut self, user_id: &UserId) -> AppResult<Vec<LedgerEnvelope>> {
        let principal = self.guard(Intent::ManageUsers)?;
        if &principal.user_id == user_id {
            return Err(AppError::policy("cannot delete the logged-in user"));
        }
        let command = LedgerCommand::RemoveUser(RemoveUser {
            user_id: user_id.clone(),
            occurred_at: self.ids.now(),
        });
        self.dispatch(command)
    }

    // ─────────────────────────────────────────────────────────────────────

    fn logged_in(&self) -> AppResult<&LoggedIn> {
        self.current.as_ref().ok_or(AppError::NotLoggedIn)
    }

    fn principal(&self) -> AppResult<&Principal> {
        Ok(&self.logged_in()?.principal)
    }

    fn guard(&self, intent: Intent) -> AppResult<Principal> {
        let principal = self.principal()?;
        authorize_intent(principal, &intent).inspect_err(|err| {
            tracing::warn!(user_id = %principal.user_id, ?intent, error = %err, "intent refused");
        })?;
        Ok(principal.clone())
    }

    fn dispatch(&mut self, command: LedgerCommand) -> AppResult<Vec<LedgerEnvelope>> {
        Ok(self.dispatcher.dispatch(&mut self.ledger, &command)?)
    }
}
