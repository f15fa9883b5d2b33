//! Command execution pipeline.
//!
//! ```text
//! LedgerCommand
//!   ↓
//! 1. Ledger::handle (pure decision, produces events)
//!   ↓
//! 2. Ledger::apply (every event, in order)
//!   ↓
//! 3. Wrap in envelopes (sequence = ledger version after the event)
//!   ↓
//! 4. Publish to the bus
//! ```
//!
//! A refused command applies nothing. Missing references and settling an
//! already paid invoice are ignored with a warning unless
//! `strict_references` is set; validation failures always reach the caller.

use thiserror::Error;

use cashguard_core::{AggregateRoot, DomainError};
use cashguard_custody::{Invoice, Ledger, LedgerCommand, LedgerEvent};
use cashguard_events::{EventBus, EventEnvelope, Subscription, execute};

pub type LedgerEnvelope = EventEnvelope<LedgerEvent>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Publication failed after the events were applied.
    #[error("event publication failed: {0}")]
    Publish(String),
}

#[derive(Debug)]
pub struct Dispatcher<B> {
    bus: B,
    strict_references: bool,
}

impl<B> Dispatcher<B> {
    pub fn new(bus: B, strict_references: bool) -> Self {
        Self {
            bus,
            strict_references,
        }
    }
}

impl<B> Dispatcher<B>
where
    B: EventBus<LedgerEnvelope>,
{
    pub fn subscribe(&self) -> Subscription<LedgerEnvelope> {
        self.bus.subscribe()
    }

    /// Execute one command against the ledger and publish what happened.
    ///
    /// Returns the published envelopes; an ignored command returns none.
    pub fn dispatch(
        &self,
        ledger: &mut Ledger,
        command: &LedgerCommand,
    ) -> Result<Vec<LedgerEnvelope>, DispatchError> {
        let base_version = ledger.version();

        let events = match execute(ledger, command) {
            Ok(events) => events,
            Err(err) if !self.strict_references && is_ignorable(ledger, command, &err) => {
                tracing::warn!(
                    command = command.name(),
                    error = %err,
                    "command ignored"
                );
                return Ok(Vec::new());
            }
            Err(err) => {
                tracing::info!(command = command.name(), error = %err, "command refused");
                return Err(err.into());
            }
        };

        let ledger_id = *ledger.id();
        let envelopes: Vec<LedgerEnvelope> = events
            .into_iter()
            .zip(base_version + 1..)
            .map(|(event, seq)| EventEnvelope::wrap(ledger_id, seq, event))
            .collect();

        for envelope in &envelopes {
            tracing::info!(
                event_type = envelope.event_type(),
                sequence = envelope.sequence_number(),
                "event applied"
            );
            self.bus.publish(envelope.clone()).map_err(|e| {
                tracing::error!(error = ?e, "event publication failed");
                DispatchError::Publish(format!("{e:?}"))
            })?;
        }

        Ok(envelopes)
    }
}

/// Refusals that the ledger treats as "nothing to do".
fn is_ignorable(ledger: &Ledger, command: &LedgerCommand, err: &DomainError) -> bool {
    match (err, command) {
        (DomainError::NotFound { .. }, _) => true,
        (DomainError::Conflict(_), LedgerCommand::SettleInvoice(cmd)) => {
            ledger.invoice(&cmd.invoice_id).is_some_and(Invoice::is_paid)
        }
        _ => false,
    }
}
