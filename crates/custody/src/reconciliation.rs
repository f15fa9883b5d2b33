//! Stored vs derived balances.
//!
//! A custodian's stored balance is a running total. The derived balance is
//! recomputed from its validated transactions. They agree until something
//! outside the normal flow happens, such as deleting a validated transaction
//! or rejecting one after it was validated.

use serde::{Deserialize, Serialize};

use cashguard_core::{CustodianId, Money, TransactionId};

use crate::ledger::Ledger;
use crate::transaction::Transaction;

/// Sum of the effects of the custodian's validated transactions.
pub fn derived_balance(ledger: &Ledger, custodian_id: &CustodianId) -> Money {
    ledger
        .transactions_of(custodian_id)
        .map(Transaction::validated_effect)
        .sum()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceDrift {
    pub custodian_id: CustodianId,
    pub name: String,
    pub stored: Money,
    pub derived: Money,
    /// `stored - derived`.
    pub drift: Money,
}

impl BalanceDrift {
    pub fn is_balanced(&self) -> bool {
        self.drift.is_zero()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReport {
    /// One entry per custodian, in ledger order.
    pub entries: Vec<BalanceDrift>,
    /// Validated transactions whose custodian no longer exists.
    pub orphaned: Vec<TransactionId>,
}

impl ReconciliationReport {
    pub fn for_ledger(ledger: &Ledger) -> Self {
        let entries = ledger
            .custodians()
            .iter()
            .map(|c| {
                let derived = derived_balance(ledger, &c.id);
                BalanceDrift {
                    custodian_id: c.id.clone(),
                    name: c.name.clone(),
                    stored: c.balance,
                    derived,
                    drift: c.balance.saturating_sub(derived),
                }
            })
            .collect();

        let orphaned = ledger
            .transactions()
            .iter()
            .filter(|t| t.is_validated() && ledger.custodian(&t.custodian_id).is_none())
            .map(|t| t.id.clone())
            .collect();

        Self { entries, orphaned }
    }

    pub fn is_balanced(&self) -> bool {
        self.entries.iter().all(BalanceDrift::is_balanced)
    }

    pub fn drifted(&self) -> impl Iterator<Item = &BalanceDrift> + '_ {
        self.entries.iter().filter(|e| !e.is_balanced())
    }

    pub fn total_drift(&self) -> Money {
        self.entries.iter().map(|e| e.drift).sum()
    }
}
