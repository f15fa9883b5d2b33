use serde::{Deserialize, Serialize};

use cashguard_core::{CustodianId, Entity, Money};

/// Display name used when a record points at a custodian that no longer exists.
pub const UNKNOWN_CUSTODIAN: &str = "Desconocido";

/// A person or account holding cash.
///
/// `balance` is a stored running total. It is adjusted by settlements and
/// validations, never recomputed from history (see [`crate::reconciliation`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Custodian {
    pub id: CustodianId,
    pub name: String,
    pub balance: Money,
}

impl Custodian {
    /// New custodians always start at zero.
    pub fn new(id: CustodianId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            balance: Money::ZERO,
        }
    }
}

impl Entity for Custodian {
    type Id = CustodianId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
