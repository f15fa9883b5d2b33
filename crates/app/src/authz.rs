//! Authorization guard for intents.
//!
//! This enforces authorization at the intent boundary (before dispatch),
//! keeping the ledger caller-agnostic.

use cashguard_auth::{AuthzError, CommandAuthorization, Principal, authorize};

/// Check every permission an intent requires.
///
/// Call this **before** building and dispatching the ledger command.
pub fn authorize_intent<C: CommandAuthorization>(
    principal: &Principal,
    intent: &C,
) -> Result<(), AuthzError> {
    for perm in intent.required_permissions() {
        authorize(principal, &perm)?;
    }

    Ok(())
}
