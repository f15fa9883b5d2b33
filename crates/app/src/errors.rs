use thiserror::Error;

use cashguard_auth::{AuthzError, Role};
use cashguard_core::{DomainError, UserId};

use crate::dispatcher::DispatchError;
use crate::navigation::View;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("no user is logged in")]
    NotLoggedIn,

    #[error("unknown user: {0}")]
    UnknownUser(UserId),

    #[error(transparent)]
    Forbidden(#[from] AuthzError),

    #[error("view {view} is not available to role {role}")]
    ViewNotAvailable { view: View, role: Role },

    /// Refused by an application rule rather than by the ledger.
    #[error("not allowed: {0}")]
    Policy(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("event publication failed: {0}")]
    Publish(String),
}

impl AppError {
    pub fn policy(msg: impl Into<String>) -> Self {
        Self::Policy(msg.into())
    }
}

impl From<DispatchError> for AppError {
    fn from(value: DispatchError) -> Self {
        match value {
            DispatchError::Domain(err) => AppError::Domain(err),
            DispatchError::Publish(msg) => AppError::Publish(msg),
        }
    }
}
