//! `cashguard-auth`: role-based authorization boundary.
//!
//! There is no authentication: a user is picked from a list. This crate only
//! answers "may this role do that", and it stays outside the ledger.

pub mod authorize;
pub mod permissions;
pub mod principal;
pub mod roles;

pub use authorize::{AuthzError, CommandAuthorization, authorize, permissions_for_role, role_has};
pub use permissions::Permission;
pub use principal::Principal;
pub use roles::Role;
