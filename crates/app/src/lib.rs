//! Application boundary for the custody ledger.
//!
//! ```text
//! Session intent → authorize → LedgerCommand → Dispatcher
//!     → Ledger::handle / Ledger::apply → EventBus::publish
//! ```
//!
//! The ledger itself has no notion of who is calling; everything about users,
//! roles, views and the "missing reference is a no-op" policy lives here.

pub mod authz;
pub mod config;
pub mod dispatcher;
pub mod errors;
pub mod ids;
pub mod intent;
pub mod navigation;
pub mod session;

pub use config::{AppConfig, ConfigError, SeedProfile};
pub use dispatcher::{DispatchError, Dispatcher, LedgerEnvelope};
pub use errors::AppError;
pub use ids::IdGenerator;
pub use intent::Intent;
pub use navigation::{View, default_view, navigation};
pub use session::Session;
