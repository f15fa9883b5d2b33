//! Event mechanics: the `Event` contract, envelopes, and the in-process bus.
//!
//! Domain crates define their own event enums; this crate only knows how to
//! number, wrap and fan them out.

pub mod bus;
pub mod envelope;
pub mod event;
pub mod handler;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use envelope::EventEnvelope;
pub use event::Event;
pub use handler::execute;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
