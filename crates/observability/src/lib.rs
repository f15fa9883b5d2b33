//! Tracing and logging setup shared by the binary and tests.

/// Subscriber configuration (filters, output format).
pub mod subscriber;

pub use subscriber::{DEFAULT_FILTER, LogFormat, UnknownLogFormat};

/// Initialize process-wide tracing with the given output format.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init_with(format: LogFormat) {
    subscriber::init(format);
}
