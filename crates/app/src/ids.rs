//! Clock-derived record identifiers.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};

use cashguard_core::{Clock, TransactionId};

/// Hands out millisecond-timestamp ids.
///
/// Ids are strictly increasing: a request in the same millisecond as the
/// previous one (or after the clock stepped back) gets `last + 1`.
pub struct IdGenerator {
    clock: Arc<dyn Clock>,
    last: AtomicI64,
}

impl IdGenerator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            last: AtomicI64::new(i64::MIN),
        }
    }

    /// Business time for commands.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Next unique millisecond stamp.
    pub fn next_millis(&self) -> i64 {
        let now = self.clock.now().timestamp_millis();
        let mut last = self.last.load(Ordering::SeqCst);
        loop {
            let next = now.max(last.saturating_add(1));
            match self
                .last
                .compare_exchange(last, next, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return next,
                Err(seen) => last = seen,
            }
        }
    }

    /// A fresh id for any string-backed identifier.
    pub fn next_id<I: From<String>>(&self) -> I {
        I::from(self.next_millis().to_string())
    }

    /// Expense and income leg ids for one transfer: `tx-<ms>-1`, `tx-<ms>-2`.
    pub fn transfer_ids(&self) -> (TransactionId, TransactionId) {
        let stamp = self.next_millis();
        (
            TransactionId::new(format!("tx-{stamp}-1")),
            TransactionId::new(format!("tx-{stamp}-2")),
        )
    }
}

impl core::fmt::Debug for IdGenerator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IdGenerator")
            .field("last", &self.last.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}
