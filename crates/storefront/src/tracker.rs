//! Last-write-wins tracking of in-flight cart totals.
//!
//! Every cart change starts a new computation. Results are published in
//! issuance order: a result is only accepted if no newer computation has
//! been started since, so a slow, stale computation can never overwrite the
//! totals for the cart the customer is looking at now.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::debug;

use crate::totals::CartTotals;

/// Issuance number of one computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.0
    }
}

/// Holds the latest accepted result and rejects stale ones.
#[derive(Debug)]
pub struct TotalsTracker<T = CartTotals> {
    issued: AtomicU64,
    latest: watch::Sender<Option<T>>,
}

impl<T> Default for TotalsTracker<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TotalsTracker<T> {
    /// Create a tracker with no result yet.
    #[must_use]
    pub fn new() -> Self {
        let (latest, _) = watch::channel(None);
        Self {
            issued: AtomicU64::new(0),
            latest,
        }
    }

    /// Start a computation. Any earlier ticket becomes stale.
    pub fn begin(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether `ticket` is still the most recently issued one.
    #[must_use]
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket.0
    }

    /// Publish a result. Returns `false` (and drops the value) if a newer
    /// computation has started since `ticket` was issued.
    pub fn publish(&self, ticket: Ticket, value: T) -> bool {
        let accepted = self.latest.send_if_modified(|slot| {
            if self.is_current(ticket) {
                *slot = Some(value);
                true
            } else {
                false
            }
        });
        if !accepted {
            debug!(ticket = ticket.0, "discarding stale totals");
        }
        accepted
    }

    /// Clear the shown result after the current computation failed, so
    /// totals for an older cart are not mistaken for the current ones.
    pub fn fail(&self, ticket: Ticket) -> bool {
        self.latest.send_if_modified(|slot| {
            if self.is_current(ticket) && slot.is_some() {
                *slot = None;
                true
            } else {
                false
            }
        })
    }

    /// Watch accepted results.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<T>> {
        self.latest.subscribe()
    }
}

impl<T: Clone> TotalsTracker<T> {
    /// The latest accepted result, if any.
    #[must_use]
    pub fn latest(&self) -> Option<T> {
        self.latest.borrow().clone()
    }

    /// Run a computation under a fresh ticket and publish its outcome.
    ///
    /// Returns `Ok(Some(value))` if the result was accepted and `Ok(None)` if
    /// it was stale.
    ///
    /// # Errors
    ///
    /// Returns the computation's error unchanged (after clearing the shown
    /// result if the failed computation was the current one).
    pub async fn track<F, E>(&self, computation: F) -> Result<Option<T>, E>
    where
        F: Future<Output = Result<T, E>>,
    {
        let ticket = self.begin();
        match computation.await {
            Ok(value) => Ok(self.publish(ticket, value.clone()).then_some(value)),
            Err(err) => {
                self.fail(ticket);
                Err(err)
            }
        }
    }
}
