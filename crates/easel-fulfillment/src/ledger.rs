//! In-process ledger of already-submitted (order, line item) pairs.
//!
//! One provider call is made per line item, but the webhook sender re-delivers
//! whole orders — without a guard, a re-delivery would re-submit items that
//! already succeeded. A pair is claimed before submission and released again
//! if the submission fails, so a later re-delivery can retry exactly the items
//! that never went through.
//!
//! The ledger is process-local: it covers the common re-delivery window but
//! not restarts. The per-pair `external_id` on the provider order is the
//! durable second line of defense for operators investigating duplicates.

use std::collections::HashSet;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct SubmissionLedger {
    submitted: Mutex<HashSet<(i64, i64)>>,
}

impl SubmissionLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the pair for submission. Returns `false` if it was already
    /// claimed — the caller must treat that as a duplicate and skip the
    /// provider call.
    pub fn try_claim(&self, order_id: i64, line_item_id: i64) -> bool {
        self.submitted
            .lock()
            .expect("submission ledger lock poisoned")
            .insert((order_id, line_item_id))
    }

    /// Releases a claim after a failed submission so a re-delivery can retry.
    pub fn release(&self, order_id: i64, line_item_id: i64) {
        self.submitted
            .lock()
            .expect("submission ledger lock poisoned")
            .remove(&(order_id, line_item_id));
    }

    /// Whether the pair has a standing claim.
    #[must_use]
    pub fn contains(&self, order_id: i64, line_item_id: i64) -> bool {
        self.submitted
            .lock()
            .expect("submission ledger lock poisoned")
            .contains(&(order_id, line_item_id))
    }
}
