//! Per-order fan-out: map, claim, build, submit — one outcome per item.
//!
//! Line items are independent units of work. A missing mapping, a duplicate
//! claim, or a provider rejection affects only its own item; the others are
//! still attempted and the caller acknowledges the webhook either way. The
//! collected [`OrderReport`] is the structured record of what happened — the
//! HTTP response deliberately carries none of it.

use std::sync::Arc;

use serde::Serialize;

use easel_printful::PrintfulClient;

use crate::event::{LineItem, OrderEvent};
use crate::ledger::SubmissionLedger;
use crate::mapper::VariantMapper;
use crate::submit::build_fulfillment_order;

/// Outcome of one actionable line item.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemStatus {
    Submitted { provider_order_id: i64 },
    MappingNotFound,
    Duplicate,
    SubmissionFailed { message: String },
}

#[derive(Debug, Serialize)]
pub struct ItemOutcome {
    pub line_item_id: i64,
    pub variant_id: Option<String>,
    #[serde(flatten)]
    pub status: ItemStatus,
}

/// Everything that happened while processing one order event.
#[derive(Debug, Serialize)]
pub struct OrderReport {
    pub order_id: i64,
    pub line_items: usize,
    pub actionable_items: usize,
    pub outcomes: Vec<ItemOutcome>,
}

impl OrderReport {
    /// Number of items that reached the provider successfully.
    #[must_use]
    pub fn submitted(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, ItemStatus::Submitted { .. }))
            .count()
    }
}

/// Wires the mapper, the ledger, and the provider client into the per-order
/// processing flow.
pub struct FulfillmentPipeline {
    mapper: Arc<VariantMapper>,
    printful: Arc<PrintfulClient>,
    ledger: Arc<SubmissionLedger>,
}

impl FulfillmentPipeline {
    #[must_use]
    pub fn new(
        mapper: Arc<VariantMapper>,
        printful: Arc<PrintfulClient>,
        ledger: Arc<SubmissionLedger>,
    ) -> Self {
        Self {
            mapper,
            printful,
            ledger,
        }
    }

    /// Attempts every actionable line item of `event` and reports per-item
    /// outcomes. Never fails as a whole: errors below this level are values
    /// in the report.
    pub async fn process_order(&self, event: &OrderEvent) -> OrderReport {
        let actionable = event.actionable_items();
        let mut outcomes = Vec::with_capacity(actionable.len());

        for actionable_item in &actionable {
            let item = actionable_item.item;
            let status = self
                .process_item(event, actionable_item.artwork_url, actionable_item.email, item)
                .await;

            match &status {
                ItemStatus::Submitted { provider_order_id } => {
                    tracing::info!(
                        order_id = event.id,
                        line_item_id = item.id,
                        provider_order_id,
                        "fulfillment order submitted"
                    );
                }
                ItemStatus::MappingNotFound => {
                    tracing::warn!(
                        order_id = event.id,
                        line_item_id = item.id,
                        variant_id = item.variant_id.as_deref().unwrap_or("<none>"),
                        "no provider mapping for variant; item skipped"
                    );
                }
                ItemStatus::Duplicate => {
                    tracing::warn!(
                        order_id = event.id,
                        line_item_id = item.id,
                        "item already submitted; duplicate delivery skipped"
                    );
                }
                ItemStatus::SubmissionFailed { message } => {
                    tracing::error!(
                        order_id = event.id,
                        line_item_id = item.id,
                        error = %message,
                        "fulfillment submission failed; item skipped"
                    );
                }
            }

            outcomes.push(ItemOutcome {
                line_item_id: item.id,
                variant_id: item.variant_id.clone(),
                status,
            });
        }

        OrderReport {
            order_id: event.id,
            line_items: event.line_items.len(),
            actionable_items: actionable.len(),
            outcomes,
        }
    }

    async fn process_item(
        &self,
        event: &OrderEvent,
        artwork_url: &str,
        email: Option<&str>,
        item: &LineItem,
    ) -> ItemStatus {
        let Some(variant_id) = item.variant_id.as_deref() else {
            return ItemStatus::MappingNotFound;
        };

        let Some(sync_variant_id) = self.mapper.resolve(variant_id).await else {
            return ItemStatus::MappingNotFound;
        };

        if !self.ledger.try_claim(event.id, item.id) {
            return ItemStatus::Duplicate;
        }

        let order = match build_fulfillment_order(event, item, artwork_url, email, sync_variant_id)
        {
            Ok(order) => order,
            Err(e) => {
                self.ledger.release(event.id, item.id);
                return ItemStatus::SubmissionFailed {
                    message: e.to_string(),
                };
            }
        };

        match self.printful.create_order(&order).await {
            Ok(provider_order_id) => ItemStatus::Submitted { provider_order_id },
            Err(e) => {
                // Release so an explicit re-delivery can retry this item.
                self.ledger.release(event.id, item.id);
                ItemStatus::SubmissionFailed {
                    message: e.to_string(),
                }
            }
        }
    }
}
