//! # POS Session
//!
//! The state a POS screen owns between checkouts: the cart, the selected
//! customer and warehouse, the checkout toggles, and the last created order.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Session ⇄ Checkout                                  │
//! │                                                                         │
//! │  PosSession ──begin_checkout()──► CheckoutDraft ──► orchestrator        │
//! │      ▲                                                  │               │
//! │      │                                                  │               │
//! │      └──────────── apply_outcome(&CheckoutOutcome) ◄────┘               │
//! │                                                                         │
//! │  Outcome present (order created):                                      │
//! │    • cart cleared, customer cleared                                    │
//! │    • completed_order = outcome.order                                   │
//! │  Create failed: apply_outcome is never called, nothing changes         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::Cart;
use crate::checkout::{CheckoutDraft, CheckoutFlags, CheckoutOutcome};
use crate::pricing::CartTotals;
use crate::types::{CompletedOrderRef, CustomerId, WarehouseId};

/// Explicit session state for one POS screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PosSession {
    pub cart: Cart,
    pub customer_id: Option<CustomerId>,
    /// Kept across checkouts; a till usually draws from one warehouse.
    pub warehouse_id: Option<WarehouseId>,
    pub flags: CheckoutFlags,
    pub completed_order: Option<CompletedOrderRef>,
}

impl PosSession {
    /// Creates an empty session.
    pub fn new(warehouse_id: Option<WarehouseId>, flags: CheckoutFlags) -> Self {
        PosSession {
            warehouse_id,
            flags,
            ..Default::default()
        }
    }

    /// Current totals for the cart.
    pub fn totals(&self) -> CartTotals {
        CartTotals::from(&self.cart)
    }

    pub fn select_customer(&mut self, customer_id: impl Into<CustomerId>) {
        self.customer_id = Some(customer_id.into());
    }

    pub fn select_warehouse(&mut self, warehouse_id: impl Into<WarehouseId>) {
        self.warehouse_id = Some(warehouse_id.into());
    }

    /// Snapshots the session for a checkout attempt.
    ///
    /// The previous completed order stays until an attempt creates a new
    /// one, so a refused submit keeps the invoice prompt open.
    pub fn begin_checkout(&self, notes: impl Into<String>) -> CheckoutDraft {
        CheckoutDraft {
            cart: self.cart.clone(),
            customer_id: self.customer_id.clone(),
            warehouse_id: self.warehouse_id.clone(),
            flags: self.flags,
            notes: notes.into(),
        }
    }

    /// Reconciles the session with an attempt that created an order.
    ///
    /// Applies to every outcome, including a failed fulfillment: the order
    /// exists on the service, so the cart must not be submitted again.
    pub fn apply_outcome(&mut self, outcome: &CheckoutOutcome) {
        self.cart.clear();
        self.customer_id = None;
        self.completed_order = Some(outcome.order.clone());
    }

    /// Forgets the completed order (the cashier closed the invoice prompt).
    pub fn dismiss_completed_order(&mut self) -> Option<CompletedOrderRef> {
        self.completed_order.take()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
