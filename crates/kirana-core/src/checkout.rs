//! # Checkout
//!
//! The immutable checkout snapshot and the per-attempt state machine.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Checkout Attempt Lifecycle                          │
//! │                                                                         │
//! │   IDLE ──submit──► CREATING ──create ok──► CREATED                      │
//! │                       │                      │                          │
//! │                  create fails      ┌─────────┴──────────┐               │
//! │                       │     auto_fulfill=false   auto_fulfill=true      │
//! │                       ▼            │                    │               │
//! │                    FAILED          ▼                    ▼               │
//! │                           DONE_UNFULFILLED         FULFILLING           │
//! │                                                    │        │           │
//! │                                             fulfill ok  fulfill fails   │
//! │                                                    ▼        ▼           │
//! │                                      DONE_FULFILLED   DONE_CREATED_ONLY │
//! │                                                                         │
//! │  CREATING, CREATED, FULFILLING are in flight: submit is refused.       │
//! │  Every state after CREATED carries the created order.                  │
//! │  Any terminal state accepts a new submit.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! "Mark paid" is not a step: it travels as the `payment_status` of the
//! create call.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::{Cart, LineItem};
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::pricing::{self, CartTotals};
use crate::types::{CompletedOrderRef, CustomerId, PaymentStatus, ProductId, TaxRate, WarehouseId};
use crate::validation::validate_selected;

/// Shown when order creation fails without a service message.
pub const CREATE_FAILED_MESSAGE: &str = "Failed to create order";

/// Shown when fulfillment fails without a service message.
pub const FULFILL_FAILED_MESSAGE: &str = "Fulfillment failed";

// =============================================================================
// Flags
// =============================================================================

/// Cashier toggles that shape a checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutFlags {
    /// Fulfill (deduct inventory) right after the order is created.
    pub auto_fulfill: bool,
    /// Record the order as paid.
    pub mark_paid: bool,
}

impl Default for CheckoutFlags {
    fn default() -> Self {
        CheckoutFlags {
            auto_fulfill: true,
            mark_paid: true,
        }
    }
}

// =============================================================================
// Request Snapshot
// =============================================================================

/// One line as submitted to the order service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: Money,
    pub discount: Money,
    pub tax_rate: TaxRate,
    /// GST computed for this line by the pricing engine.
    pub tax_amount: Money,
}

impl From<&LineItem> for OrderLine {
    fn from(item: &LineItem) -> Self {
        OrderLine {
            product_id: item.product_id.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            discount: item.discount,
            tax_rate: item.tax_rate,
            tax_amount: pricing::line_tax(item),
        }
    }
}

/// Session state captured at the moment checkout is invoked, not yet
/// validated.
#[derive(Debug, Clone)]
pub struct CheckoutDraft {
    pub cart: Cart,
    pub customer_id: Option<CustomerId>,
    pub warehouse_id: Option<WarehouseId>,
    pub flags: CheckoutFlags,
    pub notes: String,
}

impl CheckoutDraft {
    /// Checks checkout preconditions and freezes the request.
    ///
    /// ## Preconditions (checked in this order)
    /// 1. A customer is selected
    /// 2. A warehouse is selected
    /// 3. The cart has at least one line
    /// 4. No line has a discount above its gross value
    pub fn validate(self) -> Result<CheckoutRequest, ValidationError> {
        let customer_id = validate_selected("customer", self.customer_id.as_deref())?.to_string();
        let warehouse_id = validate_selected("warehouse", self.warehouse_id.as_deref())?.to_string();

        if self.cart.is_empty() {
            return Err(ValidationError::EmptyCart);
        }

        if let Some(item) = self
            .cart
            .items()
            .iter()
            .find(|i| pricing::line_subtotal(i).is_negative())
        {
            return Err(ValidationError::DiscountExceedsLineValue {
                product_id: item.product_id.clone(),
                name: item.name.clone(),
            });
        }

        Ok(CheckoutRequest {
            customer_id,
            warehouse_id,
            lines: self.cart.items().iter().map(OrderLine::from).collect(),
            order_discount: self.cart.order_discount(),
            payment_status: PaymentStatus::from_mark_paid(self.flags.mark_paid),
            auto_fulfill: self.flags.auto_fulfill,
            notes: self.notes,
            totals: CartTotals::from(&self.cart),
        })
    }
}

/// A validated, immutable checkout request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub customer_id: CustomerId,
    pub warehouse_id: WarehouseId,
    pub lines: Vec<OrderLine>,
    pub order_discount: Money,
    pub payment_status: PaymentStatus,
    pub auto_fulfill: bool,
    pub notes: String,
    /// Totals as shown to the cashier when checkout was pressed.
    pub totals: CartTotals,
}

// =============================================================================
// Phase & Events
// =============================================================================

/// Where a checkout attempt currently stands.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "state", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckoutPhase {
    #[default]
    Idle,
    Creating {
        auto_fulfill: bool,
    },
    Created {
        order: CompletedOrderRef,
        auto_fulfill: bool,
    },
    Fulfilling {
        order: CompletedOrderRef,
    },
    Failed {
        message: String,
    },
    DoneUnfulfilled {
        order: CompletedOrderRef,
    },
    DoneFulfilled {
        order: CompletedOrderRef,
    },
    DoneCreatedOnly {
        order: CompletedOrderRef,
        message: String,
    },
}

/// Something that happened to a checkout attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutEvent {
    Submit { auto_fulfill: bool },
    CreateSucceeded { order: CompletedOrderRef },
    CreateFailed { message: String },
    /// Move on from CREATED to fulfillment or completion.
    Continue,
    FulfillSucceeded,
    FulfillFailed { message: String },
}

impl CheckoutEvent {
    fn label(&self) -> &'static str {
        match self {
            CheckoutEvent::Submit { .. } => "submit",
            CheckoutEvent::CreateSucceeded { .. } => "create succeeded",
            CheckoutEvent::CreateFailed { .. } => "create failed",
            CheckoutEvent::Continue => "continue",
            CheckoutEvent::FulfillSucceeded => "fulfill succeeded",
            CheckoutEvent::FulfillFailed { .. } => "fulfill failed",
        }
    }
}

impl CheckoutPhase {
    /// Applies an event, returning the next phase.
    ///
    /// ## Errors
    /// `CoreError::InvalidCheckoutTransition` for any event the current
    /// phase does not accept, including a submit while in flight.
    pub fn transition(self, event: CheckoutEvent) -> CoreResult<CheckoutPhase> {
        use CheckoutEvent as E;
        use CheckoutPhase as P;

        match (self, event) {
            (phase, E::Submit { auto_fulfill }) if !phase.is_in_flight() => {
                Ok(P::Creating { auto_fulfill })
            }
            (P::Creating { auto_fulfill }, E::CreateSucceeded { order }) => {
                Ok(P::Created { order, auto_fulfill })
            }
            (P::Creating { .. }, E::CreateFailed { message }) => Ok(P::Failed { message }),
            (P::Created { order, auto_fulfill: true }, E::Continue) => Ok(P::Fulfilling { order }),
            (P::Created { order, auto_fulfill: false }, E::Continue) => {
                Ok(P::DoneUnfulfilled { order })
            }
            (P::Fulfilling { mut order }, E::FulfillSucceeded) => {
                order.fulfilled = true;
                Ok(P::DoneFulfilled { order })
            }
            (P::Fulfilling { order }, E::FulfillFailed { message }) => {
                Ok(P::DoneCreatedOnly { order, message })
            }
            (phase, event) => Err(CoreError::InvalidCheckoutTransition {
                phase: phase.label().to_string(),
                event: event.label().to_string(),
            }),
        }
    }

    /// True while a network step is running or about to run.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            CheckoutPhase::Creating { .. } | CheckoutPhase::Created { .. } | CheckoutPhase::Fulfilling { .. }
        )
    }

    /// True once the attempt has finished, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CheckoutPhase::Failed { .. }
                | CheckoutPhase::DoneUnfulfilled { .. }
                | CheckoutPhase::DoneFulfilled { .. }
                | CheckoutPhase::DoneCreatedOnly { .. }
        )
    }

    /// The created order, in every phase after a successful create.
    pub fn order(&self) -> Option<&CompletedOrderRef> {
        match self {
            CheckoutPhase::Created { order, .. }
            | CheckoutPhase::Fulfilling { order }
            | CheckoutPhase::DoneUnfulfilled { order }
            | CheckoutPhase::DoneFulfilled { order }
            | CheckoutPhase::DoneCreatedOnly { order, .. } => Some(order),
            CheckoutPhase::Idle | CheckoutPhase::Creating { .. } | CheckoutPhase::Failed { .. } => {
                None
            }
        }
    }

    /// Short name for logs and error messages.
    pub fn label(&self) -> &'static str {
        match self {
            CheckoutPhase::Idle => "idle",
            CheckoutPhase::Creating { .. } => "creating",
            CheckoutPhase::Created { .. } => "created",
            CheckoutPhase::Fulfilling { .. } => "fulfilling",
            CheckoutPhase::Failed { .. } => "failed",
            CheckoutPhase::DoneUnfulfilled { .. } => "done_unfulfilled",
            CheckoutPhase::DoneFulfilled { .. } => "done_fulfilled",
            CheckoutPhase::DoneCreatedOnly { .. } => "done_created_only",
        }
    }
}

// =============================================================================
// Outcome
// =============================================================================

/// Result of an attempt that created an order.
///
/// Only the three `Done*` phases produce an outcome. A failed create is an
/// error, not an outcome, and leaves session state untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutOutcome {
    pub order: CompletedOrderRef,
    pub phase: CheckoutPhase,
}

impl CheckoutOutcome {
    /// Builds an outcome from a finished phase that carries an order.
    pub fn from_phase(phase: CheckoutPhase) -> Option<Self> {
        match &phase {
            CheckoutPhase::DoneUnfulfilled { order }
            | CheckoutPhase::DoneFulfilled { order }
            | CheckoutPhase::DoneCreatedOnly { order, .. } => Some(CheckoutOutcome {
                order: order.clone(),
                phase,
            }),
            _ => None,
        }
    }

    /// True when inventory was deducted.
    pub fn is_fulfilled(&self) -> bool {
        matches!(self.phase, CheckoutPhase::DoneFulfilled { .. })
    }

    /// True when the order must be fulfilled by hand from the sales screen.
    pub fn needs_manual_fulfillment(&self) -> bool {
        matches!(self.phase, CheckoutPhase::DoneCreatedOnly { .. })
    }

    /// Message shown to the cashier.
    pub fn message(&self) -> String {
        match &self.phase {
            CheckoutPhase::DoneFulfilled { .. } => {
                "Sale completed and fulfilled! Inventory deducted.".to_string()
            }
            CheckoutPhase::DoneCreatedOnly { message, .. } => format!(
                "Order created but fulfillment failed ({}). Complete it from the Sales page.",
                message
            ),
            _ => "Order created! Fulfill it from the Sales page to deduct inventory.".to_string(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Product;

    fn order() -> CompletedOrderRef {
        CompletedOrderRef::new("o-1", Some("SO-0001".to_string()), Money::from_major(100))
    }

    fn draft() -> CheckoutDraft {
        let mut cart = Cart::new();
        cart.add_product(
            &Product {
                id: "p-1".to_string(),
                name: "Sugar 1kg".to_string(),
                sku: None,
                barcode: None,
                selling_price: Money::from_major(100),
                tax_rate: None,
            },
            2,
        )
        .unwrap();
        cart.set_discount("p-1", Money::from_major(10)).unwrap();
        cart.set_order_discount(Money::from_major(20)).unwrap();

        CheckoutDraft {
            cart,
            customer_id: Some("c-1".to_string()),
            warehouse_id: Some("w-1".to_string()),
            flags: CheckoutFlags::default(),
            notes: "POS Order".to_string(),
        }
    }

    #[test]
    fn test_validate_builds_request() {
        let request = draft().validate().unwrap();

        assert_eq!(request.customer_id, "c-1");
        assert_eq!(request.warehouse_id, "w-1");
        assert_eq!(request.payment_status, PaymentStatus::Paid);
        assert!(request.auto_fulfill);
        assert_eq!(request.order_discount, Money::from_major(20));
        assert_eq!(request.lines.len(), 1);
        assert_eq!(request.lines[0].tax_amount, Money::from_minor(3420));
        assert_eq!(request.lines[0].tax_rate, TaxRate::from_percent(18));
        assert_eq!(request.totals.total, Money::from_minor(20420));
    }

    #[test]
    fn test_validate_requires_customer() {
        let mut d = draft();
        d.customer_id = None;
        assert_eq!(
            d.validate(),
            Err(ValidationError::Required {
                field: "customer".to_string()
            })
        );
    }

    #[test]
    fn test_validate_requires_warehouse() {
        let mut d = draft();
        d.warehouse_id = Some("  ".to_string());
        assert!(matches!(d.validate(), Err(ValidationError::Required { field }) if field == "warehouse"));
    }

    #[test]
    fn test_validate_rejects_empty_cart() {
        let mut d = draft();
        d.cart.clear();
        assert_eq!(d.validate(), Err(ValidationError::EmptyCart));
    }

    #[test]
    fn test_validate_rejects_negative_line() {
        let mut d = draft();
        d.cart.set_discount("p-1", Money::from_major(500)).unwrap();
        assert!(matches!(
            d.validate(),
            Err(ValidationError::DiscountExceedsLineValue { product_id, .. }) if product_id == "p-1"
        ));
    }

    #[test]
    fn test_mark_paid_off_sends_unpaid() {
        let mut d = draft();
        d.flags.mark_paid = false;
        assert_eq!(d.validate().unwrap().payment_status, PaymentStatus::Unpaid);
    }

    #[test]
    fn test_happy_path_with_fulfillment() {
        let phase = CheckoutPhase::Idle
            .transition(CheckoutEvent::Submit { auto_fulfill: true })
            .unwrap();
        assert!(phase.is_in_flight());

        let phase = phase
            .transition(CheckoutEvent::CreateSucceeded { order: order() })
            .unwrap();
        assert_eq!(phase.order().map(|o| o.order_id.as_str()), Some("o-1"));

        let phase = phase.transition(CheckoutEvent::Continue).unwrap();
        assert_eq!(phase.label(), "fulfilling");

        let phase = phase.transition(CheckoutEvent::FulfillSucceeded).unwrap();
        assert!(phase.is_terminal());
        assert!(phase.order().unwrap().fulfilled);
    }

    #[test]
    fn test_without_auto_fulfill_skips_fulfilling() {
        let phase = CheckoutPhase::Idle
            .transition(CheckoutEvent::Submit { auto_fulfill: false })
            .and_then(|p| p.transition(CheckoutEvent::CreateSucceeded { order: order() }))
            .and_then(|p| p.transition(CheckoutEvent::Continue))
            .unwrap();

        assert!(matches!(phase, CheckoutPhase::DoneUnfulfilled { .. }));
        assert!(!phase.order().unwrap().fulfilled);
    }

    #[test]
    fn test_fulfill_failure_keeps_order_unfulfilled() {
        let phase = CheckoutPhase::Idle
            .transition(CheckoutEvent::Submit { auto_fulfill: true })
            .and_then(|p| p.transition(CheckoutEvent::CreateSucceeded { order: order() }))
            .and_then(|p| p.transition(CheckoutEvent::Continue))
            .and_then(|p| {
                p.transition(CheckoutEvent::FulfillFailed {
                    message: "Insufficient stock".to_string(),
                })
            })
            .unwrap();

        assert_eq!(phase.label(), "done_created_only");
        assert!(!phase.order().unwrap().fulfilled);

        let outcome = CheckoutOutcome::from_phase(phase).unwrap();
        assert!(outcome.needs_manual_fulfillment());
        assert!(!outcome.is_fulfilled());
        assert!(outcome.message().contains("Insufficient stock"));
    }

    #[test]
    fn test_create_failure() {
        let phase = CheckoutPhase::Idle
            .transition(CheckoutEvent::Submit { auto_fulfill: true })
            .and_then(|p| {
                p.transition(CheckoutEvent::CreateFailed {
                    message: CREATE_FAILED_MESSAGE.to_string(),
                })
            })
            .unwrap();

        assert!(phase.is_terminal());
        assert!(phase.order().is_none());
        assert!(CheckoutOutcome::from_phase(phase).is_none());
    }

    #[test]
    fn test_submit_refused_while_in_flight() {
        let creating = CheckoutPhase::Creating { auto_fulfill: true };
        let err = creating
            .transition(CheckoutEvent::Submit { auto_fulfill: true })
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidCheckoutTransition { .. }));

        let fulfilling = CheckoutPhase::Fulfilling { order: order() };
        assert!(fulfilling
            .transition(CheckoutEvent::Submit { auto_fulfill: false })
            .is_err());
    }

    #[test]
    fn test_terminal_phase_accepts_new_submit() {
        let done = CheckoutPhase::DoneFulfilled { order: order() };
        let next = done
            .transition(CheckoutEvent::Submit { auto_fulfill: false })
            .unwrap();
        assert_eq!(next, CheckoutPhase::Creating { auto_fulfill: false });
    }

    #[test]
    fn test_out_of_order_events_rejected() {
        assert!(CheckoutPhase::Idle
            .transition(CheckoutEvent::FulfillSucceeded)
            .is_err());
        assert!(CheckoutPhase::Creating { auto_fulfill: true }
            .transition(CheckoutEvent::Continue)
            .is_err());
    }

    #[test]
    fn test_outcome_messages() {
        let fulfilled = CheckoutOutcome::from_phase(CheckoutPhase::DoneFulfilled { order: order() }).unwrap();
        assert_eq!(
            fulfilled.message(),
            "Sale completed and fulfilled! Inventory deducted."
        );

        let unfulfilled = CheckoutOutcome::from_phase(CheckoutPhase::DoneUnfulfilled { order: order() }).unwrap();
        assert!(unfulfilled.message().starts_with("Order created!"));
        assert!(!unfulfilled.needs_manual_fulfillment());
    }

    #[test]
    fn test_phase_serializes_tagged() {
        let json = serde_json::to_value(CheckoutPhase::Creating { auto_fulfill: true }).unwrap();
        assert_eq!(json["state"], "CREATING");
        assert_eq!(json["auto_fulfill"], true);
    }
}
