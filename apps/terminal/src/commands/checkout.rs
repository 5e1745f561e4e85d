//! # Checkout Commands
//!
//! Customer / warehouse selection, checkout toggles, and the checkout itself.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Checkout Command                                 │
//! │                                                                         │
//! │  1. begin_checkout()  snapshot cart + customer + warehouse + flags     │
//! │  2. submit(draft)     validate → create → (fulfill)                    │
//! │  3. Ok(outcome)  ───► apply_outcome: clear cart + customer, keep ref   │
//! │     Err(..)      ───► session untouched, cashier sees the message      │
//! │                                                                         │
//! │  The session lock is released before step 2 and re-taken for step 3,  │
//! │  so the cart can still be viewed while the order service responds.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use kirana_client::OrderService;
use kirana_core::{CheckoutFlags, CompletedOrderRef, Money};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::state::{CheckoutState, SessionState};

/// Who and where the next order is for, plus the checkout toggles.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub customer_id: Option<String>,
    pub warehouse_id: Option<String>,
    pub flags: CheckoutFlags,
    pub completed_order: Option<CompletedOrderRef>,
}

fn session_response(session: &SessionState) -> SessionResponse {
    session.with_session(|s| SessionResponse {
        customer_id: s.customer_id.clone(),
        warehouse_id: s.warehouse_id.clone(),
        flags: s.flags,
        completed_order: s.completed_order.clone(),
    })
}

/// Current session selections.
pub fn get_session(session: &SessionState) -> SessionResponse {
    session_response(session)
}

/// Selects the customer the next order is billed to.
pub fn select_customer(session: &SessionState, customer_id: &str) -> Result<SessionResponse, ApiError> {
    let customer_id = customer_id.trim();
    if customer_id.is_empty() {
        return Err(ApiError::validation("customer is required"));
    }
    debug!(customer_id, "select_customer command");
    session.with_session_mut(|s| s.select_customer(customer_id));
    Ok(session_response(session))
}

/// Selects the warehouse stock is drawn from.
pub fn select_warehouse(session: &SessionState, warehouse_id: &str) -> Result<SessionResponse, ApiError> {
    let warehouse_id = warehouse_id.trim();
    if warehouse_id.is_empty() {
        return Err(ApiError::validation("warehouse is required"));
    }
    debug!(warehouse_id, "select_warehouse command");
    session.with_session_mut(|s| s.select_warehouse(warehouse_id));
    Ok(session_response(session))
}

/// Turns fulfillment right after creation on or off.
pub fn set_auto_fulfill(session: &SessionState, enabled: bool) -> SessionResponse {
    debug!(enabled, "set_auto_fulfill command");
    session.with_session_mut(|s| s.flags.auto_fulfill = enabled);
    session_response(session)
}

/// Turns "mark as paid" on or off.
pub fn set_mark_paid(session: &SessionState, enabled: bool) -> SessionResponse {
    debug!(enabled, "set_mark_paid command");
    session.with_session_mut(|s| s.flags.mark_paid = enabled);
    session_response(session)
}

/// Forgets the completed order (the cashier closed the invoice prompt).
pub fn dismiss_completed_order(session: &SessionState) -> Option<CompletedOrderRef> {
    debug!("dismiss_completed_order command");
    session.with_session_mut(|s| s.dismiss_completed_order())
}

/// What the cashier sees after a checkout that created an order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub order: CompletedOrderRef,
    pub total: Money,
    pub fulfilled: bool,
    pub needs_manual_fulfillment: bool,
    pub message: String,
}

/// Runs a checkout for the current session.
///
/// ## Returns
/// - `Ok` once the order exists. The cart and customer are cleared even when
///   fulfillment failed; `needs_manual_fulfillment` says so.
/// - `Err` when nothing was created. The cart is left as it was.
pub async fn checkout<S: OrderService>(
    session: &SessionState,
    checkout: &CheckoutState<S>,
) -> Result<CheckoutResponse, ApiError> {
    debug!("checkout command");

    let draft = session.with_session(|s| s.begin_checkout(checkout.notes()));
    let outcome = checkout.orchestrator().submit(draft).await?;

    session.with_session_mut(|s| s.apply_outcome(&outcome));

    if outcome.needs_manual_fulfillment() {
        warn!(order_id = %outcome.order.order_id, "Order needs manual fulfillment");
    } else {
        info!(order_id = %outcome.order.order_id, fulfilled = outcome.is_fulfilled(), "Checkout complete");
    }

    Ok(CheckoutResponse {
        total: outcome.order.total,
        fulfilled: outcome.is_fulfilled(),
        needs_manual_fulfillment: outcome.needs_manual_fulfillment(),
        message: outcome.message(),
        order: outcome.order,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::cart::{add_to_cart, set_line_discount};
    use crate::commands::test_support::{checkout_state, product, MockService};
    use crate::error::ErrorCode;
    use kirana_client::ServiceError;

    fn ready_session() -> SessionState {
        let session = SessionState::new(Some("w-1".to_string()), CheckoutFlags::default());
        add_to_cart(&session, &product("p-1", 100, None), 2).unwrap();
        set_line_discount(&session, "p-1", Money::from_major(10)).unwrap();
        select_customer(&session, "c-1").unwrap();
        session
    }

    #[tokio::test]
    async fn test_checkout_clears_cart_and_keeps_order() {
        let session = ready_session();
        let state = checkout_state(MockService::default());

        let response = checkout(&session, &state).await.unwrap();

        assert!(response.fulfilled);
        assert_eq!(response.total, Money::from_minor(22420));
        assert_eq!(response.message, "Sale completed and fulfilled! Inventory deducted.");
        session.with_session(|s| {
            assert!(s.cart.is_empty());
            assert!(s.customer_id.is_none());
            assert_eq!(s.warehouse_id.as_deref(), Some("w-1"));
            assert_eq!(s.completed_order.as_ref().map(|o| o.order_id.as_str()), Some("order-1"));
        });
        assert_eq!(state.service().last_notes().as_deref(), Some("POS Order"));
    }

    #[tokio::test]
    async fn test_fulfill_failure_reports_manual_fulfillment() {
        let session = ready_session();
        let state = checkout_state(MockService {
            fail_fulfill: Some(ServiceError::Rejected {
                status: 400,
                detail: "Insufficient stock".to_string(),
            }),
            ..Default::default()
        });

        let response = checkout(&session, &state).await.unwrap();

        assert!(!response.fulfilled);
        assert!(response.needs_manual_fulfillment);
        assert!(response.message.contains("Insufficient stock"));
        assert!(session.with_session(|s| s.cart.is_empty()));
    }

    #[tokio::test]
    async fn test_create_failure_keeps_cart() {
        let session = ready_session();
        let state = checkout_state(MockService {
            fail_create: Some(ServiceError::ConnectionFailed("refused".to_string())),
            ..Default::default()
        });

        let err = checkout(&session, &state).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::ServiceUnavailable);
        assert_eq!(err.message, "Failed to create order");
        session.with_session(|s| {
            assert_eq!(s.cart.item_count(), 1);
            assert_eq!(s.customer_id.as_deref(), Some("c-1"));
            assert!(s.completed_order.is_none());
        });
    }

    #[tokio::test]
    async fn test_checkout_without_warehouse_is_validation_error() {
        let session = SessionState::default();
        add_to_cart(&session, &product("p-1", 100, None), 1).unwrap();
        select_customer(&session, "c-1").unwrap();
        let state = checkout_state(MockService::default());

        let err = checkout(&session, &state).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "warehouse is required");
        assert_eq!(state.service().create_calls(), 0);
    }

    #[test]
    fn test_toggles_and_dismiss() {
        let session = SessionState::default();

        let response = set_auto_fulfill(&session, false);
        assert!(!response.flags.auto_fulfill);
        let response = set_mark_paid(&session, false);
        assert!(!response.flags.mark_paid);

        assert!(select_customer(&session, "  ").is_err());
        assert!(dismiss_completed_order(&session).is_none());
    }
}
