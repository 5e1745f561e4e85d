//! # Checkout Orchestrator
//!
//! Runs one checkout attempt at a time against an [`OrderService`].
//!
//! ## Attempt Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         submit(draft)                                   │
//! │                                                                         │
//! │  ┌──────────────┐  busy   ┌────────────────────────┐                    │
//! │  │ claim slot   │───────► │ Err(AlreadyInFlight)   │  no network call   │
//! │  └──────┬───────┘         └────────────────────────┘                    │
//! │         ▼                                                               │
//! │  ┌──────────────┐  fails  ┌────────────────────────┐                    │
//! │  │ validate     │───────► │ Err(Validation)        │  no network call   │
//! │  └──────┬───────┘         └────────────────────────┘                    │
//! │         ▼                                                               │
//! │  ┌──────────────┐  fails  ┌────────────────────────┐                    │
//! │  │ create_order │───────► │ Err(Create)  FAILED    │  session untouched │
//! │  └──────┬───────┘         └────────────────────────┘                    │
//! │         ▼                                                               │
//! │  ┌──────────────┐  off    ┌────────────────────────┐                    │
//! │  │ auto_fulfill?│───────► │ Ok  DONE_UNFULFILLED   │                    │
//! │  └──────┬───────┘         └────────────────────────┘                    │
//! │         ▼                                                               │
//! │  ┌──────────────┐  fails  ┌────────────────────────┐                    │
//! │  │ fulfill_order│───────► │ Ok  DONE_CREATED_ONLY  │  fulfill by hand   │
//! │  └──────┬───────┘         └────────────────────────┘                    │
//! │         ▼                                                               │
//! │    Ok  DONE_FULFILLED                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Steps run strictly one after another and nothing is retried. The slot is
//! released when `submit` returns or its future is dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use kirana_core::checkout::{CREATE_FAILED_MESSAGE, FULFILL_FAILED_MESSAGE};
use kirana_core::{
    CheckoutDraft, CheckoutEvent, CheckoutOutcome, CheckoutPhase, CheckoutRequest, CompletedOrderRef,
    CoreError,
};
use tokio::sync::watch;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::error::CheckoutError;
use crate::service::OrderService;

// =============================================================================
// In-flight Slot
// =============================================================================

/// Holds the single checkout slot until dropped.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

// =============================================================================
// Orchestrator
// =============================================================================

/// Sequences create → fulfill for one till.
///
/// Share it behind an `Arc`; every method takes `&self`.
pub struct CheckoutOrchestrator<S: OrderService> {
    service: Arc<S>,
    in_flight: AtomicBool,
    phase: watch::Sender<CheckoutPhase>,
}

impl<S: OrderService> CheckoutOrchestrator<S> {
    pub fn new(service: Arc<S>) -> Self {
        let (phase, _) = watch::channel(CheckoutPhase::Idle);
        CheckoutOrchestrator {
            service,
            in_flight: AtomicBool::new(false),
            phase,
        }
    }

    /// The order service this orchestrator submits to.
    pub fn service(&self) -> &Arc<S> {
        &self.service
    }

    /// Phase of the current or most recent attempt.
    pub fn phase(&self) -> CheckoutPhase {
        self.phase.borrow().clone()
    }

    /// Receives every phase change, for UIs that render progress.
    pub fn subscribe(&self) -> watch::Receiver<CheckoutPhase> {
        self.phase.subscribe()
    }

    /// True while an attempt holds the slot. The UI disables submit.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Runs one checkout attempt.
    ///
    /// ## Returns
    /// - `Ok(outcome)` once an order exists, even if fulfillment failed.
    ///   The caller applies it with `PosSession::apply_outcome`.
    /// - `Err(..)` when no order was created. Session state stays as it was.
    pub async fn submit(&self, draft: CheckoutDraft) -> Result<CheckoutOutcome, CheckoutError> {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            warn!(phase = self.phase.borrow().label(), "Checkout already in progress, submit ignored");
            return Err(CheckoutError::AlreadyInFlight);
        };

        let request = draft.validate().map_err(|e| {
            info!(reason = %e, "Checkout refused");
            e
        })?;

        let attempt = Uuid::new_v4();
        self.run(request)
            .instrument(info_span!("checkout", %attempt))
            .await
    }

    async fn run(&self, request: CheckoutRequest) -> Result<CheckoutOutcome, CheckoutError> {
        // Holding the slot means any in-flight phase belongs to a dropped attempt
        let abandoned = self.phase.borrow().is_in_flight();
        if abandoned {
            warn!("Previous checkout attempt was abandoned, resetting phase");
            self.phase.send_replace(CheckoutPhase::Idle);
        }

        self.advance(CheckoutEvent::Submit {
            auto_fulfill: request.auto_fulfill,
        })?;

        info!(
            customer_id = %request.customer_id,
            warehouse_id = %request.warehouse_id,
            lines = request.lines.len(),
            total = %request.totals.total,
            payment_status = %request.payment_status,
            "Creating order"
        );

        let created = match self.service.create_order(&request).await {
            Ok(created) => created,
            Err(e) => {
                error!(error = %e, retryable = e.is_retryable(), "Order creation failed");
                self.advance(CheckoutEvent::CreateFailed {
                    message: e.user_message(CREATE_FAILED_MESSAGE),
                })?;
                return Err(CheckoutError::Create(e));
            }
        };

        let order = CompletedOrderRef::new(created.id, created.order_number, request.totals.total);
        info!(order_id = %order.order_id, order_number = ?order.order_number, "Order created");

        self.advance(CheckoutEvent::CreateSucceeded { order })?;
        let mut phase = self.advance(CheckoutEvent::Continue)?;

        if let CheckoutPhase::Fulfilling { order } = &phase {
            let order_id = order.order_id.clone();
            debug!(order_id = %order_id, "Fulfilling order");

            phase = match self.service.fulfill_order(&order_id).await {
                Ok(()) => {
                    info!(order_id = %order_id, "Order fulfilled");
                    self.advance(CheckoutEvent::FulfillSucceeded)?
                }
                Err(e) => {
                    warn!(order_id = %order_id, error = %e, "Fulfillment failed, order left unfulfilled");
                    self.advance(CheckoutEvent::FulfillFailed {
                        message: e.user_message(FULFILL_FAILED_MESSAGE),
                    })?
                }
            };
        }

        let label = phase.label();
        CheckoutOutcome::from_phase(phase).ok_or_else(|| {
            CheckoutError::State(CoreError::InvalidCheckoutTransition {
                phase: label.to_string(),
                event: "finish".to_string(),
            })
        })
    }

    /// Applies an event to the published phase and returns the new phase.
    fn advance(&self, event: CheckoutEvent) -> Result<CheckoutPhase, CoreError> {
        let next = self.phase.borrow().clone().transition(event)?;
        debug!(phase = next.label(), "Checkout phase changed");
        self.phase.send_replace(next.clone());
        Ok(next)
    }
}
