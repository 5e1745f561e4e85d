//! # Checkout State
//!
//! Owns the checkout orchestrator and the order notes attached to every sale.

use std::sync::Arc;

use kirana_client::{CheckoutOrchestrator, OrderService};

/// Shared checkout machinery for one till.
pub struct CheckoutState<S: OrderService> {
    orchestrator: Arc<CheckoutOrchestrator<S>>,
    notes: String,
}

impl<S: OrderService> CheckoutState<S> {
    pub fn new(service: Arc<S>, notes: impl Into<String>) -> Self {
        CheckoutState {
            orchestrator: Arc::new(CheckoutOrchestrator::new(service)),
            notes: notes.into(),
        }
    }

    pub fn orchestrator(&self) -> &Arc<CheckoutOrchestrator<S>> {
        &self.orchestrator
    }

    /// The order service, for product lookups.
    pub fn service(&self) -> &Arc<S> {
        self.orchestrator.service()
    }

    /// Notes sent with each order.
    pub fn notes(&self) -> &str {
        &self.notes
    }
}

impl<S: OrderService> Clone for CheckoutState<S> {
    fn clone(&self) -> Self {
        CheckoutState {
            orchestrator: Arc::clone(&self.orchestrator),
            notes: self.notes.clone(),
        }
    }
}
