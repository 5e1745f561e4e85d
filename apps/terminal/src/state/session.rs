//! # Session State
//!
//! Holds the till's [`PosSession`]: cart, selected customer and warehouse,
//! checkout toggles, and the last completed order.
//!
//! ## Thread Safety
//! The session is wrapped in `Arc<Mutex<T>>` so a checkout running on
//! another task can apply its outcome. The lock is only ever taken inside
//! a closure, so it is never held across an `.await`.

use std::sync::{Arc, Mutex};

use kirana_core::{CheckoutFlags, PosSession, WarehouseId};

/// Shared POS session.
#[derive(Debug, Clone)]
pub struct SessionState {
    session: Arc<Mutex<PosSession>>,
}

impl SessionState {
    /// Creates an empty session.
    pub fn new(warehouse_id: Option<WarehouseId>, flags: CheckoutFlags) -> Self {
        SessionState {
            session: Arc::new(Mutex::new(PosSession::new(warehouse_id, flags))),
        }
    }

    /// Executes a function with read access to the session.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let totals = session_state.with_session(|s| s.totals());
    /// ```
    pub fn with_session<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&PosSession) -> R,
    {
        let session = self.session.lock().expect("Session mutex poisoned");
        f(&session)
    }

    /// Executes a function with write access to the session.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// session_state.with_session_mut(|s| s.cart.add_product(&product, 1))?;
    /// ```
    pub fn with_session_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut PosSession) -> R,
    {
        let mut session = self.session.lock().expect("Session mutex poisoned");
        f(&mut session)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(None, CheckoutFlags::default())
    }
}
