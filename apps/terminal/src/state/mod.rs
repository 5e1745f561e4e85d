//! # State Module
//!
//! Application state for the terminal, split into focused types so each
//! command takes only what it needs.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────┐  ┌──────────────────┐  ┌──────────────────┐       │
//! │  │  SessionState    │  │  CheckoutState   │  │   ConfigState    │       │
//! │  │                  │  │                  │  │                  │       │
//! │  │  Arc<Mutex<      │  │  orchestrator    │  │  store_name      │       │
//! │  │   PosSession>>   │  │  order notes     │  │  currency        │       │
//! │  └──────────────────┘  └──────────────────┘  └──────────────────┘       │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • SessionState: Arc<Mutex<T>>, never held across an await            │
//! │  • CheckoutState: orchestrator owns its own in-flight guard           │
//! │  • ConfigState: Read-only after initialization                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod checkout;
mod config;
mod session;

pub use checkout::CheckoutState;
pub use config::ConfigState;
pub use session::SessionState;
