//! # kirana-client: Order Service Client for Kirana POS
//!
//! Network side of the POS: the order service seam, its HTTP
//! implementation, client configuration, and the checkout orchestrator that
//! sequences create → fulfill.
//!
//! ## Module Organization
//! ```text
//! kirana_client/
//! ├── lib.rs           ◄─── You are here
//! ├── config.rs        ◄─── ClientConfig (toml + env)
//! ├── error.rs         ◄─── ServiceError, CheckoutError
//! ├── service.rs       ◄─── OrderService trait + product pick rule
//! ├── http.rs          ◄─── HttpOrderService (reqwest)
//! └── orchestrator.rs  ◄─── CheckoutOrchestrator
//! ```
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PosSession::begin_checkout() ──► CheckoutDraft                         │
//! │                                       │                                 │
//! │                                       ▼                                 │
//! │  CheckoutOrchestrator::submit(draft)                                   │
//! │     1. refuse if an attempt is in flight (no network call)            │
//! │     2. validate draft (no network call on failure)                    │
//! │     3. create_order ─────────────────► order service                  │
//! │     4. fulfill_order (if auto_fulfill) ► order service                │
//! │                                       │                                 │
//! │                                       ▼                                 │
//! │  PosSession::apply_outcome(&outcome)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod orchestrator;
pub mod service;

pub use config::ClientConfig;
pub use error::{CheckoutError, ClientResult, ServiceError};
pub use http::HttpOrderService;
pub use orchestrator::CheckoutOrchestrator;
pub use service::{CreatedOrder, OrderService};
