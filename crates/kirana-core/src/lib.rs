//! # kirana-core: Pure Business Logic for Kirana POS
//!
//! This crate holds the cart pricing engine and the checkout state machine
//! as pure functions and plain data, with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Kirana POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Terminal (apps/terminal)                     │   │
//! │  │      scan ──► qty/disc ──► customer ──► checkout ──► invoice    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          kirana-client (order service + orchestrator)           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kirana-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌─────────┐ │   │
//! │  │   │  money  │ │  cart   │ │ pricing │ │ checkout │ │ session │ │   │
//! │  │   │  Money  │ │LineItem │ │  GST    │ │  Phase   │ │PosSess. │ │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └──────────┘ └─────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • PURE FUNCTIONS                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, TaxRate, PaymentStatus, order refs)
//! - [`money`] - Fixed-point rupee amounts
//! - [`cart`] - Line items and the cart
//! - [`pricing`] - Line and cart totals, CGST/SGST split, GST slabs
//! - [`checkout`] - Checkout request snapshot and state machine
//! - [`session`] - Explicit POS session state (cart + customer + last order)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Pricing is deterministic, same input = same output
//! 2. **Exact Money**: Amounts are decimals; rounding only happens for display
//! 3. **Explicit State**: Session and checkout state are values, never globals
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use kirana_core::cart::{Cart, LineItem};
//! use kirana_core::money::Money;
//! use kirana_core::pricing;
//! use kirana_core::types::TaxRate;
//!
//! let mut cart = Cart::new();
//! cart.push_line(LineItem {
//!     product_id: "p-1".into(),
//!     name: "Basmati Rice 1kg".into(),
//!     sku: None,
//!     unit_price: Money::from_major(100),
//!     quantity: 2,
//!     discount: Money::from_major(10),
//!     tax_rate: TaxRate::from_percent(18),
//! }).unwrap();
//!
//! assert_eq!(pricing::cart_subtotal(&cart), Money::from_major(190));
//! assert_eq!(pricing::cart_tax(&cart), Money::from_minor(3420));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod error;
pub mod money;
pub mod pricing;
pub mod session;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, LineItem};
pub use checkout::{CheckoutDraft, CheckoutEvent, CheckoutFlags, CheckoutOutcome, CheckoutPhase, CheckoutRequest};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::{CartTotals, GstSlab, TaxSplit};
pub use session::PosSession;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single cart.
///
/// ## Business Reason
/// Prevents runaway carts and keeps invoices printable on one roll.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., scanning 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Largest unit price or discount accepted, in whole rupees.
///
/// ## Business Reason
/// Catches mistyped amounts. Every cart total computed from amounts up to
/// this bound (times MAX_ITEM_QUANTITY, across MAX_CART_ITEMS lines) stays
/// far inside `Decimal` range.
pub const MAX_AMOUNT_RUPEES: i64 = 1_000_000_000_000;

/// Notes attached to every order created from the POS screen.
pub const DEFAULT_ORDER_NOTES: &str = "POS Order";
