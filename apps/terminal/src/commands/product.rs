//! # Product Commands
//!
//! Barcode / SKU lookup against the order service.
//!
//! ## Scan Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  > scan 8901234567890                                                  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  validate_product_code ──► GET /products/search?q=8901234567890        │
//! │                                   │                                     │
//! │                 ┌─────────────────┴─────────────────┐                   │
//! │                 ▼                                   ▼                   │
//! │        no match: "No product"            barcode → sku → first         │
//! │        (not an error)                           │                       │
//! │                                                 ▼                       │
//! │                                          add_to_cart(qty)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use kirana_client::OrderService;
use kirana_core::validation::validate_product_code;
use kirana_core::Product;
use serde::Serialize;
use tracing::{debug, info};

use crate::commands::cart::{add_to_cart, CartResponse};
use crate::error::ApiError;
use crate::state::{CheckoutState, SessionState};

/// Looks up a product by scanned or typed code.
///
/// A miss is `Ok(None)`.
pub async fn lookup_product<S: OrderService>(
    checkout: &CheckoutState<S>,
    code: &str,
) -> Result<Option<Product>, ApiError> {
    let code = validate_product_code(code)?;
    debug!(code = %code, "lookup_product command");

    let product = checkout.service().search_product_by_code(&code).await?;
    if product.is_none() {
        info!(code = %code, "No product matches code");
    }
    Ok(product)
}

/// Result of scanning a code into the cart.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase", tag = "result")]
pub enum ScanResponse {
    Added { product: Product, cart: CartResponse },
    NotFound { code: String },
}

/// Looks up a code and adds the product to the cart.
pub async fn scan<S: OrderService>(
    session: &SessionState,
    checkout: &CheckoutState<S>,
    code: &str,
    quantity: i64,
) -> Result<ScanResponse, ApiError> {
    match lookup_product(checkout, code).await? {
        Some(product) => {
            let cart = add_to_cart(session, &product, quantity)?;
            Ok(ScanResponse::Added { product, cart })
        }
        None => Ok(ScanResponse::NotFound {
            code: code.trim().to_string(),
        }),
    }
}
