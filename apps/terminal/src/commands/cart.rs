//! # Cart Commands
//!
//! Cart manipulation for the POS screen.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Checkout │────►│ Completed│       │
//! │  │  Cart    │     │          │     │          │     │  Order   │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                                                │
//! │                   scan / qty / disc / price / rm                       │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                   clear ─────────────────────────►  (back to empty)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use kirana_core::pricing::{self, LineTotals};
use kirana_core::{Cart, CartTotals, GstSlab, LineItem, Money, Product, TaxRate};
use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::state::SessionState;

/// One cart line with its computed amounts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineView {
    pub product_id: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub discount: Money,
    pub tax_rate: TaxRate,
    /// e.g. `"GST 18% (CGST 9% + SGST 9%)"`
    pub gst_label: String,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
}

impl From<&LineItem> for LineView {
    fn from(item: &LineItem) -> Self {
        let LineTotals {
            subtotal, tax, total, ..
        } = LineTotals::from(item);
        LineView {
            product_id: item.product_id.clone(),
            name: item.name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            discount: item.discount,
            tax_rate: item.tax_rate,
            gst_label: gst_label(item.tax_rate),
            subtotal,
            tax,
            total,
        }
    }
}

/// Label shown next to a line's tax.
pub fn gst_label(rate: TaxRate) -> String {
    let half = TaxRate::from_percent(rate.component_percent());
    format!("GST {} (CGST {} + SGST {})", rate, half, half)
}

/// Cart response including lines, totals and the GST breakdown.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub lines: Vec<LineView>,
    pub totals: CartTotals,
    pub gst: Vec<GstSlab>,
}

impl From<&Cart> for CartResponse {
    fn from(cart: &Cart) -> Self {
        CartResponse {
            lines: cart.items().iter().map(LineView::from).collect(),
            totals: CartTotals::from(cart),
            gst: pricing::gst_breakdown(cart),
        }
    }
}

/// Gets the current cart contents.
pub fn get_cart(session: &SessionState) -> CartResponse {
    debug!("get_cart command");
    session.with_session(|s| CartResponse::from(&s.cart))
}

/// Adds a product to the cart, merging with an existing line.
///
/// The product's GST rate is resolved here, once, and frozen on the line.
pub fn add_to_cart(session: &SessionState, product: &Product, quantity: i64) -> Result<CartResponse, ApiError> {
    debug!(product_id = %product.id, quantity, "add_to_cart command");
    session.with_session_mut(|s| -> Result<CartResponse, ApiError> {
        s.cart.add_product(product, quantity)?;
        Ok(CartResponse::from(&s.cart))
    })
}

/// Sets the quantity of a line. Zero or less is rejected; use `remove_from_cart`.
pub fn update_quantity(session: &SessionState, product_id: &str, quantity: i64) -> Result<CartResponse, ApiError> {
    debug!(product_id, quantity, "update_quantity command");
    session.with_session_mut(|s| -> Result<CartResponse, ApiError> {
        s.cart.set_quantity(product_id, quantity)?;
        Ok(CartResponse::from(&s.cart))
    })
}

/// Sets the flat discount on a line.
pub fn set_line_discount(session: &SessionState, product_id: &str, discount: Money) -> Result<CartResponse, ApiError> {
    debug!(product_id, %discount, "set_line_discount command");
    session.with_session_mut(|s| -> Result<CartResponse, ApiError> {
        s.cart.set_discount(product_id, discount)?;
        Ok(CartResponse::from(&s.cart))
    })
}

/// Overrides the unit price of a line.
pub fn set_unit_price(session: &SessionState, product_id: &str, unit_price: Money) -> Result<CartResponse, ApiError> {
    debug!(product_id, %unit_price, "set_unit_price command");
    session.with_session_mut(|s| -> Result<CartResponse, ApiError> {
        s.cart.set_unit_price(product_id, unit_price)?;
        Ok(CartResponse::from(&s.cart))
    })
}

/// Removes a line from the cart.
pub fn remove_from_cart(session: &SessionState, product_id: &str) -> Result<CartResponse, ApiError> {
    debug!(product_id, "remove_from_cart command");
    session.with_session_mut(|s| -> Result<CartResponse, ApiError> {
        s.cart.remove(product_id)?;
        Ok(CartResponse::from(&s.cart))
    })
}

/// Sets the discount applied to the whole order after tax.
pub fn set_order_discount(session: &SessionState, discount: Money) -> Result<CartResponse, ApiError> {
    debug!(%discount, "set_order_discount command");
    session.with_session_mut(|s| -> Result<CartResponse, ApiError> {
        s.cart.set_order_discount(discount)?;
        Ok(CartResponse::from(&s.cart))
    })
}

/// Empties the cart and resets the order discount.
pub fn clear_cart(session: &SessionState) -> CartResponse {
    debug!("clear_cart command");
    session.with_session_mut(|s| {
        s.cart.clear();
        CartResponse::from(&s.cart)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::product;
    use crate::error::ErrorCode;

    #[test]
    fn test_add_and_edit_lines() {
        let session = SessionState::default();
        let sugar = product("p-1", 100, None);

        add_to_cart(&session, &sugar, 1).unwrap();
        let cart = add_to_cart(&session, &sugar, 1).unwrap();
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.lines[0].quantity, 2);

        let cart = set_line_discount(&session, "p-1", Money::from_major(10)).unwrap();
        assert_eq!(cart.lines[0].subtotal, Money::from_major(190));
        assert_eq!(cart.lines[0].tax, Money::from_minor(3420));
        assert_eq!(cart.lines[0].total, Money::from_minor(22420));

        let cart = set_order_discount(&session, Money::from_major(20)).unwrap();
        assert_eq!(cart.totals.total, Money::from_minor(20420));
        assert_eq!(cart.totals.split.cgst + cart.totals.split.sgst, cart.totals.tax);
    }

    #[test]
    fn test_quantity_zero_rejected() {
        let session = SessionState::default();
        add_to_cart(&session, &product("p-1", 50, None), 1).unwrap();

        let err = update_quantity(&session, "p-1", 0).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(get_cart(&session).lines[0].quantity, 1);
    }

    #[test]
    fn test_missing_line_is_not_found() {
        let session = SessionState::default();
        let err = remove_from_cart(&session, "nope").unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn test_clear_resets_order_discount() {
        let session = SessionState::default();
        add_to_cart(&session, &product("p-1", 50, None), 1).unwrap();
        set_order_discount(&session, Money::from_major(5)).unwrap();

        let cart = clear_cart(&session);

        assert!(cart.lines.is_empty());
        assert!(cart.totals.order_discount.is_zero());
    }

    #[test]
    fn test_gst_breakdown_groups_rates() {
        let session = SessionState::default();
        add_to_cart(&session, &product("p-1", 100, Some(5)), 2).unwrap();
        add_to_cart(&session, &product("p-2", 100, None), 1).unwrap();

        let cart = get_cart(&session);

        assert_eq!(cart.gst.len(), 2);
        assert_eq!(cart.gst[0].rate, TaxRate::from_percent(5));
        assert_eq!(cart.gst[0].tax, Money::from_major(10));
        assert_eq!(cart.gst[1].rate, TaxRate::from_percent(18));
        assert_eq!(cart.gst[1].tax, Money::from_major(18));
    }

    #[test]
    fn test_gst_label() {
        assert_eq!(gst_label(TaxRate::from_percent(18)), "GST 18% (CGST 9% + SGST 9%)");
        assert_eq!(gst_label(TaxRate::from_percent(5)), "GST 5% (CGST 2.5% + SGST 2.5%)");
    }

    #[test]
    fn test_negative_line_is_flagged() {
        let session = SessionState::default();
        add_to_cart(&session, &product("p-1", 10, None), 1).unwrap();

        let cart = set_line_discount(&session, "p-1", Money::from_major(15)).unwrap();

        assert!(cart.totals.has_negative_lines());
        assert!(cart.lines[0].subtotal.is_negative());
    }
}
