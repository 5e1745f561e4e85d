//! # Cart
//!
//! Line items accumulated at the POS screen, plus the order-level discount.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Cashier Action           Method                  Cart Change           │
//! │  ──────────────           ──────                  ───────────           │
//! │                                                                         │
//! │  Scan product ──────────► add_product() ────────► push or qty += n     │
//! │                                                                         │
//! │  Change quantity ───────► set_quantity() ───────► items[i].qty = n     │
//! │                                                                         │
//! │  Line discount ─────────► set_discount() ───────► items[i].discount    │
//! │                                                                         │
//! │  Override price ────────► set_unit_price() ─────► items[i].unit_price  │
//! │                                                                         │
//! │  Remove ────────────────► remove() ─────────────► items.remove(i)      │
//! │                                                                         │
//! │  Bill discount ─────────► set_order_discount() ─► order_discount       │
//! │                                                                         │
//! │  Clear / checkout ──────► clear() ──────────────► empty, no discount   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Totals are never stored on the cart. [`crate::pricing`] recomputes them
//! from the lines on every read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{resolve_tax_rate, Product, ProductId, TaxRate};
use crate::validation::{
    validate_amount, validate_cart_size, validate_quantity, validate_tax_rate,
};
use crate::MAX_ITEM_QUANTITY;

// =============================================================================
// Line Item
// =============================================================================

/// One product entry in the cart.
///
/// ## Snapshot Fields
/// `unit_price` and `tax_rate` are copied from the product when it is added.
/// Later catalogue changes do not reach a line already in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Product this line sells. Never changes once added.
    pub product_id: ProductId,

    /// Product name at time of adding (frozen).
    pub name: String,

    /// SKU at time of adding (frozen).
    pub sku: Option<String>,

    /// Price per unit before tax. Editable by the cashier.
    pub unit_price: Money,

    /// Units sold, always >= 1.
    pub quantity: i64,

    /// Flat discount taken off this line before tax.
    pub discount: Money,

    /// GST rate for this line.
    pub tax_rate: TaxRate,
}

impl LineItem {
    /// Creates a line from a product, resolving its tax rate.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        LineItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            sku: product.sku.clone(),
            unit_price: product.selling_price,
            quantity,
            discount: Money::zero(),
            tax_rate: resolve_tax_rate(product),
        }
    }

    /// Quantity × unit price, before any discount.
    #[inline]
    pub fn gross(&self) -> Money {
        self.unit_price * self.quantity
    }

    fn validate(&self) -> CoreResult<()> {
        validate_quantity(self.quantity)?;
        validate_amount("unit price", self.unit_price)?;
        validate_amount("discount", self.discount)?;
        validate_tax_rate(self.tax_rate)?;
        Ok(())
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
///
/// ## Invariants
/// - At most one line per `product_id` (adding again increases quantity)
/// - Quantity is always 1..=999
/// - Unit price, line discount and order discount are within 0..=MAX_AMOUNT_RUPEES
/// - Lines keep insertion order
/// - At most 100 lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    items: Vec<LineItem>,

    /// Flat discount taken off the grand total, after tax.
    order_discount: Money,

    /// When the cart was created/last cleared.
    #[ts(as = "String")]
    created_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            items: Vec::new(),
            order_discount: Money::zero(),
            created_at: Utc::now(),
        }
    }

    /// Lines in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Looks up the line for a product.
    pub fn line(&self, product_id: &str) -> Option<&LineItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    /// The order-level discount.
    pub fn order_discount(&self) -> Money {
        self.order_discount
    }

    /// When the cart was created or last cleared.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Adds a product to the cart or increases quantity if already present.
    ///
    /// ## Behavior
    /// - Product already in cart: quantity increases by `quantity`, the
    ///   line's price, discount and rate are left as they are
    /// - Product not in cart: a new line is appended with the product's
    ///   selling price and resolved tax rate
    ///
    /// ## Returns
    /// The affected line.
    pub fn add_product(&mut self, product: &Product, quantity: i64) -> CoreResult<&LineItem> {
        self.push_line(LineItem::from_product(product, quantity))
    }

    /// Adds a prepared line, merging into an existing line for the same
    /// product by quantity.
    pub fn push_line(&mut self, line: LineItem) -> CoreResult<&LineItem> {
        line.validate()?;

        if let Some(index) = self.position(&line.product_id) {
            let item = &mut self.items[index];
            let new_qty = item.quantity + line.quantity;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            item.quantity = new_qty;
            return Ok(&self.items[index]);
        }

        validate_cart_size(self.items.len()).map_err(|_| CoreError::CartTooLarge {
            max: crate::MAX_CART_ITEMS,
        })?;

        self.items.push(line);
        Ok(&self.items[self.items.len() - 1])
    }

    /// Sets the quantity of a line.
    ///
    /// A quantity below 1 is rejected and the line keeps its quantity.
    /// Use [`Cart::remove`] to drop a line.
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        validate_quantity(quantity)?;
        self.line_mut(product_id)?.quantity = quantity;
        Ok(())
    }

    /// Sets the flat discount of a line.
    ///
    /// A discount larger than the line's gross value is accepted here. The
    /// line's subtotal goes negative and checkout refuses it.
    pub fn set_discount(&mut self, product_id: &str, discount: Money) -> CoreResult<()> {
        validate_amount("discount", discount)?;
        self.line_mut(product_id)?.discount = discount;
        Ok(())
    }

    /// Overrides the unit price of a line.
    pub fn set_unit_price(&mut self, product_id: &str, unit_price: Money) -> CoreResult<()> {
        validate_amount("unit price", unit_price)?;
        self.line_mut(product_id)?.unit_price = unit_price;
        Ok(())
    }

    /// Removes a line from the cart by product ID.
    pub fn remove(&mut self, product_id: &str) -> CoreResult<LineItem> {
        let index = self
            .position(product_id)
            .ok_or_else(|| CoreError::LineNotFound(product_id.to_string()))?;
        Ok(self.items.remove(index))
    }

    /// Sets the order-level discount.
    ///
    /// The discount may exceed the cart total; the grand total then goes
    /// negative and is shown as such.
    pub fn set_order_discount(&mut self, discount: Money) -> CoreResult<()> {
        validate_amount("order discount", discount)?;
        self.order_discount = discount;
        Ok(())
    }

    /// Empties the cart and resets the order discount.
    pub fn clear(&mut self) {
        self.items.clear();
        self.order_discount = Money::zero();
        self.created_at = Utc::now();
    }

    /// Returns the number of lines in the cart.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn position(&self, product_id: &str) -> Option<usize> {
        self.items.iter().position(|i| i.product_id == product_id)
    }

    fn line_mut(&mut self, product_id: &str) -> CoreResult<&mut LineItem> {
        self.items
            .iter_mut()
            .find(|i| i.product_id == product_id)
            .ok_or_else(|| CoreError::LineNotFound(product_id.to_string()))
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
