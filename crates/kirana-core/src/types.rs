//! # Domain Types
//!
//! Core domain types shared by the pricing engine and the checkout flow.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌───────────────────────┐ │
//! │  │    Product      │   │    TaxRate      │   │  CompletedOrderRef    │ │
//! │  │  ─────────────  │   │  ─────────────  │   │  ───────────────────  │ │
//! │  │  id             │   │  percent        │   │  order_id             │ │
//! │  │  sku / barcode  │   │  18 = 18% GST   │   │  order_number         │ │
//! │  │  selling_price  │   │  9 + 9 split    │   │  fulfilled            │ │
//! │  │  tax_rate?      │   └─────────────────┘   └───────────────────────┘ │
//! │  └─────────────────┘                                                    │
//! │                        ┌─────────────────┐                              │
//! │                        │ PaymentStatus   │                              │
//! │                        │  Unpaid         │                              │
//! │                        │  Partial        │                              │
//! │                        │  Paid           │                              │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Identifiers are opaque strings issued by the order service.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

/// Identifier of a product in the catalogue.
pub type ProductId = String;

/// Identifier of a customer.
pub type CustomerId = String;

/// Identifier of the warehouse stock is drawn from.
pub type WarehouseId = String;

/// Identifier of a sales order returned by the order service.
pub type OrderId = String;

// =============================================================================
// Tax Rate
// =============================================================================

/// GST rate applied to one line, as a percentage.
///
/// ## Why a Percentage?
/// GST slabs are published as percentages (0, 5, 12, 18, 28) and the order
/// service stores `tax_rate: 18.0`. Keeping the same unit avoids conversions
/// at the service boundary.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct TaxRate(#[ts(as = "String")] Decimal);

impl TaxRate {
    /// Standard GST rate used when a product carries none.
    pub const DEFAULT_GST_PERCENT: i64 = 18;

    /// Creates a tax rate from a percentage.
    pub fn from_percent(pct: impl Into<Decimal>) -> Self {
        TaxRate(pct.into())
    }

    /// Creates a tax rate from basis points (1800 = 18%).
    pub fn from_bps(bps: u32) -> Self {
        TaxRate(Decimal::new(i64::from(bps), 2))
    }

    /// Returns the rate as a percentage.
    #[inline]
    pub const fn percent(&self) -> Decimal {
        self.0
    }

    /// Rate of each GST component (CGST or SGST), half the combined rate.
    pub fn component_percent(&self) -> Decimal {
        self.0 / Decimal::TWO
    }

    /// Zero tax rate (exempt goods).
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(Decimal::ZERO)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::from_percent(Self::DEFAULT_GST_PERCENT)
    }
}

/// Displays as `18%` or `2.5%`.
impl fmt::Display for TaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0.normalize())
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalogue product as returned by a code lookup.
///
/// Only the fields the POS needs are modelled. Stock levels, cost price and
/// supplier data stay on the service side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    /// Selling price before tax.
    pub selling_price: Money,
    /// GST rate. `None` means the catalogue has no rate for this product.
    pub tax_rate: Option<TaxRate>,
}

impl Product {
    /// Returns the rate this product is sold at, see [`resolve_tax_rate`].
    #[inline]
    pub fn resolved_tax_rate(&self) -> TaxRate {
        resolve_tax_rate(self)
    }

    /// True when `code` equals the product's barcode.
    pub fn matches_barcode(&self, code: &str) -> bool {
        self.barcode.as_deref().map(str::trim) == Some(code.trim())
    }

    /// True when `code` equals the product's SKU, ignoring case.
    pub fn matches_sku(&self, code: &str) -> bool {
        self.sku
            .as_deref()
            .is_some_and(|sku| sku.trim().eq_ignore_ascii_case(code.trim()))
    }
}

/// Resolves the GST rate a product is added to the cart with.
///
/// This is the single place the 18% default is applied. It runs once, when a
/// product is added, and the result is frozen on the line item.
pub fn resolve_tax_rate(product: &Product) -> TaxRate {
    product.tax_rate.unwrap_or_default()
}

// =============================================================================
// Payment Status
// =============================================================================

/// Payment state recorded on a sales order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Partial,
    Paid,
}

impl PaymentStatus {
    /// Maps the POS "mark as paid" toggle to a payment status.
    pub fn from_mark_paid(mark_paid: bool) -> Self {
        if mark_paid {
            PaymentStatus::Paid
        } else {
            PaymentStatus::Unpaid
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Unpaid => write!(f, "unpaid"),
            PaymentStatus::Partial => write!(f, "partial"),
            PaymentStatus::Paid => write!(f, "paid"),
        }
    }
}

// =============================================================================
// Completed Order Reference
// =============================================================================

/// The order a checkout created, kept so the cashier can open its invoice.
///
/// Set as soon as the order service confirms creation, before fulfillment
/// is attempted. Cleared when dismissed or when the next checkout starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CompletedOrderRef {
    pub order_id: OrderId,
    /// Human-facing invoice number, when the service returns one.
    pub order_number: Option<String>,
    /// Whether inventory was deducted for this order.
    pub fulfilled: bool,
    /// Grand total the order was submitted with.
    pub total: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl CompletedOrderRef {
    /// Creates an unfulfilled reference for a freshly created order.
    pub fn new(order_id: impl Into<OrderId>, order_number: Option<String>, total: Money) -> Self {
        CompletedOrderRef {
            order_id: order_id.into(),
            order_number,
            fulfilled: false,
            total,
            created_at: Utc::now(),
        }
    }

    /// Label used on screen: the invoice number if known, else the id.
    pub fn display_id(&self) -> &str {
        self.order_number.as_deref().unwrap_or(&self.order_id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(tax_rate: Option<TaxRate>) -> Product {
        Product {
            id: "p-1".to_string(),
            name: "Toor Dal 1kg".to_string(),
            sku: Some("DAL-1KG".to_string()),
            barcode: Some("8901234567890".to_string()),
            selling_price: Money::from_major(150),
            tax_rate,
        }
    }

    #[test]
    fn test_tax_rate_from_bps() {
        assert_eq!(TaxRate::from_bps(1800), TaxRate::from_percent(18));
        assert_eq!(TaxRate::from_bps(250).percent(), Decimal::new(25, 1));
    }

    #[test]
    fn test_tax_rate_display() {
        assert_eq!(TaxRate::from_percent(18).to_string(), "18%");
        assert_eq!(TaxRate::from_bps(250).to_string(), "2.5%");
        assert_eq!(TaxRate::from_percent(18).component_percent(), Decimal::from(9));
    }

    #[test]
    fn test_resolve_tax_rate_defaults_to_18() {
        assert_eq!(resolve_tax_rate(&product(None)), TaxRate::from_percent(18));
        assert_eq!(
            resolve_tax_rate(&product(Some(TaxRate::from_percent(5)))),
            TaxRate::from_percent(5)
        );
        assert_eq!(
            product(Some(TaxRate::zero())).resolved_tax_rate(),
            TaxRate::zero()
        );
    }

    #[test]
    fn test_product_code_matching() {
        let p = product(None);
        assert!(p.matches_barcode(" 8901234567890"));
        assert!(p.matches_sku("dal-1kg"));
        assert!(!p.matches_sku("DAL"));
    }

    #[test]
    fn test_payment_status_from_toggle() {
        assert_eq!(PaymentStatus::from_mark_paid(true), PaymentStatus::Paid);
        assert_eq!(PaymentStatus::from_mark_paid(false), PaymentStatus::Unpaid);
        assert_eq!(serde_json::to_string(&PaymentStatus::Paid).unwrap(), "\"paid\"");
    }

    #[test]
    fn test_tax_rate_serializes_as_plain_string() {
        let json = serde_json::to_string(&TaxRate::from_percent(18)).unwrap();
        assert_eq!(json, "\"18\"");
        let back: TaxRate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TaxRate::from_percent(18));
    }

    #[test]
    fn test_order_ref_display_id() {
        let mut order = CompletedOrderRef::new("uuid-1", None, Money::zero());
        assert_eq!(order.display_id(), "uuid-1");
        order.order_number = Some("SO-2024-0042".to_string());
        assert_eq!(order.display_id(), "SO-2024-0042");
        assert!(!order.fulfilled);
    }
}
