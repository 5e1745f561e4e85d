//! # Cart Pricing Engine
//!
//! Pure computation of line and cart totals under India's GST model.
//!
//! ## Formulae
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Per-Line, Discount-then-Tax                       │
//! │                                                                         │
//! │  line_subtotal = quantity × unit_price − discount                      │
//! │  line_tax      = line_subtotal × tax_rate / 100                         │
//! │  line_total    = line_subtotal + line_tax                               │
//! │                                                                         │
//! │  cart_subtotal = Σ line_subtotal                                        │
//! │  cart_tax      = Σ line_tax          (each line at its own rate)        │
//! │  cart_total    = cart_subtotal + cart_tax − order_discount              │
//! │                                                                         │
//! │  split_tax(T)  = { cgst, sgst },  cgst + sgst == T                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every value here is exact. Rounding to paise happens only when an amount
//! is displayed, see [`Money::round_for_display`]. Nothing in this module can
//! fail: a negative subtotal is a legal result and is reported, not clamped.

use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::{Cart, LineItem};
use crate::money::{Money, DISPLAY_SCALE};
use crate::types::{ProductId, TaxRate};

// =============================================================================
// Line Computations
// =============================================================================

/// `quantity × unit_price − discount`, never clamped.
pub fn line_subtotal(item: &LineItem) -> Money {
    item.gross() - item.discount
}

/// GST on the discounted line value.
pub fn line_tax(item: &LineItem) -> Money {
    line_subtotal(item).calculate_tax(item.tax_rate)
}

/// Subtotal plus tax for one line.
pub fn line_total(item: &LineItem) -> Money {
    line_subtotal(item) + line_tax(item)
}

// =============================================================================
// Cart Computations
// =============================================================================

/// Sum of line subtotals.
pub fn cart_subtotal(cart: &Cart) -> Money {
    cart.items().iter().map(line_subtotal).sum()
}

/// Sum of line taxes, each at its own rate.
pub fn cart_tax(cart: &Cart) -> Money {
    cart.items().iter().map(line_tax).sum()
}

/// `cart_subtotal + cart_tax − order_discount`.
pub fn cart_total(cart: &Cart) -> Money {
    cart_subtotal(cart) + cart_tax(cart) - cart.order_discount()
}

// =============================================================================
// CGST / SGST
// =============================================================================

/// The two equal components of a GST amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxSplit {
    /// Central GST. Carries the odd paisa when the amount does not halve.
    pub cgst: Money,
    /// State GST.
    pub sgst: Money,
}

/// Splits a tax amount into CGST and SGST.
///
/// SGST is half the amount truncated to paise; CGST is the rest. The two
/// always sum to exactly `amount`, and any remainder lands on CGST.
///
/// ## Example
/// ```rust
/// use kirana_core::money::Money;
/// use kirana_core::pricing::split_tax;
///
/// let split = split_tax(Money::from_minor(3420));
/// assert_eq!(split.cgst, Money::from_minor(1710));
/// assert_eq!(split.sgst, Money::from_minor(1710));
///
/// let split = split_tax(Money::from_minor(5));
/// assert_eq!(split.cgst, Money::from_minor(3));
/// assert_eq!(split.sgst, Money::from_minor(2));
/// ```
pub fn split_tax(amount: Money) -> TaxSplit {
    let half = amount.amount() / Decimal::TWO;
    let sgst = Money::from_decimal(half.round_dp_with_strategy(DISPLAY_SCALE, RoundingStrategy::ToZero));
    TaxSplit {
        cgst: amount - sgst,
        sgst,
    }
}

// =============================================================================
// Totals Summary
// =============================================================================

/// Computed amounts for one line, for display next to the line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineTotals {
    pub product_id: ProductId,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
}

impl From<&LineItem> for LineTotals {
    fn from(item: &LineItem) -> Self {
        let subtotal = line_subtotal(item);
        let tax = subtotal.calculate_tax(item.tax_rate);
        LineTotals {
            product_id: item.product_id.clone(),
            subtotal,
            tax,
            total: subtotal + tax,
        }
    }
}

/// Everything the POS screen shows under the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub item_count: usize,
    pub total_quantity: i64,
    pub subtotal: Money,
    pub tax: Money,
    pub split: TaxSplit,
    pub order_discount: Money,
    pub total: Money,
    /// Lines whose discount exceeds their gross value.
    pub negative_lines: Vec<ProductId>,
}

impl CartTotals {
    /// True when some line has a negative subtotal.
    pub fn has_negative_lines(&self) -> bool {
        !self.negative_lines.is_empty()
    }
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        let subtotal = cart_subtotal(cart);
        let tax = cart_tax(cart);
        CartTotals {
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            subtotal,
            tax,
            split: split_tax(tax),
            order_discount: cart.order_discount(),
            total: subtotal + tax - cart.order_discount(),
            negative_lines: cart
                .items()
                .iter()
                .filter(|i| line_subtotal(i).is_negative())
                .map(|i| i.product_id.clone())
                .collect(),
        }
    }
}

// =============================================================================
// GST Breakdown by Rate
// =============================================================================

/// Taxable value and tax for all lines sharing one GST rate.
///
/// Invoices print one row per slab:
/// ```text
///  Rate   Taxable     CGST      SGST
///  5%     ₹200.00     ₹5.00     ₹5.00
///  18%    ₹190.00     ₹17.10    ₹17.10
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct GstSlab {
    pub rate: TaxRate,
    pub taxable_value: Money,
    pub tax: Money,
    pub split: TaxSplit,
}

/// Groups the cart's lines by tax rate, lowest rate first.
///
/// The slab taxes add up to [`cart_tax`] exactly.
pub fn gst_breakdown(cart: &Cart) -> Vec<GstSlab> {
    let mut slabs: BTreeMap<TaxRate, (Money, Money)> = BTreeMap::new();
    for item in cart.items() {
        let entry = slabs.entry(item.tax_rate).or_default();
        entry.0 += line_subtotal(item);
        entry.1 += line_tax(item);
    }

    slabs
        .into_iter()
        .map(|(rate, (taxable_value, tax))| GstSlab {
            rate,
            taxable_value,
            tax,
            split: split_tax(tax),
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: &str, quantity: i64, unit_price: Money, discount: Money, rate: i64) -> LineItem {
        LineItem {
            product_id: id.to_string(),
            name: format!("Product {}", id),
            sku: None,
            unit_price,
            quantity,
            discount,
            tax_rate: TaxRate::from_percent(rate),
        }
    }

    fn cart_of(lines: Vec<LineItem>) -> Cart {
        let mut cart = Cart::new();
        for l in lines {
            cart.push_line(l).unwrap();
        }
        cart
    }

    #[test]
    fn test_worked_example_line() {
        let item = line("1", 2, Money::from_major(100), Money::from_major(10), 18);

        assert_eq!(line_subtotal(&item), Money::from_major(190));
        assert_eq!(line_tax(&item), Money::from_decimal(Decimal::new(342, 1)));
        assert_eq!(line_total(&item), Money::from_decimal(Decimal::new(2242, 1)));
    }

    #[test]
    fn test_worked_example_order_discount() {
        let mut cart = cart_of(vec![line("1", 2, Money::from_major(100), Money::from_major(10), 18)]);
        cart.set_order_discount(Money::from_major(20)).unwrap();

        assert_eq!(cart_total(&cart), Money::from_decimal(Decimal::new(2042, 1)));
    }

    #[test]
    fn test_line_total_is_exact_for_awkward_values() {
        let samples = [
            line("a", 3, Money::from_minor(3333), Money::zero(), 18),
            line("b", 7, Money::from_minor(1999), Money::from_minor(1), 5),
            line("c", 1, Money::from_minor(1), Money::zero(), 28),
            line("d", 11, Money::from_minor(4567), Money::from_minor(333), 12),
        ];
        for item in &samples {
            for _ in 0..3 {
                assert_eq!(line_total(item), line_subtotal(item) + line_tax(item));
            }
        }
    }

    #[test]
    fn test_cart_total_identity_with_mixed_rates() {
        let mut cart = cart_of(vec![
            line("a", 2, Money::from_major(100), Money::from_major(10), 18),
            line("b", 4, Money::from_major(50), Money::zero(), 5),
            line("c", 1, Money::from_minor(999), Money::zero(), 0),
        ]);
        cart.set_order_discount(Money::from_minor(1234)).unwrap();

        assert_eq!(
            cart_total(&cart),
            cart_subtotal(&cart) + cart_tax(&cart) - cart.order_discount()
        );
        // 190 + 200 + 9.99
        assert_eq!(cart_subtotal(&cart), Money::from_minor(39999));
        // 34.2 + 10 + 0
        assert_eq!(cart_tax(&cart), Money::from_minor(4420));
    }

    #[test]
    fn test_split_tax_sums_exactly() {
        for paise in [0, 1, 5, 99, 3420, 12345, -7] {
            let amount = Money::from_minor(paise);
            let split = split_tax(amount);
            assert_eq!(split.cgst + split.sgst, amount);
        }

        let sub_paisa = Money::from_decimal(Decimal::new(59994, 4));
        let split = split_tax(sub_paisa);
        assert_eq!(split.cgst + split.sgst, sub_paisa);
        assert_eq!(split.sgst, Money::from_minor(299));
    }

    #[test]
    fn test_split_tax_remainder_goes_to_cgst() {
        let split = split_tax(Money::from_minor(101));
        assert_eq!(split.cgst, Money::from_minor(51));
        assert_eq!(split.sgst, Money::from_minor(50));
    }

    #[test]
    fn test_negative_line_is_surfaced_not_clamped() {
        let cart = cart_of(vec![
            line("a", 1, Money::from_major(10), Money::from_major(15), 18),
            line("b", 1, Money::from_major(100), Money::zero(), 18),
        ]);
        let item = &cart.items()[0];

        assert_eq!(line_subtotal(item), Money::from_major(-5));
        assert_eq!(line_tax(item), Money::from_minor(-90));

        let totals = CartTotals::from(&cart);
        assert_eq!(totals.negative_lines, vec!["a".to_string()]);
        assert!(totals.has_negative_lines());
        assert_eq!(totals.subtotal, Money::from_major(95));
    }

    #[test]
    fn test_order_discount_above_total_goes_negative() {
        let mut cart = cart_of(vec![line("a", 1, Money::from_major(10), Money::zero(), 0)]);
        cart.set_order_discount(Money::from_major(15)).unwrap();
        assert_eq!(cart_total(&cart), Money::from_major(-5));
    }

    #[test]
    fn test_totals_summary() {
        let mut cart = cart_of(vec![
            line("a", 2, Money::from_major(100), Money::from_major(10), 18),
            line("b", 1, Money::from_major(50), Money::zero(), 5),
        ]);
        cart.set_order_discount(Money::from_major(20)).unwrap();

        let totals = CartTotals::from(&cart);
        assert_eq!(totals.item_count, 2);
        assert_eq!(totals.total_quantity, 3);
        assert_eq!(totals.subtotal, Money::from_major(240));
        assert_eq!(totals.tax, Money::from_minor(3670));
        assert_eq!(totals.split.cgst + totals.split.sgst, totals.tax);
        assert_eq!(totals.total, Money::from_minor(25670));
        assert!(!totals.has_negative_lines());
    }

    #[test]
    fn test_empty_cart_totals_are_zero() {
        let totals = CartTotals::from(&Cart::new());
        assert_eq!(totals.subtotal, Money::zero());
        assert_eq!(totals.tax, Money::zero());
        assert_eq!(totals.total, Money::zero());
    }

    #[test]
    fn test_line_totals_match_engine() {
        let item = line("1", 2, Money::from_major(100), Money::from_major(10), 18);
        let totals = LineTotals::from(&item);
        assert_eq!(totals.subtotal, line_subtotal(&item));
        assert_eq!(totals.tax, line_tax(&item));
        assert_eq!(totals.total, line_total(&item));
    }

    #[test]
    fn test_gst_breakdown_groups_by_rate() {
        let cart = cart_of(vec![
            line("a", 2, Money::from_major(100), Money::from_major(10), 18),
            line("b", 4, Money::from_major(50), Money::zero(), 5),
            line("c", 1, Money::from_major(10), Money::zero(), 18),
        ]);

        let slabs = gst_breakdown(&cart);
        assert_eq!(slabs.len(), 2);

        assert_eq!(slabs[0].rate, TaxRate::from_percent(5));
        assert_eq!(slabs[0].taxable_value, Money::from_major(200));
        assert_eq!(slabs[0].tax, Money::from_major(10));
        assert_eq!(slabs[0].split.cgst, Money::from_major(5));

        assert_eq!(slabs[1].rate, TaxRate::from_percent(18));
        assert_eq!(slabs[1].taxable_value, Money::from_major(200));
        assert_eq!(slabs[1].tax, Money::from_major(36));

        let slab_tax: Money = slabs.iter().map(|s| s.tax).sum();
        assert_eq!(slab_tax, cart_tax(&cart));
    }
}
