//! # Order Service Seam
//!
//! The three remote operations a till needs. The orchestrator only ever
//! talks to this trait, so tests can swap in an in-memory service.

use async_trait::async_trait;
use kirana_core::{CheckoutRequest, OrderId, Product};
use serde::{Deserialize, Serialize};

use crate::error::ClientResult;

/// Identity of an order the service just created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedOrder {
    pub id: OrderId,
    /// Human-facing number such as `SO-20240611-0042`.
    #[serde(default)]
    pub order_number: Option<String>,
}

/// Remote order operations.
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Creates a sales order. `payment_status` travels with the request.
    async fn create_order(&self, request: &CheckoutRequest) -> ClientResult<CreatedOrder>;

    /// Fulfills (ships from stock) an existing order.
    async fn fulfill_order(&self, order_id: &str) -> ClientResult<()>;

    /// Looks up a product by a scanned barcode or typed SKU.
    async fn search_product_by_code(&self, code: &str) -> ClientResult<Option<Product>>;
}

/// Chooses the product a scanned code refers to.
///
/// ## Preference
/// 1. Exact barcode match
/// 2. Exact SKU match (case-insensitive)
/// 3. First search result
pub fn pick_product(code: &str, candidates: Vec<Product>) -> Option<Product> {
    if let Some(idx) = candidates.iter().position(|p| p.matches_barcode(code)) {
        return candidates.into_iter().nth(idx);
    }
    if let Some(idx) = candidates.iter().position(|p| p.matches_sku(code)) {
        return candidates.into_iter().nth(idx);
    }
    candidates.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kirana_core::Money;

    fn product(id: &str, sku: Option<&str>, barcode: Option<&str>) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            sku: sku.map(str::to_string),
            barcode: barcode.map(str::to_string),
            selling_price: Money::from_major(10),
            tax_rate: None,
        }
    }

    #[test]
    fn test_barcode_beats_sku_and_order() {
        let candidates = vec![
            product("a", Some("8901234"), None),
            product("b", None, Some("8901234")),
        ];
        assert_eq!(pick_product("8901234", candidates).unwrap().id, "b");
    }

    #[test]
    fn test_sku_match_is_case_insensitive() {
        let candidates = vec![product("a", Some("DAL-1"), None), product("b", Some("dal-2"), None)];
        assert_eq!(pick_product("DAL-2", candidates).unwrap().id, "b");
    }

    #[test]
    fn test_falls_back_to_first_result() {
        let candidates = vec![product("a", None, None), product("b", None, None)];
        assert_eq!(pick_product("toor", candidates).unwrap().id, "a");
        assert!(pick_product("toor", Vec::new()).is_none());
    }
}
