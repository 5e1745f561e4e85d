//! # HTTP Order Service
//!
//! [`OrderService`] over the back-office REST API.
//!
//! ## Endpoints
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST {base}/sales/                 create order       → 201 + order   │
//! │  POST {base}/sales/{id}/fulfill     deduct inventory   → 200           │
//! │  GET  {base}/products/search?q=...  code lookup        → [product]     │
//! │                                                                         │
//! │  Errors: {"detail": "..."} or {"detail": [{"msg": "..."}, ...]}        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Amounts go over the wire as JSON numbers, which is what the service
//! stores. Inside the POS they stay exact decimals.

use async_trait::async_trait;
use kirana_core::{CheckoutRequest, Money, PaymentStatus, Product, TaxRate};
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::ClientConfig;
use crate::error::{ClientResult, ServiceError};
use crate::service::{pick_product, CreatedOrder, OrderService};

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Serialize)]
struct SalesOrderItemBody<'a> {
    product_id: &'a str,
    quantity: i64,
    #[serde(with = "rust_decimal::serde::float")]
    unit_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    discount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    tax_rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    tax_amount: Decimal,
}

#[derive(Debug, Serialize)]
struct SalesOrderBody<'a> {
    customer_id: &'a str,
    warehouse_id: &'a str,
    items: Vec<SalesOrderItemBody<'a>>,
    notes: &'a str,
    /// Tax already travels per line.
    #[serde(with = "rust_decimal::serde::float")]
    tax_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    discount_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    shipping_cost: Decimal,
    payment_status: PaymentStatus,
}

impl<'a> From<&'a CheckoutRequest> for SalesOrderBody<'a> {
    fn from(request: &'a CheckoutRequest) -> Self {
        SalesOrderBody {
            customer_id: &request.customer_id,
            warehouse_id: &request.warehouse_id,
            items: request
                .lines
                .iter()
                .map(|line| SalesOrderItemBody {
                    product_id: &line.product_id,
                    quantity: line.quantity,
                    unit_price: line.unit_price.amount(),
                    discount: line.discount.amount(),
                    tax_rate: line.tax_rate.percent(),
                    tax_amount: line.tax_amount.amount(),
                })
                .collect(),
            notes: &request.notes,
            tax_amount: Decimal::ZERO,
            discount_amount: request.order_discount.amount(),
            shipping_cost: Decimal::ZERO,
            payment_status: request.payment_status,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProductRecord {
    id: String,
    name: String,
    #[serde(default)]
    sku: Option<String>,
    #[serde(default)]
    barcode: Option<String>,
    selling_price: Decimal,
    #[serde(default)]
    tax_rate: Option<Decimal>,
}

impl From<ProductRecord> for Product {
    fn from(record: ProductRecord) -> Self {
        Product {
            id: record.id,
            name: record.name,
            sku: record.sku,
            barcode: record.barcode,
            selling_price: Money::from_decimal(record.selling_price),
            tax_rate: record.tax_rate.map(TaxRate::from_percent),
        }
    }
}

/// Pulls the human-readable message out of an error body.
///
/// Handles both `{"detail": "..."}` and the validation form
/// `{"detail": [{"msg": "..."}]}`, joining messages with `"; "`.
pub fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_json::Value::Array(entries) => {
            let messages: Vec<&str> = entries
                .iter()
                .filter_map(|e| e.get("msg").and_then(|m| m.as_str()))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}

// =============================================================================
// HTTP Client
// =============================================================================

/// Order service reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpOrderService {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpOrderService {
    /// Creates a client from configuration.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        config.validate()?;

        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client,
            base_url: config.service.base_url.trim_end_matches('/').to_string(),
            token: config.service.access_token.clone(),
        })
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Maps a non-success response to [`ServiceError`], or passes it through.
    async fn check_status(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), body = %text, "Order service returned error");

        Err(match extract_detail(&text) {
            Some(detail) => ServiceError::Rejected {
                status: status.as_u16(),
                detail,
            },
            None => ServiceError::Status {
                status: status.as_u16(),
            },
        })
    }

    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let response = Self::check_status(response).await?;
        response.json().await.map_err(Into::into)
    }
}

#[async_trait]
impl OrderService for HttpOrderService {
    #[instrument(skip(self, request), fields(customer_id = %request.customer_id, lines = request.lines.len()))]
    async fn create_order(&self, request: &CheckoutRequest) -> ClientResult<CreatedOrder> {
        let body = SalesOrderBody::from(request);
        let response = self
            .authorize(self.client.post(self.url("sales/")).json(&body))
            .send()
            .await?;
        Self::handle_response(response).await
    }

    #[instrument(skip(self))]
    async fn fulfill_order(&self, order_id: &str) -> ClientResult<()> {
        let response = self
            .authorize(self.client.post(self.url(&format!("sales/{}/fulfill", order_id))))
            .send()
            .await?;
        // Body echoes the order; only the status matters here
        Self::check_status(response).await.map(|_| ())
    }

    #[instrument(skip(self))]
    async fn search_product_by_code(&self, code: &str) -> ClientResult<Option<Product>> {
        let response = self
            .authorize(self.client.get(self.url("products/search")).query(&[("q", code)]))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let records: Vec<ProductRecord> = Self::handle_response(response).await?;
        debug!(code, results = records.len(), "Product search finished");
        Ok(pick_product(code, records.into_iter().map(Product::from).collect()))
    }
}
