//! # Client Error Types
//!
//! Error types for order service calls and checkout submission.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ServiceError                                                          │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Service             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Connection     │  │  Rejected (detail)      │ │
//! │  │  InvalidUrl     │  │  Timeout        │  │  Status (no detail)     │ │
//! │  │  ConfigLoad     │  │                 │  │  InvalidResponse        │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  CheckoutError                                                         │
//! │  ├── Validation       - precondition failed, nothing sent             │
//! │  ├── AlreadyInFlight  - second submit refused, nothing sent           │
//! │  ├── Create           - order service refused or unreachable          │
//! │  └── State            - state machine rejected an event               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use kirana_core::checkout::CREATE_FAILED_MESSAGE;
use kirana_core::{CoreError, ValidationError};
use thiserror::Error;

/// Result type alias for order service operations.
pub type ClientResult<T> = Result<T, ServiceError>;

/// Failures talking to the order service.
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid client configuration.
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),

    /// Service base URL is malformed.
    #[error("Invalid service URL: {0}")]
    InvalidUrl(String),

    /// Failed to read or parse the config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// Could not reach the service.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The request did not complete in time.
    #[error("Request timed out")]
    Timeout,

    // =========================================================================
    // Service Errors
    // =========================================================================
    /// The service answered with an error and explained why.
    ///
    /// ## Example
    /// ```text
    /// HTTP 400 {"detail": "Insufficient stock for Toor Dal 1kg"}
    ///      │
    ///      ▼
    /// Rejected { status: 400, detail: "Insufficient stock for Toor Dal 1kg" }
    /// ```
    #[error("Service rejected request ({status}): {detail}")]
    Rejected { status: u16, detail: String },

    /// The service answered with an error status and no readable detail.
    #[error("Service returned status {status}")]
    Status { status: u16 },

    /// Response body did not match the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ServiceError {
    /// Message supplied by the service, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ServiceError::Rejected { detail, .. } => Some(detail),
            _ => None,
        }
    }

    /// The service message when present, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        self.detail().unwrap_or(fallback).to_string()
    }

    /// Returns true if the failure is likely transient.
    ///
    /// Checkout never retries on its own; this only decides how the failure
    /// is presented.
    pub fn is_retryable(&self) -> bool {
        match self {
            ServiceError::ConnectionFailed(_) | ServiceError::Timeout => true,
            ServiceError::Status { status } | ServiceError::Rejected { status, .. } => {
                *status >= 500
            }
            _ => false,
        }
    }
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ServiceError::Timeout
        } else if err.is_decode() {
            ServiceError::InvalidResponse(err.to_string())
        } else if err.is_builder() {
            ServiceError::InvalidConfig(err.to_string())
        } else {
            ServiceError::ConnectionFailed(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::InvalidResponse(err.to_string())
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(err: std::io::Error) -> Self {
        ServiceError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ServiceError {
    fn from(err: toml::de::Error) -> Self {
        ServiceError::ConfigLoadFailed(err.to_string())
    }
}

// =============================================================================
// Checkout Error
// =============================================================================

/// Why a checkout submit produced no outcome.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// A precondition failed. No network call was made.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Another attempt is still running. No network call was made.
    #[error("A checkout is already in progress")]
    AlreadyInFlight,

    /// Order creation failed. Cart and customer are untouched.
    #[error("Failed to create order: {0}")]
    Create(#[source] ServiceError),

    /// The checkout state machine refused an event.
    #[error(transparent)]
    State(#[from] CoreError),
}

impl CheckoutError {
    /// Message shown to the cashier.
    pub fn user_message(&self) -> String {
        match self {
            CheckoutError::Validation(e) => e.to_string(),
            CheckoutError::AlreadyInFlight => self.to_string(),
            CheckoutError::Create(e) => e.user_message(CREATE_FAILED_MESSAGE),
            CheckoutError::State(e) => e.to_string(),
        }
    }

    /// True when the attempt was refused before any network call.
    pub fn is_pre_network(&self) -> bool {
        matches!(
            self,
            CheckoutError::Validation(_) | CheckoutError::AlreadyInFlight
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_service_detail() {
        let err = ServiceError::Rejected {
            status: 400,
            detail: "Customer not found".to_string(),
        };
        assert_eq!(err.user_message("Failed to create order"), "Customer not found");

        let err = ServiceError::Status { status: 502 };
        assert_eq!(err.user_message("Failed to create order"), "Failed to create order");
    }

    #[test]
    fn test_retryable() {
        assert!(ServiceError::Timeout.is_retryable());
        assert!(ServiceError::ConnectionFailed("refused".into()).is_retryable());
        assert!(ServiceError::Status { status: 503 }.is_retryable());
        assert!(!ServiceError::Rejected {
            status: 400,
            detail: "bad".into()
        }
        .is_retryable());
        assert!(!ServiceError::InvalidConfig("x".into()).is_retryable());
    }

    #[test]
    fn test_checkout_error_messages() {
        let err = CheckoutError::Create(ServiceError::Timeout);
        assert_eq!(err.user_message(), "Failed to create order");
        assert!(!err.is_pre_network());

        let err = CheckoutError::from(ValidationError::EmptyCart);
        assert_eq!(err.user_message(), "Cart is empty");
        assert!(err.is_pre_network());

        assert!(CheckoutError::AlreadyInFlight.is_pre_network());
    }
}
