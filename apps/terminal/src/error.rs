//! # API Error Type
//!
//! Unified error type for terminal commands.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Kirana POS                             │
//! │                                                                         │
//! │  > qty p-1 0                                                           │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Cart rule broken? ─── CoreError::LineNotFound ─────┐           │  │
//! │  │         │                                            │           │  │
//! │  │         ▼                                            ▼           │  │
//! │  │  Service failed? ─── ServiceError::Rejected ────── ApiError ───►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  ✗ [ValidationError] quantity must be positive                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `ApiError` also serializes, so `--json` output carries both a
//! machine-readable `code` and the human-readable `message`.

use kirana_client::{CheckoutError, ServiceError};
use kirana_core::{CoreError, ValidationError};
use serde::Serialize;

/// Error returned from terminal commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "SERVICE_REJECTED",
///   "message": "Insufficient stock for Toor Dal 1kg"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for command responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Line or product not found
    NotFound,

    /// Input or checkout precondition failed
    ValidationError,

    /// Cart limit reached
    CartError,

    /// A checkout is already running
    CheckoutInProgress,

    /// The order service refused the request
    ServiceRejected,

    /// The order service could not be reached
    ServiceUnavailable,

    /// Bad client configuration
    ConfigError,

    /// Anything else
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts validation errors to API errors.
impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::LineNotFound(id) => ApiError::not_found("Cart line", &id),
            CoreError::CartTooLarge { .. } => ApiError::new(ErrorCode::CartError, err.to_string()),
            CoreError::QuantityTooLarge { .. } => ApiError::validation(err.to_string()),
            CoreError::InvalidCheckoutTransition { .. } => {
                tracing::error!("Checkout state machine rejected an event: {}", err);
                ApiError::internal(err.to_string())
            }
            CoreError::Validation(e) => e.into(),
        }
    }
}

/// Converts order service errors to API errors.
///
/// The service's own message is shown when it sent one.
impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match &err {
            ServiceError::Rejected { status: 404, detail } => {
                ApiError::new(ErrorCode::NotFound, detail.clone())
            }
            ServiceError::Rejected { detail, .. } => {
                ApiError::new(ErrorCode::ServiceRejected, detail.clone())
            }
            ServiceError::InvalidConfig(_)
            | ServiceError::InvalidUrl(_)
            | ServiceError::ConfigLoadFailed(_) => ApiError::new(ErrorCode::ConfigError, err.to_string()),
            ServiceError::ConnectionFailed(_) | ServiceError::Timeout => {
                ApiError::new(ErrorCode::ServiceUnavailable, err.to_string())
            }
            ServiceError::Status { .. } | ServiceError::InvalidResponse(_) => {
                tracing::error!("Order service error: {}", err);
                ApiError::new(ErrorCode::ServiceUnavailable, err.to_string())
            }
        }
    }
}

/// Converts checkout errors to API errors.
impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        let message = err.user_message();
        match err {
            CheckoutError::Validation(e) => e.into(),
            CheckoutError::AlreadyInFlight => ApiError::new(ErrorCode::CheckoutInProgress, message),
            CheckoutError::Create(e) => ApiError {
                message,
                ..ApiError::from(e)
            },
            CheckoutError::State(e) => e.into(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_validation_code() {
        let err = ApiError::from(ValidationError::EmptyCart);
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "Cart is empty");
    }

    #[test]
    fn test_core_errors() {
        let err = ApiError::from(CoreError::LineNotFound("p-9".to_string()));
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Cart line not found: p-9");

        let err = ApiError::from(CoreError::CartTooLarge { max: 100 });
        assert_eq!(err.code, ErrorCode::CartError);
    }

    #[test]
    fn test_create_failure_keeps_generic_message_without_detail() {
        let err = ApiError::from(CheckoutError::Create(ServiceError::Timeout));
        assert_eq!(err.code, ErrorCode::ServiceUnavailable);
        assert_eq!(err.message, "Failed to create order");
    }

    #[test]
    fn test_create_failure_uses_service_detail() {
        let err = ApiError::from(CheckoutError::Create(ServiceError::Rejected {
            status: 400,
            detail: "Insufficient stock".to_string(),
        }));
        assert_eq!(err.code, ErrorCode::ServiceRejected);
        assert_eq!(err.message, "Insufficient stock");
    }

    #[test]
    fn test_serializes_screaming_code() {
        let json = serde_json::to_value(ApiError::from(CheckoutError::AlreadyInFlight)).unwrap();
        assert_eq!(json["code"], "CHECKOUT_IN_PROGRESS");
    }

    #[test]
    fn test_display() {
        let err = ApiError::validation("bad input");
        assert_eq!(err.to_string(), "[ValidationError] bad input");
    }
}
