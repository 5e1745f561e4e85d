//! # Configuration State
//!
//! Display settings for the terminal: store name and currency formatting.
//! Service and checkout settings live in `kirana_client::ClientConfig`.
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use kirana_core::money::CURRENCY_SYMBOL;
use kirana_core::Money;
use rust_decimal::RoundingStrategy;
use serde::{Deserialize, Serialize};

/// Terminal display configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigState {
    /// Store name (shown in the banner and on completed orders)
    pub store_name: String,

    /// Currency code (ISO 4217)
    pub currency_code: String,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Number of decimal places for currency
    pub currency_decimals: u32,

    /// Print command results as JSON instead of tables
    pub json_output: bool,
}

impl Default for ConfigState {
    /// ## Default Values
    /// - Store: "Kirana Store"
    /// - Currency: INR (₹), 2 decimals
    /// - Output: tables
    fn default() -> Self {
        ConfigState {
            store_name: "Kirana Store".to_string(),
            currency_code: "INR".to_string(),
            currency_symbol: CURRENCY_SYMBOL.to_string(),
            currency_decimals: 2,
            json_output: false,
        }
    }
}

impl ConfigState {
    /// Creates a ConfigState from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `KIRANA_STORE_NAME`: Override store name
    /// - `KIRANA_JSON_OUTPUT`: `1`/`true` prints JSON responses
    pub fn from_env() -> Self {
        let mut config = ConfigState::default();

        if let Ok(store_name) = std::env::var("KIRANA_STORE_NAME") {
            config.store_name = store_name;
        }

        if let Ok(json) = std::env::var("KIRANA_JSON_OUTPUT") {
            config.json_output = matches!(json.trim().to_lowercase().as_str(), "1" | "true" | "yes");
        }

        config
    }

    /// Formats an amount for display, rounding half away from zero.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = ConfigState::default();
    /// assert_eq!(config.format_currency(Money::from_minor(22420)), "₹224.20");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        let mut value = amount
            .amount()
            .round_dp_with_strategy(self.currency_decimals, RoundingStrategy::MidpointAwayFromZero);
        value.rescale(self.currency_decimals);

        format!(
            "{}{}{}",
            if value.is_sign_negative() && !value.is_zero() { "-" } else { "" },
            self.currency_symbol,
            value.abs()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_format_currency_positive() {
        let config = ConfigState::default();
        assert_eq!(config.format_currency(Money::from_minor(123456)), "₹1234.56");
        assert_eq!(config.format_currency(Money::from_major(1)), "₹1.00");
        assert_eq!(config.format_currency(Money::from_minor(1)), "₹0.01");
        assert_eq!(config.format_currency(Money::zero()), "₹0.00");
    }

    #[test]
    fn test_format_currency_negative() {
        let config = ConfigState::default();
        assert_eq!(config.format_currency(Money::from_minor(-1234)), "-₹12.34");
    }

    #[test]
    fn test_format_currency_rounds_half_away_from_zero() {
        let config = ConfigState::default();
        let amount = Money::from_decimal(Decimal::new(125, 3)); // 0.125
        assert_eq!(config.format_currency(amount), "₹0.13");

        let tiny = Money::from_decimal(Decimal::new(-4, 3)); // -0.004
        assert_eq!(config.format_currency(tiny), "₹0.00");
    }

    #[test]
    fn test_format_currency_whole_rupees() {
        let config = ConfigState {
            currency_decimals: 0,
            ..ConfigState::default()
        };
        assert_eq!(config.format_currency(Money::from_minor(22450)), "₹225");
    }
}
