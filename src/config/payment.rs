//! Payment configuration.

use serde::Deserialize;

use crate::domain::foundation::Currency;

use super::error::ConfigError;

fn default_currency() -> String {
    "nzd".to_string()
}

/// Payment configuration (Stripe).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentConfig {
    /// Stripe API key.
    pub stripe_api_key: String,

    /// Currency every price and charge is denominated in.
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl PaymentConfig {
    /// Check if using Stripe test mode.
    pub fn is_test_mode(&self) -> bool {
        self.stripe_api_key.starts_with("sk_test_")
    }

    /// Check if using Stripe live mode.
    pub fn is_live_mode(&self) -> bool {
        self.stripe_api_key.starts_with("sk_live_")
    }

    /// The configured platform currency.
    pub fn platform_currency(&self) -> Result<Currency, ConfigError> {
        match self.currency.as_str() {
            "nzd" => Ok(Currency::Nzd),
            "usd" => Ok(Currency::Usd),
            "eur" => Ok(Currency::Eur),
            other => Err(ConfigError::UnsupportedCurrency(other.to_string())),
        }
    }

    /// Validate payment configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stripe_api_key.is_empty() {
            return Err(ConfigError::MissingRequired("STRIPE_API_KEY"));
        }
        if !self.stripe_api_key.starts_with("sk_") {
            return Err(ConfigError::InvalidStripeKey);
        }
        self.platform_currency()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(key: &str, currency: &str) -> PaymentConfig {
        PaymentConfig {
            stripe_api_key: key.to_string(),
            currency: currency.to_string(),
        }
    }

    #[test]
    fn test_is_test_mode() {
        let config = config("sk_test_xxx", "nzd");
        assert!(config.is_test_mode());
        assert!(!config.is_live_mode());
    }

    #[test]
    fn test_is_live_mode() {
        let config = config("sk_live_xxx", "nzd");
        assert!(config.is_live_mode());
        assert!(!config.is_test_mode());
    }

    #[test]
    fn test_validation_missing_api_key() {
        let config = PaymentConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_api_key_prefix() {
        let config = config("pk_test_xxx", "nzd");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_unsupported_currency() {
        let config = config("sk_test_xxx", "gbp");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_platform_currency_parses() {
        let config = config("sk_test_xxx", "nzd");
        assert_eq!(config.platform_currency().unwrap(), Currency::Nzd);
    }
}
