//! Configuration error types.

use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(&'static str),

    #[error("Stripe API key must start with sk_")]
    InvalidStripeKey,

    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(String),

    #[error("Unsupported currency code: {0}")]
    UnsupportedCurrency(String),

    #[error(transparent)]
    Source(#[from] config::ConfigError),
}
