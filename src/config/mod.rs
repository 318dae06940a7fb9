//! Configuration loading and validation.
//!
//! Settings come from environment variables (optionally via `.env`
//! through dotenvy), layered with the `config` crate. Every section
//! validates itself before the application starts.

mod database;
mod email;
mod error;
mod payment;
mod telemetry;

pub use database::DatabaseConfig;
pub use email::EmailConfig;
pub use error::ConfigError;
pub use payment::PaymentConfig;
pub use telemetry::init_tracing;

use serde::Deserialize;

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub payment: PaymentConfig,
    #[serde(default)]
    pub email: EmailConfig,
}

impl AppConfig {
    /// Loads configuration from the environment.
    ///
    /// `.env` files are honored in development; real environment
    /// variables win. Variables are namespaced `CONREG_`, with `__`
    /// separating section and key (e.g. `CONREG_DATABASE__URL`).
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let settings = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("CONREG")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let app: AppConfig = settings.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.database.validate()?;
        self.payment.validate()?;
        self.email.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_covers_all_sections() {
        let app = AppConfig {
            database: DatabaseConfig {
                url: "postgres://localhost/conreg".to_string(),
                max_connections: 5,
            },
            payment: PaymentConfig {
                stripe_api_key: "sk_test_xxx".to_string(),
                currency: "nzd".to_string(),
            },
            email: EmailConfig::default(),
        };
        assert!(app.validate().is_ok());
    }

    #[test]
    fn validation_fails_on_bad_payment_section() {
        let app = AppConfig {
            database: DatabaseConfig {
                url: "postgres://localhost/conreg".to_string(),
                max_connections: 5,
            },
            payment: PaymentConfig::default(),
            email: EmailConfig::default(),
        };
        assert!(app.validate().is_err());
    }
}
