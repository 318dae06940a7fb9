//! Email configuration for receipt notifications.

use serde::Deserialize;

use super::error::ConfigError;

fn default_from_address() -> String {
    "registration@example.com".to_string()
}

/// Outbound email configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Address receipts are sent from.
    #[serde(default = "default_from_address")]
    pub from_address: String,

    /// Whether to deliver at all; disabled deployments log instead.
    #[serde(default)]
    pub enabled: bool,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            from_address: default_from_address(),
            enabled: false,
        }
    }
}

impl EmailConfig {
    /// Validate email configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && !self.from_address.contains('@') {
            return Err(ConfigError::MissingRequired("EMAIL_FROM_ADDRESS"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_email_needs_no_address() {
        let config = EmailConfig {
            from_address: String::new(),
            enabled: false,
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn enabled_email_requires_valid_address() {
        let config = EmailConfig {
            from_address: "not-an-address".to_string(),
            enabled: true,
        };
        assert!(config.validate().is_err());
    }
}
