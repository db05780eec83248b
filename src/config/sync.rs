//! Reconciliation job configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Configuration for the scheduled subscription sweep
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Shared secret required to invoke the cron sweep endpoint
    pub cron_secret: String,

    /// Number of subscriptions fetched per sweep page
    #[serde(default = "default_sweep_page_size")]
    pub sweep_page_size: u32,
}

impl SyncConfig {
    /// Validate sync configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.cron_secret.is_empty() {
            return Err(ValidationError::MissingRequired("SYNC__CRON_SECRET"));
        }
        if self.sweep_page_size == 0 || self.sweep_page_size > 100 {
            return Err(ValidationError::InvalidSweepPageSize);
        }
        Ok(())
    }
}

fn default_sweep_page_size() -> u32 {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_config_passes() {
        let config = SyncConfig {
            cron_secret: "cron-secret".to_string(),
            sweep_page_size: 100,
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_secret_fails() {
        let config = SyncConfig {
            cron_secret: String::new(),
            sweep_page_size: 100,
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingRequired("SYNC__CRON_SECRET"))
        ));
    }

    #[test]
    fn page_size_bounds_are_enforced() {
        let zero = SyncConfig {
            cron_secret: "s".to_string(),
            sweep_page_size: 0,
        };
        assert!(matches!(
            zero.validate(),
            Err(ValidationError::InvalidSweepPageSize)
        ));

        let oversized = SyncConfig {
            cron_secret: "s".to_string(),
            sweep_page_size: 250,
        };
        assert!(matches!(
            oversized.validate(),
            Err(ValidationError::InvalidSweepPageSize)
        ));
    }
}
