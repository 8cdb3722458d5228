//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Parse amounts and URLs before any network interaction
//! - Validate value ranges (workers, core accounts, batch sizes)
//!
//! Returns all validation errors, not just the first.

use alloy::primitives::U256;
use thiserror::Error;

use crate::config::schema::FundingConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("failed to parse expected amount from input {0}")]
    InvalidAmount(String),

    #[error("invalid RPC URL '{0}'")]
    InvalidUrl(String),

    #[error("invalid metrics address '{0}'")]
    InvalidMetricsAddress(String),

    #[error("{field} must be at least 1")]
    Zero { field: &'static str },
}

/// Parse a decimal wei amount.
pub fn parse_amount(input: &str) -> Result<U256, ValidationError> {
    let digits = input.trim();
    if digits.is_empty() {
        return Err(ValidationError::InvalidAmount(input.to_string()));
    }
    U256::from_str_radix(digits, 10).map_err(|_| ValidationError::InvalidAmount(input.to_string()))
}

/// Check every semantic constraint of `config`.
pub fn validate_config(config: &FundingConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = parse_amount(&config.depositor.target_balance) {
        errors.push(e);
    }
    if config.rpc.url.parse::<url::Url>().is_err() {
        errors.push(ValidationError::InvalidUrl(config.rpc.url.clone()));
    }
    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    let depositor = &config.depositor;
    for (field, value) in [
        ("depositor.num_workers", depositor.num_workers),
        ("depositor.core_accounts", depositor.core_accounts),
        ("depositor.tx_per_turn", depositor.tx_per_turn),
    ] {
        if value == 0 {
            errors.push(ValidationError::Zero { field });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&FundingConfig::default()).is_ok());
    }

    #[test]
    fn test_parse_amount_beyond_u64() {
        let amount = parse_amount("100000000000000000000000").unwrap();
        assert!(amount > U256::from(u64::MAX));
        assert!(parse_amount("12abc").is_err());
        assert!(parse_amount("").is_err());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = FundingConfig::default();
        config.depositor.target_balance = "lots".to_string();
        config.depositor.num_workers = 0;
        config.depositor.core_accounts = 0;
        config.rpc.url = "::::".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::InvalidAmount("lots".to_string())));
        assert!(errors.contains(&ValidationError::Zero {
            field: "depositor.core_accounts"
        }));
    }
}
