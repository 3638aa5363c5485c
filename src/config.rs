//! Configuration for GST return preparation

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::types::*;
use crate::utils::validation::validate_threshold;

/// Settings shared by every return computed through a [`crate::GstReturnService`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GstReturnConfig {
    /// Invoice value above which a B2C invoice is reported individually (B2CL).
    /// Confirm against current GST law before deployment.
    pub b2c_large_threshold: BigDecimal,
    /// State code of the supplier, used to derive the supply type of lines
    /// that do not carry one
    pub home_state: Option<String>,
    /// Allowed difference when reconciling rounded amounts
    pub rounding_tolerance: BigDecimal,
}

impl Default for GstReturnConfig {
    fn default() -> Self {
        Self {
            b2c_large_threshold: BigDecimal::from(250_000),
            home_state: None,
            rounding_tolerance: BigDecimal::new(1.into(), 2),
        }
    }
}

impl GstReturnConfig {
    /// Load configuration from a JSON document; missing keys keep their defaults
    pub fn from_json(json: &str) -> GstReturnResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| GstReturnError::Config(format!("Cannot parse configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Set the supplier's home state
    pub fn with_home_state(mut self, home_state: impl Into<String>) -> Self {
        self.home_state = Some(home_state.into());
        self
    }

    /// Set the B2C large threshold
    pub fn with_threshold(mut self, threshold: BigDecimal) -> Self {
        self.b2c_large_threshold = threshold;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> GstReturnResult<()> {
        validate_threshold(&self.b2c_large_threshold)?;

        if self.rounding_tolerance < BigDecimal::from(0) {
            return Err(GstReturnError::Config(format!(
                "Rounding tolerance cannot be negative: {}",
                self.rounding_tolerance
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_defaults() {
        let config = GstReturnConfig::default();
        assert_eq!(config.b2c_large_threshold, BigDecimal::from(250000));
        assert_eq!(config.rounding_tolerance, BigDecimal::from_str("0.01").unwrap());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let config = GstReturnConfig::from_json(r#"{"homeState": "27"}"#).unwrap();
        assert_eq!(config.home_state.as_deref(), Some("27"));
        assert_eq!(config.b2c_large_threshold, BigDecimal::from(250000));
    }

    #[test]
    fn test_from_json_threshold_override() {
        let config = GstReturnConfig::from_json(r#"{"b2cLargeThreshold": "100000.00"}"#).unwrap();
        assert_eq!(config.b2c_large_threshold, BigDecimal::from(100000));
    }

    #[test]
    fn test_from_json_rejects_zero_threshold() {
        let result = GstReturnConfig::from_json(r#"{"b2cLargeThreshold": "0"}"#);
        assert!(matches!(result, Err(GstReturnError::ThresholdNotPositive(_))));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let result = GstReturnConfig::from_json("not json");
        assert!(matches!(result, Err(GstReturnError::Config(_))));
    }
}
