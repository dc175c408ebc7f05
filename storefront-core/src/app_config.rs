use crate::policy::{LifecyclePolicy, RerequestRule, ShippingPolicy};
use crate::PolicyResult;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub shipping: ShippingConfig,
    #[serde(default)]
    pub returns: ReturnsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ShippingConfig {
    pub free_shipping_threshold: Decimal,
    pub flat_fee: Decimal,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ReturnsConfig {
    #[serde(default)]
    pub rerequest_rule: RerequestRule,
}

impl Config {
    /// Load from `./config`, layered the usual way:
    /// `default` -> `{RUN_MODE}` -> `local` -> `STOREFRONT__*` environment.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    pub fn load_from(dir: &str) -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name(&format!("{}/default", dir)))
            // Per-environment overrides are optional
            .add_source(config::File::with_name(&format!("{}/{}", dir, run_mode)).required(false))
            // Never checked in
            .add_source(config::File::with_name(&format!("{}/local", dir)).required(false))
            // Eg. `STOREFRONT__SHIPPING__FLAT_FEE=40`
            .add_source(config::Environment::with_prefix("STOREFRONT").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    /// Parse a single TOML document. Used by tests and embedded defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(contents, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    /// Validate the loaded values into the engine's policy.
    pub fn lifecycle_policy(&self) -> PolicyResult<LifecyclePolicy> {
        let shipping = ShippingPolicy::new(
            self.shipping.free_shipping_threshold,
            self.shipping.flat_fee,
        )?;

        Ok(LifecyclePolicy {
            shipping,
            rerequest_rule: self.returns.rerequest_rule,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PolicyError;

    #[test]
    fn test_parse_full_config() {
        let config = Config::from_toml_str(
            r#"
            [shipping]
            free_shipping_threshold = "299"
            flat_fee = "50"

            [returns]
            rerequest_rule = "only_active_blocks"
            "#,
        )
        .unwrap();

        let policy = config.lifecycle_policy().unwrap();
        assert_eq!(policy.shipping, ShippingPolicy::STANDARD);
        assert_eq!(policy.rerequest_rule, RerequestRule::OnlyActiveBlocks);
    }

    #[test]
    fn test_returns_section_is_optional() {
        let config = Config::from_toml_str(
            r#"
            [shipping]
            free_shipping_threshold = "499.50"
            flat_fee = "40"
            "#,
        )
        .unwrap();

        let policy = config.lifecycle_policy().unwrap();
        assert_eq!(policy.shipping.free_shipping_threshold, Decimal::new(49950, 2));
        assert_eq!(policy.rerequest_rule, RerequestRule::AnyExistingBlocks);
    }

    #[test]
    fn test_negative_fee_fails_validation() {
        let config = Config::from_toml_str(
            r#"
            [shipping]
            free_shipping_threshold = "299"
            flat_fee = "-10"
            "#,
        )
        .unwrap();

        assert!(matches!(
            config.lifecycle_policy(),
            Err(PolicyError::NegativeAmount { field: "flat_fee", .. })
        ));
    }

    #[test]
    fn test_missing_shipping_section_fails() {
        assert!(Config::from_toml_str("").is_err());
    }
}
