//! Service configuration loaded from the environment.
//!
//! A `.env` file is honoured when present. Unparseable values are errors
//! rather than silently falling back to defaults.

use std::fmt::Display;
use std::str::FromStr;

use anyhow::Context;

use crate::shipping::{validate_fee_config, FeeConfig};

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Fee schedule used when a request does not override it
    pub fee_config: FeeConfig,
}

impl Config {
    /// Load configuration from `.env` and process environment
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = FeeConfig::default();

        let fee_config = FeeConfig {
            base_fee_per_delivery: parse_var(
                &lookup,
                "SHIPPING_BASE_FEE",
                defaults.base_fee_per_delivery,
            )?,
            price_per_km: parse_var(&lookup, "SHIPPING_PRICE_PER_KM", defaults.price_per_km)?,
            min_fee_per_delivery: parse_var(
                &lookup,
                "SHIPPING_MIN_FEE",
                defaults.min_fee_per_delivery,
            )?,
            max_fee_per_delivery: parse_var(
                &lookup,
                "SHIPPING_MAX_FEE",
                defaults.max_fee_per_delivery,
            )?,
        };

        validate_fee_config(&fee_config).context("invalid default shipping fee configuration")?;

        Ok(Config {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_var(&lookup, "PORT", 8080)?,
            fee_config,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} has invalid value {:?}: {}", key, raw, e)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.fee_config, FeeConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "3000"),
            ("SHIPPING_BASE_FEE", "1000"),
            ("SHIPPING_MIN_FEE", " 5000 "),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
        assert_eq!(config.fee_config.base_fee_per_delivery, 1_000);
        assert_eq!(config.fee_config.min_fee_per_delivery, 5_000);
        assert_eq!(config.fee_config.price_per_km, 5_000);
    }

    #[test]
    fn test_unparseable_value_is_an_error() {
        let err = Config::from_lookup(lookup_from(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_inverted_fee_bounds_are_rejected() {
        let result = Config::from_lookup(lookup_from(&[
            ("SHIPPING_MIN_FEE", "200000"),
            ("SHIPPING_MAX_FEE", "100000"),
        ]));
        assert!(result.is_err());
    }
}
