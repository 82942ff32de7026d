//! Application configuration
//!
//! Configuration loaded from .shopfront.toml file.

use serde::{Deserialize, Serialize};

/// A product the store is seeded with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSeed {
    pub name: String,
    pub price: f64,
}

impl ProductSeed {
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }
}

/// Application configuration loaded from .shopfront.toml
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    /// Delay before the async price reduction commits, in milliseconds
    #[serde(default = "default_action_delay_ms")]
    pub action_delay_ms: u64,

    /// Amount subtracted from every price by the demo
    #[serde(default = "default_discount_amount")]
    pub discount_amount: f64,

    /// Initial product list
    #[serde(default = "default_products")]
    pub products: Vec<ProductSeed>,
}

fn default_action_delay_ms() -> u64 {
    2000
}

fn default_discount_amount() -> f64 {
    5.0
}

fn default_products() -> Vec<ProductSeed> {
    vec![
        ProductSeed::new("mouse", 20.0),
        ProductSeed::new("keyboard", 40.0),
        ProductSeed::new("headset", 60.0),
        ProductSeed::new("monitor", 80.0),
    ]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            action_delay_ms: default_action_delay_ms(),
            discount_amount: default_discount_amount(),
            products: default_products(),
        }
    }
}

impl AppConfig {
    /// Load config from the first file found (see `config_file`), or use defaults
    pub fn load() -> Self {
        if let Some(source) = crate::load_config_file() {
            match Self::parse(&source.content) {
                Ok(config) => {
                    log::info!("Loaded app config from {}", source.path.display());
                    return config;
                }
                Err(e) => {
                    log::warn!("Failed to parse {}: {}", source.path.display(), e);
                }
            }
        }

        log::debug!("Using default app config");
        Self::default()
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.action_delay_ms, 2000);
        assert_eq!(config.discount_amount, 5.0);
        let prices: Vec<f64> = config.products.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![20.0, 40.0, 60.0, 80.0]);
        assert_eq!(config.products[0].name, "mouse");
    }

    #[test]
    fn test_config_deserialize() {
        let toml = r#"
            action_delay_ms = 50

            [[products]]
            name = "cable"
            price = 3.5
        "#;
        let config = AppConfig::parse(toml).unwrap();
        assert_eq!(config.action_delay_ms, 50);
        assert_eq!(config.products, vec![ProductSeed::new("cable", 3.5)]);
        // discount should use default
        assert_eq!(config.discount_amount, 5.0);
    }

    #[test]
    fn test_config_deserialize_partial() {
        let config = AppConfig::parse("discount_amount = 1.0").unwrap();
        assert_eq!(config.discount_amount, 1.0);
        assert_eq!(config.action_delay_ms, 2000);
        assert_eq!(config.products.len(), 4);
    }

    #[test]
    fn test_config_rejects_bad_types() {
        assert!(AppConfig::parse("action_delay_ms = \"soon\"").is_err());
    }
}
