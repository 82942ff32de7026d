//! Configuration and file management for shopfront
//!
//! This crate provides:
//! - Configuration file loading (TOML)
//! - Application configuration (AppConfig)
//! - Cache directory for log files

pub mod app_config;
pub mod config_file;
pub mod paths;

pub use app_config::{AppConfig, ProductSeed};
pub use config_file::{load_config_file, ConfigSource};
pub use paths::cache_dir;
