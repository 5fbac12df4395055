// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration management for the Loom dSYM symbolicator.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`LOOM_SYMBOLICATOR_*`)
//!
//! # Usage
//!
//! ```ignore
//! use loom_symbolicator_config::load_config;
//!
//! let config = load_config()?;
//! println!("Serving dSYMs from the {} store", config.store.backend);
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::SymbolicatorConfigLayer;
pub use sections::*;
pub use sources::{
	ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource, SYSTEM_CONFIG_PATH,
};

use loom_crash_pipeline::AttributeKeys;
use tracing::{debug, info};

/// Fully resolved symbolicator configuration.
#[derive(Debug, Clone, Default)]
pub struct SymbolicatorConfig {
	pub store: StoreConfig,
	pub cache: CacheConfig,
	pub attributes: AttributeKeys,
	pub logging: LoggingConfig,
	pub processing: ProcessingConfig,
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`LOOM_SYMBOLICATOR_*`)
/// 2. Config file (`/etc/loom/symbolicator.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<SymbolicatorConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<SymbolicatorConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<SymbolicatorConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = SymbolicatorConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize a merged configuration layer into resolved config.
pub fn finalize(layer: SymbolicatorConfigLayer) -> Result<SymbolicatorConfig, ConfigError> {
	let config = SymbolicatorConfig {
		store: layer.store.unwrap_or_default().finalize(),
		cache: layer.cache.unwrap_or_default().finalize(),
		attributes: layer.attributes.unwrap_or_default().finalize(),
		logging: layer.logging.unwrap_or_default().finalize(),
		processing: layer.processing.unwrap_or_default().finalize(),
	};

	validate_config(&config)?;

	info!(
		backend = %config.store.backend,
		bucket = config.store.bucket.as_deref().unwrap_or(""),
		prefix = %config.store.prefix,
		cache_capacity = config.cache.capacity,
		admission_timeout_ms = config.cache.admission_timeout_ms,
		preserve_original = config.attributes.preserve_original,
		concurrency = config.processing.concurrency,
		"Symbolicator configuration loaded"
	);

	Ok(config)
}

/// Validate cross-field configuration rules.
fn validate_config(config: &SymbolicatorConfig) -> Result<(), ConfigError> {
	let store = &config.store;
	match store.backend {
		StoreBackend::Local => {}
		StoreBackend::S3 => {
			if store.bucket.is_none() {
				return Err(ConfigError::Validation(
					"S3 store requires LOOM_SYMBOLICATOR_STORE_BUCKET".to_string(),
				));
			}
			if store.region.is_none() {
				return Err(ConfigError::Validation(
					"S3 store requires LOOM_SYMBOLICATOR_STORE_REGION".to_string(),
				));
			}
			if store.access_key_id.is_some() != store.secret_access_key.is_some() {
				return Err(ConfigError::Validation(
					"S3 access key id and secret access key must be set together".to_string(),
				));
			}
		}
		StoreBackend::Gcs => {
			if store.bucket.is_none() {
				return Err(ConfigError::Validation(
					"GCS store requires LOOM_SYMBOLICATOR_STORE_BUCKET".to_string(),
				));
			}
		}
	}

	if store.request_timeout_secs == 0 {
		return Err(ConfigError::Validation(
			"store request timeout must be greater than zero".to_string(),
		));
	}
	if config.cache.capacity == 0 {
		return Err(ConfigError::Validation(
			"cache capacity must be greater than zero".to_string(),
		));
	}
	if config.cache.admission_timeout_ms == 0 {
		return Err(ConfigError::Validation(
			"cache admission timeout must be greater than zero".to_string(),
		));
	}
	if config.processing.concurrency == 0 {
		return Err(ConfigError::Validation(
			"processing concurrency must be greater than zero".to_string(),
		));
	}

	Ok(())
}
