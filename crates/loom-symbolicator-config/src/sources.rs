// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: environment variables and TOML files.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::SymbolicatorConfigLayer;
use crate::sections::{
	AttributesConfigLayer, CacheConfigLayer, LogFormat, LoggingConfigLayer, ProcessingConfigLayer,
	StoreBackend, StoreConfigLayer,
};

/// Default location of the config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/loom/symbolicator.toml";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<SymbolicatorConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<SymbolicatorConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(SymbolicatorConfigLayer::default())
	}
}

/// TOML file configuration source. A missing file is skipped.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new(SYSTEM_CONFIG_PATH)
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<SymbolicatorConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(SymbolicatorConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: SymbolicatorConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: LOOM_SYMBOLICATOR_<SECTION>_<FIELD>. Secrets may instead be
/// given as a file path in `<VAR>_FILE`.
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<SymbolicatorConfigLayer, ConfigError> {
		debug!("loading environment variables");
		layer_from_env(&|name: &str| std::env::var(name).ok())
	}
}

type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

pub(crate) fn layer_from_env(lookup: Lookup<'_>) -> Result<SymbolicatorConfigLayer, ConfigError> {
	let env = Env { lookup };
	Ok(SymbolicatorConfigLayer {
		store: Some(load_store_from_env(&env)?),
		cache: Some(load_cache_from_env(&env)?),
		attributes: Some(load_attributes_from_env(&env)?),
		logging: Some(load_logging_from_env(&env)?),
		processing: Some(load_processing_from_env(&env)?),
	})
}

struct Env<'a> {
	lookup: Lookup<'a>,
}

impl Env<'_> {
	fn var(&self, name: &str) -> Option<String> {
		(self.lookup)(name).filter(|s| !s.is_empty())
	}

	fn bool(&self, name: &str) -> Option<bool> {
		self.var(name)
			.map(|v| v.eq_ignore_ascii_case("true") || v == "1")
	}

	fn parse<T: std::str::FromStr>(&self, name: &str, kind: &str) -> Result<Option<T>, ConfigError> {
		match self.var(name) {
			Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
				key: name.to_string(),
				message: format!("invalid {kind} value '{v}'"),
			}),
			None => Ok(None),
		}
	}

	/// `<name>_FILE` wins over `<name>`; one trailing newline is stripped
	/// from file contents.
	fn secret(&self, name: &str) -> Result<Option<String>, ConfigError> {
		let file_var = format!("{name}_FILE");
		if let Some(path) = (self.lookup)(&file_var) {
			if path.is_empty() {
				return Err(ConfigError::Secret(format!(
					"secret file path in {file_var} is empty"
				)));
			}
			let content = std::fs::read_to_string(&path).map_err(|e| {
				ConfigError::Secret(format!("failed to read secret file at {path}: {e}"))
			})?;
			return Ok(Some(
				content.strip_suffix('\n').unwrap_or(&content).to_string(),
			));
		}
		Ok(self.var(name))
	}
}

fn load_store_from_env(env: &Env<'_>) -> Result<StoreConfigLayer, ConfigError> {
	let backend = match env.var("LOOM_SYMBOLICATOR_STORE_BACKEND") {
		Some(v) => Some(v.parse::<StoreBackend>().map_err(|message| {
			ConfigError::InvalidValue {
				key: "LOOM_SYMBOLICATOR_STORE_BACKEND".to_string(),
				message,
			}
		})?),
		None => None,
	};

	Ok(StoreConfigLayer {
		backend,
		local_root: env.var("LOOM_SYMBOLICATOR_STORE_LOCAL_ROOT").map(PathBuf::from),
		bucket: env.var("LOOM_SYMBOLICATOR_STORE_BUCKET"),
		prefix: env.var("LOOM_SYMBOLICATOR_STORE_PREFIX"),
		region: env.var("LOOM_SYMBOLICATOR_STORE_REGION"),
		endpoint: env.var("LOOM_SYMBOLICATOR_STORE_ENDPOINT"),
		access_key_id: env.var("LOOM_SYMBOLICATOR_STORE_ACCESS_KEY_ID"),
		secret_access_key: env.secret("LOOM_SYMBOLICATOR_STORE_SECRET_ACCESS_KEY")?,
		session_token: env.secret("LOOM_SYMBOLICATOR_STORE_SESSION_TOKEN")?,
		gcs_token: env.secret("LOOM_SYMBOLICATOR_STORE_GCS_TOKEN")?,
		gcs_use_adc: env.bool("LOOM_SYMBOLICATOR_STORE_GCS_USE_ADC"),
		request_timeout_secs: env.parse("LOOM_SYMBOLICATOR_STORE_REQUEST_TIMEOUT_SECS", "u64")?,
	})
}

fn load_cache_from_env(env: &Env<'_>) -> Result<CacheConfigLayer, ConfigError> {
	Ok(CacheConfigLayer {
		capacity: env.parse("LOOM_SYMBOLICATOR_CACHE_CAPACITY", "u64")?,
		admission_timeout_ms: env.parse("LOOM_SYMBOLICATOR_CACHE_ADMISSION_TIMEOUT_MS", "u64")?,
	})
}

fn load_attributes_from_env(env: &Env<'_>) -> Result<AttributesConfigLayer, ConfigError> {
	let key = |field: &str| env.var(&format!("LOOM_SYMBOLICATOR_ATTRIBUTES_{field}"));
	Ok(AttributesConfigLayer {
		stacktrace_json: key("STACKTRACE_JSON"),
		flat_stacktrace: key("FLAT_STACKTRACE"),
		build_uuid: key("BUILD_UUID"),
		app_executable: key("APP_EXECUTABLE"),
		exception_sources: None,
		flat_exception: None,
		output_stacktrace: key("OUTPUT_STACKTRACE"),
		output_exception_type: key("OUTPUT_EXCEPTION_TYPE"),
		output_exception_message: key("OUTPUT_EXCEPTION_MESSAGE"),
		failed: key("FAILED"),
		error: key("ERROR"),
		original: key("ORIGINAL"),
		preserve_original: env.bool("LOOM_SYMBOLICATOR_ATTRIBUTES_PRESERVE_ORIGINAL"),
	})
}

fn load_logging_from_env(env: &Env<'_>) -> Result<LoggingConfigLayer, ConfigError> {
	let format = match env.var("LOOM_SYMBOLICATOR_LOGGING_FORMAT") {
		Some(v) => Some(v.parse::<LogFormat>().map_err(|message| {
			ConfigError::InvalidValue {
				key: "LOOM_SYMBOLICATOR_LOGGING_FORMAT".to_string(),
				message,
			}
		})?),
		None => None,
	};

	Ok(LoggingConfigLayer {
		level: env.var("LOOM_SYMBOLICATOR_LOGGING_LEVEL"),
		format,
	})
}

fn load_processing_from_env(env: &Env<'_>) -> Result<ProcessingConfigLayer, ConfigError> {
	Ok(ProcessingConfigLayer {
		concurrency: env.parse("LOOM_SYMBOLICATOR_PROCESSING_CONCURRENCY", "usize")?,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;
	use std::io::Write;
	use tempfile::NamedTempFile;

	fn env_layer(vars: &[(&str, &str)]) -> Result<SymbolicatorConfigLayer, ConfigError> {
		let vars: HashMap<String, String> = vars
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();
		layer_from_env(&move |name: &str| vars.get(name).cloned())
	}

	#[test]
	fn test_precedence_ordering() {
		assert!(Precedence::Defaults < Precedence::ConfigFile);
		assert!(Precedence::ConfigFile < Precedence::Environment);
	}

	#[test]
	fn test_missing_toml_file_is_skipped() {
		let layer = TomlSource::new("/nonexistent/symbolicator.toml")
			.load()
			.unwrap();
		assert!(layer.store.is_none());
	}

	#[test]
	fn test_invalid_toml_reports_path() {
		let mut file = NamedTempFile::new().unwrap();
		writeln!(file, "[cache\ncapacity = ").unwrap();
		let err = TomlSource::new(file.path()).load().unwrap_err();
		assert!(matches!(err, ConfigError::TomlParse { .. }));
	}

	#[test]
	fn test_env_store_section() {
		let layer = env_layer(&[
			("LOOM_SYMBOLICATOR_STORE_BACKEND", "S3"),
			("LOOM_SYMBOLICATOR_STORE_BUCKET", "crash-symbols"),
			("LOOM_SYMBOLICATOR_STORE_REGION", "eu-west-1"),
			("LOOM_SYMBOLICATOR_STORE_SECRET_ACCESS_KEY", "direct"),
			("LOOM_SYMBOLICATOR_STORE_PREFIX", ""),
		])
		.unwrap();
		let store = layer.store.unwrap();
		assert_eq!(store.backend, Some(StoreBackend::S3));
		assert_eq!(store.bucket.as_deref(), Some("crash-symbols"));
		assert_eq!(store.secret_access_key.as_deref(), Some("direct"));
		// Empty values count as unset.
		assert!(store.prefix.is_none());
	}

	#[test]
	fn test_env_gcs_adc_flag() {
		let layer = env_layer(&[("LOOM_SYMBOLICATOR_STORE_GCS_USE_ADC", "false")]).unwrap();
		assert_eq!(layer.store.unwrap().gcs_use_adc, Some(false));
	}

	#[test]
	fn test_env_secret_file_wins() {
		let mut file = NamedTempFile::new().unwrap();
		writeln!(file, "from-file").unwrap();
		let path = file.path().display().to_string();

		let layer = env_layer(&[
			("LOOM_SYMBOLICATOR_STORE_GCS_TOKEN", "direct"),
			("LOOM_SYMBOLICATOR_STORE_GCS_TOKEN_FILE", &path),
		])
		.unwrap();
		assert_eq!(layer.store.unwrap().gcs_token.as_deref(), Some("from-file"));
	}

	#[test]
	fn test_env_secret_file_unreadable() {
		let err = env_layer(&[(
			"LOOM_SYMBOLICATOR_STORE_SESSION_TOKEN_FILE",
			"/nonexistent/token",
		)])
		.unwrap_err();
		assert!(matches!(err, ConfigError::Secret(_)));
	}

	#[test]
	fn test_env_invalid_numbers() {
		let err = env_layer(&[("LOOM_SYMBOLICATOR_CACHE_CAPACITY", "lots")]).unwrap_err();
		match err {
			ConfigError::InvalidValue { key, message } => {
				assert_eq!(key, "LOOM_SYMBOLICATOR_CACHE_CAPACITY");
				assert!(message.contains("lots"));
			}
			other => panic!("unexpected error: {other}"),
		}
	}

	#[test]
	fn test_env_attributes_and_logging() {
		let layer = env_layer(&[
			("LOOM_SYMBOLICATOR_ATTRIBUTES_OUTPUT_STACKTRACE", "stack.readable"),
			("LOOM_SYMBOLICATOR_ATTRIBUTES_PRESERVE_ORIGINAL", "1"),
			("LOOM_SYMBOLICATOR_LOGGING_FORMAT", "json"),
			("LOOM_SYMBOLICATOR_PROCESSING_CONCURRENCY", "3"),
		])
		.unwrap();
		let attributes = layer.attributes.unwrap();
		assert_eq!(
			attributes.output_stacktrace.as_deref(),
			Some("stack.readable")
		);
		assert_eq!(attributes.preserve_original, Some(true));
		assert_eq!(layer.logging.unwrap().format, Some(LogFormat::Json));
		assert_eq!(layer.processing.unwrap().concurrency, Some(3));
	}
}
