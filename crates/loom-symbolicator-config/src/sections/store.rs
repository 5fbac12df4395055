// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Debug symbol store configuration.

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

const DEFAULT_LOCAL_ROOT: &str = "/var/lib/loom/dsyms";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Which store serves dSYM bundles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
	#[default]
	Local,
	S3,
	Gcs,
}

impl StoreBackend {
	pub fn as_str(&self) -> &'static str {
		match self {
			StoreBackend::Local => "local",
			StoreBackend::S3 => "s3",
			StoreBackend::Gcs => "gcs",
		}
	}
}

impl std::str::FromStr for StoreBackend {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"local" | "filesystem" => Ok(StoreBackend::Local),
			"s3" => Ok(StoreBackend::S3),
			"gcs" => Ok(StoreBackend::Gcs),
			other => Err(format!("unknown store backend '{other}'")),
		}
	}
}

impl fmt::Display for StoreBackend {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Store configuration (runtime, fully resolved).
#[derive(Clone, PartialEq, Eq)]
pub struct StoreConfig {
	pub backend: StoreBackend,
	pub local_root: PathBuf,
	pub bucket: Option<String>,
	pub prefix: String,
	pub region: Option<String>,
	pub endpoint: Option<String>,
	pub access_key_id: Option<String>,
	pub secret_access_key: Option<String>,
	pub session_token: Option<String>,
	pub gcs_token: Option<String>,
	/// Mint GCS tokens from Application Default Credentials when no static
	/// token is set. Disable for public buckets.
	pub gcs_use_adc: bool,
	pub request_timeout_secs: u64,
}

impl Default for StoreConfig {
	fn default() -> Self {
		StoreConfigLayer::default().finalize()
	}
}

impl fmt::Debug for StoreConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let redacted = |v: &Option<String>| v.as_ref().map(|_| "[REDACTED]");
		f.debug_struct("StoreConfig")
			.field("backend", &self.backend)
			.field("local_root", &self.local_root)
			.field("bucket", &self.bucket)
			.field("prefix", &self.prefix)
			.field("region", &self.region)
			.field("endpoint", &self.endpoint)
			.field("access_key_id", &self.access_key_id)
			.field("secret_access_key", &redacted(&self.secret_access_key))
			.field("session_token", &redacted(&self.session_token))
			.field("gcs_token", &redacted(&self.gcs_token))
			.field("gcs_use_adc", &self.gcs_use_adc)
			.field("request_timeout_secs", &self.request_timeout_secs)
			.finish()
	}
}

/// Store configuration layer (partial, for merging).
#[derive(Clone, Default, Deserialize)]
pub struct StoreConfigLayer {
	#[serde(default)]
	pub backend: Option<StoreBackend>,
	#[serde(default)]
	pub local_root: Option<PathBuf>,
	#[serde(default)]
	pub bucket: Option<String>,
	#[serde(default)]
	pub prefix: Option<String>,
	#[serde(default)]
	pub region: Option<String>,
	#[serde(default)]
	pub endpoint: Option<String>,
	#[serde(default)]
	pub access_key_id: Option<String>,
	#[serde(default)]
	pub secret_access_key: Option<String>,
	#[serde(default)]
	pub session_token: Option<String>,
	#[serde(default)]
	pub gcs_token: Option<String>,
	#[serde(default)]
	pub gcs_use_adc: Option<bool>,
	#[serde(default)]
	pub request_timeout_secs: Option<u64>,
}

impl fmt::Debug for StoreConfigLayer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("StoreConfigLayer")
			.field("backend", &self.backend)
			.field("bucket", &self.bucket)
			.field("prefix", &self.prefix)
			.field("region", &self.region)
			.finish_non_exhaustive()
	}
}

impl StoreConfigLayer {
	pub fn merge(&mut self, other: StoreConfigLayer) {
		if other.backend.is_some() {
			self.backend = other.backend;
		}
		if other.local_root.is_some() {
			self.local_root = other.local_root;
		}
		if other.bucket.is_some() {
			self.bucket = other.bucket;
		}
		if other.prefix.is_some() {
			self.prefix = other.prefix;
		}
		if other.region.is_some() {
			self.region = other.region;
		}
		if other.endpoint.is_some() {
			self.endpoint = other.endpoint;
		}
		if other.access_key_id.is_some() {
			self.access_key_id = other.access_key_id;
		}
		if other.secret_access_key.is_some() {
			self.secret_access_key = other.secret_access_key;
		}
		if other.session_token.is_some() {
			self.session_token = other.session_token;
		}
		if other.gcs_token.is_some() {
			self.gcs_token = other.gcs_token;
		}
		if other.gcs_use_adc.is_some() {
			self.gcs_use_adc = other.gcs_use_adc;
		}
		if other.request_timeout_secs.is_some() {
			self.request_timeout_secs = other.request_timeout_secs;
		}
	}

	pub fn finalize(self) -> StoreConfig {
		StoreConfig {
			backend: self.backend.unwrap_or_default(),
			local_root: self
				.local_root
				.unwrap_or_else(|| PathBuf::from(DEFAULT_LOCAL_ROOT)),
			bucket: self.bucket,
			prefix: self.prefix.unwrap_or_default(),
			region: self.region,
			endpoint: self.endpoint,
			access_key_id: self.access_key_id,
			secret_access_key: self.secret_access_key,
			session_token: self.session_token,
			gcs_token: self.gcs_token,
			gcs_use_adc: self.gcs_use_adc.unwrap_or(true),
			request_timeout_secs: self
				.request_timeout_secs
				.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
		}
	}
}
