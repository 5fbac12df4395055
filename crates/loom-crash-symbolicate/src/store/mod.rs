// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Debug symbol stores.
//!
//! A store hands back the raw bytes of the DWARF file inside a dSYM bundle.
//! Every backend lays bundles out the same way (see
//! [`loom_crash_core::bundle_relative_path`]) below its own root; failures of
//! any kind are reported as a [`StoreError`] naming the attempted path and are
//! never retried here.

mod gcp_token;
mod gcs;
mod local;
mod memory;
mod s3;
mod sigv4;

pub use gcp_token::{
	AccessTokenSource, ApplicationDefaultCredentials, TokenError, GCS_READ_ONLY_SCOPE,
};
pub use gcs::{GcsCredentials, GcsStore, GcsStoreConfig, DEFAULT_GCS_ENDPOINT};
pub use local::LocalStore;
pub use memory::InMemoryStore;
pub use s3::{S3Credentials, S3Store, S3StoreConfig};

use async_trait::async_trait;
use loom_crash_core::DebugBundleKey;
use thiserror::Error;

/// Failure to obtain a bundle from a store.
#[derive(Debug, Error)]
pub enum StoreError {
	#[error("bundle not found: {path}")]
	NotFound { path: String },

	#[error("failed to read {path}: {source}")]
	Io {
		path: String,
		#[source]
		source: std::io::Error,
	},

	#[error("request for {path} failed: {source}")]
	Transport {
		path: String,
		#[source]
		source: reqwest::Error,
	},

	#[error("request for {path} returned HTTP {status}")]
	Status { path: String, status: u16 },

	#[error("could not authorize request for {path}: {message}")]
	Auth { path: String, message: String },
}

impl StoreError {
	/// The path the store attempted to read.
	pub fn path(&self) -> &str {
		match self {
			Self::NotFound { path }
			| Self::Io { path, .. }
			| Self::Transport { path, .. }
			| Self::Status { path, .. }
			| Self::Auth { path, .. } => path,
		}
	}

	/// Whether the store positively reported the bundle as absent, as opposed
	/// to failing to answer.
	pub fn is_not_found(&self) -> bool {
		matches!(self, Self::NotFound { .. })
	}

	/// Short label for metrics and logs.
	pub fn kind(&self) -> &'static str {
		match self {
			Self::NotFound { .. } => "not_found",
			Self::Io { .. } => "io",
			Self::Transport { .. } => "transport",
			Self::Status { .. } => "status",
			Self::Auth { .. } => "auth",
		}
	}
}

/// Source of raw dSYM bundle bytes.
#[async_trait]
pub trait SymbolStore: Send + Sync {
	/// Human-readable location of the bundle for `key`, used in errors.
	fn bundle_path(&self, key: &DebugBundleKey) -> String;

	/// Fetch the DWARF file for `key`.
	async fn fetch(&self, key: &DebugBundleKey) -> Result<Vec<u8>, StoreError>;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_error_path_and_kind() {
		let err = StoreError::Status {
			path: "bucket/key".to_string(),
			status: 403,
		};
		assert_eq!(err.path(), "bucket/key");
		assert_eq!(err.kind(), "status");
		assert!(!err.is_not_found());

		let err = StoreError::NotFound {
			path: "x".to_string(),
		};
		assert!(err.is_not_found());
	}
}
