// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Builds the configured symbol store.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use loom_crash_symbolicate::{
	http, ApplicationDefaultCredentials, GcsCredentials, GcsStore, GcsStoreConfig, LocalStore,
	S3Credentials, S3Store, S3StoreConfig, SymbolStore,
};
use loom_symbolicator_config::{StoreBackend, StoreConfig};
use tracing::info;

pub fn build_store(config: &StoreConfig) -> anyhow::Result<Arc<dyn SymbolStore>> {
	let timeout = Duration::from_secs(config.request_timeout_secs);

	let store: Arc<dyn SymbolStore> = match config.backend {
		StoreBackend::Local => {
			info!(root = %config.local_root.display(), "using local dSYM store");
			Arc::new(LocalStore::new(config.local_root.clone()))
		}
		StoreBackend::S3 => {
			let bucket = config.bucket.clone().context("S3 store requires a bucket")?;
			let region = config.region.clone().context("S3 store requires a region")?;
			let credentials = match (&config.access_key_id, &config.secret_access_key) {
				(Some(access_key_id), Some(secret_access_key)) => Some(S3Credentials {
					access_key_id: access_key_id.clone(),
					secret_access_key: secret_access_key.clone(),
					session_token: config.session_token.clone(),
				}),
				_ => None,
			};
			info!(
				bucket = %bucket,
				region = %region,
				prefix = %config.prefix,
				signed = credentials.is_some(),
				"using S3 dSYM store"
			);
			let client = http::new_client(timeout).context("failed to build HTTP client")?;
			Arc::new(S3Store::new(
				client,
				S3StoreConfig {
					bucket,
					prefix: config.prefix.clone(),
					region,
					endpoint: config.endpoint.clone(),
					credentials,
				},
			))
		}
		StoreBackend::Gcs => {
			let bucket = config.bucket.clone().context("GCS store requires a bucket")?;
			let credentials = gcs_credentials(config);
			info!(
				bucket = %bucket,
				prefix = %config.prefix,
				credentials = ?credentials,
				"using GCS dSYM store"
			);
			let client = http::new_client(timeout).context("failed to build HTTP client")?;
			Arc::new(GcsStore::new(
				client,
				GcsStoreConfig {
					bucket,
					prefix: config.prefix.clone(),
					endpoint: config.endpoint.clone(),
					credentials,
				},
			))
		}
	};

	Ok(store)
}

/// A configured token wins; otherwise tokens come from Application Default
/// Credentials unless that is switched off.
fn gcs_credentials(config: &StoreConfig) -> GcsCredentials {
	match (&config.gcs_token, config.gcs_use_adc) {
		(Some(token), _) => GcsCredentials::Static(token.clone()),
		(None, true) => GcsCredentials::Source(Arc::new(ApplicationDefaultCredentials::new())),
		(None, false) => GcsCredentials::Anonymous,
	}
}
