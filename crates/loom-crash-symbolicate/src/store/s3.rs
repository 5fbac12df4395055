// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Amazon S3 symbol store.

use std::fmt;

use async_trait::async_trait;
use chrono::Utc;
use loom_crash_core::DebugBundleKey;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use super::sigv4::{encode_key_path, sign_get, SigningParams, UNSIGNED_PAYLOAD};
use super::{StoreError, SymbolStore};

/// Static AWS credentials.
#[derive(Clone)]
pub struct S3Credentials {
	pub access_key_id: String,
	pub secret_access_key: String,
	pub session_token: Option<String>,
}

impl fmt::Debug for S3Credentials {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("S3Credentials")
			.field("access_key_id", &self.access_key_id)
			.field("secret_access_key", &"[REDACTED]")
			.field(
				"session_token",
				&self.session_token.as_ref().map(|_| "[REDACTED]"),
			)
			.finish()
	}
}

#[derive(Debug, Clone)]
pub struct S3StoreConfig {
	pub bucket: String,
	pub prefix: String,
	pub region: String,
	/// Custom endpoint (e.g. MinIO); requests then use path-style addressing.
	pub endpoint: Option<String>,
	/// Anonymous requests are sent when unset.
	pub credentials: Option<S3Credentials>,
}

/// Reads bundles from an S3 bucket below a key prefix.
#[derive(Debug, Clone)]
pub struct S3Store {
	client: Client,
	config: S3StoreConfig,
}

impl S3Store {
	pub fn new(client: Client, config: S3StoreConfig) -> Self {
		Self { client, config }
	}

	fn object_key(&self, key: &DebugBundleKey) -> String {
		key.relative_path(&self.config.prefix)
	}

	/// Request URL plus the host and canonical URI it is signed with.
	fn request_target(&self, object_key: &str) -> Result<(Url, String, String), String> {
		let encoded_key = encode_key_path(object_key);

		let (url, canonical_uri) = match &self.config.endpoint {
			Some(endpoint) => {
				let canonical_uri = format!(
					"/{}/{}",
					urlencoding::encode(&self.config.bucket),
					encoded_key
				);
				let url = format!("{}{}", endpoint.trim_end_matches('/'), canonical_uri);
				(url, canonical_uri)
			}
			None => {
				let canonical_uri = format!("/{encoded_key}");
				let url = format!(
					"https://{}.s3.{}.amazonaws.com{}",
					self.config.bucket, self.config.region, canonical_uri
				);
				(url, canonical_uri)
			}
		};

		let url = Url::parse(&url).map_err(|e| format!("invalid S3 URL {url}: {e}"))?;
		let host = match (url.host_str(), url.port()) {
			(Some(host), Some(port)) => format!("{host}:{port}"),
			(Some(host), None) => host.to_string(),
			(None, _) => return Err(format!("S3 URL {url} has no host")),
		};

		Ok((url, host, canonical_uri))
	}
}

#[async_trait]
impl SymbolStore for S3Store {
	fn bundle_path(&self, key: &DebugBundleKey) -> String {
		format!("s3://{}/{}", self.config.bucket, self.object_key(key))
	}

	async fn fetch(&self, key: &DebugBundleKey) -> Result<Vec<u8>, StoreError> {
		let path = self.bundle_path(key);
		let (url, host, canonical_uri) =
			self.request_target(&self.object_key(key))
				.map_err(|message| StoreError::Io {
					path: path.clone(),
					source: std::io::Error::new(std::io::ErrorKind::InvalidInput, message),
				})?;

		debug!(path = %path, url = %url, "fetching dSYM from S3");
		let mut request = self.client.get(url);

		if let Some(credentials) = &self.config.credentials {
			let signed = sign_get(
				&SigningParams {
					access_key_id: &credentials.access_key_id,
					secret_access_key: &credentials.secret_access_key,
					session_token: credentials.session_token.as_deref(),
					region: &self.config.region,
					service: "s3",
				},
				&host,
				&canonical_uri,
				Utc::now(),
			);
			request = request
				.header("x-amz-date", signed.amz_date)
				.header("x-amz-content-sha256", UNSIGNED_PAYLOAD)
				.header(reqwest::header::AUTHORIZATION, signed.authorization);
			if let Some(token) = &credentials.session_token {
				request = request.header("x-amz-security-token", token);
			}
		}

		let response = request.send().await.map_err(|e| StoreError::Transport {
			path: path.clone(),
			source: e,
		})?;

		match response.status() {
			status if status.is_success() => response
				.bytes()
				.await
				.map(|b| b.to_vec())
				.map_err(|e| StoreError::Transport { path, source: e }),
			StatusCode::NOT_FOUND => Err(StoreError::NotFound { path }),
			status => Err(StoreError::Status {
				path,
				status: status.as_u16(),
			}),
		}
	}
}
