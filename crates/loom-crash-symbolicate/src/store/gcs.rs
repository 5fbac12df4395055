// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Google Cloud Storage symbol store.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use loom_crash_core::DebugBundleKey;
use reqwest::{Client, StatusCode};
use tracing::debug;

use super::gcp_token::AccessTokenSource;
use super::{StoreError, SymbolStore};

pub const DEFAULT_GCS_ENDPOINT: &str = "https://storage.googleapis.com";

/// How GCS requests are authorized.
#[derive(Clone, Default)]
pub enum GcsCredentials {
	/// No `Authorization` header; public buckets only.
	#[default]
	Anonymous,
	/// A fixed OAuth2 access token. These expire after about an hour.
	Static(String),
	/// A token fetched per request from a refreshing source.
	Source(Arc<dyn AccessTokenSource>),
}

impl fmt::Debug for GcsCredentials {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Anonymous => f.write_str("Anonymous"),
			Self::Static(_) => f.write_str("Static([REDACTED])"),
			Self::Source(_) => f.write_str("Source"),
		}
	}
}

#[derive(Debug, Clone)]
pub struct GcsStoreConfig {
	pub bucket: String,
	pub prefix: String,
	/// Defaults to [`DEFAULT_GCS_ENDPOINT`]; override for emulators.
	pub endpoint: Option<String>,
	pub credentials: GcsCredentials,
}

/// Reads bundles through the GCS JSON API media download.
#[derive(Debug, Clone)]
pub struct GcsStore {
	client: Client,
	config: GcsStoreConfig,
}

impl GcsStore {
	pub fn new(client: Client, config: GcsStoreConfig) -> Self {
		Self { client, config }
	}

	fn object_name(&self, key: &DebugBundleKey) -> String {
		key.relative_path(&self.config.prefix)
	}

	fn media_url(&self, object_name: &str) -> String {
		let endpoint = self
			.config
			.endpoint
			.as_deref()
			.unwrap_or(DEFAULT_GCS_ENDPOINT)
			.trim_end_matches('/');
		format!(
			"{endpoint}/storage/v1/b/{}/o/{}?alt=media",
			urlencoding::encode(&self.config.bucket),
			urlencoding::encode(object_name)
		)
	}

	async fn bearer_token(&self, path: &str) -> Result<Option<String>, StoreError> {
		match &self.config.credentials {
			GcsCredentials::Anonymous => Ok(None),
			GcsCredentials::Static(token) => Ok(Some(token.clone())),
			GcsCredentials::Source(source) => {
				source
					.access_token()
					.await
					.map(Some)
					.map_err(|e| StoreError::Auth {
						path: path.to_string(),
						message: e.to_string(),
					})
			}
		}
	}
}

#[async_trait]
impl SymbolStore for GcsStore {
	fn bundle_path(&self, key: &DebugBundleKey) -> String {
		format!("gs://{}/{}", self.config.bucket, self.object_name(key))
	}

	async fn fetch(&self, key: &DebugBundleKey) -> Result<Vec<u8>, StoreError> {
		let path = self.bundle_path(key);
		let url = self.media_url(&self.object_name(key));
		debug!(path = %path, "fetching dSYM from GCS");

		let mut request = self.client.get(&url);
		if let Some(token) = self.bearer_token(&path).await? {
			request = request.bearer_auth(token);
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
			StatusCode::UNAUTHORIZED => {
				if let GcsCredentials::Source(source) = &self.config.credentials {
					source.invalidate().await;
				}
				Err(StoreError::Status {
					path,
					status: StatusCode::UNAUTHORIZED.as_u16(),
				})
			}
			status => Err(StoreError::Status {
				path,
				status: status.as_u16(),
			}),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::store::TokenError;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use wiremock::matchers::{header, method, path, query_param};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	const OBJECT_PATH: &str =
		"/storage/v1/b/crash-symbols/o/dsyms%2FABC.dSYM%2FContents%2FResources%2FDWARF%2FApp";

	fn store_with(endpoint: &str, credentials: GcsCredentials) -> GcsStore {
		GcsStore::new(
			Client::new(),
			GcsStoreConfig {
				bucket: "crash-symbols".to_string(),
				prefix: "dsyms".to_string(),
				endpoint: Some(endpoint.to_string()),
				credentials,
			},
		)
	}

	fn store(endpoint: &str, bearer_token: Option<&str>) -> GcsStore {
		let credentials = match bearer_token {
			Some(token) => GcsCredentials::Static(token.to_string()),
			None => GcsCredentials::Anonymous,
		};
		store_with(endpoint, credentials)
	}

	/// Hands out `token-1`, `token-2`, ... and counts invalidations.
	#[derive(Default)]
	struct RotatingTokens {
		issued: AtomicUsize,
		invalidated: AtomicUsize,
		fail: bool,
	}

	#[async_trait]
	impl AccessTokenSource for RotatingTokens {
		async fn access_token(&self) -> Result<String, TokenError> {
			if self.fail {
				return Err(TokenError("no credentials found".to_string()));
			}
			let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
			Ok(format!("token-{n}"))
		}

		async fn invalidate(&self) {
			self.invalidated.fetch_add(1, Ordering::SeqCst);
		}
	}

	#[test]
	fn test_media_url_encodes_whole_object_name() {
		let store = store("https://storage.googleapis.com/", None);
		let url = store.media_url("dsyms/ABC.dSYM/Contents/Resources/DWARF/My App");
		assert_eq!(
			url,
			"https://storage.googleapis.com/storage/v1/b/crash-symbols/o/dsyms%2FABC.dSYM%2FContents%2FResources%2FDWARF%2FMy%20App?alt=media"
		);
	}

	#[test]
	fn test_debug_redacts_token() {
		let rendered = format!("{:?}", store("http://x", Some("ya29.secret")).config);
		assert!(!rendered.contains("ya29.secret"));
	}

	#[tokio::test]
	async fn test_fetch_with_bearer_token() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path(OBJECT_PATH))
			.and(query_param("alt", "media"))
			.and(header("authorization", "Bearer ya29.token"))
			.respond_with(ResponseTemplate::new(200).set_body_bytes(b"dwarf".to_vec()))
			.expect(1)
			.mount(&server)
			.await;

		let store = store(&server.uri(), Some("ya29.token"));
		let data = store.fetch(&DebugBundleKey::new("abc", "App")).await.unwrap();
		assert_eq!(data, b"dwarf");
	}

	#[tokio::test]
	async fn test_missing_object_is_not_found() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.respond_with(ResponseTemplate::new(404))
			.mount(&server)
			.await;

		let err = store(&server.uri(), None)
			.fetch(&DebugBundleKey::new("ABC", "App"))
			.await
			.unwrap_err();
		assert!(err.is_not_found());
		assert_eq!(
			err.path(),
			"gs://crash-symbols/dsyms/ABC.dSYM/Contents/Resources/DWARF/App"
		);
	}

	#[tokio::test]
	async fn test_server_error_is_status_error() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.respond_with(ResponseTemplate::new(503))
			.mount(&server)
			.await;

		let err = store(&server.uri(), None)
			.fetch(&DebugBundleKey::new("ABC", "App"))
			.await
			.unwrap_err();
		assert!(matches!(err, StoreError::Status { status: 503, .. }));
	}

	#[tokio::test]
	async fn test_token_source_is_asked_on_every_fetch() {
		let server = MockServer::start().await;
		for token in ["token-1", "token-2"] {
			Mock::given(method("GET"))
				.and(path(OBJECT_PATH))
				.and(header("authorization", format!("Bearer {token}").as_str()))
				.respond_with(ResponseTemplate::new(200).set_body_bytes(b"dwarf".to_vec()))
				.expect(1)
				.mount(&server)
				.await;
		}

		let tokens = Arc::new(RotatingTokens::default());
		let store = store_with(&server.uri(), GcsCredentials::Source(tokens.clone()));
		let key = DebugBundleKey::new("ABC", "App");
		store.fetch(&key).await.unwrap();
		store.fetch(&key).await.unwrap();

		assert_eq!(tokens.issued.load(Ordering::SeqCst), 2);
	}

	#[tokio::test]
	async fn test_unauthorized_invalidates_token() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.respond_with(ResponseTemplate::new(401))
			.mount(&server)
			.await;

		let tokens = Arc::new(RotatingTokens::default());
		let store = store_with(&server.uri(), GcsCredentials::Source(tokens.clone()));
		let err = store
			.fetch(&DebugBundleKey::new("ABC", "App"))
			.await
			.unwrap_err();

		assert!(matches!(err, StoreError::Status { status: 401, .. }));
		assert_eq!(tokens.invalidated.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn test_token_failure_is_auth_error_without_request() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.respond_with(ResponseTemplate::new(200))
			.expect(0)
			.mount(&server)
			.await;

		let tokens = Arc::new(RotatingTokens {
			fail: true,
			..RotatingTokens::default()
		});
		let err = store_with(&server.uri(), GcsCredentials::Source(tokens))
			.fetch(&DebugBundleKey::new("ABC", "App"))
			.await
			.unwrap_err();

		assert_eq!(err.kind(), "auth");
		assert!(err.to_string().contains("no credentials found"));
	}
}
