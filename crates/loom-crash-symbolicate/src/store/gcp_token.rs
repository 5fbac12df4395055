// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! OAuth access tokens for the GCS store.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use gcp_auth::TokenProvider;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, error};

pub const GCS_READ_ONLY_SCOPE: &str = "https://www.googleapis.com/auth/devstorage.read_only";

/// Cached tokens are replaced this long before they are assumed to expire.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Lifetime assumed for a freshly minted token.
const TOKEN_LIFETIME: Duration = Duration::from_secs(3500);

#[derive(Debug, Error)]
#[error("{0}")]
pub struct TokenError(pub String);

/// Supplies a bearer token for each GCS request.
#[async_trait]
pub trait AccessTokenSource: Send + Sync {
	async fn access_token(&self) -> Result<String, TokenError>;

	/// Forget any cached token; called after the server rejected one.
	async fn invalidate(&self) {}
}

/// Cached access token with expiry tracking.
struct CachedToken {
	token: String,
	expires_at: Instant,
}

impl CachedToken {
	fn is_fresh(&self, now: Instant) -> bool {
		self.expires_at > now + REFRESH_MARGIN
	}
}

/// Tokens from Application Default Credentials, minted lazily and refreshed
/// shortly before they expire.
#[derive(Default)]
pub struct ApplicationDefaultCredentials {
	provider: RwLock<Option<Arc<dyn TokenProvider>>>,
	cached: RwLock<Option<CachedToken>>,
}

impl ApplicationDefaultCredentials {
	pub fn new() -> Self {
		Self::default()
	}

	async fn provider(&self) -> Result<Arc<dyn TokenProvider>, TokenError> {
		let mut provider_guard = self.provider.write().await;
		if let Some(provider) = provider_guard.as_ref() {
			return Ok(Arc::clone(provider));
		}

		debug!("Initializing GCP authentication provider");
		let provider = gcp_auth::provider().await.map_err(|e| {
			error!(error = %e, "Failed to initialize GCP auth");
			TokenError(format!("GCP auth initialization failed: {e}"))
		})?;
		*provider_guard = Some(Arc::clone(&provider));
		Ok(provider)
	}
}

impl fmt::Debug for ApplicationDefaultCredentials {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ApplicationDefaultCredentials")
			.finish_non_exhaustive()
	}
}

#[async_trait]
impl AccessTokenSource for ApplicationDefaultCredentials {
	async fn access_token(&self) -> Result<String, TokenError> {
		{
			let cached = self.cached.read().await;
			if let Some(token) = cached.as_ref() {
				if token.is_fresh(Instant::now()) {
					return Ok(token.token.clone());
				}
			}
		}

		let provider = self.provider().await?;
		let token = provider.token(&[GCS_READ_ONLY_SCOPE]).await.map_err(|e| {
			error!(error = %e, "Failed to get GCP access token");
			TokenError(format!("GCP token acquisition failed: {e}"))
		})?;
		let token = token.as_str().to_string();

		*self.cached.write().await = Some(CachedToken {
			token: token.clone(),
			expires_at: Instant::now() + TOKEN_LIFETIME,
		});

		Ok(token)
	}

	async fn invalidate(&self) {
		*self.cached.write().await = None;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn cached(expires_in: Duration, now: Instant) -> CachedToken {
		CachedToken {
			token: "ya29.token".to_string(),
			expires_at: now + expires_in,
		}
	}

	#[test]
	fn test_token_is_fresh_well_before_expiry() {
		let now = Instant::now();
		assert!(cached(TOKEN_LIFETIME, now).is_fresh(now));
	}

	#[test]
	fn test_token_inside_refresh_margin_is_stale() {
		let now = Instant::now();
		assert!(!cached(REFRESH_MARGIN, now).is_fresh(now));
		assert!(!cached(Duration::from_secs(5), now).is_fresh(now));
	}

	#[tokio::test]
	async fn test_invalidate_drops_cached_token() {
		let credentials = ApplicationDefaultCredentials::new();
		*credentials.cached.write().await = Some(cached(TOKEN_LIFETIME, Instant::now()));

		assert_eq!(credentials.access_token().await.unwrap(), "ya29.token");
		credentials.invalidate().await;
		assert!(credentials.cached.read().await.is_none());
	}
}
