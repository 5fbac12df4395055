// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Frame symbolication with caching and a global admission gate.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use loom_crash_core::{DebugBundleKey, ResolvedLocation};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, instrument, warn};

use crate::cache::{CacheEntry, SymbolCache, DEFAULT_CACHE_CAPACITY};
use crate::error::{Result, SymbolicateError};
use crate::metrics::{NoopMetrics, SymbolicationMetrics};
use crate::resolver::{ResolverError, SymbolIndex, SymbolResolver};
use crate::store::SymbolStore;

pub const DEFAULT_ADMISSION_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolicationConfig {
	pub cache_capacity: u64,
	pub admission_timeout: Duration,
}

impl Default for SymbolicationConfig {
	fn default() -> Self {
		Self {
			cache_capacity: DEFAULT_CACHE_CAPACITY,
			admission_timeout: DEFAULT_ADMISSION_TIMEOUT,
		}
	}
}

/// Resolves one instruction offset to its source locations.
#[async_trait]
pub trait FrameSymbolicator: Send + Sync {
	async fn symbolicate_frame(
		&self,
		debug_id: &str,
		binary_name: &str,
		address: u64,
	) -> Result<Vec<ResolvedLocation>>;
}

/// Owns the store, the cache and the admission gate. Build one per process
/// and share it by reference.
pub struct SymbolicationService {
	loader: BundleLoader,
	gate: Arc<Semaphore>,
	admission_timeout: Duration,
}

impl SymbolicationService {
	pub fn new(
		store: Arc<dyn SymbolStore>,
		resolver: Arc<dyn SymbolResolver>,
		config: SymbolicationConfig,
	) -> Self {
		Self {
			loader: BundleLoader {
				store,
				resolver,
				cache: SymbolCache::new(config.cache_capacity),
				metrics: Arc::new(NoopMetrics),
			},
			gate: Arc::new(Semaphore::new(1)),
			admission_timeout: config.admission_timeout,
		}
	}

	pub fn with_metrics(mut self, metrics: Arc<dyn SymbolicationMetrics>) -> Self {
		self.loader.metrics = metrics;
		self
	}

	pub fn cache(&self) -> &SymbolCache {
		&self.loader.cache
	}

	fn metrics(&self) -> &dyn SymbolicationMetrics {
		self.loader.metrics.as_ref()
	}

	async fn admit(&self) -> Result<OwnedSemaphorePermit> {
		match tokio::time::timeout(self.admission_timeout, self.gate.clone().acquire_owned()).await
		{
			Ok(Ok(permit)) => Ok(permit),
			// The gate is never closed, but a closed gate admits nobody either.
			Ok(Err(_)) | Err(_) => {
				warn!(timeout = ?self.admission_timeout, "symbolication admission timed out");
				Err(SymbolicateError::AdmissionTimeout {
					timeout: self.admission_timeout,
				})
			}
		}
	}

	async fn resolve_locked(
		&self,
		debug_id: &str,
		binary_name: &str,
		address: u64,
	) -> Result<Vec<ResolvedLocation>> {
		let permit = self.admit().await?;
		let key = DebugBundleKey::new(debug_id, binary_name);

		let (index, _permit) = match self.loader.cached(&key)? {
			Some(index) => (index, permit),
			None => {
				// The load owns the permit until the bundle is cached, so a
				// caller that goes away neither aborts it nor lets another
				// load of the same bundle start alongside it.
				let loader = self.loader.clone();
				let task_key = key.clone();
				let (result, permit) = tokio::spawn(async move {
					let result = loader.load(&task_key).await;
					(result, permit)
				})
				.await
				.map_err(|e| {
					SymbolicateError::InvalidBundle(ResolverError::Malformed(format!(
						"bundle loader task failed: {e}"
					)))
				})?;
				(result?, permit)
			}
		};

		let object = index
			.object(&key.debug_id)
			.ok_or_else(|| SymbolicateError::SymbolIndexNotFound {
				debug_id: key.debug_id.clone(),
			})?;

		let locations = object.lookup(address);
		if locations.is_empty() {
			return Err(SymbolicateError::SymbolNotFoundAtAddress {
				debug_id: key.debug_id,
				address,
			});
		}
		Ok(locations)
	}
}

/// Everything a cache miss needs, cheap to clone onto its own task.
#[derive(Clone)]
struct BundleLoader {
	store: Arc<dyn SymbolStore>,
	resolver: Arc<dyn SymbolResolver>,
	cache: SymbolCache,
	metrics: Arc<dyn SymbolicationMetrics>,
}

impl BundleLoader {
	/// `Ok(None)` on a miss; a negative entry is an error.
	fn cached(&self, key: &DebugBundleKey) -> Result<Option<Arc<dyn SymbolIndex>>> {
		match self.cache.get(&key.cache_key()) {
			Some(CacheEntry::Resolved(index)) => Ok(Some(index)),
			Some(CacheEntry::Negative(source)) => Err(SymbolicateError::SymbolBundleUnavailable {
				path: source.path().to_string(),
				cached: true,
				source,
			}),
			None => Ok(None),
		}
	}

	/// Fetch, parse and cache one bundle.
	async fn load(&self, key: &DebugBundleKey) -> Result<Arc<dyn SymbolIndex>> {
		let cache_key = key.cache_key();

		let data = match self.store.fetch(key).await {
			Ok(data) => data,
			Err(e) => {
				let source = Arc::new(e);
				warn!(
					path = %source.path(),
					kind = source.kind(),
					error = %source,
					"failed to fetch debug symbol bundle"
				);
				self.cache
					.insert(cache_key, CacheEntry::Negative(source.clone()));
				self.metrics.record_fetch_failure(source.kind());
				self.metrics.record_cache_size(self.cache.entry_count());
				return Err(SymbolicateError::SymbolBundleUnavailable {
					path: source.path().to_string(),
					cached: false,
					source,
				});
			}
		};

		let resolver = self.resolver.clone();
		let index = tokio::task::spawn_blocking(move || resolver.parse(&data))
			.await
			.map_err(|e| {
				SymbolicateError::InvalidBundle(ResolverError::Malformed(format!(
					"parser task failed: {e}"
				)))
			})??;

		debug!(key = %cache_key, objects = ?index.debug_ids(), "parsed debug symbol bundle");
		self.cache
			.insert(cache_key, CacheEntry::Resolved(index.clone()));
		self.metrics.record_cache_size(self.cache.entry_count());
		Ok(index)
	}
}

#[async_trait]
impl FrameSymbolicator for SymbolicationService {
	#[instrument(skip(self))]
	async fn symbolicate_frame(
		&self,
		debug_id: &str,
		binary_name: &str,
		address: u64,
	) -> Result<Vec<ResolvedLocation>> {
		let started = Instant::now();
		let result = self.resolve_locked(debug_id, binary_name, address).await;
		self.metrics()
			.record_lookup_duration(started.elapsed(), outcome_label(&result));
		result
	}
}

fn outcome_label(result: &Result<Vec<ResolvedLocation>>) -> &'static str {
	match result {
		Ok(_) => "resolved",
		Err(SymbolicateError::SymbolBundleUnavailable { cached: true, .. }) => {
			"bundle_unavailable_cached"
		}
		Err(SymbolicateError::SymbolBundleUnavailable { .. }) => "bundle_unavailable",
		Err(SymbolicateError::SymbolIndexNotFound { .. }) => "index_not_found",
		Err(SymbolicateError::SymbolNotFoundAtAddress { .. }) => "address_not_found",
		Err(SymbolicateError::AdmissionTimeout { .. }) => "admission_timeout",
		Err(SymbolicateError::InvalidBundle(_)) => "invalid_bundle",
		Err(_) => "error",
	}
}
