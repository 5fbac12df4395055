// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! LRU cache of parsed symbol indices and failed fetches.

use std::fmt;
use std::sync::Arc;

use moka::policy::EvictionPolicy;
use moka::sync::Cache;

use crate::resolver::SymbolIndex;
use crate::store::StoreError;

pub const DEFAULT_CACHE_CAPACITY: u64 = 128;

/// A cached outcome for one bundle key.
#[derive(Clone)]
pub enum CacheEntry {
	Resolved(Arc<dyn SymbolIndex>),
	/// The store failed; repeat lookups must not touch it again.
	Negative(Arc<StoreError>),
}

impl fmt::Debug for CacheEntry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Resolved(index) => f.debug_tuple("Resolved").field(index).finish(),
			Self::Negative(err) => f.debug_tuple("Negative").field(&err.to_string()).finish(),
		}
	}
}

/// Positive and negative entries share one key space and one capacity.
/// Clones share the same entries.
#[derive(Clone)]
pub struct SymbolCache {
	inner: Cache<String, CacheEntry>,
	capacity: u64,
}

impl SymbolCache {
	pub fn new(capacity: u64) -> Self {
		let inner = Cache::builder()
			.max_capacity(capacity)
			.eviction_policy(EvictionPolicy::lru())
			.build();
		Self { inner, capacity }
	}

	pub fn get(&self, key: &str) -> Option<CacheEntry> {
		self.inner.get(key)
	}

	/// Insert and settle eviction before returning, so the entry count is
	/// within capacity once this call completes.
	pub fn insert(&self, key: String, entry: CacheEntry) {
		self.inner.insert(key, entry);
		self.inner.run_pending_tasks();
	}

	pub fn entry_count(&self) -> u64 {
		self.inner.entry_count()
	}

	pub fn capacity(&self) -> u64 {
		self.capacity
	}

	pub fn contains(&self, key: &str) -> bool {
		self.inner.contains_key(key)
	}

	pub fn clear(&self) {
		self.inner.invalidate_all();
		self.inner.run_pending_tasks();
	}
}

impl Default for SymbolCache {
	fn default() -> Self {
		Self::new(DEFAULT_CACHE_CAPACITY)
	}
}

impl fmt::Debug for SymbolCache {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SymbolCache")
			.field("capacity", &self.capacity)
			.field("entries", &self.inner.entry_count())
			.finish()
	}
}
