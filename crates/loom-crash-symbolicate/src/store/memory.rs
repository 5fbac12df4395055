// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory symbol store for testing and embedding.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use loom_crash_core::DebugBundleKey;

use super::{StoreError, SymbolStore};

/// Holds bundles keyed by [`DebugBundleKey`] and counts fetch calls.
#[derive(Debug, Default)]
pub struct InMemoryStore {
	bundles: RwLock<HashMap<DebugBundleKey, Vec<u8>>>,
	fetches: AtomicUsize,
}

impl InMemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add(&self, debug_id: &str, binary_name: &str, data: Vec<u8>) {
		let key = DebugBundleKey::new(debug_id, binary_name);
		self.bundles
			.write()
			.unwrap_or_else(|poisoned| poisoned.into_inner())
			.insert(key, data);
	}

	/// Number of `fetch` calls served so far, successful or not.
	pub fn fetch_count(&self) -> usize {
		self.fetches.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl SymbolStore for InMemoryStore {
	fn bundle_path(&self, key: &DebugBundleKey) -> String {
		format!("memory://{}", key.relative_path(""))
	}

	async fn fetch(&self, key: &DebugBundleKey) -> Result<Vec<u8>, StoreError> {
		self.fetches.fetch_add(1, Ordering::SeqCst);
		self.bundles
			.read()
			.unwrap_or_else(|poisoned| poisoned.into_inner())
			.get(key)
			.cloned()
			.ok_or_else(|| StoreError::NotFound {
				path: self.bundle_path(key),
			})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_fetch_is_case_insensitive_on_debug_id_and_counted() {
		let store = InMemoryStore::new();
		store.add("abc-def", "App", vec![1, 2, 3]);

		let data = store.fetch(&DebugBundleKey::new("ABC-DEF", "App")).await.unwrap();
		assert_eq!(data, vec![1, 2, 3]);

		let err = store
			.fetch(&DebugBundleKey::new("ABC-DEF", "Other"))
			.await
			.unwrap_err();
		assert!(err.is_not_found());
		assert_eq!(store.fetch_count(), 2);
	}
}
