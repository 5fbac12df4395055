// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Filesystem-backed symbol store.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use loom_crash_core::DebugBundleKey;
use tracing::debug;

use super::{StoreError, SymbolStore};

/// Reads bundles from a directory tree on local disk.
#[derive(Debug, Clone)]
pub struct LocalStore {
	root: PathBuf,
}

impl LocalStore {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	fn full_path(&self, key: &DebugBundleKey) -> PathBuf {
		self.root.join(key.relative_path(""))
	}
}

#[async_trait]
impl SymbolStore for LocalStore {
	fn bundle_path(&self, key: &DebugBundleKey) -> String {
		self.full_path(key).display().to_string()
	}

	async fn fetch(&self, key: &DebugBundleKey) -> Result<Vec<u8>, StoreError> {
		let path = self.full_path(key);
		debug!(path = %path.display(), "reading dSYM from disk");

		tokio::fs::read(&path).await.map_err(|e| {
			let path = path.display().to_string();
			if e.kind() == ErrorKind::NotFound {
				StoreError::NotFound { path }
			} else {
				StoreError::Io { path, source: e }
			}
		})
	}
}
