// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Symbol cache and admission configuration.

use std::time::Duration;

use serde::Deserialize;

const DEFAULT_CAPACITY: u64 = 128;
const DEFAULT_ADMISSION_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
	/// Maximum cached bundles, positive and negative entries combined.
	pub capacity: u64,
	pub admission_timeout_ms: u64,
}

impl CacheConfig {
	pub fn admission_timeout(&self) -> Duration {
		Duration::from_millis(self.admission_timeout_ms)
	}
}

impl Default for CacheConfig {
	fn default() -> Self {
		Self {
			capacity: DEFAULT_CAPACITY,
			admission_timeout_ms: DEFAULT_ADMISSION_TIMEOUT_MS,
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheConfigLayer {
	#[serde(default)]
	pub capacity: Option<u64>,
	#[serde(default)]
	pub admission_timeout_ms: Option<u64>,
}

impl CacheConfigLayer {
	pub fn merge(&mut self, other: CacheConfigLayer) {
		if other.capacity.is_some() {
			self.capacity = other.capacity;
		}
		if other.admission_timeout_ms.is_some() {
			self.admission_timeout_ms = other.admission_timeout_ms;
		}
	}

	pub fn finalize(self) -> CacheConfig {
		CacheConfig {
			capacity: self.capacity.unwrap_or(DEFAULT_CAPACITY),
			admission_timeout_ms: self
				.admission_timeout_ms
				.unwrap_or(DEFAULT_ADMISSION_TIMEOUT_MS),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let config = CacheConfigLayer::default().finalize();
		assert_eq!(config.capacity, 128);
		assert_eq!(config.admission_timeout(), Duration::from_secs(5));
	}

	#[test]
	fn test_merge_keeps_unset_fields() {
		let mut base = CacheConfigLayer {
			capacity: Some(64),
			admission_timeout_ms: Some(250),
		};
		base.merge(CacheConfigLayer {
			capacity: Some(512),
			admission_timeout_ms: None,
		});
		let config = base.finalize();
		assert_eq!(config.capacity, 512);
		assert_eq!(config.admission_timeout_ms, 250);
	}
}
