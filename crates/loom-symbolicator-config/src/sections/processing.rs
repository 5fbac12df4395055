// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Batch processing configuration.

use loom_crash_pipeline::DEFAULT_BATCH_CONCURRENCY;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingConfig {
	/// Records symbolicated concurrently within one batch.
	pub concurrency: usize,
}

impl Default for ProcessingConfig {
	fn default() -> Self {
		Self {
			concurrency: DEFAULT_BATCH_CONCURRENCY,
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessingConfigLayer {
	#[serde(default)]
	pub concurrency: Option<usize>,
}

impl ProcessingConfigLayer {
	pub fn merge(&mut self, other: ProcessingConfigLayer) {
		if other.concurrency.is_some() {
			self.concurrency = other.concurrency;
		}
	}

	pub fn finalize(self) -> ProcessingConfig {
		ProcessingConfig {
			concurrency: self.concurrency.unwrap_or(DEFAULT_BATCH_CONCURRENCY),
		}
	}
}
