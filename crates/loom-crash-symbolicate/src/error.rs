// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for symbolication operations.

use std::sync::Arc;
use std::time::Duration;

use loom_crash_core::CrashError;
use thiserror::Error;

use crate::resolver::ResolverError;
use crate::store::StoreError;

/// Errors that can occur during symbolication.
#[derive(Debug, Error)]
pub enum SymbolicateError {
	#[error("missing required attribute: {0}")]
	MissingAttribute(String),

	#[error("failed to parse crash payload: {0}")]
	Parse(String),

	#[error("debug symbol bundle unavailable at {path}{}", cached_suffix(.cached))]
	SymbolBundleUnavailable {
		path: String,
		cached: bool,
		#[source]
		source: Arc<StoreError>,
	},

	#[error("no symbols for debug id {debug_id} in bundle")]
	SymbolIndexNotFound { debug_id: String },

	#[error("no symbol found at address {address:#x} for debug id {debug_id}")]
	SymbolNotFoundAtAddress { debug_id: String, address: u64 },

	#[error("timed out after {timeout:?} waiting for symbolication admission")]
	AdmissionTimeout { timeout: Duration },

	#[error("failed to parse debug symbol bundle: {0}")]
	InvalidBundle(#[from] ResolverError),
}

fn cached_suffix(cached: &bool) -> &'static str {
	if *cached {
		" (cached)"
	} else {
		""
	}
}

impl SymbolicateError {
	/// Whether the bundle could not be fetched, fresh or from the negative cache.
	pub fn is_bundle_unavailable(&self) -> bool {
		matches!(self, Self::SymbolBundleUnavailable { .. })
	}

	/// Whether the error concerns resolving one address rather than the
	/// machinery around it.
	pub fn is_resolution_failure(&self) -> bool {
		matches!(
			self,
			Self::SymbolBundleUnavailable { .. }
				| Self::SymbolIndexNotFound { .. }
				| Self::SymbolNotFoundAtAddress { .. }
				| Self::InvalidBundle(_)
		)
	}
}

impl From<CrashError> for SymbolicateError {
	fn from(e: CrashError) -> Self {
		Self::Parse(e.to_string())
	}
}

pub type Result<T> = std::result::Result<T, SymbolicateError>;
