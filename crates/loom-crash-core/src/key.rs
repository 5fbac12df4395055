// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Debug bundle identity and the dSYM path convention.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Normalize a debug identifier for comparison and storage.
///
/// Debug IDs arrive in whatever case the SDK emitted them; bundles are stored
/// and indexed upper-case.
pub fn normalize_debug_id(debug_id: &str) -> String {
	debug_id.trim().to_ascii_uppercase()
}

/// Build the bundle path relative to a store root.
///
/// Layout follows the Apple dSYM bundle structure:
/// `<prefix>/<debugId>.dSYM/Contents/Resources/DWARF/<binaryName>`.
/// An empty prefix yields a path without a leading separator.
pub fn bundle_relative_path(prefix: &str, debug_id: &str, binary_name: &str) -> String {
	let prefix = prefix.trim_end_matches('/');
	let tail = format!("{debug_id}.dSYM/Contents/Resources/DWARF/{binary_name}");
	if prefix.is_empty() {
		tail
	} else {
		format!("{prefix}/{tail}")
	}
}

/// Names one binary's debug symbols within one build.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DebugBundleKey {
	/// Upper-cased build identifier.
	pub debug_id: String,
	pub binary_name: String,
}

impl DebugBundleKey {
	pub fn new(debug_id: &str, binary_name: impl Into<String>) -> Self {
		Self {
			debug_id: normalize_debug_id(debug_id),
			binary_name: binary_name.into(),
		}
	}

	/// Key under which the parsed bundle is cached.
	pub fn cache_key(&self) -> String {
		format!("{}/{}", self.debug_id, self.binary_name)
	}

	/// Bundle path below `prefix`.
	pub fn relative_path(&self, prefix: &str) -> String {
		bundle_relative_path(prefix, &self.debug_id, &self.binary_name)
	}
}

impl fmt::Display for DebugBundleKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}", self.debug_id, self.binary_name)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn test_relative_path_with_prefix() {
		let key = DebugBundleKey::new("6A8CB813-45F6-3652-AD33-778FD1EAB196", "Chateaux Bufeaux");
		assert_eq!(
			key.relative_path("symbols/ios"),
			"symbols/ios/6A8CB813-45F6-3652-AD33-778FD1EAB196.dSYM/Contents/Resources/DWARF/Chateaux Bufeaux"
		);
	}

	#[test]
	fn test_relative_path_without_prefix() {
		assert_eq!(
			bundle_relative_path("", "ABC", "App"),
			"ABC.dSYM/Contents/Resources/DWARF/App"
		);
	}

	#[test]
	fn test_trailing_slash_prefix_is_not_doubled() {
		assert_eq!(
			bundle_relative_path("dsyms/", "ABC", "App"),
			"dsyms/ABC.dSYM/Contents/Resources/DWARF/App"
		);
	}

	#[test]
	fn test_key_normalizes_case() {
		let key = DebugBundleKey::new(" 6a8cb813-45f6-3652-ad33-778fd1eab196 ", "App");
		assert_eq!(key.debug_id, "6A8CB813-45F6-3652-AD33-778FD1EAB196");
		assert_eq!(key.cache_key(), "6A8CB813-45F6-3652-AD33-778FD1EAB196/App");
	}

	proptest! {
		#[test]
		fn normalize_is_idempotent(id in "[0-9a-fA-F-]{0,40}") {
			let once = normalize_debug_id(&id);
			prop_assert_eq!(normalize_debug_id(&once), once.clone());
			prop_assert!(once.eq_ignore_ascii_case(id.trim()));
		}
	}
}
