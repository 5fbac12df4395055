// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! JSON-described symbol tables for testing and simple use cases.

use std::sync::Arc;

use loom_crash_core::{normalize_debug_id, ResolvedLocation};
use serde::{Deserialize, Serialize};

use super::{ObjectIndex, ResolverError, SymbolIndex, SymbolResolver};

/// A symbol covering `[start, end)` and the locations it resolves to.
///
/// `instruction_address` of each location is replaced by the looked-up
/// address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticSymbol {
	pub start: u64,
	pub end: u64,
	pub locations: Vec<ResolvedLocation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticObject {
	pub debug_id: String,
	pub symbols: Vec<StaticSymbol>,
}

impl ObjectIndex for StaticObject {
	fn lookup(&self, address: u64) -> Vec<ResolvedLocation> {
		self.symbols
			.iter()
			.find(|s| s.start <= address && address < s.end)
			.map(|s| {
				s.locations
					.iter()
					.cloned()
					.map(|mut location| {
						location.instruction_address = address;
						location
					})
					.collect()
			})
			.unwrap_or_default()
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticIndex {
	pub objects: Vec<StaticObject>,
}

impl StaticIndex {
	/// The JSON document [`StaticResolver`] parses.
	pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
		serde_json::to_vec(self)
	}
}

impl SymbolIndex for StaticIndex {
	fn object(&self, debug_id: &str) -> Option<&dyn ObjectIndex> {
		self.objects
			.iter()
			.find(|o| o.debug_id == debug_id)
			.map(|o| o as &dyn ObjectIndex)
	}

	fn debug_ids(&self) -> Vec<String> {
		self.objects.iter().map(|o| o.debug_id.clone()).collect()
	}
}

/// Parses JSON-encoded [`StaticIndex`] documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticResolver;

impl SymbolResolver for StaticResolver {
	fn parse(&self, data: &[u8]) -> Result<Arc<dyn SymbolIndex>, ResolverError> {
		let mut index: StaticIndex =
			serde_json::from_slice(data).map_err(|e| ResolverError::Malformed(e.to_string()))?;
		if index.objects.is_empty() {
			return Err(ResolverError::Empty);
		}
		for object in &mut index.objects {
			object.debug_id = normalize_debug_id(&object.debug_id);
		}
		Ok(Arc::new(index))
	}
}
