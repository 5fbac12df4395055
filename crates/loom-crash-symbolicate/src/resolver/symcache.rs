// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! DWARF symbolication backed by `symbolic` symcaches.
//!
//! Each object in the debug file is converted once into a compact symcache;
//! lookups then read that buffer directly.

use std::fmt;
use std::sync::Arc;

use loom_crash_core::{normalize_debug_id, ResolvedLocation};
use symbolic::debuginfo::Archive;
use symbolic::symcache::{SymCache, SymCacheConverter};
use tracing::{debug, warn};

use super::{ObjectIndex, ResolverError, SymbolIndex, SymbolResolver};
use crate::demangle::demangle_symbol;

/// Parses Mach-O / ELF debug files into [`SymCacheIndex`]es.
#[derive(Debug, Default, Clone, Copy)]
pub struct SymCacheResolver;

impl SymCacheResolver {
	pub fn new() -> Self {
		Self
	}
}

impl SymbolResolver for SymCacheResolver {
	fn parse(&self, data: &[u8]) -> Result<Arc<dyn SymbolIndex>, ResolverError> {
		let archive = Archive::parse(data).map_err(|e| ResolverError::Malformed(e.to_string()))?;

		let mut objects = Vec::new();
		for object in archive.objects() {
			let object = object.map_err(|e| ResolverError::Malformed(e.to_string()))?;
			let debug_id = normalize_debug_id(&object.debug_id().uuid().to_string());
			let arch = object.arch().name().to_string();

			let mut converter = SymCacheConverter::new();
			converter
				.process_object(&object)
				.map_err(|e| ResolverError::Malformed(e.to_string()))?;
			let mut buffer = Vec::new();
			converter.serialize(&mut buffer)?;

			// Validate once so lookups can rely on the buffer.
			SymCache::parse(&buffer).map_err(|e| ResolverError::Malformed(e.to_string()))?;

			debug!(debug_id = %debug_id, arch = %arch, size = buffer.len(), "built symcache");
			objects.push(SymCacheObject {
				debug_id,
				arch,
				data: buffer,
			});
		}

		if objects.is_empty() {
			return Err(ResolverError::Empty);
		}

		Ok(Arc::new(SymCacheIndex { objects }))
	}
}

struct SymCacheObject {
	debug_id: String,
	arch: String,
	data: Vec<u8>,
}

impl ObjectIndex for SymCacheObject {
	fn lookup(&self, address: u64) -> Vec<ResolvedLocation> {
		let symcache = match SymCache::parse(&self.data) {
			Ok(symcache) => symcache,
			Err(e) => {
				warn!(error = %e, debug_id = %self.debug_id, "symcache failed to reparse");
				return Vec::new();
			}
		};

		symcache
			.lookup(address)
			.map(|location| {
				let function = location.function();
				ResolvedLocation {
					source_path: location
						.file()
						.map(|file| file.full_path())
						.unwrap_or_default(),
					instruction_address: address,
					language: function.language().name().to_string(),
					line_number: location.line(),
					symbol_address: u64::from(function.entry_pc()),
					symbol_name: demangle_symbol(function.name()),
				}
			})
			.collect()
	}
}

/// Symcaches for every object of one debug file.
pub struct SymCacheIndex {
	objects: Vec<SymCacheObject>,
}

impl fmt::Debug for SymCacheIndex {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list()
			.entries(self.objects.iter().map(|o| (&o.debug_id, &o.arch, o.data.len())))
			.finish()
	}
}

impl SymbolIndex for SymCacheIndex {
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
