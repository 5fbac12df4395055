// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Turning raw debug files into address lookup indices.
//!
//! A debug file may hold several objects (a fat Mach-O carries one per
//! architecture), each identified by its own debug ID. A [`SymbolIndex`]
//! exposes one [`ObjectIndex`] per debug ID.

mod static_index;
mod symcache;

pub use static_index::{StaticIndex, StaticObject, StaticResolver, StaticSymbol};
pub use symcache::{SymCacheIndex, SymCacheResolver};

use std::fmt;
use std::sync::Arc;

use loom_crash_core::ResolvedLocation;
use thiserror::Error;

/// Errors raised while parsing a debug file.
#[derive(Debug, Error)]
pub enum ResolverError {
	#[error("malformed debug file: {0}")]
	Malformed(String),

	#[error("debug file contains no objects")]
	Empty,

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}

/// Address lookup within one object.
pub trait ObjectIndex: Send + Sync {
	/// Source locations for `address`, innermost inlined frame first as the
	/// debug info orders them. Empty when nothing covers the address.
	fn lookup(&self, address: u64) -> Vec<ResolvedLocation>;
}

/// A parsed debug file. Never mutated once built.
pub trait SymbolIndex: Send + Sync + fmt::Debug {
	/// The object for a normalized (upper-case) debug ID.
	fn object(&self, debug_id: &str) -> Option<&dyn ObjectIndex>;

	/// Debug IDs of all objects in the file.
	fn debug_ids(&self) -> Vec<String>;
}

/// Parses raw debug file bytes.
pub trait SymbolResolver: Send + Sync {
	fn parse(&self, data: &[u8]) -> Result<Arc<dyn SymbolIndex>, ResolverError>;
}
