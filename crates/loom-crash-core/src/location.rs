// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Resolved source locations.

use serde::{Deserialize, Serialize};

/// One source location an instruction address resolves to.
///
/// A single address yields several locations when calls were inlined; the
/// resolver's order is kept as-is all the way into the rendered trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLocation {
	pub source_path: String,
	pub instruction_address: u64,
	/// Source language as reported by the debug info, e.g. `swift`.
	pub language: String,
	pub line_number: u32,
	/// Entry address of the enclosing function.
	pub symbol_address: u64,
	pub symbol_name: String,
}
