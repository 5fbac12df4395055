// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Rust symbol demangling for resolved function names.

use rustc_demangle::try_demangle;

/// Check if a symbol appears to be a Rust mangled symbol.
pub fn is_rust_symbol(symbol: &str) -> bool {
	let looks_mangled = |s: &str| s.starts_with("_ZN") || s.starts_with("_R");
	// Mach-O adds an extra leading underscore.
	looks_mangled(symbol) || symbol.strip_prefix('_').is_some_and(looks_mangled)
}

/// Demangle Rust symbols (without the trailing hash); other names, including
/// Swift and C, pass through unchanged.
pub fn demangle_symbol(symbol: &str) -> String {
	if !is_rust_symbol(symbol) {
		return symbol.to_string();
	}
	match try_demangle(symbol) {
		Ok(demangled) => format!("{demangled:#}"),
		Err(_) => symbol.to_string(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_demangle_rust_symbol() {
		let demangled =
			demangle_symbol("_ZN4loom6server8handlers5crash7capture17h1234567890abcdefE");
		assert_eq!(demangled, "loom::server::handlers::crash::capture");
	}

	#[test]
	fn test_mach_o_underscore_prefix() {
		let demangled =
			demangle_symbol("__ZN4loom6server8handlers5crash7capture17h1234567890abcdefE");
		assert_eq!(demangled, "loom::server::handlers::crash::capture");
	}

	#[test]
	fn test_non_rust_symbols_unchanged() {
		assert_eq!(demangle_symbol("main"), "main");
		assert_eq!(
			demangle_symbol("$s16Chateaux_Bufeaux7AppMainV"),
			"$s16Chateaux_Bufeaux7AppMainV"
		);
		assert_eq!(demangle_symbol("-[NSObject description]"), "-[NSObject description]");
	}

	#[test]
	fn test_is_rust_symbol() {
		assert!(is_rust_symbol("_ZN4loom6serverE"));
		assert!(is_rust_symbol("_R"));
		assert!(!is_rust_symbol("regular_function"));
		assert!(!is_rust_symbol("__libc_start_main"));
	}
}
