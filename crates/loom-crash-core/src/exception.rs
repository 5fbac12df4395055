// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Exception type/message selection.
//!
//! A crash can describe its cause at several layers at once: an Objective-C
//! runtime exception, the Mach exception the kernel raised and the POSIX
//! signal delivered to the process. The most platform-specific description
//! wins.

use serde::{Deserialize, Serialize};

/// Placeholder used when a crash carries no exception description.
pub const UNKNOWN_EXCEPTION: &str = "Unknown Error";

/// One optionally-present (type, message) pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExceptionCandidate<'a> {
	pub exception_type: Option<&'a str>,
	pub message: Option<&'a str>,
}

impl<'a> ExceptionCandidate<'a> {
	pub fn new(exception_type: Option<&'a str>, message: Option<&'a str>) -> Self {
		Self {
			exception_type,
			message,
		}
	}

	fn is_present(&self) -> bool {
		self.exception_type.is_some_and(|t| !t.is_empty())
	}
}

/// The exception reported for a crash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionInfo {
	pub exception_type: String,
	pub message: String,
}

impl ExceptionInfo {
	pub fn unknown() -> Self {
		Self {
			exception_type: UNKNOWN_EXCEPTION.to_string(),
			message: UNKNOWN_EXCEPTION.to_string(),
		}
	}
}

/// Pick the first present candidate, in the order given.
///
/// Callers pass candidates highest priority first. A candidate counts as
/// present when its type is non-empty; a missing message becomes empty.
pub fn classify_exception(candidates: &[ExceptionCandidate<'_>]) -> ExceptionInfo {
	candidates
		.iter()
		.find(|c| c.is_present())
		.map(|c| ExceptionInfo {
			exception_type: c.exception_type.unwrap_or_default().to_string(),
			message: c.message.unwrap_or_default().to_string(),
		})
		.unwrap_or_else(ExceptionInfo::unknown)
}
