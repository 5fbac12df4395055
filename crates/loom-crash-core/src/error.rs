// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for crash payload handling.

use thiserror::Error;

/// Errors raised while decoding crash payloads.
#[derive(Debug, Error)]
pub enum CrashError {
	#[error("invalid call stack tree: {0}")]
	InvalidReport(#[from] serde_json::Error),

	#[error("call stack tree nested deeper than {max} levels")]
	TooDeep { max: usize },
}

/// Result type for crash payload operations.
pub type Result<T> = std::result::Result<T, CrashError>;
