// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for Loom native crash symbolication.
//!
//! This crate provides the shared vocabulary used by the symbolication engine
//! (`loom-crash-symbolicate`) and the pipeline adapter (`loom-crash-pipeline`):
//!
//! - [`DebugBundleKey`]: names one binary's dSYM bundle within one build
//! - [`ResolvedLocation`]: one source location an instruction address maps to
//! - [`CallStackTree`] / [`CallFrame`]: the nested MetricKit call-tree payload
//! - [`classify_exception`]: picks the exception type/message for a crash

pub mod error;
pub mod exception;
pub mod key;
pub mod location;
pub mod report;

pub use error::{CrashError, Result};
pub use exception::{
	classify_exception, ExceptionCandidate, ExceptionInfo, UNKNOWN_EXCEPTION,
};
pub use key::{bundle_relative_path, normalize_debug_id, DebugBundleKey};
pub use location::ResolvedLocation;
pub use report::{CallFrame, CallStack, CallStackTree, MAX_CALL_DEPTH};
