// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Telemetry pipeline adapter for dSYM symbolication.
//!
//! The host pipeline owns the records; this crate reads the stack trace out
//! of each record's attribute map, symbolicates it, and writes the readable
//! trace, the exception type/message and a failure flag back.

pub mod attributes;
pub mod keys;
pub mod processor;

pub use attributes::{AttributeMap, AttributeValue, Attributes};
pub use keys::{AttributeKeys, ExceptionKeys};
pub use processor::{BatchSummary, CrashProcessor, RecordOutcome, DEFAULT_BATCH_CONCURRENCY};
