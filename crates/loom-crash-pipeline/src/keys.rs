// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Attribute keys read and written by the processor.

use serde::{Deserialize, Serialize};

/// Type/message keys of one exception source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionKeys {
	pub type_key: String,
	pub message_key: String,
}

impl ExceptionKeys {
	pub fn new(type_key: impl Into<String>, message_key: impl Into<String>) -> Self {
		Self {
			type_key: type_key.into(),
			message_key: message_key.into(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeKeys {
	/// MetricKit call-stack-tree JSON.
	pub stacktrace_json: String,
	/// Pre-formatted trace, one frame per line.
	pub flat_stacktrace: String,
	/// Debug ID shared by every frame of a flat trace.
	pub build_uuid: String,
	/// Binary name shared by every frame of a flat trace.
	pub app_executable: String,
	/// Exception sources of call-stack-tree records, highest priority first.
	pub exception_sources: Vec<ExceptionKeys>,
	/// Exception source of flat records.
	pub flat_exception: ExceptionKeys,
	pub output_stacktrace: String,
	pub output_exception_type: String,
	pub output_exception_message: String,
	pub failed: String,
	pub error: String,
	/// Where the raw input goes when it would be overwritten by the output.
	pub original: String,
	/// Keep the raw input after a successful run.
	pub preserve_original: bool,
}

impl Default for AttributeKeys {
	fn default() -> Self {
		let diagnostic = "metrickit.diagnostic.crash.exception";
		Self {
			stacktrace_json: format!("{diagnostic}.stacktrace_json"),
			flat_stacktrace: "exception.stacktrace".to_string(),
			build_uuid: "app.debug.build_uuid".to_string(),
			app_executable: "app.bundle.executable".to_string(),
			exception_sources: vec![
				ExceptionKeys::new(
					format!("{diagnostic}.objc.type"),
					format!("{diagnostic}.objc.message"),
				),
				ExceptionKeys::new(
					format!("{diagnostic}.mach_exception.name"),
					format!("{diagnostic}.mach_exception.description"),
				),
				ExceptionKeys::new(
					format!("{diagnostic}.signal.name"),
					format!("{diagnostic}.signal.description"),
				),
			],
			flat_exception: ExceptionKeys::new("exception.type", "exception.message"),
			output_stacktrace: "exception.stacktrace".to_string(),
			output_exception_type: "exception.type".to_string(),
			output_exception_message: "exception.message".to_string(),
			failed: "exception.symbolicator.failed".to_string(),
			error: "exception.symbolicator.error".to_string(),
			original: "exception.stacktrace.original".to_string(),
			preserve_original: false,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_priority_order() {
		let keys = AttributeKeys::default();
		let types: Vec<&str> = keys
			.exception_sources
			.iter()
			.map(|k| k.type_key.as_str())
			.collect();
		assert_eq!(
			types,
			vec![
				"metrickit.diagnostic.crash.exception.objc.type",
				"metrickit.diagnostic.crash.exception.mach_exception.name",
				"metrickit.diagnostic.crash.exception.signal.name",
			]
		);
		assert_eq!(keys.flat_stacktrace, keys.output_stacktrace);
		assert!(!keys.preserve_original);
	}
}
