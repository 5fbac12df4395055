// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Record attribute keys.
//!
//! Every key defaults to the value in [`AttributeKeys::default`]. The
//! exception source list can only be replaced as a whole, from TOML.

use loom_crash_pipeline::{AttributeKeys, ExceptionKeys};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttributesConfigLayer {
	#[serde(default)]
	pub stacktrace_json: Option<String>,
	#[serde(default)]
	pub flat_stacktrace: Option<String>,
	#[serde(default)]
	pub build_uuid: Option<String>,
	#[serde(default)]
	pub app_executable: Option<String>,
	#[serde(default)]
	pub exception_sources: Option<Vec<ExceptionKeys>>,
	#[serde(default)]
	pub flat_exception: Option<ExceptionKeys>,
	#[serde(default)]
	pub output_stacktrace: Option<String>,
	#[serde(default)]
	pub output_exception_type: Option<String>,
	#[serde(default)]
	pub output_exception_message: Option<String>,
	#[serde(default)]
	pub failed: Option<String>,
	#[serde(default)]
	pub error: Option<String>,
	#[serde(default)]
	pub original: Option<String>,
	#[serde(default)]
	pub preserve_original: Option<bool>,
}

macro_rules! merge_fields {
	($target:expr, $other:expr, $($field:ident),+ $(,)?) => {
		$(
			if $other.$field.is_some() {
				$target.$field = $other.$field;
			}
		)+
	};
}

impl AttributesConfigLayer {
	pub fn merge(&mut self, other: AttributesConfigLayer) {
		merge_fields!(
			self,
			other,
			stacktrace_json,
			flat_stacktrace,
			build_uuid,
			app_executable,
			exception_sources,
			flat_exception,
			output_stacktrace,
			output_exception_type,
			output_exception_message,
			failed,
			error,
			original,
			preserve_original,
		);
	}

	pub fn finalize(self) -> AttributeKeys {
		let defaults = AttributeKeys::default();
		AttributeKeys {
			stacktrace_json: self.stacktrace_json.unwrap_or(defaults.stacktrace_json),
			flat_stacktrace: self.flat_stacktrace.unwrap_or(defaults.flat_stacktrace),
			build_uuid: self.build_uuid.unwrap_or(defaults.build_uuid),
			app_executable: self.app_executable.unwrap_or(defaults.app_executable),
			exception_sources: self
				.exception_sources
				.unwrap_or(defaults.exception_sources),
			flat_exception: self.flat_exception.unwrap_or(defaults.flat_exception),
			output_stacktrace: self
				.output_stacktrace
				.unwrap_or(defaults.output_stacktrace),
			output_exception_type: self
				.output_exception_type
				.unwrap_or(defaults.output_exception_type),
			output_exception_message: self
				.output_exception_message
				.unwrap_or(defaults.output_exception_message),
			failed: self.failed.unwrap_or(defaults.failed),
			error: self.error.unwrap_or(defaults.error),
			original: self.original.unwrap_or(defaults.original),
			preserve_original: self
				.preserve_original
				.unwrap_or(defaults.preserve_original),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_empty_layer_yields_defaults() {
		assert_eq!(
			AttributesConfigLayer::default().finalize(),
			AttributeKeys::default()
		);
	}

	#[test]
	fn test_toml_overrides() {
		let toml_str = r#"
output_stacktrace = "exception.stacktrace.symbolicated"
preserve_original = true

[[exception_sources]]
type_key = "crash.signal"
message_key = "crash.signal.detail"
"#;
		let layer: AttributesConfigLayer = toml::from_str(toml_str).unwrap();
		let keys = layer.finalize();
		assert_eq!(keys.output_stacktrace, "exception.stacktrace.symbolicated");
		assert!(keys.preserve_original);
		assert_eq!(
			keys.exception_sources,
			vec![ExceptionKeys::new("crash.signal", "crash.signal.detail")]
		);
		assert_eq!(keys.flat_stacktrace, "exception.stacktrace");
	}
}
