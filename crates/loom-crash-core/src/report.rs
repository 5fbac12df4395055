// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! MetricKit call-stack-tree payloads.
//!
//! A crash diagnostic carries one or more call stacks. Each stack is a tree of
//! [`CallFrame`]s where the outermost frame is the root and every frame nests
//! its callee under `subFrames`. Only the first sub-frame at each level is
//! part of the crashing chain.

use serde::{Deserialize, Serialize};

use crate::error::{CrashError, Result};

/// Deepest first-child chain accepted from a payload.
pub const MAX_CALL_DEPTH: usize = 128;

/// JSON nesting allowed before deserialization is attempted. Each frame level
/// costs one object and one array, plus the fixed envelope around the roots.
const MAX_JSON_NESTING: usize = 2 * MAX_CALL_DEPTH + 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallStackTree {
	pub call_stacks: Vec<CallStack>,
	#[serde(default)]
	pub call_stack_per_thread: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallStack {
	#[serde(default)]
	pub thread_attributed: bool,
	#[serde(default)]
	pub call_stack_root_frames: Vec<CallFrame>,
}

/// One sampled machine frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallFrame {
	#[serde(rename = "binaryUUID")]
	pub binary_uuid: String,
	pub offset_into_binary_text_segment: u64,
	pub binary_name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub address: Option<u64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sample_count: Option<u64>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub sub_frames: Vec<CallFrame>,
}

impl CallStackTree {
	/// Parse a call stack tree, rejecting payloads nested past the depth guard.
	pub fn from_json(json: &str) -> Result<Self> {
		if json_nesting(json) > MAX_JSON_NESTING {
			return Err(CrashError::TooDeep {
				max: MAX_CALL_DEPTH,
			});
		}

		// The nesting guard above bounds recursion, so serde_json's own
		// fixed limit would only reject legitimate deep stacks.
		let mut deserializer = serde_json::Deserializer::from_str(json);
		deserializer.disable_recursion_limit();
		let tree = CallStackTree::deserialize(&mut deserializer)?;
		deserializer.end()?;

		let too_deep = tree
			.call_stacks
			.iter()
			.flat_map(|stack| stack.call_stack_root_frames.iter())
			.any(|root| root.depth() > MAX_CALL_DEPTH);
		if too_deep {
			return Err(CrashError::TooDeep {
				max: MAX_CALL_DEPTH,
			});
		}

		Ok(tree)
	}
}

impl CallStack {
	/// The frame the crashing chain starts from.
	pub fn root(&self) -> Option<&CallFrame> {
		self.call_stack_root_frames.first()
	}
}

impl CallFrame {
	/// Length of the chain reached by following only the first sub-frame.
	pub fn depth(&self) -> usize {
		let mut depth = 1;
		let mut current = self;
		while let Some(next) = current.sub_frames.first() {
			depth += 1;
			current = next;
		}
		depth
	}

	/// The first-child chain, root first.
	pub fn chain(&self) -> Vec<&CallFrame> {
		let mut chain = Vec::with_capacity(self.depth());
		let mut current = Some(self);
		while let Some(frame) = current {
			chain.push(frame);
			current = frame.sub_frames.first();
		}
		chain
	}
}

/// Maximum bracket nesting of a JSON document, ignoring string contents.
fn json_nesting(json: &str) -> usize {
	let mut depth = 0usize;
	let mut max = 0usize;
	let mut in_string = false;
	let mut escaped = false;

	for byte in json.bytes() {
		if in_string {
			match byte {
				_ if escaped => escaped = false,
				b'\\' => escaped = true,
				b'"' => in_string = false,
				_ => {}
			}
			continue;
		}
		match byte {
			b'"' => in_string = true,
			b'{' | b'[' => {
				depth += 1;
				max = max.max(depth);
			}
			b'}' | b']' => depth = depth.saturating_sub(1),
			_ => {}
		}
	}

	max
}

#[cfg(test)]
mod tests {
	use super::*;

	fn frame_json(name: &str, offset: u64, sub: Option<String>) -> String {
		let sub = sub.map(|s| format!(r#","subFrames":[{s}]"#)).unwrap_or_default();
		format!(
			r#"{{"binaryUUID":"6A8CB813-45F6-3652-AD33-778FD1EAB196","offsetIntoBinaryTextSegment":{offset},"binaryName":"{name}","sampleCount":1,"address":4295067732{sub}}}"#
		)
	}

	fn nested_tree(depth: usize) -> String {
		let mut frame = frame_json("f0", 0, None);
		for i in 1..depth {
			frame = frame_json(&format!("f{i}"), i as u64, Some(frame));
		}
		format!(r#"{{"callStacks":[{{"threadAttributed":true,"callStackRootFrames":[{frame}]}}],"callStackPerThread":true}}"#)
	}

	#[test]
	fn test_parse_metrickit_tree() {
		let json = nested_tree(3);
		let tree = CallStackTree::from_json(&json).unwrap();

		assert!(tree.call_stack_per_thread);
		assert_eq!(tree.call_stacks.len(), 1);
		let root = tree.call_stacks[0].root().unwrap();
		assert_eq!(root.binary_name, "f2");
		assert_eq!(root.binary_uuid, "6A8CB813-45F6-3652-AD33-778FD1EAB196");
		assert_eq!(root.address, Some(4295067732));
		assert_eq!(root.depth(), 3);
	}

	#[test]
	fn test_chain_follows_first_child_only() {
		let json = r#"{"callStacks":[{"callStackRootFrames":[
			{"binaryUUID":"A","offsetIntoBinaryTextSegment":1,"binaryName":"root","subFrames":[
				{"binaryUUID":"A","offsetIntoBinaryTextSegment":2,"binaryName":"first"},
				{"binaryUUID":"A","offsetIntoBinaryTextSegment":3,"binaryName":"sibling","subFrames":[
					{"binaryUUID":"A","offsetIntoBinaryTextSegment":4,"binaryName":"nested"}
				]}
			]}
		]}]}"#;
		let tree = CallStackTree::from_json(json).unwrap();
		let chain = tree.call_stacks[0].root().unwrap().chain();

		let names: Vec<&str> = chain.iter().map(|f| f.binary_name.as_str()).collect();
		assert_eq!(names, vec!["root", "first"]);
	}

	#[test]
	fn test_deep_but_allowed_tree_parses() {
		let json = nested_tree(120);
		let tree = CallStackTree::from_json(&json).unwrap();
		assert_eq!(tree.call_stacks[0].root().unwrap().depth(), 120);
	}

	#[test]
	fn test_pathological_depth_is_rejected() {
		let json = nested_tree(MAX_CALL_DEPTH + 10);
		let result = CallStackTree::from_json(&json);
		assert!(matches!(result, Err(CrashError::TooDeep { .. })));
	}

	#[test]
	fn test_chain_at_max_depth_keeps_deepest_frame() {
		let json = nested_tree(MAX_CALL_DEPTH);
		let tree = CallStackTree::from_json(&json).unwrap();
		let chain = tree.call_stacks[0].root().unwrap().chain();
		assert_eq!(chain.len(), MAX_CALL_DEPTH);
		assert_eq!(chain.last().unwrap().binary_name, "f0");
	}

	#[test]
	fn test_one_frame_past_max_depth_is_rejected() {
		for depth in [MAX_CALL_DEPTH + 1, MAX_CALL_DEPTH + 2] {
			let result = CallStackTree::from_json(&nested_tree(depth));
			assert!(
				matches!(result, Err(CrashError::TooDeep { max: MAX_CALL_DEPTH })),
				"depth {depth} was accepted"
			);
		}
	}

	#[test]
	fn test_deep_second_root_is_rejected() {
		let shallow = frame_json("shallow", 1, None);
		let mut deep = frame_json("f0", 0, None);
		for i in 1..=MAX_CALL_DEPTH {
			deep = frame_json(&format!("f{i}"), i as u64, Some(deep));
		}
		let json = format!(r#"{{"callStacks":[{{"callStackRootFrames":[{shallow},{deep}]}}]}}"#);
		assert!(matches!(
			CallStackTree::from_json(&json),
			Err(CrashError::TooDeep { .. })
		));
	}

	#[test]
	fn test_brackets_inside_strings_do_not_count() {
		assert_eq!(json_nesting(r#"{"a":"[[[{{{"}"#), 1);
		assert_eq!(json_nesting(r#"{"a":"\"[[","b":[1]}"#), 2);
	}

	#[test]
	fn test_malformed_json_is_invalid_report() {
		let result = CallStackTree::from_json(r#"{"callStacks": [}"#);
		assert!(matches!(result, Err(CrashError::InvalidReport(_))));
	}

	#[test]
	fn test_missing_required_frame_field_is_invalid_report() {
		let json = r#"{"callStacks":[{"callStackRootFrames":[{"binaryName":"x"}]}]}"#;
		assert!(matches!(
			CallStackTree::from_json(json),
			Err(CrashError::InvalidReport(_))
		));
	}
}
