// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Rendering MetricKit call-stack trees as readable stack traces.
//!
//! Each stack follows the first-child chain from its root frame. Output puts
//! the deepest frame first; a frame whose bundle is unavailable degrades to a
//! fallback line while every other failure aborts the whole report.

use loom_crash_core::{CallFrame, CallStack, CallStackTree, ResolvedLocation};
use tracing::{debug, instrument};

use crate::error::{Result, SymbolicateError};
use crate::service::FrameSymbolicator;

/// Separates the lines of one stack.
pub const LINE_SEPARATOR: &str = "\n    ";

/// Separates stacks within one report.
pub const STACK_SEPARATOR: &str = "\n\n\n";

/// `<binary>\t\t\t0x<OFFSET> <symbol> (<file>:<line>) + <symbol address>`
pub fn format_resolved_line(binary_name: &str, offset: u64, location: &ResolvedLocation) -> String {
	format!(
		"{binary_name}\t\t\t0x{offset:X} {} ({}:{}) + {}",
		location.symbol_name, location.source_path, location.line_number, location.symbol_address
	)
}

/// `<binary>(<uuid>) +<offset>`
pub fn format_fallback_line(frame: &CallFrame) -> String {
	format!(
		"{}({}) +{}",
		frame.binary_name, frame.binary_uuid, frame.offset_into_binary_text_segment
	)
}

/// Symbolicate every stack of a call-stack-tree JSON payload.
#[instrument(skip_all, fields(payload_len = json.len()))]
pub async fn symbolicate_call_stack_tree<S>(symbolicator: &S, json: &str) -> Result<String>
where
	S: FrameSymbolicator + ?Sized,
{
	let tree = CallStackTree::from_json(json)?;

	let mut stacks = Vec::with_capacity(tree.call_stacks.len());
	for stack in &tree.call_stacks {
		stacks.push(unwind_stack(symbolicator, stack).await?);
	}
	Ok(stacks.join(STACK_SEPARATOR))
}

async fn unwind_stack<S>(symbolicator: &S, stack: &CallStack) -> Result<String>
where
	S: FrameSymbolicator + ?Sized,
{
	let Some(root) = stack.root() else {
		return Ok(String::new());
	};

	let chain = root.chain();
	let depth = chain.len();
	let mut frames: Vec<Vec<String>> = vec![Vec::new(); depth];

	for (position, frame) in chain.into_iter().enumerate() {
		let offset = frame.offset_into_binary_text_segment;
		let lines = match symbolicator
			.symbolicate_frame(&frame.binary_uuid, &frame.binary_name, offset)
			.await
		{
			Ok(locations) => locations
				.iter()
				.map(|location| format_resolved_line(&frame.binary_name, offset, location))
				.collect(),
			Err(e @ SymbolicateError::SymbolBundleUnavailable { .. }) => {
				debug!(error = %e, binary = %frame.binary_name, "using fallback frame");
				vec![format_fallback_line(frame)]
			}
			Err(e) => return Err(e),
		};
		frames[depth - 1 - position] = lines;
	}

	Ok(frames.concat().join(LINE_SEPARATOR))
}
