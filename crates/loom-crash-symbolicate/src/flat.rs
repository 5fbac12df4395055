// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Rewriting pre-formatted, one-frame-per-line stack traces.
//!
//! Every recognized line is resolved against the same debug ID and binary,
//! supplied by the caller for the whole trace. Lines that do not look like
//! frames are left exactly as they are.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::service::FrameSymbolicator;

/// `<index> <binary> 0x<address> <expression> + <decimal offset>`
static FRAME_LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r"^\s*(?P<index>\d+)\s+(?P<binary>.+?)\s+(?P<address>0x[0-9A-Fa-f]+)\s+(?P<expr>.+?\s\+\s(?P<offset>\d+))\s*$",
	)
	.unwrap()
});

/// Symbolicate a flat trace, one frame per line.
///
/// Lines whose frame cannot be resolved are kept unchanged; failures that are
/// not about resolution (such as an admission timeout) abort the trace.
#[instrument(skip(symbolicator, trace), fields(lines = trace.lines().count()))]
pub async fn symbolicate_flat_trace<S>(
	symbolicator: &S,
	trace: &str,
	debug_id: &str,
	binary_name: &str,
) -> Result<String>
where
	S: FrameSymbolicator + ?Sized,
{
	let mut out = Vec::new();
	for line in trace.split('\n') {
		out.push(rewrite_line(symbolicator, line, debug_id, binary_name).await?);
	}
	Ok(out.join("\n"))
}

async fn rewrite_line<S>(
	symbolicator: &S,
	line: &str,
	debug_id: &str,
	binary_name: &str,
) -> Result<String>
where
	S: FrameSymbolicator + ?Sized,
{
	let Some(captures) = FRAME_LINE_REGEX.captures(line) else {
		return Ok(line.to_string());
	};
	let (Some(expr), Some(offset)) = (captures.name("expr"), captures.name("offset")) else {
		return Ok(line.to_string());
	};
	let Ok(offset) = offset.as_str().parse::<u64>() else {
		return Ok(line.to_string());
	};

	let location = match symbolicator
		.symbolicate_frame(debug_id, binary_name, offset)
		.await
	{
		Ok(locations) => match locations.into_iter().next() {
			Some(location) => location,
			None => return Ok(line.to_string()),
		},
		Err(e) if e.is_resolution_failure() => {
			debug!(error = %e, offset, "leaving frame unsymbolicated");
			return Ok(line.to_string());
		}
		Err(e) => return Err(e),
	};

	let replacement = format!(
		"{} (in {binary_name}) ({}:{})",
		location.symbol_name, location.source_path, location.line_number
	);
	Ok(format!(
		"{}{replacement}{}",
		&line[..expr.start()],
		&line[expr.end()..]
	))
}
