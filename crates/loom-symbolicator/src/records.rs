// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Newline-delimited JSON record framing.
//!
//! Each non-blank input line is one record: a JSON object whose keys are the
//! record's attributes.

use anyhow::{bail, Context};
use serde_json::{Map, Value};

pub type Record = Map<String, Value>;

/// Parse NDJSON text into records. Blank lines are ignored.
pub fn parse_records(input: &str) -> anyhow::Result<Vec<Record>> {
	let mut records = Vec::new();
	for (index, line) in input.lines().enumerate() {
		let line = line.trim();
		if line.is_empty() {
			continue;
		}
		let value: Value = serde_json::from_str(line)
			.with_context(|| format!("line {}: invalid JSON", index + 1))?;
		match value {
			Value::Object(map) => records.push(map),
			_ => bail!("line {}: record is not a JSON object", index + 1),
		}
	}
	Ok(records)
}

/// Serialize records back to NDJSON, one object per line.
pub fn render_records(records: &[Record]) -> anyhow::Result<String> {
	let mut out = String::new();
	for record in records {
		out.push_str(&serde_json::to_string(record)?);
		out.push('\n');
	}
	Ok(out)
}
