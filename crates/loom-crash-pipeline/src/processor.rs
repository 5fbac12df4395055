// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Running symbolication over attribute-map records.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use loom_crash_core::{classify_exception, ExceptionCandidate, ExceptionInfo};
use loom_crash_symbolicate::{
	symbolicate_call_stack_tree, symbolicate_flat_trace, FrameSymbolicator, SymbolicateError,
};
use tracing::{debug, info, instrument, warn};

use crate::attributes::AttributeMap;
use crate::keys::{AttributeKeys, ExceptionKeys};

pub const DEFAULT_BATCH_CONCURRENCY: usize = 8;

/// What happened to one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
	/// The record carried no stack trace; nothing was written.
	Skipped,
	Symbolicated,
	/// The failure flag and error message were written.
	Failed(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
	pub skipped: usize,
	pub symbolicated: usize,
	pub failed: usize,
}

impl BatchSummary {
	fn record(&mut self, outcome: &RecordOutcome) {
		match outcome {
			RecordOutcome::Skipped => self.skipped += 1,
			RecordOutcome::Symbolicated => self.symbolicated += 1,
			RecordOutcome::Failed(_) => self.failed += 1,
		}
	}

	pub fn total(&self) -> usize {
		self.skipped + self.symbolicated + self.failed
	}
}

enum TraceInput {
	CallStackTree,
	Flat {
		debug_id: String,
		binary_name: String,
	},
}

struct Request {
	input_key: String,
	raw: String,
	input: TraceInput,
	exception: ExceptionInfo,
}

pub struct CrashProcessor {
	symbolicator: Arc<dyn FrameSymbolicator>,
	keys: AttributeKeys,
}

impl CrashProcessor {
	pub fn new(symbolicator: Arc<dyn FrameSymbolicator>, keys: AttributeKeys) -> Self {
		Self { symbolicator, keys }
	}

	pub fn keys(&self) -> &AttributeKeys {
		&self.keys
	}

	/// Symbolicate one record in place.
	///
	/// A call-stack-tree payload takes priority over a flat trace. Failures
	/// never escape: they are written to the record and reported as
	/// [`RecordOutcome::Failed`], leaving the raw input in place.
	pub async fn process_record<M>(&self, attributes: &mut M) -> RecordOutcome
	where
		M: AttributeMap + ?Sized,
	{
		let request = match self.read_request(attributes) {
			None => return RecordOutcome::Skipped,
			Some(request) => request,
		};

		let result = match request {
			Ok(request) => self
				.symbolicate(&request)
				.await
				.map(|stacktrace| (request, stacktrace)),
			Err(e) => Err(e),
		};

		match result {
			Ok((request, stacktrace)) => {
				self.write_success(attributes, request, stacktrace);
				RecordOutcome::Symbolicated
			}
			Err(e) => {
				let message = e.to_string();
				warn!(error = %message, "crash record symbolication failed");
				attributes.set_bool(&self.keys.failed, true);
				attributes.set_str(&self.keys.error, message.clone());
				RecordOutcome::Failed(message)
			}
		}
	}

	/// Process records concurrently, at most `concurrency` at a time.
	#[instrument(skip_all, fields(records = records.len(), concurrency = concurrency))]
	pub async fn process_batch<M>(&self, records: &mut [M], concurrency: usize) -> BatchSummary
	where
		M: AttributeMap,
	{
		let outcomes: Vec<RecordOutcome> = stream::iter(records.iter_mut())
			.map(|record| self.process_record(record))
			.buffer_unordered(concurrency.max(1))
			.collect()
			.await;

		let mut summary = BatchSummary::default();
		for outcome in &outcomes {
			summary.record(outcome);
		}
		info!(
			symbolicated = summary.symbolicated,
			failed = summary.failed,
			skipped = summary.skipped,
			"processed crash batch"
		);
		summary
	}

	fn read_request<M>(&self, attributes: &M) -> Option<Result<Request, SymbolicateError>>
	where
		M: AttributeMap + ?Sized,
	{
		let keys = &self.keys;

		if let Some(raw) = attributes.get_str(&keys.stacktrace_json) {
			let candidates: Vec<ExceptionCandidate<'_>> = keys
				.exception_sources
				.iter()
				.map(|source| candidate(attributes, source))
				.collect();
			return Some(Ok(Request {
				input_key: keys.stacktrace_json.clone(),
				raw: raw.to_string(),
				input: TraceInput::CallStackTree,
				exception: classify_exception(&candidates),
			}));
		}

		let raw = attributes.get_str(&keys.flat_stacktrace)?;
		let required = |key: &str| {
			attributes
				.get_str(key)
				.map(str::to_string)
				.ok_or_else(|| SymbolicateError::MissingAttribute(key.to_string()))
		};
		let input = match (required(&keys.build_uuid), required(&keys.app_executable)) {
			(Ok(debug_id), Ok(binary_name)) => TraceInput::Flat {
				debug_id,
				binary_name,
			},
			(Err(e), _) | (_, Err(e)) => return Some(Err(e)),
		};

		Some(Ok(Request {
			input_key: keys.flat_stacktrace.clone(),
			raw: raw.to_string(),
			input,
			exception: classify_exception(&[candidate(attributes, &keys.flat_exception)]),
		}))
	}

	async fn symbolicate(&self, request: &Request) -> Result<String, SymbolicateError> {
		let symbolicator = self.symbolicator.as_ref();
		match &request.input {
			TraceInput::CallStackTree => {
				symbolicate_call_stack_tree(symbolicator, &request.raw).await
			}
			TraceInput::Flat {
				debug_id,
				binary_name,
			} => symbolicate_flat_trace(symbolicator, &request.raw, debug_id, binary_name).await,
		}
	}

	fn write_success<M>(&self, attributes: &mut M, request: Request, stacktrace: String)
	where
		M: AttributeMap + ?Sized,
	{
		let keys = &self.keys;
		if request.input_key == keys.output_stacktrace {
			if keys.preserve_original {
				attributes.set_str(&keys.original, request.raw);
			}
		} else if !keys.preserve_original {
			attributes.remove(&request.input_key);
		}

		attributes.set_str(&keys.output_stacktrace, stacktrace);
		attributes.set_str(&keys.output_exception_type, request.exception.exception_type);
		attributes.set_str(&keys.output_exception_message, request.exception.message);
		attributes.set_bool(&keys.failed, false);
		attributes.remove(&keys.error);
		debug!(input = %request.input_key, "crash record symbolicated");
	}
}

fn candidate<'a, M>(attributes: &'a M, keys: &ExceptionKeys) -> ExceptionCandidate<'a>
where
	M: AttributeMap + ?Sized,
{
	ExceptionCandidate::new(
		attributes.get_str(&keys.type_key),
		attributes.get_str(&keys.message_key),
	)
}
