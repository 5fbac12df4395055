// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Instrumentation hooks for the symbolication service.
//!
//! The service calls these synchronously; delivery is up to the host.

use std::time::Duration;

use prometheus::{
	CounterVec, Encoder, Gauge, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};

pub trait SymbolicationMetrics: Send + Sync {
	/// Wall time of one `symbolicate_frame` call, including admission.
	fn record_lookup_duration(&self, duration: Duration, outcome: &'static str);

	/// Cache entry count after a fetch was cached.
	fn record_cache_size(&self, entries: u64);

	/// A store fetch failed and was negative-cached.
	fn record_fetch_failure(&self, kind: &'static str);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl SymbolicationMetrics for NoopMetrics {
	fn record_lookup_duration(&self, _duration: Duration, _outcome: &'static str) {}
	fn record_cache_size(&self, _entries: u64) {}
	fn record_fetch_failure(&self, _kind: &'static str) {}
}

/// Prometheus-backed hooks.
pub struct PrometheusMetrics {
	registry: Registry,
	lookup_duration: HistogramVec,
	cache_entries: Gauge,
	fetch_failures: CounterVec,
}

impl PrometheusMetrics {
	pub fn new() -> Result<Self, prometheus::Error> {
		Self::with_registry(Registry::new())
	}

	pub fn with_registry(registry: Registry) -> Result<Self, prometheus::Error> {
		let lookup_duration = HistogramVec::new(
			HistogramOpts::new(
				"loom_symbolicator_lookup_duration_seconds",
				"Time spent symbolicating one frame",
			)
			.buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0]),
			&["outcome"],
		)?;
		registry.register(Box::new(lookup_duration.clone()))?;

		let cache_entries = Gauge::with_opts(Opts::new(
			"loom_symbolicator_cache_entries",
			"Entries in the symbol index cache",
		))?;
		registry.register(Box::new(cache_entries.clone()))?;

		let fetch_failures = CounterVec::new(
			Opts::new(
				"loom_symbolicator_fetch_failures_total",
				"dSYM fetches that failed",
			),
			&["kind"],
		)?;
		registry.register(Box::new(fetch_failures.clone()))?;

		Ok(Self {
			registry,
			lookup_duration,
			cache_entries,
			fetch_failures,
		})
	}

	pub fn registry(&self) -> &Registry {
		&self.registry
	}

	/// Render all metrics in the text exposition format.
	pub fn encode(&self) -> Result<String, prometheus::Error> {
		let mut buffer = Vec::new();
		TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
		String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
	}
}

impl SymbolicationMetrics for PrometheusMetrics {
	fn record_lookup_duration(&self, duration: Duration, outcome: &'static str) {
		self.lookup_duration
			.with_label_values(&[outcome])
			.observe(duration.as_secs_f64());
	}

	fn record_cache_size(&self, entries: u64) {
		self.cache_entries.set(entries as f64);
	}

	fn record_fetch_failure(&self, kind: &'static str) {
		self.fetch_failures.with_label_values(&[kind]).inc();
	}
}
