// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Loom symbolicator binary.
//!
//! Reads NDJSON crash records, symbolicates their stack traces against the
//! configured dSYM store and writes the updated records back out.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use loom_crash_pipeline::CrashProcessor;
use loom_crash_symbolicate::{
	PrometheusMetrics, SymCacheResolver, SymbolicationConfig, SymbolicationService,
};
use loom_symbolicator_config::{LogFormat, LoggingConfig, SymbolicatorConfig};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod records;
mod store;

/// Loom symbolicator - resolve native crash addresses against dSYM bundles.
#[derive(Parser, Debug)]
#[command(
	name = "loom-symbolicator",
	about = "Symbolicate native crash records against dSYM bundles",
	version
)]
struct Args {
	/// TOML config file (defaults to /etc/loom/symbolicator.toml)
	#[arg(long, env = "LOOM_SYMBOLICATOR_CONFIG")]
	config: Option<PathBuf>,

	/// NDJSON records to read; stdin when omitted
	#[arg(long)]
	input: Option<PathBuf>,

	/// Where to write the symbolicated records; stdout when omitted
	#[arg(long)]
	output: Option<PathBuf>,

	/// Write Prometheus metrics in text format here once the batch is done
	#[arg(long)]
	metrics: Option<PathBuf>,

	/// Override the configured batch concurrency
	#[arg(long)]
	concurrency: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	let config = match &args.config {
		Some(path) => loom_symbolicator_config::load_config_with_file(path),
		None => loom_symbolicator_config::load_config(),
	}
	.context("failed to load configuration")?;

	init_tracing(&config.logging);

	run(args, config).await
}

/// Logs go to stderr; stdout carries records.
fn init_tracing(logging: &LoggingConfig) {
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
	let registry = tracing_subscriber::registry().with(filter);
	match logging.format {
		LogFormat::Pretty => registry
			.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
			.init(),
		LogFormat::Json => registry
			.with(
				tracing_subscriber::fmt::layer()
					.json()
					.with_writer(std::io::stderr),
			)
			.init(),
	}
}

async fn run(args: Args, config: SymbolicatorConfig) -> anyhow::Result<()> {
	tracing::info!(
		backend = %config.store.backend,
		cache_capacity = config.cache.capacity,
		"starting loom-symbolicator"
	);

	let metrics = Arc::new(PrometheusMetrics::new().context("failed to register metrics")?);
	let service = SymbolicationService::new(
		store::build_store(&config.store)?,
		Arc::new(SymCacheResolver::new()),
		SymbolicationConfig {
			cache_capacity: config.cache.capacity,
			admission_timeout: config.cache.admission_timeout(),
		},
	)
	.with_metrics(metrics.clone());
	let processor = CrashProcessor::new(Arc::new(service), config.attributes.clone());

	let input = read_input(args.input.as_ref()).await?;
	let mut batch = records::parse_records(&input)?;
	tracing::debug!(records = batch.len(), "read crash records");

	let concurrency = args.concurrency.unwrap_or(config.processing.concurrency);
	let summary = processor
		.process_batch(batch.as_mut_slice(), concurrency)
		.await;

	write_output(args.output.as_ref(), &records::render_records(&batch)?).await?;

	if let Some(path) = &args.metrics {
		let text = metrics.encode().context("failed to encode metrics")?;
		tokio::fs::write(path, text)
			.await
			.with_context(|| format!("failed to write metrics to {}", path.display()))?;
	}

	tracing::info!(
		total = summary.total(),
		symbolicated = summary.symbolicated,
		failed = summary.failed,
		skipped = summary.skipped,
		"loom-symbolicator finished"
	);

	Ok(())
}

async fn read_input(path: Option<&PathBuf>) -> anyhow::Result<String> {
	match path {
		Some(path) => tokio::fs::read_to_string(path)
			.await
			.with_context(|| format!("failed to read {}", path.display())),
		None => {
			let mut input = String::new();
			tokio::io::stdin()
				.read_to_string(&mut input)
				.await
				.context("failed to read stdin")?;
			Ok(input)
		}
	}
}

async fn write_output(path: Option<&PathBuf>, output: &str) -> anyhow::Result<()> {
	match path {
		Some(path) => tokio::fs::write(path, output)
			.await
			.with_context(|| format!("failed to write {}", path.display())),
		None => {
			let mut stdout = tokio::io::stdout();
			stdout.write_all(output.as_bytes()).await?;
			stdout.flush().await?;
			Ok(())
		}
	}
}
