// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! dSYM symbolication engine for Loom native crash reports.
//!
//! This crate provides:
//! - Debug symbol stores (local filesystem, S3, GCS, in-memory)
//! - A symbolication service with an LRU cache, negative caching and a
//!   global admission gate
//! - Rendering of MetricKit call-stack trees and rewriting of flat traces
//! - Demangling of Rust symbols
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use loom_crash_symbolicate::{
//! 	symbolicate_call_stack_tree, LocalStore, SymCacheResolver, SymbolicationConfig,
//! 	SymbolicationService,
//! };
//!
//! # async fn run(payload: &str) -> loom_crash_symbolicate::Result<()> {
//! let service = SymbolicationService::new(
//! 	Arc::new(LocalStore::new("/var/lib/loom/dsyms")),
//! 	Arc::new(SymCacheResolver::new()),
//! 	SymbolicationConfig::default(),
//! );
//!
//! let trace = symbolicate_call_stack_tree(&service, payload).await?;
//! println!("{trace}");
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod demangle;
pub mod error;
pub mod flat;
pub mod http;
pub mod metrics;
pub mod resolver;
pub mod service;
pub mod store;
pub mod unwind;

pub use cache::{CacheEntry, SymbolCache, DEFAULT_CACHE_CAPACITY};
pub use demangle::demangle_symbol;
pub use error::{Result, SymbolicateError};
pub use flat::symbolicate_flat_trace;
pub use metrics::{NoopMetrics, PrometheusMetrics, SymbolicationMetrics};
pub use resolver::{
	ObjectIndex, ResolverError, StaticIndex, StaticObject, StaticResolver, StaticSymbol,
	SymCacheResolver, SymbolIndex, SymbolResolver,
};
pub use service::{
	FrameSymbolicator, SymbolicationConfig, SymbolicationService, DEFAULT_ADMISSION_TIMEOUT,
};
pub use store::{
	AccessTokenSource, ApplicationDefaultCredentials, GcsCredentials, GcsStore, GcsStoreConfig,
	InMemoryStore, LocalStore, S3Credentials, S3Store, S3StoreConfig, StoreError, SymbolStore,
	TokenError, DEFAULT_GCS_ENDPOINT, GCS_READ_ONLY_SCOPE,
};
pub use unwind::{
	format_fallback_line, format_resolved_line, symbolicate_call_stack_tree, LINE_SEPARATOR,
	STACK_SEPARATOR,
};
