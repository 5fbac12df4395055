// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Integration tests for the symbolication service.
//!
//! Tests cover:
//! - Repeat lookups served from cache with no extra store I/O
//! - Negative caching of absent bundles
//! - LRU eviction forcing a refetch
//! - Concurrent callers sharing the admission gate
//! - Local filesystem store layout end to end

use std::sync::Arc;

use loom_crash_core::{bundle_relative_path, ResolvedLocation};
use loom_crash_symbolicate::{
	symbolicate_call_stack_tree, FrameSymbolicator, InMemoryStore, LocalStore, StaticIndex,
	StaticObject, StaticResolver, StaticSymbol, SymbolicateError, SymbolicationConfig,
	SymbolicationService,
};
use tempfile::tempdir;

fn bundle(debug_id: &str, symbol: &str) -> Vec<u8> {
	StaticIndex {
		objects: vec![StaticObject {
			debug_id: debug_id.to_string(),
			symbols: vec![StaticSymbol {
				start: 0,
				end: 1 << 20,
				locations: vec![ResolvedLocation {
					source_path: format!("/src/{symbol}.swift"),
					instruction_address: 0,
					language: "swift".to_string(),
					line_number: 10,
					symbol_address: 64,
					symbol_name: symbol.to_string(),
				}],
			}],
		}],
	}
	.to_bytes()
	.unwrap()
}

fn service(store: Arc<InMemoryStore>, capacity: u64) -> SymbolicationService {
	SymbolicationService::new(
		store,
		Arc::new(StaticResolver),
		SymbolicationConfig {
			cache_capacity: capacity,
			..SymbolicationConfig::default()
		},
	)
}

#[tokio::test]
async fn repeat_lookup_is_idempotent_without_store_io() {
	let store = Arc::new(InMemoryStore::new());
	store.add("AAAA", "App", bundle("AAAA", "main"));
	let service = service(store.clone(), 4);

	let first = service.symbolicate_frame("AAAA", "App", 100).await.unwrap();
	let fetches = store.fetch_count();
	let second = service.symbolicate_frame("AAAA", "App", 100).await.unwrap();

	assert_eq!(first, second);
	assert_eq!(store.fetch_count(), fetches);
}

#[tokio::test]
async fn absent_bundle_is_fetched_once() {
	let store = Arc::new(InMemoryStore::new());
	let service = service(store.clone(), 4);

	for _ in 0..10 {
		let err = service
			.symbolicate_frame("FFFF", "Missing", 1)
			.await
			.unwrap_err();
		assert!(err.is_bundle_unavailable());
	}
	assert_eq!(store.fetch_count(), 1);
}

#[tokio::test]
async fn eviction_forces_refetch() {
	let store = Arc::new(InMemoryStore::new());
	for id in ["A1", "A2", "A3"] {
		store.add(id, "App", bundle(id, "main"));
	}
	let service = service(store.clone(), 2);

	service.symbolicate_frame("A1", "App", 1).await.unwrap();
	service.symbolicate_frame("A2", "App", 1).await.unwrap();
	service.symbolicate_frame("A3", "App", 1).await.unwrap();
	assert_eq!(store.fetch_count(), 3);
	assert!(service.cache().entry_count() <= 2);

	// A1 was least recently used and is gone.
	service.symbolicate_frame("A1", "App", 1).await.unwrap();
	assert_eq!(store.fetch_count(), 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_callers_parse_each_key_once() {
	let store = Arc::new(InMemoryStore::new());
	store.add("C0C0", "App", bundle("C0C0", "worker"));
	let service = Arc::new(service(store.clone(), 8));

	let mut handles = Vec::new();
	for offset in 0..32u64 {
		let service = service.clone();
		handles.push(tokio::spawn(async move {
			service.symbolicate_frame("c0c0", "App", offset).await
		}));
	}
	for handle in handles {
		let locations = handle.await.unwrap().unwrap();
		assert_eq!(locations[0].symbol_name, "worker");
	}
	assert_eq!(store.fetch_count(), 1);
}

#[tokio::test]
async fn local_store_serves_bundle_layout() {
	let dir = tempdir().unwrap();
	let debug_id = "6A8CB813-45F6-3652-AD33-778FD1EAB196";
	let path = dir
		.path()
		.join(bundle_relative_path("", debug_id, "Chateaux Bufeaux"));
	std::fs::create_dir_all(path.parent().unwrap()).unwrap();
	std::fs::write(&path, bundle(debug_id, "main")).unwrap();

	let service = SymbolicationService::new(
		Arc::new(LocalStore::new(dir.path())),
		Arc::new(StaticResolver),
		SymbolicationConfig::default(),
	);

	let payload = serde_json::json!({
		"callStacks": [{
			"threadAttributed": true,
			"callStackRootFrames": [{
				"binaryUUID": debug_id,
				"offsetIntoBinaryTextSegment": 100436,
				"binaryName": "Chateaux Bufeaux",
				"sampleCount": 1
			}]
		}]
	})
	.to_string();

	let out = symbolicate_call_stack_tree(&service, &payload).await.unwrap();
	assert_eq!(
		out,
		"Chateaux Bufeaux\t\t\t0x18854 main (/src/main.swift:10) + 64"
	);

	let err = service
		.symbolicate_frame(debug_id, "Other Binary", 1)
		.await
		.unwrap_err();
	match err {
		SymbolicateError::SymbolBundleUnavailable { path, cached, .. } => {
			assert!(!cached);
			assert!(path.ends_with("6A8CB813-45F6-3652-AD33-778FD1EAB196.dSYM/Contents/Resources/DWARF/Other Binary"));
		}
		other => panic!("unexpected error: {other:?}"),
	}
}
