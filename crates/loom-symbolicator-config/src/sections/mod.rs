// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections.

mod attributes;
mod cache;
mod logging;
mod processing;
mod store;

pub use attributes::AttributesConfigLayer;
pub use cache::{CacheConfig, CacheConfigLayer};
pub use logging::{LogFormat, LoggingConfig, LoggingConfigLayer};
pub use processing::{ProcessingConfig, ProcessingConfigLayer};
pub use store::{StoreBackend, StoreConfig, StoreConfigLayer};
