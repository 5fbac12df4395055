// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP client shared by the object-storage stores.

use std::time::Duration;

use reqwest::{Client, ClientBuilder};

/// `loom-symbolicator/{version}`
pub fn user_agent() -> String {
	format!("loom-symbolicator/{}", env!("CARGO_PKG_VERSION"))
}

/// A client builder carrying the symbolicator User-Agent.
pub fn builder() -> ClientBuilder {
	Client::builder().user_agent(user_agent())
}

/// A client whose requests give up after `timeout`. Stores never retry, so
/// a timed-out request is final for that fetch.
pub fn new_client(timeout: Duration) -> Result<Client, reqwest::Error> {
	builder().timeout(timeout).build()
}
