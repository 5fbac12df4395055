// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The per-record attribute map the host pipeline hands over.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A telemetry attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
	Bool(bool),
	Int(i64),
	Double(f64),
	String(String),
}

impl AttributeValue {
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(b) => Some(*b),
			_ => None,
		}
	}
}

impl From<&str> for AttributeValue {
	fn from(s: &str) -> Self {
		Self::String(s.to_string())
	}
}

impl From<String> for AttributeValue {
	fn from(s: String) -> Self {
		Self::String(s)
	}
}

impl From<bool> for AttributeValue {
	fn from(b: bool) -> Self {
		Self::Bool(b)
	}
}

/// Read/write access to one record's attributes.
///
/// Only string and boolean values are read or written by the processor;
/// a key holding any other type reads as absent.
pub trait AttributeMap {
	fn get_str(&self, key: &str) -> Option<&str>;
	fn set_str(&mut self, key: &str, value: String);
	fn set_bool(&mut self, key: &str, value: bool);
	fn remove(&mut self, key: &str);
}

pub type Attributes = HashMap<String, AttributeValue>;

impl AttributeMap for HashMap<String, AttributeValue> {
	fn get_str(&self, key: &str) -> Option<&str> {
		self.get(key).and_then(AttributeValue::as_str)
	}

	fn set_str(&mut self, key: &str, value: String) {
		self.insert(key.to_string(), AttributeValue::String(value));
	}

	fn set_bool(&mut self, key: &str, value: bool) {
		self.insert(key.to_string(), AttributeValue::Bool(value));
	}

	fn remove(&mut self, key: &str) {
		HashMap::remove(self, key);
	}
}

impl AttributeMap for serde_json::Map<String, serde_json::Value> {
	fn get_str(&self, key: &str) -> Option<&str> {
		self.get(key).and_then(serde_json::Value::as_str)
	}

	fn set_str(&mut self, key: &str, value: String) {
		self.insert(key.to_string(), serde_json::Value::String(value));
	}

	fn set_bool(&mut self, key: &str, value: bool) {
		self.insert(key.to_string(), serde_json::Value::Bool(value));
	}

	fn remove(&mut self, key: &str) {
		serde_json::Map::remove(self, key);
	}
}
