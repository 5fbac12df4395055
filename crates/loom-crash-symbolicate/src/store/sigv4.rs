// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! AWS Signature Version 4 for unsigned-payload GET requests.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

pub(crate) const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";
const ALGORITHM: &str = "AWS4-HMAC-SHA256";

pub(crate) struct SigningParams<'a> {
	pub access_key_id: &'a str,
	pub secret_access_key: &'a str,
	pub session_token: Option<&'a str>,
	pub region: &'a str,
	pub service: &'a str,
}

/// Headers to attach to a signed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SignedHeaders {
	pub amz_date: String,
	pub authorization: String,
}

/// Percent-encode an object key for a SigV4 canonical URI: each segment is
/// encoded on its own so `/` separators survive.
pub(crate) fn encode_key_path(key: &str) -> String {
	key.split('/')
		.map(urlencoding::encode)
		.collect::<Vec<_>>()
		.join("/")
}

fn hmac(key: &[u8], data: &[u8]) -> Vec<u8> {
	let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
	mac.update(data);
	mac.finalize().into_bytes().to_vec()
}

pub(crate) fn signing_key(secret: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
	let k_date = hmac(format!("AWS4{secret}").as_bytes(), date.as_bytes());
	let k_region = hmac(&k_date, region.as_bytes());
	let k_service = hmac(&k_region, service.as_bytes());
	hmac(&k_service, b"aws4_request")
}

/// Sign a GET of `canonical_uri` on `host`.
pub(crate) fn sign_get(
	params: &SigningParams<'_>,
	host: &str,
	canonical_uri: &str,
	now: DateTime<Utc>,
) -> SignedHeaders {
	let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
	let date = now.format("%Y%m%d").to_string();

	let mut canonical_headers = format!(
		"host:{host}\nx-amz-content-sha256:{UNSIGNED_PAYLOAD}\nx-amz-date:{amz_date}\n"
	);
	let mut signed_headers = String::from("host;x-amz-content-sha256;x-amz-date");
	if let Some(token) = params.session_token {
		canonical_headers.push_str(&format!("x-amz-security-token:{token}\n"));
		signed_headers.push_str(";x-amz-security-token");
	}

	let canonical_request = format!(
		"GET\n{canonical_uri}\n\n{canonical_headers}\n{signed_headers}\n{UNSIGNED_PAYLOAD}"
	);
	let scope = format!("{date}/{}/{}/aws4_request", params.region, params.service);
	let string_to_sign = format!(
		"{ALGORITHM}\n{amz_date}\n{scope}\n{}",
		hex::encode(Sha256::digest(canonical_request.as_bytes()))
	);

	let key = signing_key(
		params.secret_access_key,
		&date,
		params.region,
		params.service,
	);
	let signature = hex::encode(hmac(&key, string_to_sign.as_bytes()));

	SignedHeaders {
		authorization: format!(
			"{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
			params.access_key_id
		),
		amz_date,
	}
}
