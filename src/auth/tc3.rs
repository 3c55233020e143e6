//! `TC3-HMAC-SHA256` signer.
//!
//! Every step below produces exactly the bytes the remote verifier recomputes.
//! A stray newline or an uppercase hex digit does not fail locally, it fails as
//! `AuthFailure.SignatureFailure` on the server, so the intermediate strings are
//! exposed and pinned in tests.

use chrono::{DateTime, Datelike as _};
use hmac::{Hmac, Mac as _};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use sha2::{Digest as _, Sha256};

use crate::auth::Credentials;
use crate::error::Error;
use crate::{Result, Timestamp};

pub type HmacSha256 = Hmac<Sha256>;

pub const ALGORITHM: &str = "TC3-HMAC-SHA256";
pub const REQUEST_TERMINATOR: &str = "tc3_request";
pub const API_VERSION: &str = "2018-11-19";
pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const SIGNED_HEADERS: &str = "content-type;host";

pub const ACTION_HEADER: &str = "X-TC-Action";
pub const TIMESTAMP_HEADER: &str = "X-TC-Timestamp";
pub const VERSION_HEADER: &str = "X-TC-Version";

const HTTP_METHOD: &str = "POST";
const CANONICAL_URI: &str = "/";
const CANONICAL_QUERY_STRING: &str = "";

/// Everything besides the credentials that goes into a signature.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SignRequest<'a> {
    pub service: &'a str,
    pub host: &'a str,
    pub action: &'a str,
    pub payload: &'a str,
    pub timestamp: Timestamp,
}

impl<'a> SignRequest<'a> {
    #[must_use]
    pub const fn new(
        service: &'a str,
        host: &'a str,
        action: &'a str,
        payload: &'a str,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            service,
            host,
            action,
            payload,
            timestamp,
        }
    }
}

/// Protocol headers for one signed request, in emission order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SignedHeaders {
    entries: Vec<(&'static str, String)>,
}

impl SignedHeaders {
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.entries.iter().map(|(name, value)| (*name, value.as_str()))
    }

    /// Case-insensitive header lookup.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn authorization(&self) -> &str {
        self.get(AUTHORIZATION.as_str()).unwrap_or_default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Converts into a [`HeaderMap`] for `reqwest`.
    ///
    /// Fails only when a caller-provided host or action contains bytes that are
    /// not allowed in an HTTP header value.
    pub fn to_header_map(&self) -> Result<HeaderMap> {
        let mut map = HeaderMap::with_capacity(self.entries.len());
        for (name, value) in &self.entries {
            map.insert(
                HeaderName::from_bytes(name.as_bytes())?,
                HeaderValue::from_str(value)?,
            );
        }
        Ok(map)
    }
}

/// Lowercase hex SHA-256 of the request body.
#[must_use]
pub fn hashed_payload(payload: &str) -> String {
    sha256_hex(payload)
}

#[must_use]
pub fn canonical_request(host: &str, payload: &str) -> String {
    let canonical_headers = format!("content-type:{CONTENT_TYPE_JSON}\nhost:{host}\n");
    format!(
        "{HTTP_METHOD}\n{CANONICAL_URI}\n{CANONICAL_QUERY_STRING}\n{canonical_headers}\n{SIGNED_HEADERS}\n{}",
        hashed_payload(payload)
    )
}

/// UTC calendar date (`YYYY-MM-DD`) of `timestamp`.
pub fn scope_date(timestamp: Timestamp) -> Result<String> {
    let datetime = DateTime::from_timestamp(timestamp, 0).ok_or_else(|| {
        Error::validation(format!("timestamp {timestamp} is out of range"))
    })?;
    if !(0..=9999).contains(&datetime.year()) {
        return Err(Error::validation(format!(
            "timestamp {timestamp} falls outside years 0000-9999"
        )));
    }
    Ok(datetime.format("%Y-%m-%d").to_string())
}

#[must_use]
pub fn credential_scope(date: &str, service: &str) -> String {
    format!("{date}/{service}/{REQUEST_TERMINATOR}")
}

#[must_use]
pub fn string_to_sign(
    timestamp: Timestamp,
    credential_scope: &str,
    canonical_request: &str,
) -> String {
    format!(
        "{ALGORITHM}\n{timestamp}\n{credential_scope}\n{}",
        sha256_hex(canonical_request)
    )
}

/// Derives `kSigning` from the secret key: `TC3<key>` → date → service → `tc3_request`.
pub fn signing_key(secret_key: &str, date: &str, service: &str) -> Result<Vec<u8>> {
    let mut initial_key = Vec::with_capacity(3 + secret_key.len());
    initial_key.extend_from_slice(b"TC3");
    initial_key.extend_from_slice(secret_key.as_bytes());

    let date_key = hmac_sha256(&initial_key, date.as_bytes())?;
    let service_key = hmac_sha256(&date_key, service.as_bytes())?;
    hmac_sha256(&service_key, REQUEST_TERMINATOR.as_bytes())
}

pub fn signature(signing_key: &[u8], string_to_sign: &str) -> Result<String> {
    hmac_sha256(signing_key, string_to_sign.as_bytes()).map(hex::encode)
}

#[must_use]
pub fn authorization(secret_id: &str, credential_scope: &str, signature: &str) -> String {
    format!(
        "{ALGORITHM} Credential={secret_id}/{credential_scope}, SignedHeaders={SIGNED_HEADERS}, Signature={signature}"
    )
}

/// Signs `request` and returns the full set of protocol headers.
///
/// Pure: the timestamp comes from the caller, so identical inputs always
/// produce identical headers.
pub fn sign(credentials: &Credentials, request: &SignRequest<'_>) -> Result<SignedHeaders> {
    let date = scope_date(request.timestamp)?;
    let scope = credential_scope(&date, request.service);
    let canonical = canonical_request(request.host, request.payload);
    let to_sign = string_to_sign(request.timestamp, &scope, &canonical);

    let key = signing_key(credentials.secret_key(), &date, request.service)?;
    let signature = signature(&key, &to_sign)?;

    let entries = vec![
        (
            "Authorization",
            authorization(credentials.secret_id(), &scope, &signature),
        ),
        ("Content-Type", CONTENT_TYPE_JSON.to_owned()),
        ("Host", request.host.to_owned()),
        (ACTION_HEADER, request.action.to_owned()),
        (TIMESTAMP_HEADER, request.timestamp.to_string()),
        (VERSION_HEADER, API_VERSION.to_owned()),
    ];

    Ok(SignedHeaders { entries })
}

fn sha256_hex(data: &str) -> String {
    hex::encode(Sha256::digest(data.as_bytes()))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key)?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}
