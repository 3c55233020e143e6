#![cfg_attr(doc, doc = include_str!("../README.md"))]

pub mod auth;
pub mod error;
pub mod ocr;

use reqwest::header::HeaderMap;
use reqwest::{Client as ReqwestClient, Request, StatusCode};

use crate::error::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Unix timestamp in seconds, UTC.
pub type Timestamp = i64;

/// Executes `request` once and hands back the raw status and body.
///
/// Status interpretation is left to the caller; only I/O failures (connect,
/// timeout, body read) surface as errors here.
pub(crate) async fn request(
    client: &ReqwestClient,
    mut request: Request,
    headers: Option<HeaderMap>,
) -> Result<(StatusCode, String)> {
    if let Some(h) = headers {
        request.headers_mut().extend(h);
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(method = %request.method(), url = %request.url(), "sending request");

    let response = client.execute(request).await?;
    let status = response.status();

    #[cfg(feature = "tracing")]
    tracing::debug!(%status, "received response");

    let body = response.text().await?;
    Ok((status, body))
}
