//! Tencent Cloud ID card OCR (`IDCardOCR`).
//!
//! Two entry points:
//! - [`OcrClient::recognize_id_card`] signs and sends one request and returns the raw body
//! - [`parse_id_card_response`] turns a raw body into [`OcrFields`] and never fails

mod client;
mod config;
pub mod response;
mod types;

pub use client::OcrClient;
pub use config::{Config, DEFAULT_HOST, DEFAULT_SERVICE, DEFAULT_TIMEOUT, ID_CARD_ACTION};
pub use response::{ERROR_KEY, ID_CARD_FIELDS, OcrFields, parse_id_card_response};
pub use types::{CardSide, IdCardRequest, RequestOverrides};
