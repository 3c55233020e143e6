use std::str::FromStr;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use strum_macros::Display;

use crate::error::Error;
use crate::{Result, Timestamp};

/// Which face of the ID card the image shows.
///
/// Travels on the wire as `FRONT` / `BACK`.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum CardSide {
    /// Portrait side: name, sex, ethnicity, birth date, address, ID number.
    #[default]
    Front,
    /// Emblem side: issuing authority and validity period.
    Back,
}

impl CardSide {
    /// Parses config-style input such as `front`, `BACK` or `portrait`.
    pub fn parse(value: &str) -> Result<CardSide> {
        match value.trim().to_ascii_lowercase().as_str() {
            "front" | "portrait" => Ok(CardSide::Front),
            "back" | "emblem" | "national_emblem" => Ok(CardSide::Back),
            other => Err(Error::validation(format!(
                "invalid card side `{other}`; expected one of: front|back"
            ))),
        }
    }
}

impl FromStr for CardSide {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        CardSide::parse(s)
    }
}

/// Body of an `IDCardOCR` call.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct IdCardRequest {
    pub image_base64: String,
    pub card_side: CardSide,
}

impl IdCardRequest {
    /// Wraps an image that has already been downscaled and base64-encoded.
    #[must_use]
    pub fn new(image_base64: impl Into<String>, card_side: CardSide) -> Self {
        Self {
            image_base64: image_base64.into(),
            card_side,
        }
    }

    /// Encodes prepared image bytes (typically a JPEG) with the standard,
    /// unwrapped base64 alphabet.
    #[must_use]
    pub fn from_image_bytes(image: &[u8], card_side: CardSide) -> Self {
        Self::new(STANDARD.encode(image), card_side)
    }

    /// Serialized JSON body; this exact string is what gets hashed and sent.
    pub fn to_payload(&self) -> Result<String> {
        if self.image_base64.is_empty() {
            return Err(Error::validation("image payload is empty"));
        }
        Ok(serde_json::to_string(self)?)
    }
}

/// Per-request overrides on top of the client defaults.
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestOverrides {
    pub timestamp: Option<Timestamp>,
}

impl RequestOverrides {
    /// Signs with `timestamp` instead of the current time.
    #[must_use]
    pub const fn with_timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}
