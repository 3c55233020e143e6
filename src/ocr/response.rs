//! Normalization of `IDCardOCR` response bodies.
//!
//! The service wraps everything in `{"Response": {...}}`. Failures are reported
//! in-band as `Response.Error = {"Code": .., "Message": ..}`, successes as flat
//! string attributes next to a `RequestId`.

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde_json::{Map, Value};

/// Key under which a failure message is stored.
pub const ERROR_KEY: &str = "error";

const ENVELOPE_KEY: &str = "Response";
const ERROR_OBJECT_KEY: &str = "Error";
const ERROR_MESSAGE_KEY: &str = "Message";

/// Recognized source fields and the labels they are reported under.
///
/// Front-side responses fill the first six, back-side responses the last two.
/// String values are copied verbatim and numbers or bools are rendered as their
/// JSON text. A field whose value is `null`, an array or an object is left out
/// of the result rather than stringified (so `null` never shows up as the text
/// `"null"`).
pub const ID_CARD_FIELDS: &[(&str, &str)] = &[
    ("Name", "姓名"),
    ("Sex", "性别"),
    ("Nation", "民族"),
    ("Birth", "出生日期"),
    ("Address", "住址"),
    ("IdNum", "身份证号"),
    ("Authority", "签发机关"),
    ("ValidDate", "有效期限"),
];

/// Normalized result of one recognition call.
///
/// Either the recognized fields, or a single [`ERROR_KEY`] entry. Check
/// [`OcrFields::error`] before reading fields.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct OcrFields(BTreeMap<&'static str, String>);

impl OcrFields {
    fn failure(message: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(ERROR_KEY, message.into());
        Self(fields)
    }

    /// The failure message, if this result is an error.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.get(ERROR_KEY)
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.0.contains_key(ERROR_KEY)
    }

    #[must_use]
    pub fn get(&self, label: &str) -> Option<&str> {
        self.0.get(label).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, &'static str, String> {
        self.0.iter()
    }

    #[must_use]
    pub fn into_inner(self) -> BTreeMap<&'static str, String> {
        self.0
    }
}

impl<'a> IntoIterator for &'a OcrFields {
    type Item = (&'a &'static str, &'a String);
    type IntoIter = btree_map::Iter<'a, &'static str, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Turns a raw response body into [`OcrFields`]. Never fails: malformed input
/// becomes an error entry.
#[must_use]
pub fn parse_id_card_response(body: &str) -> OcrFields {
    let fields = match envelope(body) {
        Ok(envelope) => extract(&envelope),
        Err(message) => OcrFields::failure(format!("failed to parse response: {message}")),
    };

    #[cfg(feature = "tracing")]
    log_outcome(&fields);

    fields
}

#[cfg(feature = "tracing")]
fn log_outcome(fields: &OcrFields) {
    match fields.error() {
        Some(message) => tracing::debug!(%message, "recognition returned an error"),
        None => tracing::debug!(fields = fields.len(), "recognition succeeded"),
    }
}

/// Whether `body` carries a usable service error (an `Error` object with a
/// string `Message`), i.e. is worth handing to [`parse_id_card_response`]
/// even though the HTTP status was not 2xx.
pub(crate) fn has_service_error(body: &str) -> bool {
    envelope(body).is_ok_and(|envelope| {
        envelope
            .get(ERROR_OBJECT_KEY)
            .and_then(|error| error.get(ERROR_MESSAGE_KEY))
            .is_some_and(Value::is_string)
    })
}

fn envelope(body: &str) -> Result<Map<String, Value>, String> {
    let root: Value = serde_json::from_str(body).map_err(|e| e.to_string())?;
    let Value::Object(mut root) = root else {
        return Err("body is not a JSON object".to_owned());
    };
    match root.remove(ENVELOPE_KEY) {
        Some(Value::Object(envelope)) => Ok(envelope),
        Some(_) => Err(format!("`{ENVELOPE_KEY}` is not an object")),
        None => Err(format!("missing `{ENVELOPE_KEY}`")),
    }
}

fn extract(envelope: &Map<String, Value>) -> OcrFields {
    if let Some(error) = envelope.get(ERROR_OBJECT_KEY) {
        return match error.get(ERROR_MESSAGE_KEY).and_then(Value::as_str) {
            Some(message) => OcrFields::failure(message),
            None => OcrFields::failure(format!(
                "failed to parse response: `{ERROR_OBJECT_KEY}` has no string `{ERROR_MESSAGE_KEY}`"
            )),
        };
    }

    let fields = ID_CARD_FIELDS
        .iter()
        .filter_map(|(source, label)| {
            envelope
                .get(*source)
                .and_then(scalar_text)
                .map(|value| (*label, value))
        })
        .collect();

    OcrFields(fields)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn front_side_subset() {
        let fields =
            parse_id_card_response(r#"{"Response":{"Name":"张三","IdNum":"110101199001011234"}}"#);

        assert_eq!(fields.len(), 2);
        assert_eq!(fields.get("姓名"), Some("张三"));
        assert_eq!(fields.get("身份证号"), Some("110101199001011234"));
        assert!(!fields.is_error());
    }

    #[test]
    fn service_error_becomes_single_entry() {
        let fields = parse_id_card_response(
            r#"{"Response":{"Error":{"Code":"InvalidImage","Message":"image decode failed"}}}"#,
        );

        assert_eq!(fields.len(), 1);
        assert_eq!(fields.error(), Some("image decode failed"));
    }

    #[test]
    fn error_wins_over_fields() {
        let fields = parse_id_card_response(
            r#"{"Response":{"Name":"张三","Error":{"Code":"AuthFailure.SignatureFailure","Message":"bad signature"},"RequestId":"r-1"}}"#,
        );

        assert_eq!(
            fields.into_inner(),
            BTreeMap::from([(ERROR_KEY, "bad signature".to_owned())])
        );
    }

    #[test]
    fn full_front_and_back() {
        let front = parse_id_card_response(
            r#"{"Response":{"Name":"李四","Sex":"男","Nation":"汉","Birth":"1990/1/1",
                "Address":"北京市东城区","IdNum":"110101199001011234","Authority":"","ValidDate":"",
                "AdvancedInfo":"{}","RequestId":"abc"}}"#,
        );
        assert_eq!(front.len(), 8);
        assert_eq!(front.get("性别"), Some("男"));
        assert_eq!(front.get("民族"), Some("汉"));
        assert_eq!(front.get("出生日期"), Some("1990/1/1"));
        assert_eq!(front.get("住址"), Some("北京市东城区"));
        assert_eq!(front.get("签发机关"), Some(""));

        let back = parse_id_card_response(
            r#"{"Response":{"Authority":"北京市公安局东城分局","ValidDate":"2010.01.01-2030.01.01","RequestId":"abc"}}"#,
        );
        let labels: Vec<_> = back.iter().map(|(label, _)| *label).collect();
        assert_eq!(labels.len(), 2);
        assert!(labels.contains(&"签发机关"));
        assert!(labels.contains(&"有效期限"));
    }

    #[test]
    fn unknown_fields_are_dropped() {
        let fields = parse_id_card_response(r#"{"Response":{"RequestId":"abc","Foo":"bar"}}"#);
        assert!(fields.is_empty());
        assert!(!fields.is_error());
    }

    #[test]
    fn non_string_scalars_are_rendered_and_containers_skipped() {
        let fields =
            parse_id_card_response(r#"{"Response":{"IdNum":110101,"Name":null,"Address":["x"]}}"#);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields.get("身份证号"), Some("110101"));
    }

    #[test]
    fn malformed_bodies_never_panic() {
        for body in [
            "",
            "not json",
            "[]",
            "42",
            r#"{"Other":{}}"#,
            r#"{"Response":"text"}"#,
            r#"{"Response":{"Error":{"Code":"X"}}}"#,
            r#"{"Response":{"Error":"flat"}}"#,
            "<html>502 Bad Gateway</html>",
        ] {
            let fields = parse_id_card_response(body);
            assert_eq!(fields.len(), 1, "body {body:?}");
            let message = fields.error().unwrap();
            assert!(message.starts_with("failed to parse response"), "{message}");
        }
    }

    #[test]
    fn detects_service_error_bodies() {
        assert!(has_service_error(
            r#"{"Response":{"Error":{"Code":"LimitExceeded","Message":"quota"}}}"#
        ));
        assert!(!has_service_error(r#"{"Response":{"Name":"张三"}}"#));
        assert!(!has_service_error("gateway timeout"));
        assert!(!has_service_error(r#"{"Response":{"Error":null}}"#));
        assert!(!has_service_error(r#"{"Response":{"Error":"flat"}}"#));
        assert!(!has_service_error(
            r#"{"Response":{"Error":{"Code":"InternalError"}}}"#
        ));
        assert!(!has_service_error(
            r#"{"Response":{"Error":{"Code":"InternalError","Message":7}}}"#
        ));
    }
}
