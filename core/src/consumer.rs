//! Response decoding.
//!
//! # Design
//! A `Consumer` receives the transport's response (status, headers, raw
//! body) and produces a [`Dish`] or an error. `PlainConsumer` hands the body
//! back untouched and `JsonConsumer` parses it. `StatusGuardConsumer` wraps
//! the JSON consumer with the checks most REST APIs need: a set of status
//! codes that fail without decoding, and an error field that turns a
//! successfully decoded payload into a domain error.

use std::collections::BTreeSet;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::{ResponseError, WaiterError};
use crate::http::HttpResponse;

/// The caller-facing value produced by a consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum Dish {
    Raw(String),
    Json(Value),
}

impl Dish {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Dish::Json(value) => Some(value),
            Dish::Raw(_) => None,
        }
    }

    pub fn into_json(self) -> Option<Value> {
        match self {
            Dish::Json(value) => Some(value),
            Dish::Raw(_) => None,
        }
    }

    pub fn as_raw(&self) -> Option<&str> {
        match self {
            Dish::Raw(body) => Some(body.as_str()),
            Dish::Json(_) => None,
        }
    }

    /// Deserialize into a typed value. Raw bodies are parsed as JSON first.
    pub fn deserialize<T: DeserializeOwned>(self) -> Result<T, WaiterError> {
        match self {
            Dish::Json(value) => Ok(serde_json::from_value(value)?),
            Dish::Raw(body) => Ok(serde_json::from_str(&body)?),
        }
    }
}

pub trait Consumer: Send {
    fn handle(&self, response: HttpResponse) -> Result<Dish, WaiterError>;
}

/// Returns the raw body unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainConsumer;

impl Consumer for PlainConsumer {
    fn handle(&self, response: HttpResponse) -> Result<Dish, WaiterError> {
        Ok(Dish::Raw(response.body))
    }
}

/// Parses the body as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonConsumer;

impl Consumer for JsonConsumer {
    fn handle(&self, response: HttpResponse) -> Result<Dish, WaiterError> {
        let value: Value = serde_json::from_str(&response.body)?;
        Ok(Dish::Json(value))
    }
}

/// JSON consumer that maps bad statuses and embedded error fields to
/// [`ResponseError`].
#[derive(Debug, Clone)]
pub struct StatusGuardConsumer {
    api: String,
    bad_statuses: BTreeSet<u16>,
    error_field: String,
    inner: JsonConsumer,
}

impl StatusGuardConsumer {
    pub fn new(
        api: impl Into<String>,
        bad_statuses: impl IntoIterator<Item = u16>,
        error_field: impl Into<String>,
    ) -> Self {
        Self {
            api: api.into(),
            bad_statuses: bad_statuses.into_iter().collect(),
            error_field: error_field.into(),
            inner: JsonConsumer,
        }
    }

    pub fn bad_statuses(&self) -> &BTreeSet<u16> {
        &self.bad_statuses
    }
}

impl Consumer for StatusGuardConsumer {
    fn handle(&self, response: HttpResponse) -> Result<Dish, WaiterError> {
        if self.bad_statuses.contains(&response.status) {
            debug!(api = %self.api, status = response.status, "bad status, body not decoded");
            return Err(ResponseError::BadStatus {
                api: self.api.clone(),
                status: response.status,
            }
            .into());
        }

        let dish = self.inner.handle(response)?;
        if let Some(error) = dish.as_json().and_then(|v| v.get(&self.error_field)) {
            let message = match error {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            return Err(ResponseError::Embedded {
                api: self.api.clone(),
                message,
            }
            .into());
        }
        Ok(dish)
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    fn guard() -> StatusGuardConsumer {
        StatusGuardConsumer::new("twitter", [404, 500, 503], "error")
    }

    #[test]
    fn plain_consumer_passes_body_through() {
        let dish = PlainConsumer.handle(HttpResponse::new(418, "not json at all")).unwrap();
        assert_eq!(dish, Dish::Raw("not json at all".to_string()));
        assert_eq!(dish.as_raw(), Some("not json at all"));
        assert!(dish.as_json().is_none());
    }

    #[test]
    fn json_consumer_parses_body() {
        let dish = JsonConsumer.handle(HttpResponse::new(200, r#"{"rand-7": 42}"#)).unwrap();
        assert_eq!(dish.into_json(), Some(json!({"rand-7": 42})));
    }

    #[test]
    fn json_consumer_rejects_malformed_body() {
        let err = JsonConsumer.handle(HttpResponse::new(200, "{oops")).unwrap_err();
        assert!(matches!(err, WaiterError::Decode(_)));
    }

    #[test]
    fn guard_fails_on_bad_status_without_decoding() {
        for status in [404, 500, 503] {
            // A perfectly fine body must not rescue a bad status.
            let err = guard()
                .handle(HttpResponse::new(status, r#"{"ok": true}"#))
                .unwrap_err();
            match err {
                WaiterError::Response(ResponseError::BadStatus { status: got, ref api }) => {
                    assert_eq!(got, status);
                    assert_eq!(api, "twitter");
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn guard_fails_on_embedded_error_field() {
        let err = guard()
            .handle(HttpResponse::new(401, r#"{"error": "Could not authenticate you."}"#))
            .unwrap_err();
        match err {
            WaiterError::Response(ResponseError::Embedded { message, .. }) => {
                assert_eq!(message, "Could not authenticate you.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn guard_stringifies_structured_error_field() {
        let err = guard()
            .handle(HttpResponse::new(200, r#"{"error": {"code": 34}}"#))
            .unwrap_err();
        assert!(err.to_string().contains(r#"{"code":34}"#));
    }

    #[test]
    fn guard_returns_clean_payloads() {
        let dish = guard().handle(HttpResponse::new(200, r#"[{"id": 1}]"#)).unwrap();
        assert_eq!(dish.into_json(), Some(json!([{"id": 1}])));
    }

    #[test]
    fn guard_reports_malformed_body_as_decode_error() {
        let err = guard().handle(HttpResponse::new(200, "<html>")).unwrap_err();
        assert!(matches!(err, WaiterError::Decode(_)));
    }

    #[test]
    fn dish_deserializes_into_typed_value() {
        #[derive(Deserialize)]
        struct Status {
            id: u64,
            text: String,
        }

        let status: Status = Dish::Json(json!({"id": 3, "text": "hi"})).deserialize().unwrap();
        assert_eq!(status.id, 3);
        assert_eq!(status.text, "hi");

        let from_raw: Status = Dish::Raw(r#"{"id": 4, "text": "raw"}"#.to_string())
            .deserialize()
            .unwrap();
        assert_eq!(from_raw.id, 4);
    }
}
