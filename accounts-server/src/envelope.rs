use accounts_core::api;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{Map, Value};
use std::borrow::Cow;

/// A response body in the `{status, message, data}` shape. The HTTP status
/// of the response is always the same as the `status` field.
#[derive(Debug, PartialEq)]
pub struct Envelope {
    pub status: StatusCode,
    pub message: Cow<'static, str>,
    pub data: Value,
}

impl Envelope {
    pub fn new(status: StatusCode, message: impl Into<Cow<'static, str>>, data: Value) -> Self {
        Self {
            status,
            message: message.into(),
            data,
        }
    }

    /// An envelope with nothing in `data`.
    pub fn empty(status: StatusCode, message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(status, message, Value::Object(Map::new()))
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        let body = api::Envelope::new(self.status.as_u16(), self.message, self.data);

        (self.status, Json(body)).into_response()
    }
}
