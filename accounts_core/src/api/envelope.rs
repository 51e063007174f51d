use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Every response body from the API has this shape. `status` always matches
/// the HTTP status of the response it came in.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Envelope<T = Value> {
    /// HTTP status code
    pub status: u16,

    /// Human-readable summary of what happened
    pub message: String,

    /// The payload on success, or error detail on failure. Empty object when
    /// there's nothing to say.
    pub data: T,
}

impl Envelope {
    /// An envelope with an empty `data` object.
    pub fn empty(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            data: Value::Object(Map::new()),
        }
    }
}

impl<T> Envelope<T> {
    /// Construct a new envelope
    pub fn new(status: u16, message: impl Into<String>, data: T) -> Self {
        Self {
            status,
            message: message.into(),
            data,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_serializes_data_as_object() {
        let envelope = Envelope::empty(403, "Not Authenticated!");

        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"status": 403, "message": "Not Authenticated!", "data": {}})
        );
    }

    #[test]
    fn typed_data_deserializes_from_value_envelope() {
        let raw = json!({
            "status": 201,
            "message": "User registered successfully",
            "data": {"email": "a@x.com", "date_joined": "2024-01-02T03:04:05Z"},
        });

        let envelope: Envelope<crate::api::account::Account> =
            serde_json::from_value(raw).unwrap();

        assert_eq!(envelope.status, 201);
        assert_eq!(envelope.data.email, "a@x.com");
    }
}
