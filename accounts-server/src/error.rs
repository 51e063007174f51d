use crate::envelope::Envelope;
use crate::repo;
use crate::validate::FieldErrors;
use argon2::password_hash;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{json, Value};

/// An error from the API. Every variant renders as an envelope whose `status`
/// matches the HTTP status.
#[derive(Debug, PartialEq)]
pub enum Error {
    /// The submitted fields were missing or malformed.
    Fields(FieldErrors),

    /// The fields were well-formed but broke a business rule, like a
    /// duplicate email. Holds the detail to send back.
    Validation(Value),

    /// The caller needs to be logged in for this.
    NotAuthenticated,

    /// The thing the caller asked for doesn't exist.
    NotFound(String),

    /// Something went wrong that the caller can't fix. The message is sent
    /// back as-is.
    Internal(String),

    /// Some handler-specific error
    Custom(StatusCode, String),
}

/// Return an error from a handler-specific error type.
#[macro_export]
macro_rules! bail {
    ($message:expr) => {
        return Err($crate::error::Error::custom($message))
    };
    ($message:expr, $status:expr) => {
        return Err($crate::error::Error::custom_with_status($message, $status))
    };
}

impl Error {
    /// Construct a custom error
    pub fn custom(message: &str) -> Self {
        Self::custom_with_status(message, StatusCode::BAD_REQUEST)
    }

    /// Construct a custom error with a specific status code
    pub fn custom_with_status(message: &str, status: StatusCode) -> Self {
        Self::Custom(status, message.to_string())
    }

    /// A body axum wouldn't hand to us as JSON. Keeps axum's status (413 for
    /// oversized bodies, 415 for a missing content type, and so on.)
    pub fn rejected(rejection: &JsonRejection) -> Self {
        Self::Custom(rejection.status(), rejection.body_text())
    }

    /// Somebody already registered with this email.
    pub fn duplicate_email() -> Self {
        Self::Validation(json!({ "message": "Email already exists" }))
    }

    /// `password` and `password2` weren't the same.
    pub fn password_mismatch() -> Self {
        Self::Validation(json!({ "password": "Password mismatch" }))
    }

    fn into_envelope(self) -> Envelope {
        match self {
            Self::Fields(errors) => Envelope::new(
                StatusCode::BAD_REQUEST,
                "Registration failed",
                json!(errors),
            ),
            Self::Validation(detail) => {
                Envelope::new(StatusCode::BAD_REQUEST, "Validation error", detail)
            }
            Self::NotAuthenticated => Envelope::empty(StatusCode::FORBIDDEN, "Not Authenticated!"),
            Self::NotFound(message) => Envelope::empty(StatusCode::NOT_FOUND, message),
            Self::Internal(message) => Envelope::empty(StatusCode::INTERNAL_SERVER_ERROR, message),
            Self::Custom(status, message) => Envelope::empty(status, message),
        }
    }

    /// Unwrap business-rule detail
    #[cfg(test)]
    pub fn unwrap_validation(self) -> Value {
        match self {
            Self::Validation(detail) => detail,
            other => panic!("called `Error::unwrap_validation` on {other:?}"),
        }
    }

    /// Unwrap field errors
    #[cfg(test)]
    pub fn unwrap_fields(self) -> FieldErrors {
        match self {
            Self::Fields(errors) => errors,
            other => panic!("called `Error::unwrap_fields` on {other:?}"),
        }
    }
}

impl From<FieldErrors> for Error {
    fn from(errors: FieldErrors) -> Self {
        Self::Fields(errors)
    }
}

impl From<repo::Error> for Error {
    fn from(err: repo::Error) -> Self {
        match err {
            repo::Error::Duplicate => Self::duplicate_email(),
            repo::Error::Database(err) => {
                tracing::error!(?err, "database error");
                Self::Internal(err.to_string())
            }
        }
    }
}

impl From<password_hash::Error> for Error {
    fn from(err: password_hash::Error) -> Self {
        tracing::error!(?err, "password hashing error");
        Self::Internal(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for Error {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        tracing::error!(?err, "JWT error");
        Self::Internal(err.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        self.into_envelope().into_response()
    }
}
