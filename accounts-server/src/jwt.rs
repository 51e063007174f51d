use axum::extract::{FromRef, OptionalFromRequestParts};
use axum::http::request::Parts;
use axum::RequestPartsExt;
use axum_extra::headers::{authorization::Bearer, Authorization};
use axum_extra::TypedHeader;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

/// What we put in the tokens we hand out at login.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// The email of the account the token was issued to
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// Claims for `email`, good for `ttl` from now.
    pub fn new(email: String, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: email,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    /// Sign these claims into a token.
    pub fn encode(&self, key: &EncodingKey) -> Result<String, jsonwebtoken::errors::Error> {
        encode(&Header::default(), self, key)
    }

    #[cfg(test)]
    pub fn test(email: &str) -> Self {
        Self::new(email.to_string(), Duration::days(30))
    }
}

/// A caller is authenticated if they send a bearer token we signed that
/// hasn't expired. Anything else (no header, wrong scheme, bad signature,
/// expired) just means they aren't, so this never rejects.
impl<S> OptionalFromRequestParts<S> for Claims
where
    DecodingKey: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        let Ok(TypedHeader(Authorization(bearer))) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
        else {
            return Ok(None);
        };

        match decode::<Claims>(
            bearer.token(),
            &DecodingKey::from_ref(state),
            &Validation::default(),
        ) {
            Ok(token_data) => Ok(Some(token_data.claims)),
            Err(err) => {
                tracing::trace!(?err, "error decoding token");
                Ok(None)
            }
        }
    }
}
