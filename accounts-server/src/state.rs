use crate::repo::SharedRepository;
use axum::extract::FromRef;
use chrono::Duration;
use jsonwebtoken::{errors::Error, DecodingKey, EncodingKey};

/// Shared state needed by requests.
#[derive(Clone, FromRef)]
pub struct State {
    /// Where accounts are stored.
    repo: SharedRepository,

    /// Key for encoding new JWTs.
    encoding_key: EncodingKey,

    /// Key for verifying existing JWTs.
    decoding_key: DecodingKey,

    /// How long tokens issued at login stay valid.
    token_ttl: TokenTtl,
}

/// How long a login lasts.
#[derive(Clone, Copy, Debug)]
pub struct TokenTtl(pub Duration);

impl State {
    /// Create a new state.
    pub fn new(
        repo: SharedRepository,
        jwt_base64_secret: &str,
        token_ttl: Duration,
    ) -> Result<Self, Error> {
        Ok(Self {
            repo,
            encoding_key: EncodingKey::from_base64_secret(jwt_base64_secret)?,
            decoding_key: DecodingKey::from_base64_secret(jwt_base64_secret)?,
            token_ttl: TokenTtl(token_ttl),
        })
    }
}
