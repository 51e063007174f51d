use crate::bail;
use crate::envelope::Envelope;
use crate::error::Error;
use crate::jwt::Claims;
use crate::repo::Repo;
use crate::state::TokenTtl;
use crate::validate::hash_password;
use accounts_core::api::login;
use argon2::{password_hash, Argon2, PasswordHash, PasswordVerifier};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use jsonwebtoken::EncodingKey;
use serde_json::json;

/// This should be the same for both missing accounts and incorrect passwords so
/// as not to tell anyone which accounts exist.
static BAD_LOGIN_MESSAGE: &str = "incorrect email or password";

#[tracing::instrument(skip(encoding_key, req))]
pub async fn handler(
    Repo(repo): Repo,
    State(encoding_key): State<EncodingKey>,
    State(TokenTtl(ttl)): State<TokenTtl>,
    req: Result<Json<login::Req>, JsonRejection>,
) -> Result<Envelope, Error> {
    let Json(req) = req.map_err(|rejection| match rejection {
        JsonRejection::JsonSyntaxError(_) | JsonRejection::JsonDataError(_) => {
            Error::custom(&rejection.body_text())
        }
        other => Error::rejected(&other),
    })?;

    let account = repo.find_by_email(&req.email).await?;

    let stored_hash = account.as_ref().map(|account| account.password.as_str());
    let matches = password_matches(stored_hash, &req.password)?;

    let account = match account {
        Some(account) if matches => account,
        _ => bail!(BAD_LOGIN_MESSAGE),
    };

    let jwt = Claims::new(account.email, ttl).encode(&encoding_key)?;

    Ok(Envelope::new(
        StatusCode::OK,
        "Logged in successfully",
        json!(login::Resp { jwt }),
    ))
}

/// Check `password` against a stored hash. With no account there's nothing
/// to check against, but we still do a full argon2 hash so that missing
/// accounts take as long to reject as wrong passwords.
fn password_matches(stored_hash: Option<&str>, password: &str) -> Result<bool, Error> {
    let Some(stored_hash) = stored_hash else {
        hash_password(password)?;
        return Ok(false);
    };

    let hash = PasswordHash::new(stored_hash)?;

    match Argon2::default().verify_password(password.as_bytes(), &hash) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(err) => {
            tracing::error!(?err, "error verifying password");
            Err(Error::Internal(err.to_string()))
        }
    }
}
