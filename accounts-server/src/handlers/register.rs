use crate::envelope::Envelope;
use crate::error::Error;
use crate::jwt::Claims;
use crate::repo::Repo;
use crate::validate::{validate_and_create, FieldErrors};
use axum::{extract::rejection::JsonRejection, http::StatusCode, Json};
use serde_json::{json, Value};

/// Register a new account from `{email, password, password2}`.
///
/// The body is taken as raw JSON so that anything a client sends, including
/// bodies that don't parse, comes back in an envelope.
#[tracing::instrument(skip(body))]
pub async fn create(
    Repo(repo): Repo,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Envelope, Error> {
    let Json(body) = body.map_err(|rejection| match rejection {
        JsonRejection::JsonSyntaxError(_) | JsonRejection::JsonDataError(_) => Error::Fields(
            FieldErrors::non_field(format!("JSON parse error - {}", rejection.body_text())),
        ),
        other => Error::rejected(&other),
    })?;

    let account = validate_and_create(repo.as_ref(), &body).await?;

    Ok(Envelope::new(
        StatusCode::CREATED,
        "User registered successfully",
        json!(account.public()),
    ))
}

/// Fetch the account of whoever is calling.
#[tracing::instrument]
pub async fn fetch(Repo(repo): Repo, claims: Option<Claims>) -> Result<Envelope, Error> {
    let claims = claims.ok_or(Error::NotAuthenticated)?;

    let account = repo
        .find_by_email(&claims.sub)
        .await?
        .ok_or_else(|| Error::NotFound("Account not found".to_string()))?;

    Ok(Envelope::new(
        StatusCode::OK,
        "successfully register",
        json!(account.public()),
    ))
}
