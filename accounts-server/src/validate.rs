//! Checking registration input and turning it into a stored account.

use crate::error::Error;
use crate::repo::{Account, AccountRepository, NewAccount};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Longest email we'll accept. Matches the RFC 5321 path limit.
pub const EMAIL_MAX_LENGTH: usize = 254;

/// Longest password we'll accept.
pub const PASSWORD_MAX_LENGTH: usize = 128;

/// Field name for errors that aren't about any single field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Everything wrong with a submission, keyed by field name. Each field can
/// have several problems.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Errors for a body we couldn't treat as a set of fields at all.
    pub fn non_field(message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(NON_FIELD_ERRORS, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }
}

/// A registration that has passed field validation. `password2` is dropped
/// as soon as it has been compared.
#[derive(PartialEq, Eq)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub password2: String,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl Registration {
    /// Pull the registration fields out of an arbitrary JSON body, collecting
    /// every problem instead of stopping at the first.
    ///
    /// ## Errors
    ///
    /// `FieldErrors` if the body isn't an object, or if any field is missing,
    /// not a string, blank, too long, or (for `email`) not an email address.
    pub fn from_json(body: &Value) -> Result<Self, FieldErrors> {
        let fields = match body {
            Value::Object(fields) => fields,
            Value::Null => return Err(FieldErrors::non_field("No data provided")),
            other => {
                return Err(FieldErrors::non_field(format!(
                    "Invalid data. Expected a dictionary, but got {}.",
                    json_kind(other)
                )))
            }
        };

        let mut errors = FieldErrors::default();

        let email = string_field(fields, "email", Trim::Yes, EMAIL_MAX_LENGTH, &mut errors);
        if let Some(email) = email {
            if !is_valid_email(email) {
                errors.add("email", "Enter a valid email address.");
            }
        }

        let password = string_field(fields, "password", Trim::No, PASSWORD_MAX_LENGTH, &mut errors);
        let password2 =
            string_field(fields, "password2", Trim::No, PASSWORD_MAX_LENGTH, &mut errors);

        match (email, password, password2) {
            (Some(email), Some(password), Some(password2)) if errors.is_empty() => Ok(Self {
                email: email.to_string(),
                password: password.to_string(),
                password2: password2.to_string(),
            }),
            _ => Err(errors),
        }
    }
}

/// Whether surrounding whitespace is part of a field's value.
#[derive(Clone, Copy)]
enum Trim {
    Yes,
    No,
}

/// A required, non-blank string field. With `Trim::Yes` the length limit
/// applies to the trimmed value, and that's what comes back.
fn string_field<'a>(
    fields: &'a Map<String, Value>,
    name: &str,
    trim: Trim,
    max_length: usize,
    errors: &mut FieldErrors,
) -> Option<&'a str> {
    let value = match fields.get(name) {
        None => {
            errors.add(name, "This field is required.");
            return None;
        }
        Some(Value::Null) => {
            errors.add(name, "This field may not be null.");
            return None;
        }
        Some(Value::String(value)) => match trim {
            Trim::Yes => value.trim(),
            Trim::No => value.as_str(),
        },
        Some(_) => {
            errors.add(name, "Not a valid string.");
            return None;
        }
    };

    if value.trim().is_empty() {
        errors.add(name, "This field may not be blank.");
        None
    } else if value.chars().count() > max_length {
        errors.add(
            name,
            format!("Ensure this field has no more than {max_length} characters."),
        );
        None
    } else {
        Some(value)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// Characters allowed in the local part of an address, besides ASCII
/// letters, digits, and dots between atoms.
const LOCAL_PART_SPECIALS: &str = "!#$%&'*+/=?^_`{|}~-";

/// Whether `email` looks like a deliverable address: a dot-atom local part,
/// an `@`, and either `localhost` or a dotted domain with a top-level label
/// of at least two characters.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.rsplit_once('@') else {
        return false;
    };

    let local_ok = !local.is_empty()
        && local.split('.').all(|atom| {
            !atom.is_empty()
                && atom
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || LOCAL_PART_SPECIALS.contains(c))
        });

    local_ok && (domain.eq_ignore_ascii_case("localhost") || is_valid_domain(domain))
}

fn is_valid_domain(domain: &str) -> bool {
    let labels: Vec<&str> = domain.split('.').collect();
    let Some((tld, rest)) = labels.split_last() else {
        return false;
    };

    let label_ok = |label: &&str| {
        (1..=63).contains(&label.len())
            && label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
            && !label.starts_with('-')
            && !label.ends_with('-')
    };

    !rest.is_empty()
        && rest.iter().all(label_ok)
        && label_ok(tld)
        && tld.len() >= 2
        && !tld.chars().all(|c| c.is_ascii_digit())
}

/// Validate a registration body and, if everything checks out, store the new
/// account.
///
/// Checks happen in a fixed order so the same input always reports the same
/// problem: field validation, then email uniqueness, then password
/// confirmation.
///
/// ## Errors
///
/// - `Error::Fields` if field validation fails
/// - `Error::Validation` if the email is taken (including losing an insert
///   race) or the passwords don't match
/// - `Error::Internal` if the store or the password hasher fails
pub async fn validate_and_create(
    repo: &dyn AccountRepository,
    body: &Value,
) -> Result<Account, Error> {
    let registration = Registration::from_json(body)?;

    if repo.exists(&registration.email).await? {
        return Err(Error::duplicate_email());
    }

    if registration.password != registration.password2 {
        return Err(Error::password_mismatch());
    }

    let password_hash = hash_password(&registration.password)?;

    let account = repo
        .insert(NewAccount {
            email: registration.email,
            password_hash,
        })
        .await?;

    tracing::info!(email = %account.email, "registered new account");

    Ok(account)
}

/// Hash a password with argon2 and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);

    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}
