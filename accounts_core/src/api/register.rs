use serde::{Deserialize, Serialize};

/// The request to register a new account.
#[derive(Debug, Serialize, Deserialize)]
pub struct Req {
    /// Email to use for contact and login.
    pub email: String,

    /// Plaintext password to use for login.
    pub password: String,

    /// Must match `password` exactly.
    pub password2: String,
}

/// Result of registering a new account, or of fetching your own.
pub type Resp = super::account::Account;

/// Where the register endpoint lives. `POST` registers, `GET` returns the
/// account of the authenticated caller.
pub const PATH: &str = "/api/v1/register";
