use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The fields of an account that are safe to send over the wire. Passwords
/// never appear here.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Account {
    /// Email the account was registered with.
    pub email: String,

    /// When the account was created.
    pub date_joined: DateTime<Utc>,
}
