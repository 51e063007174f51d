use accounts_core::api::account;
use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use chrono::{DateTime, Utc};
use std::{convert::Infallible, sync::Arc};

/// Accounts kept in process memory, for tests and local development.
pub mod memory;
pub use memory::MemoryRepository;

/// Accounts kept in PostgreSQL.
pub mod postgres;
pub use postgres::PgRepository;

/// Easy alias for repository results
pub type Result<T> = std::result::Result<T, Error>;

/// Things that can go wrong talking to the account store
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An account with this email is already stored. This is how the store
    /// reports losing an insert race, so callers should treat it the same as
    /// failing an existence check.
    #[error("an account with this email already exists")]
    Duplicate,

    /// The database failed us.
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// A stored account.
#[derive(Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Account {
    pub email: String,

    /// PHC-formatted argon2 hash. Never the plaintext password.
    pub password: String,

    pub date_joined: DateTime<Utc>,
}

impl Account {
    /// The fields we're willing to send to clients.
    pub fn public(&self) -> account::Account {
        account::Account {
            email: self.email.clone(),
            date_joined: self.date_joined,
        }
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("email", &self.email)
            .field("date_joined", &self.date_joined)
            .finish_non_exhaustive()
    }
}

/// What we need to create an account. The store fills in `date_joined`.
#[derive(Clone)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
}

/// Where accounts live.
#[async_trait]
pub trait AccountRepository: std::fmt::Debug + Send + Sync {
    /// Look up an account by its exact email.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>>;

    /// Check whether an account with this exact email exists.
    async fn exists(&self, email: &str) -> Result<bool>;

    /// Store a new account, failing with `Error::Duplicate` if the email is
    /// taken. This must be atomic with respect to other inserts.
    async fn insert(&self, account: NewAccount) -> Result<Account>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// The shared handle to whatever repository the server was started with.
pub type SharedRepository = Arc<dyn AccountRepository>;

/// Extracts the account repository from the router state.
#[derive(Debug)]
pub struct Repo(pub SharedRepository);

impl<State> FromRequestParts<State> for Repo
where
    SharedRepository: FromRef<State>,
    State: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &State,
    ) -> std::result::Result<Self, Self::Rejection> {
        Ok(Self(SharedRepository::from_ref(state)))
    }
}
