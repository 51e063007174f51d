use super::{Account, AccountRepository, Error, NewAccount, Result};
use async_trait::async_trait;
use sqlx::{query, query_as, PgPool};

/// Accounts stored in the `accounts` table. Uniqueness is enforced by the
/// table's unique constraint on `email`.
#[derive(Debug, Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    /// Wrap an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for PgRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let account = query_as::<_, Account>(
            "SELECT email, password, date_joined FROM accounts WHERE email = $1 LIMIT 1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    async fn exists(&self, email: &str) -> Result<bool> {
        let existing = query("SELECT 1 FROM accounts WHERE email = $1 LIMIT 1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(existing.is_some())
    }

    async fn insert(&self, account: NewAccount) -> Result<Account> {
        // A conflicting row means somebody else got there first, in which case
        // nothing comes back.
        query_as::<_, Account>(
            "INSERT INTO accounts (email, password) VALUES ($1, $2) \
            ON CONFLICT (email) DO NOTHING \
            RETURNING email, password, date_joined",
        )
        .bind(&account.email)
        .bind(&account.password_hash)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(Error::Duplicate)
    }

    async fn ping(&self) -> Result<()> {
        query("SELECT 1").execute(&self.pool).await?;

        Ok(())
    }
}
