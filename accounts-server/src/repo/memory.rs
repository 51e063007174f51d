use super::{Account, AccountRepository, Error, NewAccount, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{hash_map::Entry, HashMap};
use tokio::sync::RwLock;

/// Keeps accounts in a map keyed by email. Everything is lost on restart.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    accounts: RwLock<HashMap<String, Account>>,
}

impl MemoryRepository {
    /// How many accounts are stored.
    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }
}

#[async_trait]
impl AccountRepository for MemoryRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        Ok(self.accounts.read().await.get(email).cloned())
    }

    async fn exists(&self, email: &str) -> Result<bool> {
        Ok(self.accounts.read().await.contains_key(email))
    }

    async fn insert(&self, account: NewAccount) -> Result<Account> {
        match self.accounts.write().await.entry(account.email) {
            Entry::Occupied(_) => Err(Error::Duplicate),
            Entry::Vacant(entry) => {
                let stored = Account {
                    email: entry.key().clone(),
                    password: account.password_hash,
                    date_joined: Utc::now(),
                };

                Ok(entry.insert(stored).clone())
            }
        }
    }
}
