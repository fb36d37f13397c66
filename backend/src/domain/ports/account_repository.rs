//! Port abstraction for account persistence adapters.

use async_trait::async_trait;

use super::StoreError;
use crate::domain::accounts::Account;

/// Insert payload for a new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    /// Sign-up creates inactive accounts; Google sign-in creates active ones.
    pub active: bool,
}

/// Partial profile update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

impl ProfileChanges {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none() && self.password_hash.is_none()
    }
}

#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<Account>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    /// Uniqueness probe used by sign-up and Google sign-in.
    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<Account>, StoreError>;

    /// Exact identity match used by test-drive requests.
    async fn find_by_username_and_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<Account>, StoreError>;

    async fn insert(&self, account: NewAccount) -> Result<Account, StoreError>;

    /// Remove an account; compensation path when verification mail fails.
    async fn delete(&self, id: i32) -> Result<(), StoreError>;

    /// Mark the account verified.
    async fn activate(&self, id: i32) -> Result<(), StoreError>;

    async fn set_password_hash(&self, id: i32, hash: &str) -> Result<(), StoreError>;

    async fn update_profile(&self, id: i32, changes: ProfileChanges) -> Result<(), StoreError>;

    /// Stored avatar reference, if any.
    async fn avatar(&self, id: i32) -> Result<Option<String>, StoreError>;

    /// Insert or replace the avatar reference.
    async fn set_avatar(&self, id: i32, avatar: &str) -> Result<(), StoreError>;
}
