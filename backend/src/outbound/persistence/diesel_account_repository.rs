//! PostgreSQL-backed `AccountRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::accounts::Account;
use crate::domain::ports::{AccountRepository, NewAccount, ProfileChanges, StoreError};

use super::error_map::map_diesel_error;
use super::models::{AccountChanges, AccountRow, AvatarRow, NewAccountRow};
use super::pool::DbPool;
use super::schema::{account_avatars, accounts};

/// Diesel-backed implementation of the `AccountRepository` port.
#[derive(Clone)]
pub struct DieselAccountRepository {
    pool: DbPool,
}

impl DieselAccountRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for DieselAccountRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Account>, StoreError> {
        let mut conn = self.pool.get().await?;
        let row: Option<AccountRow> = accounts::table
            .find(id)
            .select(AccountRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Account::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let mut conn = self.pool.get().await?;
        let row: Option<AccountRow> = accounts::table
            .filter(accounts::email.eq(email))
            .select(AccountRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Account::from))
    }

    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<Account>, StoreError> {
        let mut conn = self.pool.get().await?;
        let row: Option<AccountRow> = accounts::table
            .filter(accounts::username.eq(username).or(accounts::email.eq(email)))
            .select(AccountRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Account::from))
    }

    async fn find_by_username_and_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<Account>, StoreError> {
        let mut conn = self.pool.get().await?;
        let row: Option<AccountRow> = accounts::table
            .filter(accounts::username.eq(username).and(accounts::email.eq(email)))
            .select(AccountRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Account::from))
    }

    async fn insert(&self, account: NewAccount) -> Result<Account, StoreError> {
        let mut conn = self.pool.get().await?;
        let row: AccountRow = diesel::insert_into(accounts::table)
            .values(NewAccountRow::from(account))
            .returning(AccountRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(Account::from(row))
    }

    async fn delete(&self, id: i32) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await?;
        diesel::delete(accounts::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn activate(&self, id: i32) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await?;
        diesel::update(accounts::table.find(id))
            .set(accounts::active.eq(true))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn set_password_hash(&self, id: i32, hash: &str) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await?;
        diesel::update(accounts::table.find(id))
            .set(accounts::password_hash.eq(hash))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn update_profile(&self, id: i32, changes: ProfileChanges) -> Result<(), StoreError> {
        if changes.is_empty() {
            return Ok(());
        }
        let mut conn = self.pool.get().await?;
        diesel::update(accounts::table.find(id))
            .set(AccountChanges::from(changes))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn avatar(&self, id: i32) -> Result<Option<String>, StoreError> {
        let mut conn = self.pool.get().await?;
        account_avatars::table
            .find(id)
            .select(account_avatars::avatar)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)
    }

    async fn set_avatar(&self, id: i32, avatar: &str) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await?;
        diesel::insert_into(account_avatars::table)
            .values(AvatarRow {
                account_id: id,
                avatar: avatar.to_owned(),
            })
            .on_conflict(account_avatars::account_id)
            .do_update()
            .set(account_avatars::avatar.eq(avatar))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }
}
