//! PostgreSQL-backed `TestDriveRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::accounts::{TestDrive, TestDriveFilter};
use crate::domain::filter::{Predicate, QueryFilter};
use crate::domain::ports::{StoreError, TestDriveRepository};

use super::condition::test_drives_condition;
use super::error_map::map_diesel_error;
use super::models::{NewTestDriveRow, TestDriveChanges, TestDriveRow};
use super::pool::DbPool;
use super::schema::test_drives;

/// Diesel-backed implementation of the `TestDriveRepository` port.
#[derive(Clone)]
pub struct DieselTestDriveRepository {
    pool: DbPool,
}

impl DieselTestDriveRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TestDriveRepository for DieselTestDriveRepository {
    async fn list(&self, predicate: &Predicate) -> Result<Vec<TestDrive>, StoreError> {
        let condition = test_drives_condition(predicate)?;
        let mut conn = self.pool.get().await?;
        let rows: Vec<TestDriveRow> = test_drives::table
            .filter(condition)
            .order(test_drives::id.asc())
            .select(TestDriveRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(TestDrive::from).collect())
    }

    async fn insert(&self, username: &str, email: &str) -> Result<TestDrive, StoreError> {
        let mut conn = self.pool.get().await?;
        let row: TestDriveRow = diesel::insert_into(test_drives::table)
            .values(NewTestDriveRow { username, email })
            .returning(TestDriveRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(TestDrive::from(row))
    }

    async fn update(
        &self,
        predicate: &Predicate,
        patch: TestDriveFilter,
    ) -> Result<(u64, Vec<TestDrive>), StoreError> {
        let mut conn = self.pool.get().await?;
        let (updated, rows) = if patch.normalize().is_empty() {
            let condition = test_drives_condition(predicate)?;
            let rows: Vec<TestDriveRow> = test_drives::table
                .filter(condition)
                .order(test_drives::id.asc())
                .select(TestDriveRow::as_select())
                .load(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            (0, rows)
        } else {
            let update_condition = test_drives_condition(predicate)?;
            let reload_condition = test_drives_condition(predicate)?;
            // Blank strings are no-ops, matching the filter normalization.
            let changes = TestDriveChanges {
                username: patch.username.filter(|value| !value.trim().is_empty()),
                email: patch.email.filter(|value| !value.trim().is_empty()),
            };
            conn.transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    let updated = diesel::update(test_drives::table.filter(update_condition))
                        .set(&changes)
                        .execute(conn)
                        .await?;
                    let rows: Vec<TestDriveRow> = test_drives::table
                        .filter(reload_condition)
                        .order(test_drives::id.asc())
                        .select(TestDriveRow::as_select())
                        .load(conn)
                        .await?;
                    Ok((updated as u64, rows))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?
        };
        Ok((updated, rows.into_iter().map(TestDrive::from).collect()))
    }

    async fn delete(&self, predicate: &Predicate) -> Result<u64, StoreError> {
        let condition = test_drives_condition(predicate)?;
        let mut conn = self.pool.get().await?;
        let removed = diesel::delete(test_drives::table.filter(condition))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed as u64)
    }
}
