//! SQLite ledger store
//!
//! Balances and payment records live in two tables. Atomicity comes from
//! the database: a debit is one conditional `UPDATE` (the non-negativity
//! check and the mutation are the same statement), and applying a payment
//! runs the reference insert and the balance upsert in one transaction, so
//! a crash can never leave a reference marked used without its credit.

pub mod schema;

use crate::error::{StoreError, StoreResult};
use crate::traits::{BalanceStore, CreditOutcome, IdempotencyIndex, LedgerStore};
use async_trait::async_trait;
use chrono::Utc;
use credbank_core::{Credits, PaymentRecord};
use schema::PaymentRow;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// SQLite realization of [`LedgerStore`].
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect to `database_url` (e.g. `sqlite:credbank.db`), creating the
    /// file and schema if missing.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .foreign_keys(true);

        let pool = SqlitePool::connect_with(options).await?;
        init_schema(&pool).await?;
        debug!(database_url, "sqlite ledger store ready");

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn balance_in<'e, E>(executor: E, account: &str) -> StoreResult<Credits>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        let balance: Option<i64> =
            sqlx::query_scalar("SELECT balance FROM balances WHERE account_id = ?")
                .bind(account)
                .fetch_optional(executor)
                .await?;

        match balance {
            Some(value) => to_credits(value),
            None => Ok(0),
        }
    }
}

/// Initialize the schema (idempotent).
pub async fn init_schema(pool: &SqlitePool) -> StoreResult<()> {
    sqlx::query(schema::CREATE_BALANCES).execute(pool).await?;
    sqlx::query(schema::CREATE_PAYMENTS).execute(pool).await?;
    sqlx::query(schema::CREATE_PAYMENTS_ACCOUNT_INDEX)
        .execute(pool)
        .await?;
    Ok(())
}

fn to_credits(value: i64) -> StoreResult<Credits> {
    Credits::try_from(value)
        .map_err(|_| StoreError::Corrupt(format!("negative balance row: {value}")))
}

#[async_trait]
impl BalanceStore for SqliteStore {
    async fn balance(&self, account: &str) -> StoreResult<Credits> {
        Self::balance_in(&self.pool, account).await
    }

    async fn apply_delta(&self, account: &str, delta: i64) -> StoreResult<Credits> {
        let mut tx = self.pool.begin().await?;

        if delta >= 0 {
            sqlx::query(
                r#"
                INSERT INTO balances (account_id, balance, updated_at)
                VALUES (?, ?, ?)
                ON CONFLICT(account_id) DO UPDATE SET
                    balance = balance + excluded.balance,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(account)
            .bind(delta)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;
        } else {
            let needed = delta.unsigned_abs();
            let result = sqlx::query(
                r#"
                UPDATE balances SET balance = balance - ?, updated_at = ?
                WHERE account_id = ? AND balance >= ?
                "#,
            )
            .bind(needed as i64)
            .bind(Utc::now())
            .bind(account)
            .bind(needed as i64)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                let available = Self::balance_in(&mut *tx, account).await?;
                tx.rollback().await?;
                return Err(StoreError::InsufficientBalance { needed, available });
            }
        }

        let balance = Self::balance_in(&mut *tx, account).await?;
        tx.commit().await?;
        Ok(balance)
    }
}

#[async_trait]
impl IdempotencyIndex for SqliteStore {
    async fn try_reserve(&self, reference: &str) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO payments (reference, applied_at) VALUES (?, ?)
            ON CONFLICT(reference) DO NOTHING
            "#,
        )
        .bind(reference)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn contains(&self, reference: &str) -> StoreResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payments WHERE reference = ?")
            .bind(reference)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }
}

#[async_trait]
impl LedgerStore for SqliteStore {
    async fn apply_payment(
        &self,
        account: &str,
        amount: Credits,
        reference: &str,
    ) -> StoreResult<CreditOutcome> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // The payments primary key decides the idempotency race.
        let inserted = sqlx::query(
            r#"
            INSERT INTO payments (reference, account_id, credits_granted, applied_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(reference) DO NOTHING
            "#,
        )
        .bind(reference)
        .bind(account)
        .bind(amount as i64)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            let balance = Self::balance_in(&mut *tx, account).await?;
            tx.rollback().await?;
            return Ok(CreditOutcome::Duplicate { balance });
        }

        sqlx::query(
            r#"
            INSERT INTO balances (account_id, balance, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(account_id) DO UPDATE SET
                balance = balance + excluded.balance,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(account)
        .bind(amount as i64)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let balance = Self::balance_in(&mut *tx, account).await?;
        tx.commit().await?;

        Ok(CreditOutcome::Applied { balance })
    }

    async fn payment(&self, reference: &str) -> StoreResult<Option<PaymentRecord>> {
        let row = sqlx::query_as::<_, PaymentRow>(
            "SELECT * FROM payments WHERE reference = ? AND account_id IS NOT NULL",
        )
        .bind(reference)
        .fetch_optional(&self.pool)
        .await?;

        row.map(PaymentRow::into_record).transpose()
    }
}
