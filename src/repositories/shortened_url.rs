// src/repositories/shortened_url.rs - Data access
use async_trait::async_trait;
use log::debug;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};

use crate::config::TableName;
use crate::db::Database;
use crate::errors::RepositoryError;
use crate::models::{
    IdWindow, ShortCodeAssignment, ShortenedUrlRecord, VisitCandidate, VisitCountAssignment,
};

type Result<T> = std::result::Result<T, RepositoryError>;

#[cfg_attr(test, mockall::automock(type Tx = ();))]
#[async_trait]
pub trait ShortenedUrlRepositoryTrait {
    /// Open transaction handed back to every statement of a unit of work
    type Tx: Send;

    /// Starts a transaction
    ///
    /// ### Errors
    /// * `RepositoryError::Database` - If no connection could be acquired
    async fn begin(&self) -> Result<Self::Tx>;

    /// Commits a transaction, making every statement run on it durable
    async fn commit(&self, tx: Self::Tx) -> Result<()>;

    /// Rolls back a transaction, discarding every statement run on it
    async fn rollback(&self, tx: Self::Tx) -> Result<()>;

    /// Inserts one row per URL in a single multi-row statement
    ///
    /// ### Returns
    /// * `Result<Vec<i64>>` - The storage-assigned ids, in input order
    ///
    /// ### Errors
    /// * `RepositoryError::Database` - If a database error occurs
    /// * `RepositoryError::Conflict` - If a unique constraint is violated
    async fn insert_urls(&self, tx: &mut Self::Tx, urls: &[String]) -> Result<Vec<i64>>;

    /// Writes short codes for already inserted rows in a single update
    ///
    /// ### Returns
    /// * `Result<u64>` - Number of rows updated
    async fn assign_short_urls(
        &self,
        tx: &mut Self::Tx,
        assignments: &[ShortCodeAssignment],
    ) -> Result<u64>;

    /// Loads the columns the visit count formula needs for every row in `window`
    async fn fetch_visit_candidates(
        &self,
        tx: &mut Self::Tx,
        window: IdWindow,
    ) -> Result<Vec<VisitCandidate>>;

    /// Overwrites visit counts in exactly one statement
    ///
    /// ### Returns
    /// * `Result<u64>` - Number of rows updated
    async fn write_visit_counts(
        &self,
        tx: &mut Self::Tx,
        assignments: &[VisitCountAssignment],
    ) -> Result<u64>;

    /// Counts every row of the table
    async fn count_rows(&self) -> Result<i64>;
}

// Implementation using actual database
pub struct ShortenedUrlRepository {
    pool: PgPool,
    table: TableName,
}

impl ShortenedUrlRepository {
    pub fn new(db: Database, table: TableName) -> Self {
        Self {
            pool: db.get_pool().clone(),
            table,
        }
    }

    /// Reads the full rows of `window`, ordered by id
    pub async fn find_in_window(&self, window: IdWindow) -> Result<Vec<ShortenedUrlRecord>> {
        let sql = format!(
            r#"
            SELECT id::bigint AS id, original_url, short_url,
                   created_at::timestamptz AS created_at, visit_count::bigint AS visit_count
            FROM {}
            WHERE id >= $1 AND id < $2
            ORDER BY id
            "#,
            self.table
        );

        let records = sqlx::query_as::<_, ShortenedUrlRecord>(&sql)
            .bind(window.start)
            .bind(window.end)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }
}

#[async_trait]
impl ShortenedUrlRepositoryTrait for ShortenedUrlRepository {
    type Tx = Transaction<'static, Postgres>;

    async fn begin(&self) -> Result<Self::Tx> {
        self.pool.begin().await.map_err(|e| {
            log::error!("Failed to start database transaction: {}", e);
            RepositoryError::Database(e)
        })
    }

    async fn commit(&self, tx: Self::Tx) -> Result<()> {
        tx.commit().await.map_err(|e| {
            log::error!("Failed to commit transaction: {}", e);
            RepositoryError::Database(e)
        })
    }

    async fn rollback(&self, tx: Self::Tx) -> Result<()> {
        tx.rollback().await.map_err(|e| {
            log::error!("Failed to roll back transaction: {}", e);
            RepositoryError::Database(e)
        })
    }

    async fn insert_urls(&self, tx: &mut Self::Tx, urls: &[String]) -> Result<Vec<i64>> {
        if urls.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("INSERT INTO {} (original_url) ", self.table));
        builder.push_values(urls, |mut row, url| {
            row.push_bind(url);
        });
        builder.push(" RETURNING id::bigint");

        let ids = builder
            .build_query_scalar::<i64>()
            .fetch_all(&mut **tx)
            .await
            .map_err(|e| {
                log::error!("Failed to insert {} URLs: {}", urls.len(), e);
                RepositoryError::from(e)
            })?;

        debug!("Inserted {} URLs into {}", ids.len(), self.table);
        Ok(ids)
    }

    async fn assign_short_urls(
        &self,
        tx: &mut Self::Tx,
        assignments: &[ShortCodeAssignment],
    ) -> Result<u64> {
        if assignments.is_empty() {
            return Ok(0);
        }

        let (ids, codes): (Vec<i64>, Vec<&str>) = assignments
            .iter()
            .map(|a| (a.id, a.short_url.as_str()))
            .unzip();

        let sql = format!(
            r#"
            UPDATE {} AS t
            SET short_url = data.short_url
            FROM UNNEST($1::bigint[], $2::text[]) AS data (id, short_url)
            WHERE t.id = data.id
            "#,
            self.table
        );

        let result = sqlx::query(&sql)
            .bind(ids)
            .bind(codes)
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                log::error!("Failed to assign {} short URLs: {}", assignments.len(), e);
                RepositoryError::from(e)
            })?;

        Ok(result.rows_affected())
    }

    async fn fetch_visit_candidates(
        &self,
        tx: &mut Self::Tx,
        window: IdWindow,
    ) -> Result<Vec<VisitCandidate>> {
        let sql = format!(
            r#"
            SELECT id::bigint AS id, original_url, created_at::timestamptz AS created_at
            FROM {}
            WHERE id >= $1 AND id < $2
            "#,
            self.table
        );

        let candidates = sqlx::query_as::<_, VisitCandidate>(&sql)
            .bind(window.start)
            .bind(window.end)
            .fetch_all(&mut **tx)
            .await?;

        debug!("Loaded {} rows in window {}", candidates.len(), window);
        Ok(candidates)
    }

    async fn write_visit_counts(
        &self,
        tx: &mut Self::Tx,
        assignments: &[VisitCountAssignment],
    ) -> Result<u64> {
        // Two array binds keep the statement size independent of the row count
        let (ids, counts): (Vec<i64>, Vec<i64>) = assignments
            .iter()
            .map(|a| (a.id, a.visit_count))
            .unzip();

        let sql = format!(
            r#"
            UPDATE {} AS t
            SET visit_count = data.visit_count
            FROM UNNEST($1::bigint[], $2::bigint[]) AS data (id, visit_count)
            WHERE t.id = data.id
            "#,
            self.table
        );

        let result = sqlx::query(&sql)
            .bind(ids)
            .bind(counts)
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected())
    }

    async fn count_rows(&self) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", self.table);
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
