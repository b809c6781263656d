// src/services/bulk_insert.rs - Insert URLs and backfill their short codes
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};

use crate::errors::{BulkInsertPhase, JobError, RepositoryError};
use crate::models::ShortCodeAssignment;
use crate::repositories::ShortenedUrlRepositoryTrait;
use crate::utils::{base62, format::group_digits};

type Result<T> = std::result::Result<T, JobError>;

/// Rows per multi-row statement
pub const DEFAULT_PAGE_SIZE: usize = 10_000;

/// Largest page whose multi-row insert stays within PostgreSQL's bind-parameter limit
pub const MAX_PAGE_SIZE: usize = u16::MAX as usize;

/// Outcome of a committed bulk insert
#[derive(Debug, Clone, PartialEq)]
pub struct BulkInsertSummary {
    pub inserted: u64,
    pub short_urls_assigned: u64,
    pub insert_elapsed: Duration,
    pub update_elapsed: Duration,
    pub total_elapsed: Duration,
}

/// Inserts URLs page by page and writes each row's short code, all inside one
/// transaction: either every row lands with its short code or none does.
pub struct BulkInserter<T: ShortenedUrlRepositoryTrait> {
    repository: Arc<T>,
    page_size: usize,
}

impl<T: ShortenedUrlRepositoryTrait + Send + Sync> BulkInserter<T> {
    pub fn new(repository: Arc<T>, page_size: usize) -> Result<Self> {
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(JobError::InvalidPageSize {
                size: page_size,
                max: MAX_PAGE_SIZE,
            });
        }
        Ok(Self {
            repository,
            page_size,
        })
    }

    pub async fn bulk_create(&self, urls: &[String]) -> Result<BulkInsertSummary> {
        let started = Instant::now();

        let mut tx = self
            .repository
            .begin()
            .await
            .map_err(|source| aborted(BulkInsertPhase::Begin, source))?;

        let outcome = self.insert_and_assign(&mut tx, urls, started).await;
        let summary = match outcome {
            Ok(summary) => summary,
            Err(err) => {
                error!("Database error: {}", err);
                if let Err(rollback_err) = self.repository.rollback(tx).await {
                    // The server discards the transaction anyway once the connection drops
                    warn!("Rollback after failed bulk insert also failed: {}", rollback_err);
                }
                return Err(err);
            }
        };

        self.repository
            .commit(tx)
            .await
            .map_err(|source| aborted(BulkInsertPhase::Commit, source))?;
        info!("Transaction committed.");

        let summary = BulkInsertSummary {
            total_elapsed: started.elapsed(),
            ..summary
        };
        info!(
            "Processed {} records in {:.2} seconds.",
            group_digits(summary.inserted),
            summary.total_elapsed.as_secs_f64()
        );

        Ok(summary)
    }

    async fn insert_and_assign(
        &self,
        tx: &mut T::Tx,
        urls: &[String],
        started: Instant,
    ) -> Result<BulkInsertSummary> {
        info!("Inserting {} records...", group_digits(urls.len() as u64));

        let mut ids = Vec::with_capacity(urls.len());
        for (page, chunk) in urls.chunks(self.page_size).enumerate() {
            debug!("Inserting page {} ({} rows)", page + 1, chunk.len());

            let page_ids = self
                .repository
                .insert_urls(tx, chunk)
                .await
                .map_err(|source| aborted(BulkInsertPhase::Insert, source))?;

            if page_ids.len() != chunk.len() {
                return Err(aborted(
                    BulkInsertPhase::Insert,
                    RepositoryError::InvalidData(format!(
                        "page {} returned {} ids for {} rows",
                        page + 1,
                        page_ids.len(),
                        chunk.len()
                    )),
                ));
            }
            ids.extend(page_ids);
        }

        let insert_elapsed = started.elapsed();
        info!(
            "Successfully inserted in {:.2} seconds. Received {} new IDs.",
            insert_elapsed.as_secs_f64(),
            group_digits(ids.len() as u64)
        );

        let assignments = short_code_assignments(&ids)
            .map_err(|source| aborted(BulkInsertPhase::ShortCodes, source))?;

        info!(
            "Updating {} records with short URLs...",
            group_digits(assignments.len() as u64)
        );
        let update_started = Instant::now();

        let mut assigned = 0;
        for chunk in assignments.chunks(self.page_size) {
            assigned += self
                .repository
                .assign_short_urls(tx, chunk)
                .await
                .map_err(|source| aborted(BulkInsertPhase::ShortCodes, source))?;
        }

        let update_elapsed = update_started.elapsed();
        info!(
            "Successfully updated records in {:.2} seconds.",
            update_elapsed.as_secs_f64()
        );

        Ok(BulkInsertSummary {
            inserted: ids.len() as u64,
            short_urls_assigned: assigned,
            insert_elapsed,
            update_elapsed,
            total_elapsed: Duration::ZERO,
        })
    }
}

fn aborted(phase: BulkInsertPhase, source: RepositoryError) -> JobError {
    JobError::BulkInsertAborted { phase, source }
}

/// Pairs every id with its base62 short code
pub fn short_code_assignments(
    ids: &[i64],
) -> std::result::Result<Vec<ShortCodeAssignment>, RepositoryError> {
    ids.iter()
        .map(|&id| {
            let n = u64::try_from(id).map_err(|_| {
                RepositoryError::InvalidData(format!("storage assigned negative id {}", id))
            })?;
            Ok(ShortCodeAssignment {
                id,
                short_url: base62::encode(n),
            })
        })
        .collect()
}

/// Placeholder URLs for load testing, `https://www.some-website.com/page/item_{i}`
pub fn generate_dummy_urls(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("https://www.some-website.com/page/item_{}", i))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicI64, Ordering};

    use mockall::predicate::eq;
    use sqlx::Error as SqlxError;

    use super::*;
    use crate::repositories::MockShortenedUrlRepositoryTrait;

    type InsertResult = std::result::Result<Vec<i64>, RepositoryError>;

    // Hands out ids the way a sequence would
    fn sequential_ids(
        next_id: Arc<AtomicI64>,
    ) -> impl FnMut(&mut (), &[String]) -> InsertResult + Send + 'static {
        move |_, urls| {
            Ok(urls
                .iter()
                .map(|_| next_id.fetch_add(1, Ordering::SeqCst))
                .collect())
        }
    }

    #[test]
    fn test_short_code_assignments() {
        let assignments = short_code_assignments(&[1, 61, 62, 125]).unwrap();
        let codes: Vec<&str> = assignments.iter().map(|a| a.short_url.as_str()).collect();
        assert_eq!(codes, vec!["1", "Z", "10", "21"]);
        assert_eq!(assignments[3].id, 125);
    }

    #[test]
    fn test_short_code_assignments_reject_negative_ids() {
        assert!(matches!(
            short_code_assignments(&[5, -1]),
            Err(RepositoryError::InvalidData(_))
        ));
    }

    #[test]
    fn test_generate_dummy_urls() {
        let urls = generate_dummy_urls(3);
        assert_eq!(urls.len(), 3);
        assert_eq!(urls[2], "https://www.some-website.com/page/item_2");
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        let repository = Arc::new(MockShortenedUrlRepositoryTrait::new());
        assert!(matches!(
            BulkInserter::new(repository, 0),
            Err(JobError::InvalidPageSize { size: 0, .. })
        ));
    }

    #[test]
    fn test_page_size_is_capped_by_bind_limit() {
        let repository = Arc::new(MockShortenedUrlRepositoryTrait::new());
        assert!(BulkInserter::new(repository.clone(), MAX_PAGE_SIZE).is_ok());

        match BulkInserter::new(repository, 40_000 + MAX_PAGE_SIZE) {
            Err(err @ JobError::InvalidPageSize { max: 65_535, .. }) => {
                assert_eq!(
                    err.to_string(),
                    "Page size must be between 1 and 65535, got 105535"
                );
            }
            Err(other) => panic!("expected a page size error, got {:?}", other),
            Ok(_) => panic!("oversized page accepted"),
        }
    }

    #[tokio::test]
    async fn test_bulk_create_pages_and_commits_once() {
        let mut repository = MockShortenedUrlRepositoryTrait::new();
        let next_id = Arc::new(AtomicI64::new(1));

        repository.expect_begin().times(1).returning(|| Ok(()));
        repository
            .expect_insert_urls()
            .times(3)
            .withf(|_, urls| urls.len() <= 4)
            .returning(sequential_ids(next_id.clone()));
        repository
            .expect_assign_short_urls()
            .times(3)
            .withf(|_, assignments| {
                assignments
                    .iter()
                    .all(|a| base62::decode(&a.short_url) == Some(a.id as u64))
            })
            .returning(|_, assignments| Ok(assignments.len() as u64));
        repository.expect_commit().times(1).returning(|_| Ok(()));
        repository.expect_rollback().times(0);

        let inserter = BulkInserter::new(Arc::new(repository), 4).unwrap();
        let summary = inserter
            .bulk_create(&generate_dummy_urls(10))
            .await
            .unwrap();

        assert_eq!(summary.inserted, 10);
        assert_eq!(summary.short_urls_assigned, 10);
        assert_eq!(next_id.load(Ordering::SeqCst), 11);
    }

    #[tokio::test]
    async fn test_failed_short_code_page_rolls_back_everything() {
        let mut repository = MockShortenedUrlRepositoryTrait::new();
        let next_id = Arc::new(AtomicI64::new(1));
        let mut update_calls = 0;

        repository.expect_begin().times(1).returning(|| Ok(()));
        repository
            .expect_insert_urls()
            .times(3)
            .returning(sequential_ids(next_id));
        repository
            .expect_assign_short_urls()
            .times(2)
            .returning(move |_, assignments| {
                update_calls += 1;
                if update_calls == 2 {
                    Err(RepositoryError::Database(SqlxError::PoolTimedOut))
                } else {
                    Ok(assignments.len() as u64)
                }
            });
        repository.expect_commit().times(0);
        repository.expect_rollback().times(1).returning(|_| Ok(()));

        let inserter = BulkInserter::new(Arc::new(repository), 4).unwrap();
        let result = inserter.bulk_create(&generate_dummy_urls(9)).await;

        assert!(matches!(
            result,
            Err(JobError::BulkInsertAborted {
                phase: BulkInsertPhase::ShortCodes,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_failed_insert_page_skips_short_codes() {
        let mut repository = MockShortenedUrlRepositoryTrait::new();

        repository.expect_begin().times(1).returning(|| Ok(()));
        repository
            .expect_insert_urls()
            .times(1)
            .returning(|_, _| Err(RepositoryError::Conflict("duplicate".to_string())));
        repository.expect_assign_short_urls().times(0);
        repository.expect_commit().times(0);
        repository.expect_rollback().times(1).returning(|_| Ok(()));

        let inserter = BulkInserter::new(Arc::new(repository), DEFAULT_PAGE_SIZE).unwrap();
        let result = inserter.bulk_create(&generate_dummy_urls(3)).await;

        assert!(matches!(
            result,
            Err(JobError::BulkInsertAborted {
                phase: BulkInsertPhase::Insert,
                source: RepositoryError::Conflict(_),
            })
        ));
    }

    #[tokio::test]
    async fn test_short_id_count_aborts() {
        let mut repository = MockShortenedUrlRepositoryTrait::new();

        repository.expect_begin().times(1).returning(|| Ok(()));
        repository
            .expect_insert_urls()
            .times(1)
            .returning(|_, _| Ok(vec![1]));
        repository.expect_rollback().times(1).returning(|_| Ok(()));

        let inserter = BulkInserter::new(Arc::new(repository), DEFAULT_PAGE_SIZE).unwrap();
        let result = inserter.bulk_create(&generate_dummy_urls(2)).await;

        assert!(matches!(
            result,
            Err(JobError::BulkInsertAborted {
                source: RepositoryError::InvalidData(_),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_failed_commit_is_reported() {
        let mut repository = MockShortenedUrlRepositoryTrait::new();

        repository.expect_begin().times(1).returning(|| Ok(()));
        repository
            .expect_insert_urls()
            .returning(|_, urls| Ok((1..=urls.len() as i64).collect()));
        repository
            .expect_assign_short_urls()
            .returning(|_, assignments| Ok(assignments.len() as u64));
        repository
            .expect_commit()
            .with(eq(()))
            .times(1)
            .returning(|_| Err(RepositoryError::Database(SqlxError::PoolClosed)));

        let inserter = BulkInserter::new(Arc::new(repository), DEFAULT_PAGE_SIZE).unwrap();
        let result = inserter.bulk_create(&generate_dummy_urls(2)).await;

        assert!(matches!(
            result,
            Err(JobError::BulkInsertAborted {
                phase: BulkInsertPhase::Commit,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_empty_input_commits_nothing() {
        let mut repository = MockShortenedUrlRepositoryTrait::new();

        repository.expect_begin().times(1).returning(|| Ok(()));
        repository.expect_insert_urls().times(0);
        repository.expect_assign_short_urls().times(0);
        repository.expect_commit().times(1).returning(|_| Ok(()));

        let inserter = BulkInserter::new(Arc::new(repository), DEFAULT_PAGE_SIZE).unwrap();
        let summary = inserter.bulk_create(&[]).await.unwrap();

        assert_eq!(summary.inserted, 0);
        assert_eq!(summary.short_urls_assigned, 0);
    }
}
