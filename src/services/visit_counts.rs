// src/services/visit_counts.rs - Batched range update of visit counts
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use log::{debug, error, info, warn};

use super::progress::{ProgressTracker, VisitCountSummary};
use super::visit_formula::visit_count;
use super::windows::IdWindows;
use crate::errors::{JobError, RepositoryError};
use crate::models::{IdWindow, VisitCountAssignment};
use crate::repositories::ShortenedUrlRepositoryTrait;
use crate::utils::{
    format::{group_digits, group_digits_signed},
    RandomSource,
};

/// Rewrites visit counts window by window, committing after every window so an
/// interrupted run keeps the windows it finished and can resume from the next.
pub struct VisitCountUpdater<T: ShortenedUrlRepositoryTrait> {
    repository: Arc<T>,
}

impl<T: ShortenedUrlRepositoryTrait + Send + Sync> VisitCountUpdater<T> {
    pub fn new(repository: Arc<T>) -> Self {
        Self { repository }
    }

    pub async fn update_visit_counts<R: RandomSource>(
        &self,
        windows: IdWindows,
        random: &mut R,
    ) -> Result<VisitCountSummary, JobError> {
        let total_batches = windows.total_batches();
        let total_records = windows.total_records();

        info!(
            "Starting visit count update for {} records ({} to {})",
            group_digits(total_records),
            windows.start_id(),
            windows.end_id()
        );
        info!(
            "Processing in {} batches of {} records each",
            total_batches,
            group_digits(windows.batch_size())
        );
        if windows.next_batch_index() > 0 {
            info!("Resuming at batch {}", windows.next_batch_index() + 1);
        }

        let mut tracker = ProgressTracker::start(total_batches, windows.next_batch_index());

        for batch in windows {
            info!(
                "Batch {}/{}: Updating IDs {} to {}",
                batch.index + 1,
                total_batches,
                group_digits_signed(batch.window.start),
                group_digits_signed(batch.window.last())
            );

            let batch_started = Instant::now();
            let rows_affected = self
                .apply_window(batch.window, random)
                .await
                .map_err(|source| {
                    error!("Database error during batch update: {}", source);
                    JobError::BatchFailed {
                        batch: batch.index + 1,
                        total_batches,
                        committed_batches: tracker.completed(),
                        source,
                    }
                })?;

            let snapshot = tracker.record(rows_affected, batch_started.elapsed());
            info!(
                "  ✓ Updated {} records in {:.2} seconds",
                group_digits(snapshot.rows_affected),
                snapshot.batch_duration.as_secs_f64()
            );
            info!(
                "  Progress: {:.1}% | Elapsed: {:.1}s | Est. remaining: {:.1}s",
                snapshot.percent,
                snapshot.elapsed.as_secs_f64(),
                snapshot.estimated_remaining.as_secs_f64()
            );
        }

        let summary = tracker.finish();
        info!("All batches completed successfully!");
        info!("{}", completion_line(total_records, &summary));
        info!(
            "Average: {:.2} seconds per batch",
            summary.average_batch_duration().as_secs_f64()
        );

        Ok(summary)
    }

    /// Runs one window in its own transaction
    async fn apply_window<R: RandomSource>(
        &self,
        window: IdWindow,
        random: &mut R,
    ) -> Result<u64, RepositoryError> {
        let mut tx = self.repository.begin().await?;

        let outcome = self.rewrite_window(&mut tx, window, random).await;
        match outcome {
            Ok(rows_affected) => {
                self.repository.commit(tx).await?;
                Ok(rows_affected)
            }
            Err(err) => {
                if let Err(rollback_err) = self.repository.rollback(tx).await {
                    warn!("Rollback of window {} failed: {}", window, rollback_err);
                }
                Err(err)
            }
        }
    }

    async fn rewrite_window<R: RandomSource>(
        &self,
        tx: &mut T::Tx,
        window: IdWindow,
        random: &mut R,
    ) -> Result<u64, RepositoryError> {
        let candidates = self.repository.fetch_visit_candidates(tx, window).await?;

        let now = Utc::now();
        let assignments: Vec<VisitCountAssignment> = candidates
            .iter()
            .map(|candidate| VisitCountAssignment {
                id: candidate.id,
                visit_count: visit_count(candidate, now, random),
            })
            .collect();

        debug!(
            "Writing {} visit counts for window {}",
            assignments.len(),
            window
        );
        self.repository.write_visit_counts(tx, &assignments).await
    }
}

/// Final report; ids missing from a sparse range make the two counts differ
fn completion_line(total_records: u64, summary: &VisitCountSummary) -> String {
    format!(
        "Completed visit count update for {} ids: {} rows updated in {:.2} seconds.",
        group_digits(total_records),
        group_digits(summary.rows_affected),
        summary.total_elapsed.as_secs_f64()
    )
}
