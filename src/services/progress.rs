use std::time::{Duration, Instant};

/// Progress of a range update after one batch
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    /// One-based number of the batch just completed
    pub batch: u64,
    pub total_batches: u64,
    pub rows_affected: u64,
    pub batch_duration: Duration,
    /// Share of all batches done, in percent
    pub percent: f64,
    pub elapsed: Duration,
    pub estimated_remaining: Duration,
}

/// Totals reported when a range update finishes
#[derive(Debug, Clone, PartialEq)]
pub struct VisitCountSummary {
    pub batches: u64,
    pub rows_affected: u64,
    pub total_elapsed: Duration,
}

impl VisitCountSummary {
    pub fn average_batch_duration(&self) -> Duration {
        if self.batches == 0 {
            return Duration::ZERO;
        }
        self.total_elapsed.div_f64(self.batches as f64)
    }
}

/// Timing and counters threaded through the batch loop.
///
/// `first_batch` is the batch the run resumed at; the estimate only uses the
/// pace of batches completed in this run.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    total_batches: u64,
    first_batch: u64,
    completed: u64,
    rows_affected: u64,
    started: Instant,
}

impl ProgressTracker {
    pub fn start(total_batches: u64, first_batch: u64) -> Self {
        Self {
            total_batches,
            first_batch: first_batch.min(total_batches),
            completed: 0,
            rows_affected: 0,
            started: Instant::now(),
        }
    }

    /// Batches committed since this tracker started
    pub fn completed(&self) -> u64 {
        self.completed
    }

    pub fn rows_affected(&self) -> u64 {
        self.rows_affected
    }

    pub fn record(&mut self, rows_affected: u64, batch_duration: Duration) -> ProgressSnapshot {
        let elapsed = self.started.elapsed();
        self.record_at(rows_affected, batch_duration, elapsed)
    }

    pub fn record_at(
        &mut self,
        rows_affected: u64,
        batch_duration: Duration,
        elapsed: Duration,
    ) -> ProgressSnapshot {
        self.completed += 1;
        self.rows_affected += rows_affected;

        let done = self.first_batch + self.completed;
        let planned = self.total_batches - self.first_batch;

        ProgressSnapshot {
            batch: done,
            total_batches: self.total_batches,
            rows_affected,
            batch_duration,
            percent: percent_complete(done, self.total_batches),
            elapsed,
            estimated_remaining: estimate_remaining(elapsed, self.completed, planned),
        }
    }

    pub fn finish(self) -> VisitCountSummary {
        VisitCountSummary {
            batches: self.completed,
            rows_affected: self.rows_affected,
            total_elapsed: self.started.elapsed(),
        }
    }
}

pub fn percent_complete(done: u64, total: u64) -> f64 {
    if total == 0 {
        return 100.0;
    }
    done as f64 / total as f64 * 100.0
}

/// Remaining time at the average pace so far: `elapsed / fraction - elapsed`
pub fn estimate_remaining(elapsed: Duration, completed: u64, planned: u64) -> Duration {
    if completed == 0 || completed >= planned {
        return Duration::ZERO;
    }
    let remaining = (planned - completed) as f64;
    elapsed.mul_f64(remaining / completed as f64)
}
