use crate::errors::JobError;
use crate::models::IdWindow;

/// One window of a range update together with its zero-based position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch {
    pub index: u64,
    pub window: IdWindow,
}

/// Splits the inclusive id range `[start_id, end_id]` into half-open windows of
/// `batch_size` ids. The last window is cut short at `end_id + 1`.
///
/// An empty range (`end_id < start_id`) yields no windows.
#[derive(Debug, Clone)]
pub struct IdWindows {
    start_id: i64,
    end_id: i64,
    batch_size: u64,
    total_batches: u64,
    next_batch: u64,
}

impl IdWindows {
    pub fn new(start_id: i64, end_id: i64, batch_size: u64) -> Result<Self, JobError> {
        if batch_size == 0 {
            return Err(JobError::InvalidBatchSize);
        }
        if end_id == i64::MAX {
            return Err(JobError::InvalidRange(format!(
                "end id must be below {}",
                i64::MAX
            )));
        }

        let total_records = Self::count_records(start_id, end_id);

        Ok(Self {
            start_id,
            end_id,
            batch_size,
            total_batches: total_records.div_ceil(batch_size),
            next_batch: 0,
        })
    }

    /// Restarts iteration at `batch_index`, skipping the windows before it
    pub fn resume_from(mut self, batch_index: u64) -> Self {
        self.next_batch = batch_index.min(self.total_batches);
        self
    }

    pub fn start_id(&self) -> i64 {
        self.start_id
    }

    pub fn end_id(&self) -> i64 {
        self.end_id
    }

    pub fn batch_size(&self) -> u64 {
        self.batch_size
    }

    pub fn total_records(&self) -> u64 {
        Self::count_records(self.start_id, self.end_id)
    }

    pub fn total_batches(&self) -> u64 {
        self.total_batches
    }

    /// Index of the window the next call to `next` yields
    pub fn next_batch_index(&self) -> u64 {
        self.next_batch
    }

    /// Window at `index`, independent of the iteration position
    pub fn window(&self, index: u64) -> Option<IdWindow> {
        if index >= self.total_batches {
            return None;
        }

        let start = i128::from(self.start_id) + i128::from(index) * i128::from(self.batch_size);
        let end = (start + i128::from(self.batch_size)).min(i128::from(self.end_id) + 1);

        // Both bounds lie within [start_id, end_id + 1], which fits in an i64
        Some(IdWindow::new(start as i64, end as i64))
    }

    fn count_records(start_id: i64, end_id: i64) -> u64 {
        if end_id < start_id {
            0
        } else {
            (i128::from(end_id) - i128::from(start_id) + 1) as u64
        }
    }
}

impl Iterator for IdWindows {
    type Item = Batch;

    fn next(&mut self) -> Option<Self::Item> {
        let window = self.window(self.next_batch)?;
        let batch = Batch {
            index: self.next_batch,
            window,
        };
        self.next_batch += 1;
        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.total_batches - self.next_batch) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for IdWindows {}
