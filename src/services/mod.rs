use std::sync::Arc;

mod bulk_insert;
mod progress;
mod visit_counts;
pub mod visit_formula;
mod windows;

pub use bulk_insert::{
    generate_dummy_urls, short_code_assignments, BulkInsertSummary, BulkInserter,
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
pub use progress::{ProgressSnapshot, ProgressTracker, VisitCountSummary};
pub use visit_counts::VisitCountUpdater;
pub use windows::{Batch, IdWindows};

use crate::{config::TableName, db::Database, errors::JobError, repositories::ShortenedUrlRepository};

/// Jobs wired to the PostgreSQL repository
pub struct Services {
    pub bulk_inserter: BulkInserter<ShortenedUrlRepository>,
    pub visit_count_updater: VisitCountUpdater<ShortenedUrlRepository>,
}

/// Service Register
pub fn register(db: Database, table: TableName, page_size: usize) -> Result<Services, JobError> {
    let repository = Arc::new(ShortenedUrlRepository::new(db, table));

    Ok(Services {
        bulk_inserter: BulkInserter::new(repository.clone(), page_size)?,
        visit_count_updater: VisitCountUpdater::new(repository),
    })
}
