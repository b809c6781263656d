// src/models/shortened_url.rs - Pure data structures
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A row of the URL shortener table
#[derive(Debug, Clone, FromRow)]
pub struct ShortenedUrlRecord {
    /// Surrogate key assigned by storage on insert
    pub id: i64,

    /// The original, long URL
    pub original_url: String,

    /// Base62 encoding of `id`, empty until the bulk insert backfills it
    pub short_url: Option<String>,

    /// Assigned by storage at insert time
    pub created_at: Option<DateTime<Utc>>,

    /// Synthetic visit count, overwritten by the visit count job
    pub visit_count: Option<i64>,
}

/// Short code computed for a freshly inserted id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortCodeAssignment {
    pub id: i64,
    pub short_url: String,
}

/// The columns the visit count formula reads
#[derive(Debug, Clone, FromRow)]
pub struct VisitCandidate {
    pub id: i64,
    pub original_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// New visit count for one row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitCountAssignment {
    pub id: i64,
    pub visit_count: i64,
}
