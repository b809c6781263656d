//! Synthetic visit counts.
//!
//! A row's visit count is the product of three independent random factors:
//! a recency multiplier driven by the row's age, a content multiplier driven by
//! keywords in its URL, and a rare viral spike. Every factor draws its own
//! uniform value, so evaluating the same row twice gives different counts.

use chrono::{DateTime, Duration, Utc};

use crate::models::VisitCandidate;
use crate::utils::RandomSource;

/// Age bucket of a row, relative to the moment the batch runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeBucket {
    Day,
    Week,
    Month,
    Year,
    Older,
}

impl AgeBucket {
    /// A row exactly on a boundary (e.g. created exactly one day ago) belongs
    /// to the younger bucket. Rows without a creation time count as oldest.
    pub fn classify(created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        let Some(created_at) = created_at else {
            return AgeBucket::Older;
        };

        if created_at >= now - Duration::days(1) {
            AgeBucket::Day
        } else if created_at >= now - Duration::days(7) {
            AgeBucket::Week
        } else if created_at >= now - Duration::days(30) {
            AgeBucket::Month
        } else if created_at >= now - Duration::days(365) {
            AgeBucket::Year
        } else {
            AgeBucket::Older
        }
    }

    fn exponent(self) -> f64 {
        match self {
            AgeBucket::Day => 3.0,
            AgeBucket::Week => 5.0,
            AgeBucket::Month => 7.0,
            AgeBucket::Year => 9.0,
            AgeBucket::Older => 11.0,
        }
    }

    /// `floor(exp(u * exponent))`
    pub fn multiplier(self, u: f64) -> i64 {
        (u * self.exponent()).exp().floor() as i64
    }
}

/// Kind of site a URL points at; the first matching keyword group wins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentBucket {
    Video,
    Social,
    Developer,
    Editorial,
    Other,
}

const CONTENT_KEYWORDS: [(ContentBucket, &[&str]); 4] = [
    (ContentBucket::Video, &["youtube", "tiktok"]),
    (ContentBucket::Social, &["twitter", "instagram", "reddit"]),
    (ContentBucket::Developer, &["github", "stackoverflow"]),
    (ContentBucket::Editorial, &["news", "medium"]),
];

impl ContentBucket {
    /// Case-insensitive substring match against the URL
    pub fn classify(original_url: Option<&str>) -> Self {
        let Some(url) = original_url else {
            return ContentBucket::Other;
        };
        let url = url.to_lowercase();

        CONTENT_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| url.contains(k)))
            .map(|(bucket, _)| *bucket)
            .unwrap_or(ContentBucket::Other)
    }

    fn spread(self) -> f64 {
        match self {
            ContentBucket::Video => 20.0,
            ContentBucket::Social => 15.0,
            ContentBucket::Developer => 8.0,
            ContentBucket::Editorial => 12.0,
            ContentBucket::Other => 5.0,
        }
    }

    /// `1 + floor(u * spread)`
    pub fn multiplier(self, u: f64) -> i64 {
        1 + (u * self.spread()).floor() as i64
    }
}

/// Rare multiplier for viral rows. Draws one value to pick the tier and a
/// second one only when a tier above 1 is picked.
pub fn spike_multiplier<R: RandomSource + ?Sized>(random: &mut R) -> i64 {
    let u = random.next_unit();

    let (scale, base) = if u < 0.001 {
        (1000.0, 100)
    } else if u < 0.01 {
        (100.0, 10)
    } else if u < 0.05 {
        (10.0, 2)
    } else {
        return 1;
    };

    (random.next_unit() * scale).floor() as i64 + base
}

/// New visit count for one row, never negative
pub fn visit_count<R: RandomSource + ?Sized>(
    candidate: &VisitCandidate,
    now: DateTime<Utc>,
    random: &mut R,
) -> i64 {
    let recency = AgeBucket::classify(candidate.created_at, now).multiplier(random.next_unit());
    let content =
        ContentBucket::classify(candidate.original_url.as_deref()).multiplier(random.next_unit());
    let spike = spike_multiplier(random);

    recency.saturating_mul(content).saturating_mul(spike).max(0)
}
