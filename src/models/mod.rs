mod shortened_url;
mod window;

pub use shortened_url::{ShortCodeAssignment, ShortenedUrlRecord, VisitCandidate, VisitCountAssignment};
pub use window::IdWindow;
