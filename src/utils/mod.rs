pub mod base62;
pub mod format;
pub mod random;

pub use random::{RandomSource, RngSource, SequenceSource};
