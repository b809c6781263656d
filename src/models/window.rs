use std::fmt;

/// Half-open id range `[start, end)` covered by one batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdWindow {
    pub start: i64,
    pub end: i64,
}

impl IdWindow {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Number of ids in the window
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start).max(0) as u64
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn contains(&self, id: i64) -> bool {
        id >= self.start && id < self.end
    }

    /// Last id inside the window
    pub fn last(&self) -> i64 {
        self.end - 1
    }
}

impl fmt::Display for IdWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}
