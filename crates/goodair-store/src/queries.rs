//! Query builders for stored samples.

use time::OffsetDateTime;

/// Filter for querying the sample window.
#[derive(Debug, Clone, Default)]
pub struct SampleQuery {
    /// Only samples captured at or after this time.
    pub since: Option<OffsetDateTime>,
    /// Only samples captured at or before this time.
    pub until: Option<OffsetDateTime>,
    /// Maximum number of samples to return.
    pub limit: Option<u32>,
    /// Return newest samples first.
    pub newest_first: bool,
}

impl SampleQuery {
    /// Create an empty query matching everything, oldest first.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only samples at or after this time.
    #[must_use]
    pub fn since(mut self, since: OffsetDateTime) -> Self {
        self.since = Some(since);
        self
    }

    /// Only samples at or before this time.
    #[must_use]
    pub fn until(mut self, until: OffsetDateTime) -> Self {
        self.until = Some(until);
        self
    }

    /// Cap the number of results.
    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Order newest first.
    #[must_use]
    pub fn newest_first(mut self) -> Self {
        self.newest_first = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_builder() {
        let q = SampleQuery::new()
            .since(OffsetDateTime::UNIX_EPOCH)
            .limit(10)
            .newest_first();
        assert!(q.since.is_some());
        assert!(q.until.is_none());
        assert_eq!(q.limit, Some(10));
        assert!(q.newest_first);
    }

    #[test]
    fn test_default_is_unfiltered() {
        let q = SampleQuery::new();
        assert!(q.since.is_none() && q.until.is_none() && q.limit.is_none());
        assert!(!q.newest_first);
    }
}
