//! Analyzed-page bookkeeping
//!
//! A page is analyzed at most once unless it is explicitly evicted. There
//! is no capacity limit and no expiry.

use std::collections::BTreeSet;

/// Set of page numbers that already have a recognition result
#[derive(Debug, Clone, Default)]
pub struct AnalysisCache {
    pages: BTreeSet<u32>,
}

impl AnalysisCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_analyzed(&self, page: u32) -> bool {
        self.pages.contains(&page)
    }

    pub fn mark_analyzed(&mut self, page: u32) {
        self.pages.insert(page);
    }

    /// Forget a page so the next request analyzes it again.
    ///
    /// Returns whether the page was present.
    pub fn evict(&mut self, page: u32) -> bool {
        self.pages.remove(&page)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_and_evict() {
        let mut cache = AnalysisCache::new();
        assert!(!cache.is_analyzed(3));

        cache.mark_analyzed(3);
        cache.mark_analyzed(3);
        cache.mark_analyzed(7);
        assert!(cache.is_analyzed(3));
        assert_eq!(cache.len(), 2);

        assert!(cache.evict(3));
        assert!(!cache.evict(3));
        assert!(!cache.is_analyzed(3));
        assert!(cache.is_analyzed(7));
    }
}
