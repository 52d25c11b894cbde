//! Shared Types
//!
//! Common types used across the application

use serde::Deserialize;

/// Default page size for list endpoints
pub const DEFAULT_LIMIT: usize = 100;

/// Hard cap on page size
pub const MAX_LIMIT: usize = 500;

/// Pagination query parameters (`?skip=0&limit=100`)
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PaginationParams {
    #[serde(default)]
    pub skip: usize,

    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

impl PaginationParams {
    pub fn new(skip: Option<usize>, limit: Option<usize>) -> Self {
        Self {
            skip: skip.unwrap_or(0),
            limit: limit.unwrap_or(DEFAULT_LIMIT),
        }
    }

    /// Limit clamped to `1..=MAX_LIMIT`
    pub fn effective_limit(&self) -> usize {
        self.limit.clamp(1, MAX_LIMIT)
    }

    /// Apply skip/limit to an already ordered list
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.skip)
            .take(self.effective_limit())
            .collect()
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: default_limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_skip_and_limit() {
        let page = PaginationParams::new(Some(2), Some(3));
        assert_eq!(page.apply((0..10).collect()), vec![2, 3, 4]);
    }

    #[test]
    fn test_limit_is_clamped() {
        assert_eq!(PaginationParams::new(None, Some(0)).effective_limit(), 1);
        assert_eq!(
            PaginationParams::new(None, Some(10_000)).effective_limit(),
            MAX_LIMIT
        );
        assert_eq!(PaginationParams::default().effective_limit(), DEFAULT_LIMIT);
    }
}
