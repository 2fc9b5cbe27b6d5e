//! Offset/limit pagination for list-style queries.

pub const DEFAULT_LIMIT: u64 = 10;

/// Offset/limit window. No upper bound is imposed on `limit`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// records to skip
    pub skip: u64,
    /// maximum records to return; `0` yields an empty page
    pub limit: u64,
}

impl Pagination {
    pub fn new(skip: u64, limit: u64) -> Self { Self { skip, limit } }

    pub fn is_empty(&self) -> bool { self.limit == 0 }

    /// Limit as the driver's signed type, saturating.
    pub fn limit_i64(&self) -> i64 { i64::try_from(self.limit).unwrap_or(i64::MAX) }

    /// Apply the window to an in-memory sequence.
    pub fn window<T, I: IntoIterator<Item = T>>(&self, items: I) -> Vec<T> {
        let skip = usize::try_from(self.skip).unwrap_or(usize::MAX);
        let take = usize::try_from(self.limit).unwrap_or(usize::MAX);
        items.into_iter().skip(skip).take(take).collect()
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { skip: 0, limit: DEFAULT_LIMIT } }
}

#[cfg(test)]
mod tests {
    use super::Pagination;

    #[test]
    fn default_values_are_sane() {
        let d = Pagination::default();
        assert_eq!(d.skip, 0);
        assert_eq!(d.limit, 10);
    }

    #[test]
    fn window_skips_then_takes() {
        let page = Pagination::new(3, 2).window(0..10);
        assert_eq!(page, vec![3, 4]);
        assert!(Pagination::new(20, 5).window(0..10).is_empty());
        assert!(Pagination::new(0, 0).window(0..10).is_empty());
    }

    #[test]
    fn huge_limit_saturates() {
        let p = Pagination::new(0, u64::MAX);
        assert_eq!(p.limit_i64(), i64::MAX);
        assert_eq!(p.window(0..4).len(), 4);
    }
}
