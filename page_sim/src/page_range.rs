use core::fmt::{self, Display};

use crate::util::arena_list::ArenaList;

/// A capacity bounded list of page ranges
pub type RangeStore = ArenaList<PageRange>;

/// A contiguous run of pages `[start, end]` (both inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRange {
    pub start: usize,
    pub end: usize,
}

impl PageRange {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "empty page ranges are never stored");
        Self { start, end }
    }

    /// Returns a range of `count` pages beginning at `start`
    ///
    /// Requires `count > 0`.
    pub fn from_count(start: usize, count: usize) -> Self {
        debug_assert_ne!(count, 0);
        Self::new(start, start + count - 1)
    }

    #[inline]
    pub fn page_count(&self) -> usize {
        self.end - self.start + 1
    }

    /// Splits off the lowest `count` pages of this range and returns them.
    ///
    /// Requires `0 < count < self.page_count()`, so `self` is never left empty.
    pub(crate) fn split_front(&mut self, count: usize) -> PageRange {
        debug_assert!(count > 0 && count < self.page_count());

        let front = PageRange::from_count(self.start, count);
        self.start += count;
        front
    }

    /// Splits off the highest `count` pages of this range and returns them.
    ///
    /// Requires `0 < count < self.page_count()`, so `self` is never left empty.
    pub(crate) fn split_back(&mut self, count: usize) -> PageRange {
        debug_assert!(count > 0 && count < self.page_count());

        let back = PageRange::new(self.end + 1 - count, self.end);
        self.end -= count;
        back
    }

    /// Returns `true` if `other` starts directly after this range ends
    #[inline]
    pub(crate) fn is_followed_by(&self, other: &PageRange) -> bool {
        self.end + 1 == other.start
    }

    #[inline]
    pub fn overlaps(&self, other: &PageRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.start, self.end)
    }
}

/// Sums up the pages of all ranges in `store`
pub(crate) fn total_pages(store: &RangeStore) -> usize {
    store.iter().map(PageRange::page_count).sum()
}
