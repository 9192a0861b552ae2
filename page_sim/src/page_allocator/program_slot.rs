use crate::page_range::{total_pages, RangeStore};

/// State of a single program id
pub(crate) struct ProgramSlot {
    /// `None` if the program is not active,
    /// otherwise the amount of bytes that are allocated for it
    pub(crate) byte_size: Option<usize>,

    /// Pages owned by this program, sorted ascending by start page
    pub(crate) ranges: RangeStore,
}

impl ProgramSlot {
    pub(crate) fn new(range_capacity: usize) -> Self {
        Self {
            byte_size: None,
            ranges: RangeStore::with_capacity(range_capacity),
        }
    }

    #[inline]
    pub(crate) fn is_active(&self) -> bool {
        self.byte_size.is_some()
    }

    pub(crate) fn page_count(&self) -> usize {
        total_pages(&self.ranges)
    }
}
