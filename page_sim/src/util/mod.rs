pub(crate) mod arena_list;

/// efficient way to calculate: ceil(x / y)
#[inline]
pub(crate) const fn div_ceil(x: usize, y: usize) -> usize {
    (x + y - 1) / y
}

/// Number of pages that are needed to hold `bytes` bytes.
///
/// A partially used page counts as a full page, `pages_for(0, _)` is `0`.
#[inline]
pub(crate) const fn pages_for(bytes: usize, page_size: usize) -> usize {
    if bytes > usize::MAX - page_size {
        // div_ceil would overflow
        return bytes / page_size + (bytes % page_size != 0) as usize;
    }
    div_ceil(bytes, page_size)
}
