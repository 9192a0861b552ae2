use crate::{util::pages_for, PageAllocator, PageRange, PageSimConfig};


pub(crate) fn init_test_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Allocator with 100 pages of 10 bytes each
pub(crate) fn get_test_allocator() -> PageAllocator {
    init_test_logger();
    PageAllocator::new(PageSimConfig::default()).unwrap()
}

pub(crate) fn get_test_allocator_with(config: PageSimConfig) -> PageAllocator {
    init_test_logger();
    PageAllocator::new(config).unwrap()
}

pub(crate) fn free_pairs(allocator: &PageAllocator) -> Vec<(usize, usize)> {
    allocator
        .free_ranges()
        .map(|range| (range.start, range.end))
        .collect()
}

pub(crate) fn owned_pairs(allocator: &PageAllocator, program: usize) -> Vec<(usize, usize)> {
    allocator
        .program_ranges(program)
        .expect("program should be active")
        .map(|range| (range.start, range.end))
        .collect()
}

/// Expands `ranges` into the set of single pages
pub(crate) fn page_set<'a, I: Iterator<Item = &'a PageRange>>(ranges: I) -> Vec<usize> {
    let mut pages: Vec<usize> = ranges.flat_map(|range| range.start..=range.end).collect();
    pages.sort_unstable();
    pages
}

fn assert_sorted_disjoint<'a, I: Iterator<Item = &'a PageRange>>(ranges: I, name: &str) {
    let ranges: Vec<&PageRange> = ranges.collect();
    for range in &ranges {
        assert!(range.start <= range.end, "{}: empty range {}", name, range);
    }
    for pair in ranges.windows(2) {
        assert!(
            pair[0].start < pair[1].start,
            "{}: {} and {} are not sorted",
            name,
            pair[0],
            pair[1]
        );
        assert!(
            !pair[0].overlaps(pair[1]),
            "{}: {} and {} overlap",
            name,
            pair[0],
            pair[1]
        );
    }
}

/// Checks every invariant that has to hold between two requests
pub(crate) fn check_integrity(allocator: &PageAllocator) {
    let config = allocator.config();

    assert_sorted_disjoint(allocator.free_ranges(), "free list");

    let mut all_pages = page_set(allocator.free_ranges());
    let mut occupied = 0;

    for program in 0..config.max_programs {
        match allocator.program_size(program) {
            None => assert!(allocator.program_ranges(program).is_none()),
            Some(size) => {
                let ranges = allocator.program_ranges(program).unwrap();
                assert_sorted_disjoint(ranges.clone(), "program list");

                let owned: usize = ranges.clone().map(PageRange::page_count).sum();
                assert_eq!(
                    owned,
                    pages_for(size, config.page_size),
                    "program {} owns the wrong amount of pages",
                    program
                );

                occupied += owned;
                all_pages.extend(page_set(ranges));
            }
        }
    }

    // every page is either free or owned by exactly one program
    all_pages.sort_unstable();
    assert_eq!(all_pages, (0..config.total_pages).collect::<Vec<_>>());

    assert_eq!(allocator.summary().occupied_pages, occupied);
    assert_eq!(allocator.free_page_count() + occupied, config.total_pages);
}
