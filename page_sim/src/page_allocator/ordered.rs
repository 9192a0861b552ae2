use log::trace;

use crate::{
    page_range::{PageRange, RangeStore},
    util::arena_list::ArenaListError,
};

/// Returns the position in front of the first range that starts after `range`,
/// or `len + 1` if there is none
fn ordered_position(range: &PageRange, store: &RangeStore) -> usize {
    store
        .iter()
        .position(|curr| curr.start > range.start)
        .map_or(store.len() + 1, |index| index + 1)
}

/// Inserts `range` so that `store` stays sorted ascending by `start`.
///
/// Adjacent ranges are not merged. Returns the position of the new range.
pub(crate) fn insert_ordered(
    range: PageRange,
    store: &mut RangeStore,
) -> Result<usize, ArenaListError> {
    let position = ordered_position(&range, store);
    store.insert_at(position, range)?;

    Ok(position)
}

/// Inserts `range` in order and merges it with its predecessor and/or successor
/// if they are directly adjacent.
///
/// Merging never needs a new slot, so this only fails if `range` has no neighbour
/// and the arena is exhausted.
pub(crate) fn insert_coalesced(
    range: PageRange,
    store: &mut RangeStore,
) -> Result<(), ArenaListError> {
    let position = ordered_position(&range, store);
    let prev = store.get(position - 1).copied();
    let next = store.get(position).copied();

    match (prev, next) {
        (Some(prev), Some(next)) if prev.is_followed_by(&range) && range.is_followed_by(&next) => {
            trace!("Merging {} with {} and {}", range, prev, next);
            store.remove_at(position)?;
            if let Some(prev) = store.get_mut(position - 1) {
                prev.end = next.end;
            }
        }
        (Some(prev), _) if prev.is_followed_by(&range) => {
            trace!("Merging {} with {}", range, prev);
            if let Some(prev) = store.get_mut(position - 1) {
                prev.end = range.end;
            }
        }
        (_, Some(next)) if range.is_followed_by(&next) => {
            trace!("Merging {} with {}", range, next);
            if let Some(next) = store.get_mut(position) {
                next.start = range.start;
            }
        }
        _ => store.insert_at(position, range)?,
    }

    Ok(())
}

#[inline]
fn place(range: PageRange, store: &mut RangeStore, coalesce: bool) -> Result<(), ArenaListError> {
    if coalesce {
        insert_coalesced(range, store)
    } else {
        insert_ordered(range, store).map(|_| ())
    }
}

/// Amount of ranges that are touched if `pages` pages are taken from the front of `store`
pub(crate) fn ranges_touched_front(store: &RangeStore, pages: usize) -> usize {
    let mut covered = 0;
    let mut touched = 0;

    for range in store.iter() {
        if covered >= pages {
            break;
        }
        covered += range.page_count();
        touched += 1;
    }

    touched
}

/// Ranges that `move_back_pages` takes out of `store` for `pages` pages, highest first
pub(crate) fn back_pieces(store: &RangeStore, mut pages: usize) -> Vec<PageRange> {
    let ranges: Vec<PageRange> = store.iter().copied().collect();
    let mut pieces = Vec::new();

    for range in ranges.iter().rev() {
        if pages == 0 {
            break;
        }

        let mut range = *range;
        if range.page_count() <= pages {
            pages -= range.page_count();
            pieces.push(range);
        } else {
            pieces.push(range.split_back(pages));
            pages = 0;
        }
    }

    pieces
}

/// Highest amount of records `store` holds while `moved` is placed into it
/// one range after another, the same way `place` does it
pub(crate) fn peak_records<I: IntoIterator<Item = PageRange>>(
    store: &RangeStore,
    moved: I,
    coalesce: bool,
) -> usize {
    let mut simulated: Vec<PageRange> = store.iter().copied().collect();
    let mut peak = simulated.len();

    for range in moved {
        let index = simulated
            .iter()
            .position(|curr| curr.start > range.start)
            .unwrap_or(simulated.len());
        let merges_prev = coalesce && index > 0 && simulated[index - 1].is_followed_by(&range);
        let merges_next =
            coalesce && index < simulated.len() && range.is_followed_by(&simulated[index]);

        match (merges_prev, merges_next) {
            (true, true) => {
                simulated[index - 1].end = simulated[index].end;
                simulated.remove(index);
            }
            (true, false) => simulated[index - 1].end = range.end,
            (false, true) => simulated[index].start = range.start,
            (false, false) => simulated.insert(index, range),
        }

        peak = peak.max(simulated.len());
    }

    peak
}

/// Moves `pages` pages from the front of `from` into `to` (in order, without merging).
///
/// The last range that is touched gets split if it is bigger than needed; its
/// low pages are moved and the rest stays in `from`.
///
/// Every range is inserted into `to` before it is removed from `from`,
/// so no page gets lost if `to` runs out of slots.
pub(crate) fn move_front_pages(
    from: &mut RangeStore,
    to: &mut RangeStore,
    mut pages: usize,
) -> Result<(), ArenaListError> {
    while pages > 0 {
        let front = match from.get_mut(1) {
            Some(front) => front,
            None => break,
        };

        if front.page_count() <= pages {
            let range = *front;
            insert_ordered(range, to)?;
            from.remove_at(1)?;

            trace!("Moved whole range {}", range);
            pages -= range.page_count();
        } else {
            let mut rest = *front;
            let granted = rest.split_front(pages);
            insert_ordered(granted, to)?;
            *front = rest;

            trace!("Split {} off, {} stays", granted, rest);
            pages = 0;
        }
    }

    debug_assert_eq!(pages, 0, "source did not hold enough pages");
    Ok(())
}

/// Moves `pages` pages from the back of `from` (highest position first) into `to`.
///
/// If the last touched range is bigger than needed, only its trailing pages are moved.
pub(crate) fn move_back_pages(
    from: &mut RangeStore,
    to: &mut RangeStore,
    mut pages: usize,
    coalesce: bool,
) -> Result<(), ArenaListError> {
    while pages > 0 {
        let position = from.len();
        let back = match from.get_mut(position) {
            Some(back) => back,
            None => break,
        };

        if back.page_count() <= pages {
            let range = *back;
            place(range, to, coalesce)?;
            from.remove_at(position)?;

            trace!("Gave back whole range {}", range);
            pages -= range.page_count();
        } else {
            let mut rest = *back;
            let freed = rest.split_back(pages);
            place(freed, to, coalesce)?;
            *back = rest;

            trace!("Gave back {}, {} stays", freed, rest);
            pages = 0;
        }
    }

    debug_assert_eq!(pages, 0, "source did not hold enough pages");
    Ok(())
}

/// Moves every range of `from` into `to` and returns the amount of pages moved
pub(crate) fn move_all(
    from: &mut RangeStore,
    to: &mut RangeStore,
    coalesce: bool,
) -> Result<usize, ArenaListError> {
    let mut moved = 0;

    while let Some(range) = from.get(1).copied() {
        place(range, to, coalesce)?;
        from.remove_at(1)?;
        moved += range.page_count();
    }

    Ok(moved)
}

#[cfg(test)]
mod test {
    use super::{
        back_pieces, insert_coalesced, insert_ordered, move_all, move_back_pages,
        move_front_pages, peak_records, ranges_touched_front,
    };
    use crate::page_range::{PageRange, RangeStore};

    fn store_from(ranges: &[(usize, usize)]) -> RangeStore {
        let mut store = RangeStore::with_capacity(20);
        for &(start, end) in ranges {
            store
                .insert_at(store.len() + 1, PageRange::new(start, end))
                .unwrap();
        }
        store
    }

    fn as_pairs(store: &RangeStore) -> Vec<(usize, usize)> {
        store.iter().map(|range| (range.start, range.end)).collect()
    }

    #[test]
    fn test_insert_ordered() {
        let mut store = store_from(&[]);

        assert_eq!(insert_ordered(PageRange::new(10, 12), &mut store), Ok(1));
        assert_eq!(insert_ordered(PageRange::new(0, 2), &mut store), Ok(1));
        assert_eq!(insert_ordered(PageRange::new(20, 25), &mut store), Ok(3));
        assert_eq!(insert_ordered(PageRange::new(3, 5), &mut store), Ok(2));

        // adjacent ranges stay separate records
        assert_eq!(
            as_pairs(&store),
            vec![(0, 2), (3, 5), (10, 12), (20, 25)]
        );
    }

    #[test]
    fn test_insert_coalesced() {
        let mut store = store_from(&[(0, 2), (10, 12), (20, 25)]);

        // joins predecessor
        insert_coalesced(PageRange::new(3, 4), &mut store).unwrap();
        assert_eq!(as_pairs(&store), vec![(0, 4), (10, 12), (20, 25)]);

        // joins successor
        insert_coalesced(PageRange::new(17, 19), &mut store).unwrap();
        assert_eq!(as_pairs(&store), vec![(0, 4), (10, 12), (17, 25)]);

        // joins both
        insert_coalesced(PageRange::new(13, 16), &mut store).unwrap();
        assert_eq!(as_pairs(&store), vec![(0, 4), (10, 25)]);

        // no neighbour
        insert_coalesced(PageRange::new(7, 7), &mut store).unwrap();
        assert_eq!(as_pairs(&store), vec![(0, 4), (7, 7), (10, 25)]);

        insert_coalesced(PageRange::new(30, 31), &mut store).unwrap();
        assert_eq!(as_pairs(&store), vec![(0, 4), (7, 7), (10, 25), (30, 31)]);
    }

    #[test]
    fn test_insert_coalesced_full_store() {
        let mut store = RangeStore::with_capacity(2);
        store.insert_at(1, PageRange::new(0, 1)).unwrap();
        store.insert_at(2, PageRange::new(5, 6)).unwrap();

        // merging does not need a slot
        insert_coalesced(PageRange::new(2, 4), &mut store).unwrap();
        assert_eq!(as_pairs(&store), vec![(0, 6)]);
    }

    #[test]
    fn test_ranges_touched() {
        let store = store_from(&[(0, 2), (5, 5), (8, 11)]);

        assert_eq!(ranges_touched_front(&store, 0), 0);
        assert_eq!(ranges_touched_front(&store, 3), 1);
        assert_eq!(ranges_touched_front(&store, 4), 2);
        assert_eq!(ranges_touched_front(&store, 5), 3);
        assert_eq!(ranges_touched_front(&store, 8), 3);
    }

    #[test]
    fn test_back_pieces() {
        let store = store_from(&[(0, 2), (5, 5), (8, 11)]);

        assert!(back_pieces(&store, 0).is_empty());
        assert_eq!(back_pieces(&store, 3), vec![PageRange::new(9, 11)]);
        assert_eq!(
            back_pieces(&store, 6),
            vec![
                PageRange::new(8, 11),
                PageRange::new(5, 5),
                PageRange::new(2, 2)
            ]
        );
    }

    #[test]
    fn test_peak_records() {
        let store = store_from(&[(2, 2), (5, 5), (10, 99)]);

        // without merging every range needs its own record
        let moved = [PageRange::new(9, 9), PageRange::new(0, 0)];
        assert_eq!(peak_records(&store, moved, false), 5);

        // (9, 9) joins (10, 99), only (0, 0) needs a new record
        assert_eq!(peak_records(&store, moved, true), 4);

        // (3, 4) joins both neighbours and frees a record before (7, 7) needs one
        let moved = [PageRange::new(3, 4), PageRange::new(7, 7)];
        assert_eq!(peak_records(&store, moved, true), 3);

        assert_eq!(peak_records(&store, Vec::new(), true), 3);
    }

    #[test]
    fn test_move_front_pages() {
        let mut from = store_from(&[(0, 2), (5, 5), (8, 11)]);
        let mut to = store_from(&[(3, 4)]);

        move_front_pages(&mut from, &mut to, 5).unwrap();

        assert_eq!(as_pairs(&from), vec![(9, 11)]);
        assert_eq!(as_pairs(&to), vec![(0, 2), (3, 4), (5, 5), (8, 8)]);
    }

    #[test]
    fn test_move_back_pages() {
        let mut from = store_from(&[(0, 2), (5, 5), (8, 11)]);
        let mut to = store_from(&[(3, 4)]);

        move_back_pages(&mut from, &mut to, 6, false).unwrap();

        assert_eq!(as_pairs(&from), vec![(0, 1)]);
        assert_eq!(as_pairs(&to), vec![(2, 2), (3, 4), (5, 5), (8, 11)]);

        let mut from = store_from(&[(0, 2), (5, 5), (8, 11)]);
        let mut to = store_from(&[(3, 4)]);

        move_back_pages(&mut from, &mut to, 6, true).unwrap();

        assert_eq!(as_pairs(&from), vec![(0, 1)]);
        assert_eq!(as_pairs(&to), vec![(2, 5), (8, 11)]);
    }

    #[test]
    fn test_move_front_pages_exhausted_keeps_pages() {
        let mut from = store_from(&[(0, 2), (5, 5), (8, 11)]);
        let mut to = RangeStore::with_capacity(1);

        assert!(move_front_pages(&mut from, &mut to, 5).is_err());

        // the first range was moved, nothing got lost
        assert_eq!(as_pairs(&from), vec![(5, 5), (8, 11)]);
        assert_eq!(as_pairs(&to), vec![(0, 2)]);
    }

    #[test]
    fn test_move_all() {
        let mut from = store_from(&[(3, 4), (9, 9)]);
        let mut to = store_from(&[(0, 2), (5, 8)]);

        assert_eq!(move_all(&mut from, &mut to, false), Ok(3));
        assert!(from.is_empty());
        assert_eq!(as_pairs(&to), vec![(0, 2), (3, 4), (5, 8), (9, 9)]);

        let mut from = store_from(&[(3, 4), (9, 9)]);
        let mut to = store_from(&[(0, 2), (5, 8)]);

        assert_eq!(move_all(&mut from, &mut to, true), Ok(3));
        assert_eq!(as_pairs(&to), vec![(0, 9)]);
    }
}
