use thiserror::Error;

/// Magic value that indicates that there is no next slot in a chain
const NEXT_NULL: usize = usize::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ArenaListError {
    /// All slots of the backing arena are in use
    #[error("range store exhausted: all {capacity} slots are in use")]
    Exhausted { capacity: usize },

    /// A logical position outside of the valid range was requested
    #[error("position {position} is out of range for a list of length {len}")]
    PositionOutOfRange { position: usize, len: usize },
}

/// Internal slot representation, to save next index and data
struct Slot<T> {
    next: usize,
    item: Option<T>,
}

/// A capacity bounded list that lives inside of a fixed arena of slots.
///
/// Items are addressed by their 1-based logical position, which is the
/// position in traversal order of the internal chain starting at `head`.
/// Unused slots are kept in a second chain starting at `free`.
///
/// The arena is allocated once on construction and never grows.
pub struct ArenaList<T> {
    slots: Box<[Slot<T>]>,
    head: usize,
    free: usize,
    len: usize,
}

impl<T> ArenaList<T> {
    /// Creates a new empty list that can hold up to `capacity` items
    pub fn with_capacity(capacity: usize) -> Self {
        let slots = (0..capacity)
            .map(|_| Slot {
                next: NEXT_NULL,
                item: None,
            })
            .collect();

        let mut list = Self {
            slots,
            head: NEXT_NULL,
            free: NEXT_NULL,
            len: 0,
        };
        list.clear();
        list
    }

    /// Return `true` if the list is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the amount of items in the list
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns how many more items can be inserted before the arena is exhausted
    #[inline]
    pub fn free_slots(&self) -> usize {
        self.capacity() - self.len
    }

    /// Walks the chain and returns the slot index of the item at `position`.
    ///
    /// Requires `1 <= position <= len`.
    fn find(&self, position: usize) -> usize {
        debug_assert!(position >= 1 && position <= self.len);

        let mut curr = self.head;
        for _ in 1..position {
            curr = self.slots[curr].next;
        }
        curr
    }

    /// Returns the item at `position` or `None` if `position` is not in `[1, len]`
    pub fn get(&self, position: usize) -> Option<&T> {
        if position == 0 || position > self.len {
            return None;
        }

        self.slots[self.find(position)].item.as_ref()
    }

    /// Returns the item at `position` or `None` if `position` is not in `[1, len]`
    pub fn get_mut(&mut self, position: usize) -> Option<&mut T> {
        if position == 0 || position > self.len {
            return None;
        }

        let slot = self.find(position);
        self.slots[slot].item.as_mut()
    }

    /// Inserts `item` so that it will be found at `position` afterwards.
    ///
    /// `position == 1` prepends, `position == len + 1` appends.
    pub fn insert_at(&mut self, position: usize, item: T) -> Result<(), ArenaListError> {
        if position == 0 || position > self.len + 1 {
            return Err(ArenaListError::PositionOutOfRange {
                position,
                len: self.len,
            });
        }

        if self.free == NEXT_NULL {
            return Err(ArenaListError::Exhausted {
                capacity: self.capacity(),
            });
        }

        // take slot from the free chain
        let slot = self.free;
        self.free = self.slots[slot].next;
        debug_assert!(
            self.slots[slot].item.is_none(),
            "free slot should not hold any data"
        );

        if position == 1 {
            self.slots[slot].next = self.head;
            self.head = slot;
        } else {
            let prev = self.find(position - 1);
            self.slots[slot].next = self.slots[prev].next;
            self.slots[prev].next = slot;
        }

        self.slots[slot].item = Some(item);
        self.len += 1;

        Ok(())
    }

    /// Removes the item at `position` and returns it.
    ///
    /// The slot is cleared and given back to the free chain.
    pub fn remove_at(&mut self, position: usize) -> Result<T, ArenaListError> {
        if position == 0 || position > self.len {
            return Err(ArenaListError::PositionOutOfRange {
                position,
                len: self.len,
            });
        }

        let slot = if position == 1 {
            let slot = self.head;
            self.head = self.slots[slot].next;
            slot
        } else {
            let prev = self.find(position - 1);
            let slot = self.slots[prev].next;
            self.slots[prev].next = self.slots[slot].next;
            slot
        };

        let item = self.slots[slot].item.take();
        self.slots[slot].next = self.free;
        self.free = slot;
        self.len -= 1;

        // every slot in the used chain holds data
        item.ok_or(ArenaListError::PositionOutOfRange {
            position,
            len: self.len + 1,
        })
    }

    /// Removes all items and puts every slot back into the free chain
    pub fn clear(&mut self) {
        let capacity = self.capacity();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            slot.item = None;
            slot.next = if index + 1 < capacity {
                index + 1
            } else {
                NEXT_NULL
            };
        }

        self.head = NEXT_NULL;
        self.free = if capacity > 0 { 0 } else { NEXT_NULL };
        self.len = 0;
    }

    /// Return an iterator over the items in the list (in logical order)
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            curr: self.head,
            list: self,
        }
    }
}

/// An iterator over the arena list
pub struct Iter<'a, T> {
    curr: usize,
    list: &'a ArenaList<T>,
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            curr: self.curr,
            list: self.list,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.curr == NEXT_NULL {
            return None;
        }

        let slot = &self.list.slots[self.curr];
        self.curr = slot.next;
        slot.item.as_ref()
    }
}

impl<'a, T> IntoIterator for &'a ArenaList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
