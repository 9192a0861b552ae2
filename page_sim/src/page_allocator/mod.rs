mod ordered;
mod program_slot;

use log::{debug, error, info, warn};

use crate::{
    error::{PageSimError, ProgramId},
    page_range::{total_pages, PageRange, RangeStore},
    page_sim_config::{ConfigError, PageSimConfig},
    report::{PrintReport, SimSummary},
    util::{
        arena_list::{ArenaListError, Iter},
        pages_for,
    },
};
use ordered::{
    back_pieces, move_all, move_back_pages, move_front_pages, peak_records, ranges_touched_front,
};
use program_slot::ProgramSlot;

/// Simulates page based memory management for a fixed set of program slots.
///
/// Free pages are kept in a free list sorted by start page. Requests are served
/// first fit from the lowest free page on, every program keeps its pages in its own
/// sorted list.
///
/// Every error is detected before anything is changed, so a failed request
/// never leaves a partial allocation or release behind.
pub struct PageAllocator {
    config: PageSimConfig,
    free_ranges: RangeStore,
    programs: Vec<ProgramSlot>,
}

impl PageAllocator {
    pub fn new(config: PageSimConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut free_ranges = RangeStore::with_capacity(config.range_capacity);
        free_ranges.insert_at(1, PageRange::new(0, config.total_pages - 1))?;

        let programs = (0..config.max_programs)
            .map(|_| ProgramSlot::new(config.range_capacity))
            .collect();

        info!(
            "Created page allocator: {} pages of {} bytes, {} program slots",
            config.total_pages, config.page_size, config.max_programs
        );

        Ok(Self {
            config,
            free_ranges,
            programs,
        })
    }

    #[inline]
    pub fn config(&self) -> &PageSimConfig {
        &self.config
    }

    /// Amount of pages that are currently not owned by any program
    pub fn free_page_count(&self) -> usize {
        total_pages(&self.free_ranges)
    }

    /// Iterates over the free list (sorted by start page)
    pub fn free_ranges(&self) -> Iter<'_, PageRange> {
        self.free_ranges.iter()
    }

    /// Returns the byte size of `program` or `None` if it is not active
    pub fn program_size(&self, program: ProgramId) -> Option<usize> {
        self.programs.get(program).and_then(|slot| slot.byte_size)
    }

    /// Iterates over the pages owned by `program` (sorted by start page)
    pub fn program_ranges(&self, program: ProgramId) -> Option<Iter<'_, PageRange>> {
        self.programs
            .get(program)
            .filter(|slot| slot.is_active())
            .map(|slot| slot.ranges.iter())
    }

    fn slot(&self, program: ProgramId) -> Result<&ProgramSlot, PageSimError> {
        self.programs
            .get(program)
            .ok_or(PageSimError::InvalidProgram(
                i64::try_from(program).unwrap_or(i64::MAX),
            ))
    }

    fn active_size(&self, program: ProgramId) -> Result<usize, PageSimError> {
        self.slot(program)?
            .byte_size
            .ok_or(PageSimError::NotActive(program))
    }

    #[inline]
    fn pages_for(&self, bytes: usize) -> usize {
        pages_for(bytes, self.config.page_size)
    }

    /// Checks that `pages` free pages can be handed to `program` without
    /// exceeding the free page count or the capacity of the program's range list
    fn check_grant(&self, program: ProgramId, pages: usize) -> Result<(), PageSimError> {
        let free_pages = self.free_page_count();
        if free_pages < pages {
            warn!(
                "Program {} needs {} pages but only {} are free",
                program, pages, free_pages
            );
            return Err(PageSimError::InsufficientSpace(program));
        }

        let owned = &self.programs[program].ranges;
        let needed = ranges_touched_front(&self.free_ranges, pages);
        if needed > owned.free_slots() {
            error!(
                "Program {} would need {} more range records but only {} are left",
                program,
                needed,
                owned.free_slots()
            );
            return Err(ArenaListError::Exhausted {
                capacity: owned.capacity(),
            }
            .into());
        }

        Ok(())
    }

    /// Checks that the free list never needs more records than it has while
    /// `moved` is given back to it, so a release or shrink never stops halfway
    fn check_free_list_capacity<I: IntoIterator<Item = PageRange>>(
        &self,
        moved: I,
    ) -> Result<(), PageSimError> {
        let needed = peak_records(&self.free_ranges, moved, self.config.coalesce_free_ranges);
        if needed <= self.free_ranges.capacity() {
            return Ok(());
        }

        error!(
            "Free list would need {} range records but can only hold {}",
            needed,
            self.free_ranges.capacity()
        );
        Err(ArenaListError::Exhausted {
            capacity: self.free_ranges.capacity(),
        }
        .into())
    }

    /// Initiates `program` with `bytes` bytes.
    ///
    /// Pages are taken from the front of the free list, the last touched free
    /// range is split if it is bigger than needed.
    pub fn allocate(&mut self, program: ProgramId, bytes: usize) -> Result<(), PageSimError> {
        if self.slot(program)?.is_active() {
            warn!("Program {} is already active", program);
            return Err(PageSimError::AlreadyActive(program));
        }

        let pages = self.pages_for(bytes);
        self.check_grant(program, pages)?;

        let slot = &mut self.programs[program];
        slot.byte_size = Some(bytes);
        move_front_pages(&mut self.free_ranges, &mut slot.ranges, pages)?;

        debug!(
            "Allocated {} pages ({} bytes) for program {}",
            pages, bytes, program
        );
        Ok(())
    }

    /// Terminates `program` and gives all of its pages back to the free list.
    ///
    /// Returns the amount of freed pages.
    pub fn release(&mut self, program: ProgramId) -> Result<usize, PageSimError> {
        let slot = self.slot(program)?;
        if !slot.is_active() {
            warn!("Cannot release program {}: not active", program);
            return Err(PageSimError::NotActive(program));
        }
        self.check_free_list_capacity(slot.ranges.iter().copied())?;

        let coalesce = self.config.coalesce_free_ranges;
        let slot = &mut self.programs[program];
        let freed = move_all(&mut slot.ranges, &mut self.free_ranges, coalesce)?;
        slot.byte_size = None;

        debug!("Released program {}, {} pages freed", program, freed);
        Ok(freed)
    }

    /// Grows `program` by `bytes` bytes and returns its new size
    pub fn grow(&mut self, program: ProgramId, bytes: usize) -> Result<usize, PageSimError> {
        let current = self.active_size(program).map_err(|err| {
            warn!("Cannot grow program {}: {}", program, err);
            err
        })?;

        let new_size = match current.checked_add(bytes) {
            Some(new_size) if new_size <= self.config.max_size => new_size,
            _ => {
                warn!(
                    "Growing program {} by {} bytes exceeds the maximum of {} bytes",
                    program, bytes, self.config.max_size
                );
                return Err(PageSimError::MaxSizeExceeded(program));
            }
        };

        let pages = self.pages_for(new_size) - self.pages_for(current);
        self.check_grant(program, pages)?;

        let slot = &mut self.programs[program];
        move_front_pages(&mut self.free_ranges, &mut slot.ranges, pages)?;
        slot.byte_size = Some(new_size);

        debug!(
            "Grew program {} by {} pages, new size = {}",
            program, pages, new_size
        );
        Ok(new_size)
    }

    /// Shrinks `program` by `bytes` bytes and returns its new size.
    ///
    /// Pages are given back from the end of the program's page list.
    pub fn shrink(&mut self, program: ProgramId, bytes: usize) -> Result<usize, PageSimError> {
        let current = self.active_size(program).map_err(|err| {
            warn!("Cannot shrink program {}: {}", program, err);
            err
        })?;

        let new_size = current.checked_sub(bytes).ok_or_else(|| {
            warn!(
                "Cannot shrink program {} by {} bytes, only {} are allocated",
                program, bytes, current
            );
            PageSimError::Underflow(program)
        })?;

        let pages = self.pages_for(current) - self.pages_for(new_size);
        self.check_free_list_capacity(back_pieces(&self.programs[program].ranges, pages))?;

        let coalesce = self.config.coalesce_free_ranges;
        let slot = &mut self.programs[program];
        move_back_pages(&mut slot.ranges, &mut self.free_ranges, pages, coalesce)?;
        slot.byte_size = Some(new_size);

        debug!(
            "Shrunk program {} by {} pages, new size = {}",
            program, pages, new_size
        );
        Ok(new_size)
    }

    /// Lists the free list if `program` is negative, otherwise the pages of `program`
    pub fn print(&self, program: i64) -> Result<PrintReport, PageSimError> {
        let program = match ProgramId::try_from(program) {
            Ok(program) => program,
            Err(_) => return Ok(PrintReport::FreeList(self.free_ranges().copied().collect())),
        };

        let slot = self.slot(program)?;
        let byte_size = slot.byte_size.ok_or(PageSimError::NotActive(program))?;

        Ok(PrintReport::Program {
            program,
            byte_size,
            ranges: slot.ranges.iter().copied().collect(),
        })
    }

    /// Counts the active programs and the pages they occupy
    pub fn summary(&self) -> SimSummary {
        self.programs
            .iter()
            .filter(|slot| slot.is_active())
            .fold(
                SimSummary {
                    active_programs: 0,
                    occupied_pages: 0,
                },
                |summary, slot| SimSummary {
                    active_programs: summary.active_programs + 1,
                    occupied_pages: summary.occupied_pages + slot.page_count(),
                },
            )
    }
}
