mod command;
mod error;
mod page_allocator;
mod page_range;
mod page_sim_config;
mod report;
mod util;

#[cfg(test)]
mod test;

pub use command::{execute, Command, CommandError, CommandReader, ParseError};
pub use error::{PageSimError, ProgramId};
pub use page_allocator::PageAllocator;
pub use page_range::{PageRange, RangeStore};
pub use page_sim_config::{ConfigError, PageSimConfig};
pub use report::{PrintReport, Report, SimSummary};
pub use util::arena_list::{ArenaList, ArenaListError, Iter};
