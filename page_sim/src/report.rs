use core::fmt::{self, Display};

use crate::{error::ProgramId, page_range::PageRange};

/// Result of the `exit` operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimSummary {
    pub active_programs: usize,
    pub occupied_pages: usize,
}

/// Result of the `print` operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrintReport {
    FreeList(Vec<PageRange>),
    Program {
        program: ProgramId,
        byte_size: usize,
        ranges: Vec<PageRange>,
    },
}

/// Outcome of a successfully executed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    Initiated {
        program: ProgramId,
        size: usize,
    },
    Terminated {
        program: ProgramId,
        pages_freed: usize,
    },
    Printed(PrintReport),
    Exited(SimSummary),
    Grown {
        program: ProgramId,
        added: usize,
        new_size: usize,
    },
    Shrunk {
        program: ProgramId,
        removed: usize,
        new_size: usize,
    },
    SelectionNotFound,
}

fn write_ranges(f: &mut fmt::Formatter<'_>, ranges: &[PageRange]) -> fmt::Result {
    write!(f, "Start page  End page")?;
    for range in ranges {
        write!(f, "\n{:5}{:11}", range.start, range.end)?;
    }
    Ok(())
}

impl Display for PrintReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrintReport::FreeList(ranges) => {
                writeln!(f, "Contents of free page list")?;
                write_ranges(f, ranges)
            }
            PrintReport::Program {
                program,
                byte_size,
                ranges,
            } => {
                writeln!(f, "Page usage for program {} --- size = {}", program, byte_size)?;
                write_ranges(f, ranges)
            }
        }
    }
}

impl Display for SimSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SIMULATOR EXIT: {} programs exist, occupying {} pages",
            self.active_programs, self.occupied_pages
        )
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Initiated { program, size } => {
                write!(f, "Program {} initiated, size = {}", program, size)
            }
            Report::Terminated {
                program,
                pages_freed,
            } => write!(f, "Program {} terminated, {} pages freed", program, pages_freed),
            Report::Printed(report) => Display::fmt(report, f),
            Report::Exited(summary) => Display::fmt(summary, f),
            Report::Grown {
                program,
                added,
                new_size,
            } => write!(
                f,
                "Program {} increased by {} bytes, new size = {}",
                program, added, new_size
            ),
            Report::Shrunk {
                program,
                removed,
                new_size,
            } => write!(
                f,
                "Program {} decreased by {}, new size = {}",
                program, removed, new_size
            ),
            Report::SelectionNotFound => write!(f, "Selection not found"),
        }
    }
}
