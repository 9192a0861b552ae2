use thiserror::Error;

use crate::util::arena_list::ArenaListError;

pub type ProgramId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageSimError {
    #[error("Program {0} already exists")]
    AlreadyActive(ProgramId),

    #[error("Program {0} does not exist")]
    NotActive(ProgramId),

    #[error("insufficient space for Program {0}")]
    InsufficientSpace(ProgramId),

    #[error("MAX SIZE exceeded for Program {0}")]
    MaxSizeExceeded(ProgramId),

    #[error("insufficient allocation for Program {0}")]
    Underflow(ProgramId),

    #[error("Program {0} is not a valid program id")]
    InvalidProgram(i64),

    /// A range store ran out of slots, this is a capacity planning problem
    /// and not something a user request can recover from
    #[error(transparent)]
    Store(#[from] ArenaListError),
}

impl PageSimError {
    #[inline]
    pub fn is_fatal(&self) -> bool {
        matches!(self, PageSimError::Store(_))
    }
}
