use core::str::{FromStr, SplitWhitespace};

use log::trace;
use thiserror::Error;

use crate::{
    error::{PageSimError, ProgramId},
    page_allocator::PageAllocator,
    report::Report,
};

/// A single request of the form `<opcode> <id> <size>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Initiate { program: i64, size: usize },
    Terminate { program: i64 },
    Print { program: i64 },
    Grow { program: i64, size: usize },
    Shrink { program: i64, size: usize },
    Exit,
    Unknown(char),
}

impl Command {
    /// Name of the command as used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            Command::Initiate { .. } => "initiate",
            Command::Terminate { .. } => "terminate",
            Command::Print { .. } => "print",
            Command::Grow { .. } => "grow",
            Command::Shrink { .. } => "shrink",
            Command::Exit => "exit",
            Command::Unknown(_) => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("input ended in the middle of a command")]
    Truncated,

    #[error("expected a number but found {0:?}")]
    InvalidNumber(String),
}

/// Reads commands from a whitespace separated token stream.
///
/// Every command consumes three tokens (opcode, id and size), even if the
/// command does not use all of them.
pub struct CommandReader<'a> {
    tokens: SplitWhitespace<'a>,
}

impl<'a> CommandReader<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            tokens: input.split_whitespace(),
        }
    }

    fn next_number<T: FromStr>(&mut self) -> Result<T, ParseError> {
        let token = self.tokens.next().ok_or(ParseError::Truncated)?;
        token
            .parse()
            .map_err(|_| ParseError::InvalidNumber(token.to_string()))
    }

    fn parse(&mut self, opcode: char) -> Result<Command, ParseError> {
        let program: i64 = self.next_number()?;
        let size: usize = self.next_number()?;

        Ok(match opcode {
            'i' => Command::Initiate { program, size },
            't' => Command::Terminate { program },
            'p' => Command::Print { program },
            'g' => Command::Grow { program, size },
            's' => Command::Shrink { program, size },
            'x' => Command::Exit,
            other => Command::Unknown(other),
        })
    }
}

impl<'a> Iterator for CommandReader<'a> {
    type Item = Result<Command, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        let opcode = self.tokens.next()?.chars().next()?;
        Some(self.parse(opcode))
    }
}

/// A failed command together with the reason it failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("ERROR on {command} command: {source}")]
pub struct CommandError {
    pub command: &'static str,
    #[source]
    pub source: PageSimError,
}

impl CommandError {
    #[inline]
    pub fn is_fatal(&self) -> bool {
        self.source.is_fatal()
    }
}

fn program_id(program: i64) -> Result<ProgramId, PageSimError> {
    ProgramId::try_from(program).map_err(|_| PageSimError::InvalidProgram(program))
}

/// Runs `command` against `allocator`
pub fn execute(allocator: &mut PageAllocator, command: Command) -> Result<Report, CommandError> {
    trace!("Executing {:?}", command);

    let result = match command {
        Command::Initiate { program, size } => program_id(program).and_then(|program| {
            allocator.allocate(program, size)?;
            Ok(Report::Initiated { program, size })
        }),
        Command::Terminate { program } => program_id(program).and_then(|program| {
            let pages_freed = allocator.release(program)?;
            Ok(Report::Terminated {
                program,
                pages_freed,
            })
        }),
        Command::Print { program } => allocator.print(program).map(Report::Printed),
        Command::Grow { program, size } => program_id(program).and_then(|program| {
            let new_size = allocator.grow(program, size)?;
            Ok(Report::Grown {
                program,
                added: size,
                new_size,
            })
        }),
        Command::Shrink { program, size } => program_id(program).and_then(|program| {
            let new_size = allocator.shrink(program, size)?;
            Ok(Report::Shrunk {
                program,
                removed: size,
                new_size,
            })
        }),
        Command::Exit => Ok(Report::Exited(allocator.summary())),
        Command::Unknown(_) => Ok(Report::SelectionNotFound),
    };

    result.map_err(|source| CommandError {
        command: command.name(),
        source,
    })
}
