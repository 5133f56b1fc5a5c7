//! The byte machine: registers, memory, instruction dispatch, and the
//! program run loop.

use thiserror::Error;

use crate::lang::LangError;

pub mod debugger;
pub mod exec;
pub mod ram;
pub mod registers;

pub use exec::{MachState, Machine};

/// An error raised while executing one instruction line.
///
/// Every error is caught at that line's boundary and rendered as a single
/// `Error: <message>` output line; the surrounding run continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MachError {
    #[error("Unknown instruction: {0}")]
    UnknownInstruction(String),
    #[error("Division by zero")]
    DivisionByZero,
    #[error(transparent)]
    Lang(#[from] LangError),
}

/// Type alias for `Result<T, MachError>`.
pub type MachResult<T> = Result<T, MachError>;
