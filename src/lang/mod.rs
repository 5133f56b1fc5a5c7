//! The language front-end: operand and condition parsing, and program
//! segmentation.

use thiserror::Error;

pub mod condition;
pub mod operand;
pub mod segment;

pub use condition::{parse_condition, split_condition, CmpOp, Condition};
pub use operand::{parse_operand, parse_target, Operand, Target};
pub use segment::{segment, Segmenter, Unit};

/// An error raised while parsing operands or conditions.
///
/// Display strings are exactly what follows `Error: ` in program output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LangError {
    #[error("Invalid register: {0}")]
    InvalidRegister(String),
    #[error("Malformed operand: {0}")]
    MalformedOperand(String),
    #[error("Invalid condition: {0}")]
    InvalidCondition(String),
    #[error("Invalid operator: {0}")]
    InvalidOperator(String),
}

/// Type alias for `Result<T, LangError>`.
pub type LangResult<T> = Result<T, LangError>;
