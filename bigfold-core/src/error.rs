#[cfg(feature = "std")]
use std::path::PathBuf;

use alloc::vec::Vec;

use thiserror::Error;

use crate::diagnostic::Diagnostic;

/// Failure of a [`BigInt`](crate::big_int::BigInt) operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum BigIntError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("numeric overflow")]
    Overflow,
    #[error("negative value")]
    Negative,
    #[error("malformed integer literal")]
    MalformedLiteral,
    #[error("shift amount out of range")]
    ShiftOutOfRange,
}

/// Failure of an operation on [`ExactValue`](crate::exact_value::ExactValue)s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExactValueError {
    #[error(transparent)]
    Arithmetic(#[from] BigIntError),
    #[error("operator `{op}` is not defined for {operand} operands")]
    InvalidOperation {
        op: &'static str,
        operand: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[cfg(feature = "std")]
    #[error("failed to read source: {0}")]
    SourceIo(#[from] std::io::Error),
    #[cfg(feature = "std")]
    #[error("package directory was not found at {0}")]
    MissingPackage(PathBuf),
    #[error("constant folding failed with {} error(s)", error_count(.0))]
    Diagnostics(Vec<Diagnostic>),
}

fn error_count(diagnostics: &[Diagnostic]) -> usize {
    diagnostics.iter().filter(|diag| diag.is_error()).count()
}

impl CoreError {
    /// Diagnostics carried by a failed fold; empty for other errors.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            CoreError::Diagnostics(diagnostics) => diagnostics,
            #[cfg(feature = "std")]
            _ => &[],
        }
    }
}
