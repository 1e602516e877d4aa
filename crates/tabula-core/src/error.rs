//! Per-cell formula error tags.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure classes for formula evaluation.
///
/// A `FormulaError` is carried as the value of an evaluated cell, never
/// raised across the model boundary: one bad formula cannot abort the
/// surrounding update.
#[derive(Clone, Copy, Debug, Error, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum FormulaError {
    /// Circular or otherwise invalid cell reference.
    #[error("#REF!")]
    Ref,

    /// Unknown function or identifier.
    #[error("#NAME?")]
    Name,

    /// Division by zero.
    #[error("#DIV/0!")]
    Div0,

    /// Operand or argument of the wrong type.
    #[error("#VALUE!")]
    Value,

    /// Invalid numeric result.
    #[error("#NUM!")]
    Num,

    /// Any other evaluation failure.
    #[error("#ERROR!")]
    Error,
}
