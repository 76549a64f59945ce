use crate::common::{Int, UInt};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    #[error("Cannot roll more than {max} dice.")]
    TooManyRolls { max: usize },
    #[error("Cannot roll dice with more than {max} sides.")]
    TooManySides { max: UInt },
    #[error("Cannot roll a die with {0} sides.")]
    NonPositiveSides(Int),
    #[error("Cannot roll {0} dice.")]
    NegativeCount(Int),
    #[error("Division by zero.")]
    ZeroDivision,
    #[error("Modulo by zero.")]
    ZeroModulo,
    #[error("Integer overflow.")]
    Overflow,
    #[error("Expression has not been evaluated.")]
    NotEvaluated,
}
