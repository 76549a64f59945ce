use crate::parse::SyntaxError;
use crate::roll::EvaluationError;

/// Anything that can go wrong between reading an expression and showing its result.
///
/// Callers that only need "something went wrong" can handle this type; callers that
/// re-prompt on bad input can match [RollError::Syntax] alone.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RollError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

impl RollError {
    pub fn is_syntax(&self) -> bool {
        matches!(self, Self::Syntax(_))
    }
}
